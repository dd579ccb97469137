//! Rastreo de ubicaciones originales en código fuente.
//!
//! Los distintos objetos internos que el compilador construye
//! deben llevar cuenta de posiciones o rangos de ubicaciones en
//! el código fuente original, lo cual permite determinar un punto
//! exacto o aproximado en donde ocurre un error de cualquier fase.

use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::Range,
    rc::Rc,
};

/// Ancho de los divisores de tabulador.
const TAB_STOP: u32 = 4;

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone)]
pub struct Located<T> {
    location: Location,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la ubicación.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Location, T) {
        (self.location, self.value)
    }

    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }

    /// Transforma el valor con la misma ubicación.
    pub fn map<U, F>(self, map: F) -> Located<U>
    where
        F: FnOnce(T) -> U,
    {
        Located {
            value: map(self.value),
            location: self.location,
        }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Una ubicación está conformada por un origen y un rango de posiciones.
///
/// El final del rango es exclusivo: apunta a la columna que sigue al
/// último carácter cubierto.
#[derive(Clone)]
pub struct Location {
    from: Rc<Source>,
    position: Range<Position>,
}

impl Location {
    /// Construye una ubicación a partir de posiciones de inicio y fin.
    pub fn new(from: &Rc<Source>, start: Position, end: Position) -> Self {
        Location {
            from: Rc::clone(from),
            position: start..end,
        }
    }

    /// Unifica un rango de ubicaciones. Se asume el mismo origen.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            from: from.from,
            position: from.position.start..to.position.end,
        }
    }

    /// Obtiene la posición de inicio.
    pub fn start(&self) -> Position {
        self.position.start
    }

    /// Obtiene la posición de fin.
    pub fn end(&self) -> Position {
        self.position.end
    }

    /// Número de línea donde inicia la ubicación.
    pub fn line(&self) -> u32 {
        self.position.start.line
    }

    /// Obtiene el código fuente de origen.
    pub fn source(&self) -> &Source {
        &self.from
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:", self.from.name)?;

        let Range { start, end } = self.position;
        if end == start.advance() || end.line != start.line {
            // Solo se señala una columna en específico
            write!(formatter, "{}", start)
        } else {
            write!(formatter, "[{}-{}]", start, end.back())
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Una posición línea-columna en un archivo.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    /// Obtiene el número de línea.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Obtiene el número de columna.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Incrementa el número de columna.
    pub fn advance(self) -> Position {
        Position {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// Decrementa el número de columna.
    pub fn back(self) -> Position {
        Position {
            line: self.line,
            column: self.column - 1,
        }
    }

    /// Incrementa el número de línea y retorna a la columna 1.
    pub fn newline(self) -> Position {
        Position {
            line: self.line + 1,
            column: 1,
        }
    }

    /// Ajusta la posición a la siguiente columna de tabulador.
    pub fn tab(self) -> Position {
        let column = 1 + ((self.column - 1) / TAB_STOP + 1) * TAB_STOP;
        Position {
            line: self.line,
            column,
        }
    }

    /// Posición que sigue a un carácter.
    pub fn after(self, c: char) -> Position {
        match c {
            '\n' => self.newline(),
            '\t' => self.tab(),
            _ => self.advance(),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

/// Código fuente completo junto a su nombre de origen.
///
/// El texto ya se encuentra decodificado; el compilador no asume
/// nada acerca de rutas ni codificaciones.
pub struct Source {
    name: String,
    text: String,
}

impl Source {
    /// Registra un texto fuente bajo un nombre (ruta o `<stdin>`).
    pub fn new<N, T>(name: N, text: T) -> Rc<Self>
    where
        N: Into<String>,
        T: Into<String>,
    {
        Rc::new(Source {
            name: name.into(),
            text: text.into(),
        })
    }

    /// Nombre de origen.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Texto completo.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ubicación de un solo carácter en la posición indicada.
    pub fn point(self: &Rc<Self>, at: Position) -> Location {
        Location::new(self, at, at.advance())
    }

    /// Ubicación inmediatamente posterior al último carácter.
    pub fn eof(self: &Rc<Self>) -> Location {
        let end = self
            .text
            .chars()
            .fold(Position::default(), |position, c| position.after(c));

        self.point(end)
    }

    /// Invoca a `callback` con el contenido de una línea, sin su fin
    /// de línea. Las líneas inexistentes se observan vacías.
    pub fn with_line<F, R>(&self, line: u32, callback: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let text = (line as usize)
            .checked_sub(1)
            .and_then(|index| self.text.lines().nth(index))
            .unwrap_or("");

        callback(text.trim_end_matches('\r'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_newlines_and_tabs() {
        let start = Position::default();
        assert_eq!(start.after('a'), Position { line: 1, column: 2 });
        assert_eq!(start.after('\n'), Position { line: 2, column: 1 });
        assert_eq!(start.after('\t'), Position { line: 1, column: 5 });
    }

    #[test]
    fn eof_points_past_last_char() {
        let source = Source::new("test", "int x;\nx = 1;");
        let eof = source.eof();

        assert_eq!(eof.line(), 2);
        assert_eq!(eof.start().column(), 7);
    }

    #[test]
    fn lines_are_one_based() {
        let source = Source::new("test", "first\r\nsecond\n");
        source.with_line(1, |line| assert_eq!(line, "first"));
        source.with_line(2, |line| assert_eq!(line, "second"));
        source.with_line(9, |line| assert_eq!(line, ""));
    }

    #[test]
    fn location_display() {
        let source = Source::new("main.txt", "int x;");
        let start = Position::default();
        let single = source.point(start);
        let wide = Location::new(&source, start, start.advance().advance().advance());

        assert_eq!(single.to_string(), "main.txt:1:1");
        assert_eq!(wide.to_string(), "main.txt:[1:1-1:3]");
    }
}
