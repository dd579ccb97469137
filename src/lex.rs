//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone el texto fuente en
//! unidades léxicas denominadas lexemas. Los espacios en blanco se descartan
//! durante esta operación. Cada lexema emitido está asociado a una ubicación
//! en el código fuente original, lo cual permite rastrear errores tanto en
//! los lexemas mismos como en constructos más elevados de fases posteriores.
//!
//! # Reglas
//! En cada posición se prueba una lista fija y ordenada de reglas. Gana la
//! **primera** regla que coincide exactamente en esa posición, no la más
//! larga. Por esta razón las palabras reservadas se listan antes que los
//! identificadores y los operadores de dos caracteres antes que sus prefijos
//! de un carácter. Las palabras reservadas exigen una frontera de palabra al
//! final, por lo cual `integer` es un identificador y no `int` + `eger`.
//!
//! # Errores
//! El lexer nunca se detiene ante entrada inválida. Si ninguna regla
//! coincide, se reporta el carácter ofensivo, se avanza exactamente un
//! carácter y se continúa. Esto garantiza terminación para toda entrada
//! finita y permite reportar todos los errores léxicos en una sola pasada.

use crate::source::{Located, Location, Position, Source};
use std::{
    fmt::{self, Display},
    rc::Rc,
};

use thiserror::Error;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Unrecognized character {0:?} in input")]
    BadChar(char),
}

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Rc<str>);

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier(Rc::from(name))
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

/// Clasificación cerrada de un lexema.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// `int`
    Int,

    /// `float`
    Float,

    /// `print`
    Print,

    /// `if`
    If,

    /// `else`
    Else,

    /// Palabra de tipo sin uso en la gramática (`void`).
    Type,

    Identifier,
    IntLiteral,
    RealLiteral,
    StringLiteral,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `/`
    Divide,

    /// `<`, `<=`, `>`, `>=`
    Relational,

    /// `||`
    Or,

    /// `&&`
    And,

    /// `!`
    Not,

    /// `==`, `!=`
    Equality,

    /// `;`
    Semicolon,

    /// `,`
    Comma,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,

    /// `{`
    OpenCurly,

    /// `}`
    CloseCurly,

    /// `=`
    Assign,
}

impl Category {
    /// Ordinal de despliegue para tablas de lexemas.
    ///
    /// No tiene significado semántico alguno.
    pub fn rank(self) -> u32 {
        use Category::*;

        match self {
            Identifier => 0,
            IntLiteral => 1,
            RealLiteral => 2,
            StringLiteral => 3,
            Type => 4,
            Plus | Minus => 5,
            Times | Divide => 6,
            Relational => 7,
            Or => 8,
            And => 9,
            Not => 10,
            Equality => 11,
            Semicolon => 12,
            Comma => 13,
            OpenParen => 14,
            CloseParen => 15,
            OpenCurly => 16,
            CloseCurly => 17,
            Assign => 18,
            If => 19,
            Else => 22,
            Int => 23,
            Float | Print => 24,
        }
    }

    /// Categorías cuya ausencia al final de la entrada se reporta.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Category::OpenParen | Category::CloseParen | Category::OpenCurly | Category::CloseCurly
        )
    }
}

impl Display for Category {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Category::*;

        let label = match self {
            Int => "reserved word `int`",
            Float => "reserved word `float`",
            Print => "reserved word `print`",
            If => "reserved word `if`",
            Else => "reserved word `else`",
            Type => "type",
            Identifier => "identifier",
            IntLiteral => "integer literal",
            RealLiteral => "real literal",
            StringLiteral => "string literal",
            Plus => "`+`",
            Minus => "`-`",
            Times => "`*`",
            Divide => "`/`",
            Relational => "relational operator",
            Or => "`||`",
            And => "`&&`",
            Not => "`!`",
            Equality => "equality operator",
            Semicolon => "`;`",
            Comma => "`,`",
            OpenParen => "`(`",
            CloseParen => "`)`",
            OpenCurly => "`{`",
            CloseCurly => "`}`",
            Assign => "`=`",
        };

        fmt.write_str(label)
    }
}

/// Objeto resultante del análisis léxico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    text: String,
    category: Category,
}

impl Lexeme {
    /// Texto original, nunca vacío.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Ver [`Category::rank()`].
    pub fn rank(&self) -> u32 {
        self.category.rank()
    }
}

impl Display for Lexeme {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Category::Identifier => write!(fmt, "identifier `{}`", self.text),
            Category::IntLiteral | Category::RealLiteral => write!(fmt, "literal `{}`", self.text),
            Category::StringLiteral => write!(fmt, "string {}", self.text),
            _ => write!(fmt, "`{}`", self.text),
        }
    }
}

/// Forma que debe tener el texto para que una regla coincida.
enum Pattern {
    /// Palabra exacta seguida de una frontera de palabra.
    Word(&'static str),

    /// Secuencia exacta de caracteres.
    Exact(&'static str),

    /// `[ \t\r\n]+`
    Whitespace,

    /// `[A-Za-z_][A-Za-z0-9_]*`
    Identifier,

    /// `\d+\.\d+`
    Real,

    /// `\d+`
    Integer,

    /// `".*?"`, sin cruzar líneas
    Str,
}

impl Pattern {
    /// Longitud en bytes de la coincidencia al inicio de `text`, si la hay.
    fn matches(&self, text: &str) -> Option<usize> {
        use Pattern::*;

        let bytes = text.as_bytes();
        let length = match self {
            Word(word) if text.starts_with(word) => {
                let boundary = text[word.len()..]
                    .chars()
                    .next()
                    .map_or(true, |c| !is_word_char(c));

                if boundary {
                    word.len()
                } else {
                    0
                }
            }

            Word(_) => 0,

            Exact(exact) if text.starts_with(exact) => exact.len(),
            Exact(_) => 0,

            Whitespace => count_while(bytes, |b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')),

            Identifier => match bytes.first() {
                Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {
                    1 + count_while(&bytes[1..], |b| b.is_ascii_alphanumeric() || b == b'_')
                }

                _ => 0,
            },

            Real => {
                let whole = count_while(bytes, |b| b.is_ascii_digit());
                match bytes.get(whole) {
                    Some(b'.') if whole > 0 => {
                        let fraction = count_while(&bytes[whole + 1..], |b| b.is_ascii_digit());
                        if fraction > 0 {
                            whole + 1 + fraction
                        } else {
                            0
                        }
                    }

                    _ => 0,
                }
            }

            Integer => count_while(bytes, |b| b.is_ascii_digit()),

            Str => match bytes.first() {
                Some(b'"') => bytes[1..]
                    .iter()
                    .take_while(|&&b| b != b'\n')
                    .position(|&b| b == b'"')
                    .map_or(0, |closing| closing + 2),

                _ => 0,
            },
        };

        Some(length).filter(|&length| length > 0)
    }
}

/// Reglas léxicas en orden de prioridad. `None` descarta la coincidencia.
const RULES: &[(Pattern, Option<Category>)] = &[
    (Pattern::Word("int"), Some(Category::Int)),
    (Pattern::Word("float"), Some(Category::Float)),
    (Pattern::Word("print"), Some(Category::Print)),
    (Pattern::Word("if"), Some(Category::If)),
    (Pattern::Word("else"), Some(Category::Else)),
    (Pattern::Word("void"), Some(Category::Type)),
    (Pattern::Whitespace, None),
    (Pattern::Identifier, Some(Category::Identifier)),
    (Pattern::Real, Some(Category::RealLiteral)),
    (Pattern::Integer, Some(Category::IntLiteral)),
    (Pattern::Str, Some(Category::StringLiteral)),
    (Pattern::Exact("+"), Some(Category::Plus)),
    (Pattern::Exact("-"), Some(Category::Minus)),
    (Pattern::Exact("*"), Some(Category::Times)),
    (Pattern::Exact("/"), Some(Category::Divide)),
    (Pattern::Exact("<="), Some(Category::Relational)),
    (Pattern::Exact(">="), Some(Category::Relational)),
    (Pattern::Exact("<"), Some(Category::Relational)),
    (Pattern::Exact(">"), Some(Category::Relational)),
    (Pattern::Exact("||"), Some(Category::Or)),
    (Pattern::Exact("&&"), Some(Category::And)),
    (Pattern::Exact("=="), Some(Category::Equality)),
    (Pattern::Exact("!="), Some(Category::Equality)),
    (Pattern::Exact("!"), Some(Category::Not)),
    (Pattern::Exact(";"), Some(Category::Semicolon)),
    (Pattern::Exact(","), Some(Category::Comma)),
    (Pattern::Exact("("), Some(Category::OpenParen)),
    (Pattern::Exact(")"), Some(Category::CloseParen)),
    (Pattern::Exact("{"), Some(Category::OpenCurly)),
    (Pattern::Exact("}"), Some(Category::CloseCurly)),
    (Pattern::Exact("="), Some(Category::Assign)),
];

/// Resultado completo del análisis léxico.
///
/// Ambas secuencias conservan el orden de aparición en la entrada.
pub struct Lexed {
    pub lexemes: Vec<Located<Lexeme>>,
    pub errors: Vec<Located<LexerError>>,
    pub eof: Location,
}

/// Analiza por completo un texto fuente.
pub fn analyse(source: &Rc<Source>) -> Lexed {
    Lexer::new(source).exhaust()
}

/// Escáner por primera coincidencia sobre un texto fuente.
pub struct Lexer<'a> {
    source: Rc<Source>,
    rest: &'a str,
    next: Position,
}

impl<'a> Lexer<'a> {
    /// Crea un lexer en la primera posición de un texto fuente.
    pub fn new(source: &'a Rc<Source>) -> Self {
        Lexer {
            source: Rc::clone(source),
            rest: source.text(),
            next: Position::default(),
        }
    }

    /// Consume toda la entrada, acumulando por separado lexemas y errores.
    ///
    /// A diferencia de otras fases, un error no detiene la acumulación
    /// de lexemas válidos posteriores.
    pub fn exhaust(self) -> Lexed {
        let eof = self.source.eof();

        let mut lexemes = Vec::new();
        let mut errors = Vec::new();

        for result in self {
            match result {
                Ok(lexeme) => lexemes.push(lexeme),
                Err(error) => errors.push(error),
            }
        }

        Lexed {
            lexemes,
            errors,
            eof,
        }
    }

    /// Avanza sobre los primeros `length` bytes de la entrada restante.
    fn consume(&mut self, length: usize) -> (&'a str, Location) {
        let (taken, rest) = self.rest.split_at(length);
        let start = self.next;

        self.next = taken.chars().fold(start, Position::after);
        self.rest = rest;

        (taken, Location::new(&self.source, start, self.next))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Located<Lexeme>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bad = self.rest.chars().next()?;

            let matched = RULES.iter().find_map(|(pattern, category)| {
                pattern.matches(self.rest).map(|length| (length, *category))
            });

            match matched {
                // Espacio en blanco: se consume sin emitir nada
                Some((length, None)) => {
                    self.consume(length);
                }

                Some((length, Some(category))) => {
                    let (text, location) = self.consume(length);
                    let lexeme = Lexeme {
                        text: text.to_owned(),
                        category,
                    };

                    break Some(Ok(Located::at(lexeme, location)));
                }

                // Ninguna regla coincide, se salta exactamente un carácter
                None => {
                    let (_, location) = self.consume(bad.len_utf8());
                    break Some(Err(Located::at(LexerError::BadChar(bad), location)));
                }
            }
        }
    }
}

/// Determina si un carácter rompe una frontera de palabra.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn count_while<F>(bytes: &[u8], predicate: F) -> usize
where
    F: Fn(u8) -> bool,
{
    bytes.iter().take_while(|&&b| predicate(b)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Lexed {
        analyse(&Source::new("test", text))
    }

    fn categories(text: &str) -> Vec<Category> {
        lex(text)
            .lexemes
            .iter()
            .map(|lexeme| lexeme.val().category())
            .collect()
    }

    #[test]
    fn declaration() {
        use Category::*;

        assert_eq!(
            categories("int x = 5;"),
            vec![Int, Identifier, Assign, IntLiteral, Semicolon]
        );
    }

    #[test]
    fn reserved_words_need_a_boundary() {
        use Category::*;

        assert_eq!(
            categories("integer int_x printer print"),
            vec![Identifier, Identifier, Identifier, Print]
        );
    }

    #[test]
    fn longer_operators_win() {
        let lexed = lex("a <= b != c == d >= e < f");
        let operators: Vec<_> = lexed
            .lexemes
            .iter()
            .filter(|lexeme| lexeme.val().category() != Category::Identifier)
            .map(|lexeme| lexeme.val().text().to_owned())
            .collect();

        assert_eq!(operators, ["<=", "!=", "==", ">=", "<"]);
        assert!(lexed.errors.is_empty());
    }

    #[test]
    fn literals() {
        use Category::*;

        assert_eq!(
            categories("3.14 42 7. \"hi there\""),
            vec![RealLiteral, IntLiteral, IntLiteral, StringLiteral]
        );
    }

    #[test]
    fn bad_chars_are_skipped() {
        let lexed = lex("int $x = 5 @;\n#");

        let errors: Vec<_> = lexed
            .errors
            .iter()
            .map(|error| match error.val() {
                LexerError::BadChar(c) => (*c, error.location().line()),
            })
            .collect();

        assert_eq!(errors, [('$', 1), ('@', 1), ('#', 2)]);
        assert_eq!(lexed.lexemes.len(), 5);
    }

    #[test]
    fn lines_advance_on_newlines() {
        let lexed = lex("int x;\n\nx = 1;\r\nprint(x);");
        let lines: Vec<_> = lexed
            .lexemes
            .iter()
            .map(|lexeme| lexeme.location().line())
            .collect();

        assert_eq!(lines, [1, 1, 1, 3, 3, 3, 3, 4, 4, 4, 4, 4]);
    }

    #[test]
    fn every_char_is_accounted_for() {
        let text = "int x=5;$float y=x*2.5;?print(y);`";
        let lexed = lex(text);

        let consumed: usize = lexed
            .lexemes
            .iter()
            .map(|lexeme| lexeme.val().text().len())
            .sum();

        let whitespace = text.chars().filter(char::is_ascii_whitespace).count();

        assert_eq!(consumed + whitespace + lexed.errors.len(), text.len());
        assert_eq!(lexed.errors.len(), 3);
    }

    #[test]
    fn unterminated_string() {
        let lexed = lex("\"abc\nx");
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.errors[0].val(), &LexerError::BadChar('"'));
        assert_eq!(lexed.lexemes.len(), 2);
    }

    #[test]
    fn deterministic() {
        let text = "if (a < 2) { print(a); } else { b = a / 3; }";
        let first = lex(text);
        let second = lex(text);

        assert_eq!(
            first.lexemes.iter().map(Located::val).collect::<Vec<_>>(),
            second.lexemes.iter().map(Located::val).collect::<Vec<_>>()
        );
    }
}
