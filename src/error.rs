//! Reporte de diagnósticos.
//!
//! Todas las fases producen errores ubicados (`Located<E>`). Esta
//! interfaz los agrupa por fase y los presenta junto al fragmento de
//! código fuente donde ocurrieron.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Display},
};

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

/// Fase del compilador que originó un error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
}

impl Display for Phase {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Phase::Lexical => "Lexical error",
            Phase::Syntax => "Syntax error",
            Phase::Semantic => "Semantic error",
            Phase::Runtime => "Runtime error",
        };

        fmt.write_str(phase)
    }
}

/// Vista plana de un diagnóstico: fase, mensaje y línea.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub message: String,
    pub line: u32,
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} at line {}: {}", self.phase, self.line, self.message)
    }
}

pub struct Diagnostics {
    phase: Phase,
    errors: Vec<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    pub fn phase(self, phase: Phase) -> Self {
        Diagnostics { phase, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Diagnósticos en el orden en que fueron reportados.
    pub fn list(&self) -> Vec<Diagnostic> {
        self.errors
            .iter()
            .map(|error| Diagnostic {
                phase: self.phase,
                message: error.source().to_string(),
                line: error.location().line(),
            })
            .collect()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            phase: Phase::Syntax,
            errors: Default::default(),
        }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            errors: vec![Box::new(error)],
            ..Default::default()
        }
    }
}

impl<E: 'static + LocatedError> From<Vec<E>> for Diagnostics {
    fn from(errors: Vec<E>) -> Self {
        let errors = errors
            .into_iter()
            .map(|error| {
                let error: Box<dyn LocatedError> = Box::new(error);
                error
            })
            .collect();

        Diagnostics {
            errors,
            ..Default::default()
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { phase, errors } = self;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "{}: {}", phase, error.source())?;

            let location = error.location();
            writeln!(fmt, " --> {}", location)?;

            let digits = location.end().line().to_string().chars().count();
            writeln!(fmt, "{:digits$} |", "", digits = digits)?;

            for line_number in location.start().line()..=location.end().line() {
                location.source().with_line(line_number, |line| {
                    writeln!(fmt, "{:>digits$} | {}", line_number, line, digits = digits)
                })?
            }

            let from = location.start().column();
            let to = location.end().column().saturating_sub(1);
            let (min, max) = (from.min(to).max(1), from.max(to).max(1));

            let skip = (min - 1) as usize;
            let highlight = (max - min + 1) as usize;

            writeln!(
                fmt,
                "{:digits$} | {:skip$}{:^<highlight$}",
                "",
                "",
                "",
                digits = digits,
                skip = skip,
                highlight = highlight
            )?;

            writeln!(fmt)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        writeln!(
            fmt,
            "Build failed with {} {}",
            errors.len(),
            error_or_errors
        )
    }
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.as_ref()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex, source::Source};

    fn lexical(text: &str) -> Diagnostics {
        let lexed = lex::analyse(&Source::new("main.txt", text));
        Diagnostics::from(lexed.errors).phase(Phase::Lexical)
    }

    #[test]
    fn renders_excerpt_and_caret() {
        let rendered = lexical("int x;\nx = $5;").to_string();

        assert_eq!(
            rendered,
            concat!(
                "Lexical error: Unrecognized character '$' in input\n",
                " --> main.txt:2:5\n",
                " |\n",
                "2 | x = $5;\n",
                " |     ^\n",
                "\n",
                "Build failed with 1 error\n",
            )
        );
    }

    #[test]
    fn flat_list_carries_phase_and_line() {
        let diagnostics = lexical("a\n@\n#");

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.list()[1].to_string(),
            "Lexical error at line 3: Unrecognized character '#' in input"
        );
    }

    #[test]
    fn empty() {
        let diagnostics = lexical("int x;");
        assert!(diagnostics.is_empty());
        assert_eq!(diagnostics.to_string(), "No errors were reported\n");
    }
}
