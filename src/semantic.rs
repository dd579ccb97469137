//! Análisis semántico.
//!
//! Esta fase no recorre un árbol por su cuenta: el parser la invoca a
//! medida que avanza, registrando declaraciones y verificando usos y
//! asignaciones en el mismo orden en que aparecen en el código fuente.
//! Los errores semánticos nunca detienen la compilación; se acumulan
//! y se reportan todos juntos. Una compilación es semánticamente válida
//! si y solo si no se acumuló error alguno.

use thiserror::Error;

use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use crate::{lex::Identifier, source::Located};

/// Tipo de una variable o expresión.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
}

impl Type {
    /// Determina si un valor de tipo `value` puede guardarse en una
    /// variable de tipo `self`.
    ///
    /// Se permite ensanchar de `int` a `float`, pero no lo contrario.
    pub fn accepts(self, value: Type) -> bool {
        self == value || (self, value) == (Type::Float, Type::Int)
    }

    /// Promoción numérica: `float` domina sobre `int`.
    pub fn promote(self, other: Type) -> Type {
        if self == Type::Float || other == Type::Float {
            Type::Float
        } else {
            Type::Int
        }
    }

    /// Promoción entre tipos posiblemente desconocidos.
    ///
    /// Un operando desconocido no impide inferir `float`, pero sí `int`.
    pub fn infer(lhs: Option<Type>, rhs: Option<Type>) -> Option<Type> {
        match (lhs, rhs) {
            (Some(Type::Float), _) | (_, Some(Type::Float)) => Some(Type::Float),
            (Some(lhs), Some(rhs)) => Some(lhs.promote(rhs)),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => fmt.write_str("int"),
            Type::Float => fmt.write_str("float"),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Variable `{0}` has already been declared")]
    Redeclared(Identifier),

    #[error("Variable `{0}` has not been declared")]
    Undeclared(Identifier),

    #[error("Variable `{name}` is declared as `{declared}` but initialized with a value of type `{found}`")]
    DeclarationMismatch {
        name: Identifier,
        declared: Type,
        found: Type,
    },

    #[error("Cannot assign a value of type `{found}` to variable `{name}` of type `{expected}`")]
    AssignmentMismatch {
        name: Identifier,
        expected: Type,
        found: Type,
    },
}

/// Tabla de símbolos: nombre declarado a tipo declarado.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<Identifier, Type>,
}

impl SymbolTable {
    /// Busca el tipo de una variable.
    pub fn get(&self, name: &Identifier) -> Option<Type> {
        self.symbols.get(name).copied()
    }

    /// Cantidad de variables declaradas.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Itera sobre los símbolos en orden alfabético.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, Type)> {
        let mut symbols: Vec<_> = self.symbols.iter().map(|(id, typ)| (id, *typ)).collect();
        symbols.sort_by(|(a, _), (b, _)| a.cmp(b));

        symbols.into_iter()
    }
}

/// Estado semántico de una pasada: tabla de símbolos y errores acumulados.
#[derive(Default)]
pub struct Analyzer {
    table: SymbolTable,
    errors: Vec<Located<SemanticError>>,
}

impl Analyzer {
    /// Declara una variable. Una redeclaración no sobrescribe a la original.
    pub fn declare(&mut self, name: &Located<Identifier>, typ: Type) {
        let id = name.as_ref();
        if self.table.symbols.contains_key(id) {
            self.report(name, SemanticError::Redeclared(id.clone()));
        } else {
            self.table.symbols.insert(id.clone(), typ);
        }
    }

    /// Verifica que una variable haya sido declarada antes de su uso.
    pub fn check_variable(&mut self, name: &Located<Identifier>) -> Option<Type> {
        let typ = self.table.get(name.as_ref());
        if typ.is_none() {
            self.report(name, SemanticError::Undeclared(name.as_ref().clone()));
        }

        typ
    }

    /// Verifica que el inicializador de una declaración sea compatible.
    pub fn check_declaration(&mut self, name: &Located<Identifier>, declared: Type, found: Type) {
        if !declared.accepts(found) {
            let error = SemanticError::DeclarationMismatch {
                name: name.as_ref().clone(),
                declared,
                found,
            };

            self.report(name, error);
        }
    }

    /// Verifica que el valor asignado a una variable sea compatible con
    /// su tipo. Variables no declaradas ya fueron reportadas por
    /// [`Analyzer::check_variable()`], por lo cual se ignoran aquí.
    pub fn check_assignment(&mut self, name: &Located<Identifier>, found: Type) {
        let expected = match self.table.get(name.as_ref()) {
            Some(expected) => expected,
            None => return,
        };

        if !expected.accepts(found) {
            let error = SemanticError::AssignmentMismatch {
                name: name.as_ref().clone(),
                expected,
                found,
            };

            self.report(name, error);
        }
    }

    /// Concluye el análisis.
    pub fn finish(self) -> (SymbolTable, Vec<Located<SemanticError>>) {
        (self.table, self.errors)
    }

    fn report(&mut self, at: &Located<Identifier>, error: SemanticError) {
        self.errors.push(Located::at(error, at.location().clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn id(name: &str) -> Located<Identifier> {
        let source = Source::new("test", name);
        Located::at(Identifier::new(name), source.eof())
    }

    #[test]
    fn promotion() {
        assert_eq!(Type::Int.promote(Type::Int), Type::Int);
        assert_eq!(Type::Int.promote(Type::Float), Type::Float);
        assert_eq!(Type::infer(None, Some(Type::Float)), Some(Type::Float));
        assert_eq!(Type::infer(Some(Type::Int), None), None);
        assert_eq!(Type::infer(None, None), None);
    }

    #[test]
    fn widening_is_one_way() {
        assert!(Type::Float.accepts(Type::Int));
        assert!(!Type::Int.accepts(Type::Float));
    }

    #[test]
    fn redeclaration_keeps_first_type() {
        let mut analyzer = Analyzer::default();
        analyzer.declare(&id("x"), Type::Int);
        analyzer.declare(&id("x"), Type::Float);

        let (table, errors) = analyzer.finish();
        assert_eq!(table.get(&Identifier::new("x")), Some(Type::Int));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].val(),
            &SemanticError::Redeclared(Identifier::new("x"))
        );
    }

    #[test]
    fn undeclared_use() {
        let mut analyzer = Analyzer::default();
        assert_eq!(analyzer.check_variable(&id("y")), None);

        let (_, errors) = analyzer.finish();
        assert!(matches!(errors[0].val(), SemanticError::Undeclared(y) if y == "y"));
    }

    #[test]
    fn assignment_checks() {
        let mut analyzer = Analyzer::default();
        analyzer.declare(&id("i"), Type::Int);
        analyzer.declare(&id("f"), Type::Float);

        analyzer.check_assignment(&id("f"), Type::Int);
        analyzer.check_assignment(&id("missing"), Type::Float);
        analyzer.check_assignment(&id("i"), Type::Float);

        let (_, errors) = analyzer.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].val().to_string(),
            "Cannot assign a value of type `float` to variable `i` of type `int`"
        );
    }
}
