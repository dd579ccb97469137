//! Extracción de declaraciones.
//!
//! Los dos back ends ([`crate::codegen`] e [`crate::interpret`]) no
//! consumen el árbol sintáctico directamente, sino una lista plana de
//! registros: declaraciones, asignaciones, impresiones y condicionales.
//! Cada registro ya conoce el tipo con el que el back end debe tratar
//! a su variable.
//!
//! Los tipos se resuelven con un mapa de nombre a tipo declarado que se
//! construye de arriba hacia abajo mientras se recorre el programa. Una
//! variable que no se ha declarado se trata como `int`. Si una variable
//! se declara más de una vez, prevalece la primera declaración, al igual
//! que en la tabla de símbolos.

use std::collections::HashMap;

use crate::{
    lex::Identifier,
    parse::{Ast, Condition, Expr, Statement},
    semantic::Type,
    source::Located,
};

/// Sentencia plana para los back ends.
#[derive(Debug, Clone)]
pub enum Record {
    /// Reserva una variable con el valor cero de su tipo.
    VarDecl { name: Identifier, of: Type },

    /// Evalúa una expresión y la guarda en una variable de tipo `of`.
    Assignment {
        name: Identifier,
        of: Type,
        value: Located<Expr>,
    },

    /// Imprime el valor de una expresión de tipo `of`.
    Print { value: Located<Expr>, of: Type },

    /// Ejecuta uno de dos bloques según una comparación.
    If {
        condition: Condition,
        body: Vec<Record>,
        otherwise: Vec<Record>,
    },
}

/// Aplana un árbol sintáctico en registros para los back ends.
pub fn extract(ast: &Ast) -> Vec<Record> {
    let mut extractor = Extractor::default();
    extractor.block(ast.statements())
}

/// Tipos declarados de las variables vistas hasta el momento.
#[derive(Default)]
pub struct Declared(HashMap<Identifier, Type>);

impl Declared {
    /// Registra una declaración, salvo que ya exista una anterior.
    pub fn declare(&mut self, name: &Identifier, of: Type) {
        self.0.entry(name.clone()).or_insert(of);
    }

    /// Tipo de una variable, `int` si no se ha declarado.
    pub fn of(&self, name: &Identifier) -> Type {
        self.0.get(name).copied().unwrap_or(Type::Int)
    }

    /// Tipo de una expresión bajo la regla de promoción numérica.
    pub fn type_of(&self, expr: &Expr) -> Type {
        match expr {
            Expr::Integer(_) => Type::Int,
            Expr::Real(_) => Type::Float,
            Expr::Read(id) => self.of(id),
            Expr::Binary(lhs, _, rhs) => self.type_of(lhs.val()).promote(self.type_of(rhs.val())),
        }
    }
}

#[derive(Default)]
struct Extractor {
    declared: Declared,
}

impl Extractor {
    fn block(&mut self, statements: &[Statement]) -> Vec<Record> {
        let mut records = Vec::with_capacity(statements.len());
        for statement in statements {
            self.statement(statement, &mut records);
        }

        records
    }

    fn statement(&mut self, statement: &Statement, records: &mut Vec<Record>) {
        match statement {
            Statement::Declaration { name, of, value } => {
                let name = name.as_ref();
                self.declared.declare(name, *of);

                records.push(Record::VarDecl {
                    name: name.clone(),
                    of: *of,
                });

                // Una declaración con inicializador equivale a una
                // declaración seguida de una asignación
                if let Some(value) = value {
                    records.push(self.assignment(name, value));
                }
            }

            Statement::Assignment { target, value } => {
                records.push(self.assignment(target.as_ref(), value));
            }

            Statement::Print(value) => records.push(Record::Print {
                value: value.clone(),
                of: self.declared.type_of(value.val()),
            }),

            Statement::If {
                condition,
                body,
                otherwise,
            } => {
                let body = self.block(body);
                let otherwise = otherwise
                    .as_deref()
                    .map(|otherwise| self.block(otherwise))
                    .unwrap_or_default();

                records.push(Record::If {
                    condition: condition.clone(),
                    body,
                    otherwise,
                });
            }
        }
    }

    fn assignment(&self, name: &Identifier, value: &Located<Expr>) -> Record {
        Record::Assignment {
            name: name.clone(),
            of: self.declared.of(name),
            value: value.clone(),
        }
    }
}
