//! Intérprete de registros.
//!
//! Ejecuta el programa directamente sobre los registros de
//! [`crate::extract`], sin pasar por ensamblador. Cada variable guarda
//! un valor entero o flotante. Las operaciones entre enteros son exactas
//! y reportan desbordamiento; la división siempre es real. Un resultado
//! flotante sin parte fraccionaria se guarda como entero.

use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use thiserror::Error;

use crate::{
    extract::Record,
    lex::Identifier,
    parse::{BinOp, Condition, Expr, RelOp},
    semantic::Type,
    source::{Located, Location},
};

/// Valor de una variable en tiempo de ejecución.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    Int(i128),
    Float(f64),
}

/// Límite exclusivo de los flotantes convertibles a `i128` (2^127).
const INT_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

impl Value {
    /// Valor inicial de una variable recién declarada.
    pub fn zero(of: Type) -> Self {
        match of {
            Type::Int => Value::Int(0),
            Type::Float => Value::Float(0.0),
        }
    }

    /// Un flotante entero y dentro de rango se guarda como entero.
    fn from_real(real: f64) -> Self {
        let whole = real.is_finite() && real.fract() == 0.0;
        if whole && (-INT_LIMIT..INT_LIMIT).contains(&real) {
            Value::Int(real as i128)
        } else {
            Value::Float(real)
        }
    }

    fn real(self) -> f64 {
        match self {
            Value::Int(int) => int as f64,
            Value::Float(float) => float,
        }
    }
}

impl Display for Value {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(int) => write!(fmt, "{}", int),
            Value::Float(float) => write!(fmt, "{:?}", float),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug, PartialEq)]
pub enum RuntimeError {
    #[error("Variable `{0}` has no value to print")]
    Undefined(Identifier),

    #[error("Cannot evaluate `{expr}`: {cause}")]
    Evaluation { expr: String, cause: EvalError },
}

/// Causa de una evaluación fallida.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvalError {
    #[error("variable `{0}` has no value")]
    Unbound(Identifier),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,
}

/// Ejecuta un programa y retorna las líneas impresas, unidas por `\n`.
///
/// El primer error detiene la ejecución.
pub fn run(records: &[Record]) -> Result<String, Located<RuntimeError>> {
    let mut machine = Machine::default();
    machine.block(records)?;

    Ok(machine.output.join("\n"))
}

#[derive(Default)]
struct Machine {
    variables: HashMap<Identifier, Value>,
    output: Vec<String>,
}

impl Machine {
    fn block(&mut self, records: &[Record]) -> Result<(), Located<RuntimeError>> {
        records.iter().try_for_each(|record| self.record(record))
    }

    fn record(&mut self, record: &Record) -> Result<(), Located<RuntimeError>> {
        match record {
            Record::VarDecl { name, of } => {
                self.variables.insert(name.clone(), Value::zero(*of));
            }

            Record::Assignment { name, value, .. } => {
                let result = self.evaluate(value)?;
                self.variables.insert(name.clone(), result);
            }

            Record::Print { value, .. } => {
                let line = match value.val().as_variable() {
                    Some(name) => match self.variables.get(name) {
                        Some(stored) => format!("{} = {}", name, stored),
                        None => {
                            let error = RuntimeError::Undefined(name.clone());
                            return Err(Located::at(error, value.location().clone()));
                        }
                    },

                    None => {
                        let result = self.evaluate(value)?;
                        format!("{} = {}", value.val(), result)
                    }
                };

                self.output.push(line);
            }

            Record::If {
                condition,
                body,
                otherwise,
            } => {
                if self.test(condition)? {
                    self.block(body)?;
                } else {
                    self.block(otherwise)?;
                }
            }
        }

        Ok(())
    }

    fn test(&self, condition: &Condition) -> Result<bool, Located<RuntimeError>> {
        let Condition { lhs, op, rhs } = condition;
        let located = |cause| {
            let error = RuntimeError::Evaluation {
                expr: condition.to_string(),
                cause,
            };

            Located::at(error, Location::span(lhs.location().clone(), rhs.location()))
        };

        let lhs = self.eval(lhs.val()).map_err(located)?;
        let rhs = self.eval(rhs.val()).map_err(located)?;

        let ordering = match (lhs, rhs) {
            (Value::Int(lhs), Value::Int(rhs)) => Some(lhs.cmp(&rhs)),
            (lhs, rhs) => lhs.real().partial_cmp(&rhs.real()),
        };

        // Toda comparación con NaN es falsa, excepto `!=`
        Ok(match ordering {
            Some(ordering) => match op {
                RelOp::Equal => ordering.is_eq(),
                RelOp::NotEqual => ordering.is_ne(),
                RelOp::Less => ordering.is_lt(),
                RelOp::LessOrEqual => ordering.is_le(),
                RelOp::Greater => ordering.is_gt(),
                RelOp::GreaterOrEqual => ordering.is_ge(),
            },

            None => *op == RelOp::NotEqual,
        })
    }

    fn evaluate(&self, expr: &Located<Expr>) -> Result<Value, Located<RuntimeError>> {
        self.eval(expr.val()).map_err(|cause| {
            let error = RuntimeError::Evaluation {
                expr: expr.val().to_string(),
                cause,
            };

            Located::at(error, expr.location().clone())
        })
    }

    fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Integer(integer) => Ok(Value::Int(i128::from(*integer))),
            Expr::Real(real) => Ok(Value::Float(*real)),

            Expr::Read(name) => self
                .variables
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::Unbound(name.clone())),

            Expr::Binary(lhs, op, rhs) => {
                let (lhs, rhs) = (self.eval(lhs.val())?, self.eval(rhs.val())?);
                binary(lhs, *op, rhs)
            }
        }
    }
}

fn binary(lhs: Value, op: BinOp, rhs: Value) -> Result<Value, EvalError> {
    use Value::*;

    match (lhs, op, rhs) {
        (Int(lhs), BinOp::Add, Int(rhs)) => {
            lhs.checked_add(rhs).map(Int).ok_or(EvalError::Overflow)
        }
        (Int(lhs), BinOp::Sub, Int(rhs)) => {
            lhs.checked_sub(rhs).map(Int).ok_or(EvalError::Overflow)
        }
        (Int(lhs), BinOp::Mul, Int(rhs)) => {
            lhs.checked_mul(rhs).map(Int).ok_or(EvalError::Overflow)
        }

        (Int(_), BinOp::Div, Int(0)) => Err(EvalError::DivisionByZero),

        // División exacta entre enteros, sin pasar por punto flotante
        (Int(lhs), BinOp::Div, Int(rhs)) if lhs % rhs == 0 => {
            lhs.checked_div(rhs).map(Int).ok_or(EvalError::Overflow)
        }

        (lhs, op, rhs) => {
            let (lhs, rhs) = (lhs.real(), rhs.real());
            let result = match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div if rhs == 0.0 => return Err(EvalError::DivisionByZero),
                BinOp::Div => lhs / rhs,
            };

            Ok(Value::from_real(result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extract::extract, lex, parse, source::Source};

    fn run_text(text: &str) -> Result<String, Located<RuntimeError>> {
        let parsed = parse::parse(&lex::analyse(&Source::new("test", text)));
        run(&extract(parsed.ast()))
    }

    #[test]
    fn precedence_and_print() {
        let output = run_text("int x = 5; int y = 2; int z = x + y * 2; print(z);");
        assert_eq!(output.unwrap(), "z = 9");
    }

    #[test]
    fn declarations_start_at_zero() {
        let output = run_text("int i; float f; print(i); print(f);");
        assert_eq!(output.unwrap(), "i = 0\nf = 0.0");
    }

    #[test]
    fn division_is_real() {
        let output = run_text("float a = 7; float b = 2; float c = a / b; print(c);\nint d = 8 / 4; print(d);");
        assert_eq!(output.unwrap(), "c = 3.5\nd = 2");
    }

    #[test]
    fn exact_name_lookup() {
        let output = run_text("int a = 1; int ab = 2; int b = ab + a; print(b);");
        assert_eq!(output.unwrap(), "b = 3");
    }

    #[test]
    fn printed_expressions_are_labeled() {
        let output = run_text("int a = 3; print(a * (a + 1));");
        assert_eq!(output.unwrap(), "a * (a + 1) = 12");
    }

    #[test]
    fn conditional_runs_one_branch() {
        let text = "int a = 3;\nif (a >= 3) { print(a); } else { a = 0; print(a); }";
        assert_eq!(run_text(text).unwrap(), "a = 3");

        let text = "int a = 1;\nif (a == 3) { print(a); } else { a = 0; print(a); }";
        assert_eq!(run_text(text).unwrap(), "a = 0");
    }

    #[test]
    fn integer_arithmetic_is_exact() {
        let output = run_text("int a = 123456789; int b = a * a; print(b);");
        assert_eq!(output.unwrap(), "b = 15241578750190521");

        let output = run_text("int a = 2000000000; int b = a * a * 3; print(b);");
        assert_eq!(output.unwrap(), "b = 12000000000000000000");

        let output = run_text("int a = 123456789; int b = a * a; int c = b / a; print(c);");
        assert_eq!(output.unwrap(), "c = 123456789");
    }

    #[test]
    fn integer_overflow() {
        let error = run_text("int a = 2000000000;\nint b = a * a * a * a * a;").unwrap_err();

        assert_eq!(error.location().line(), 2);
        assert!(matches!(
            error.val(),
            RuntimeError::Evaluation {
                cause: EvalError::Overflow,
                ..
            }
        ));
    }

    #[test]
    fn huge_floats_stay_floats() {
        let text = "float f = 100000000000000000000.0 * 100000000000000000000.0; print(f);";
        let output = run_text(text);
        assert_eq!(output.unwrap(), "f = 1e40");
    }

    #[test]
    fn unbound_variable() {
        let error = run_text("int a = 1;\nint b = a + c;").unwrap_err();

        assert_eq!(error.location().line(), 2);
        assert_eq!(
            error.val().to_string(),
            "Cannot evaluate `a + c`: variable `c` has no value"
        );
    }

    #[test]
    fn division_by_zero() {
        let error = run_text("int a = 0; int b = 1 / a;").unwrap_err();
        assert!(matches!(
            error.val(),
            RuntimeError::Evaluation {
                cause: EvalError::DivisionByZero,
                ..
            }
        ));
    }

    #[test]
    fn print_without_value() {
        let error = run_text("print(q);").unwrap_err();
        assert_eq!(error.val(), &RuntimeError::Undefined(Identifier::new("q")));
    }
}
