//! Generación de código MIPS.
//!
//! La salida es texto ensamblador para simuladores estilo SPIM/MARS: una
//! sección `.data` con una entrada por variable declarada, seguida de una
//! sección `.text` con el punto de entrada `main`. Las expresiones se
//! recorren en postorden y sus resultados intermedios se asignan con la
//! política de [`regs`]. La generación no consulta los diagnósticos; un
//! programa con errores semánticos también produce ensamblador.

use std::fmt::{self, Display, Write};

use crate::{
    extract::{Declared, Record},
    lex::Identifier,
    parse::{BinOp, Condition, Expr, RelOp},
    semantic::Type,
};

use regs::{Allocations, Temp};

mod regs;

pub use regs::{MAX_POOL, MIN_POOL};

/// Etiqueta del punto de entrada.
const ENTRY: &str = "main";

/// Opciones de generación.
#[derive(Copy, Clone, Debug)]
pub struct Options {
    /// Registros por pool, acotado a [`MIN_POOL`, `MAX_POOL`].
    pub registers: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            registers: MAX_POOL,
        }
    }
}

/// Genera el programa completo como texto.
pub fn generate(records: &[Record], options: &Options) -> String {
    let mut output = String::new();

    // Escribir a un String no falla
    let _ = write(records, options, &mut output);
    output
}

/// Escribe el programa completo en `output`.
pub fn write<W: Write>(records: &[Record], options: &Options, output: &mut W) -> fmt::Result {
    let mut declared = Declared::default();
    let mut order = Vec::new();
    collect_declarations(records, &mut declared, &mut order);

    let mut context = Context {
        text: String::new(),
        declared: &declared,
        labels: 0,
    };

    // La sección de texto se genera primero, ya que la cantidad de
    // slots de spill no se conoce hasta entonces
    let mut regs = Allocations::new(options.registers);
    context.block(&mut regs, records)?;

    writeln!(output, ".data")?;
    for name in &order {
        match declared.of(name) {
            Type::Int => writeln!(output, "{}: .word 0", Symbol(name))?,
            Type::Float => writeln!(output, "{}: .float 0.0", Symbol(name))?,
        }
    }

    regs::write_spills(&regs, output)?;

    writeln!(output, "\n.text\n.globl {0}\n{0}:", ENTRY)?;
    output.write_str(&context.text)?;

    writeln!(output, "\tli      $v0, 10")?;
    writeln!(output, "\tsyscall")
}

fn collect_declarations(records: &[Record], declared: &mut Declared, order: &mut Vec<Identifier>) {
    for record in records {
        match record {
            Record::VarDecl { name, of } => {
                if !order.contains(name) {
                    order.push(name.clone());
                    declared.declare(name, *of);
                }
            }

            Record::If {
                body, otherwise, ..
            } => {
                collect_declarations(body, declared, order);
                collect_declarations(otherwise, declared, order);
            }

            Record::Assignment { .. } | Record::Print { .. } => (),
        }
    }
}

/// Etiqueta de datos de una variable.
///
/// Un identificador que coincide con el punto de entrada se escribe como
/// `v.main`; el punto impide colisiones con otros identificadores.
struct Symbol<'a>(&'a Identifier);

impl Display for Symbol<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.as_ref() == ENTRY {
            write!(fmt, "v.{}", self.0)
        } else {
            write!(fmt, "{}", self.0)
        }
    }
}

struct Context<'a> {
    text: String,
    declared: &'a Declared,
    labels: usize,
}

impl Context<'_> {
    fn output(&mut self) -> &mut String {
        &mut self.text
    }

    fn block(&mut self, regs: &mut Allocations, records: &[Record]) -> fmt::Result {
        for record in records {
            self.record(regs, record)?;

            regs.clear();
            debug_assert!(regs.is_clear());
        }

        Ok(())
    }

    fn record(&mut self, regs: &mut Allocations, record: &Record) -> fmt::Result {
        match record {
            // Las declaraciones solo afectan a la sección de datos
            Record::VarDecl { .. } => Ok(()),

            Record::Assignment { name, of, value } => {
                let value = self.expr(regs, value.val())?;
                let value = self.convert(regs, value, *of)?;
                let reg = self.read(regs, value, &[])?;

                match of {
                    Type::Int => emit!(self, "sw", "{}, {}", reg, Symbol(name)),
                    Type::Float => emit!(self, "s.s", "{}, {}", reg, Symbol(name)),
                }
            }

            Record::Print { value, of } => {
                match (value.val().as_variable(), of) {
                    (Some(name), Type::Int) => emit!(self, "lw", "$a0, {}", Symbol(name))?,
                    (Some(name), Type::Float) => emit!(self, "l.s", "$f12, {}", Symbol(name))?,

                    (None, _) => {
                        let value = self.expr(regs, value.val())?;
                        let value = self.convert(regs, value, *of)?;
                        let reg = self.read(regs, value, &[])?;

                        match of {
                            Type::Int => emit!(self, "move", "$a0, {}", reg)?,
                            Type::Float => emit!(self, "mov.s", "$f12, {}", reg)?,
                        }
                    }
                }

                let code = match of {
                    Type::Int => 1,
                    Type::Float => 2,
                };

                emit!(self, "li", "$v0, {}", code)?;
                emit!(self, "syscall")?;

                emit!(self, "li", "$a0, 10")?;
                emit!(self, "li", "$v0, 11")?;
                emit!(self, "syscall")
            }

            Record::If {
                condition,
                body,
                otherwise,
            } => {
                let id = self.labels;
                self.labels += 1;

                let skip = if otherwise.is_empty() {
                    format!("endif.{}", id)
                } else {
                    format!("else.{}", id)
                };

                self.branch_unless(regs, condition, &skip)?;
                regs.clear();

                self.block(regs, body)?;

                if !otherwise.is_empty() {
                    emit!(self, "j", "endif.{}", id)?;
                    label!(self, "else.{}", id)?;
                    self.block(regs, otherwise)?;
                }

                label!(self, "endif.{}", id)
            }
        }
    }

    /// Evalúa una expresión en postorden. El resultado queda en un
    /// temporal de la clase de su tipo.
    fn expr(&mut self, regs: &mut Allocations, expr: &Expr) -> Result<Temp, fmt::Error> {
        match expr {
            Expr::Integer(integer) => {
                let (temp, reg) = self.fresh(regs, Type::Int, &[])?;
                emit!(self, "li", "{}, {}", reg, integer)?;

                Ok(temp)
            }

            Expr::Real(real) => {
                let (temp, reg) = self.fresh(regs, Type::Float, &[])?;
                emit!(self, "li.s", "{}, {:?}", reg, real)?;

                Ok(temp)
            }

            Expr::Read(name) => {
                let class = self.declared.of(name);
                let (temp, reg) = self.fresh(regs, class, &[])?;

                match class {
                    Type::Int => emit!(self, "lw", "{}, {}", reg, Symbol(name))?,
                    Type::Float => emit!(self, "l.s", "{}, {}", reg, Symbol(name))?,
                }

                Ok(temp)
            }

            Expr::Binary(lhs, op, rhs) => {
                let lhs = self.expr(regs, lhs.val())?;
                let rhs = self.expr(regs, rhs.val())?;
                let (lhs, rhs) = self.unify(regs, lhs, rhs)?;

                let lhs_reg = self.read(regs, lhs, &[])?;
                let rhs_reg = self.read(regs, rhs, &[lhs_reg])?;

                let opcode = match (op, lhs.class()) {
                    (BinOp::Add, Type::Int) => "add",
                    (BinOp::Sub, Type::Int) => "sub",
                    (BinOp::Mul, Type::Int) => "mul",
                    (BinOp::Div, Type::Int) => "div",
                    (BinOp::Add, Type::Float) => "add.s",
                    (BinOp::Sub, Type::Float) => "sub.s",
                    (BinOp::Mul, Type::Float) => "mul.s",
                    (BinOp::Div, Type::Float) => "div.s",
                };

                emit!(self, opcode, "{0}, {0}, {1}", lhs_reg, rhs_reg)?;
                regs.release(rhs);

                Ok(lhs)
            }
        }
    }

    /// Lleva a ambos operandos al tipo promovido de los dos.
    fn unify(
        &mut self,
        regs: &mut Allocations,
        lhs: Temp,
        rhs: Temp,
    ) -> Result<(Temp, Temp), fmt::Error> {
        let class = lhs.class().promote(rhs.class());
        let lhs = self.convert(regs, lhs, class)?;
        let rhs = self.convert(regs, rhs, class)?;

        Ok((lhs, rhs))
    }

    /// Convierte un temporal a otra clase de registro, si hace falta.
    fn convert(&mut self, regs: &mut Allocations, temp: Temp, to: Type) -> Result<Temp, fmt::Error> {
        if temp.class() == to {
            return Ok(temp);
        }

        let from = self.read(regs, temp, &[])?;
        let (converted, reg) = self.fresh(regs, to, &[])?;

        match to {
            Type::Float => {
                emit!(self, "mtc1", "{}, {}", from, reg)?;
                emit!(self, "cvt.s.w", "{0}, {0}", reg)?;
            }

            Type::Int => {
                emit!(self, "cvt.w.s", "{0}, {0}", from)?;
                emit!(self, "mfc1", "{}, {}", reg, from)?;
            }
        }

        regs.release(temp);
        Ok(converted)
    }

    /// Salta a `target` si la condición es falsa.
    fn branch_unless(
        &mut self,
        regs: &mut Allocations,
        condition: &Condition,
        target: &str,
    ) -> fmt::Result {
        let lhs = self.expr(regs, condition.lhs.val())?;
        let rhs = self.expr(regs, condition.rhs.val())?;
        let (lhs, rhs) = self.unify(regs, lhs, rhs)?;

        let lhs_reg = self.read(regs, lhs, &[])?;
        let rhs_reg = self.read(regs, rhs, &[lhs_reg])?;

        match lhs.class() {
            Type::Int => {
                let opcode = match condition.op {
                    RelOp::Equal => "bne",
                    RelOp::NotEqual => "beq",
                    RelOp::Less => "bge",
                    RelOp::LessOrEqual => "bgt",
                    RelOp::Greater => "ble",
                    RelOp::GreaterOrEqual => "blt",
                };

                emit!(self, opcode, "{}, {}, {}", lhs_reg, rhs_reg, target)
            }

            Type::Float => {
                // Solo existen comparaciones eq, lt y le; el resto se
                // obtiene invirtiendo el sentido del salto
                let (compare, jump_if_true) = match condition.op {
                    RelOp::Equal => ("c.eq.s", false),
                    RelOp::NotEqual => ("c.eq.s", true),
                    RelOp::Less => ("c.lt.s", false),
                    RelOp::LessOrEqual => ("c.le.s", false),
                    RelOp::Greater => ("c.le.s", true),
                    RelOp::GreaterOrEqual => ("c.lt.s", true),
                };

                let jump = if jump_if_true { "bc1t" } else { "bc1f" };

                emit!(self, compare, "{}, {}", lhs_reg, rhs_reg)?;
                emit!(self, jump, "{}", target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extract::extract, lex, parse, source::Source};

    fn assembly(text: &str, registers: usize) -> String {
        let parsed = parse::parse(&lex::analyse(&Source::new("test", text)));
        generate(&extract(parsed.ast()), &Options { registers })
    }

    #[test]
    fn data_and_text_sections() {
        let asm = assembly("int x = 5; int y = 2; int z = x + y * 2; print(z);", MAX_POOL);

        assert!(asm.starts_with(".data\nx: .word 0\ny: .word 0\nz: .word 0\n"));
        assert!(asm.contains("\n.text\n.globl main\nmain:\n"));
        assert!(asm.contains("\tmul     $t1, $t1, $t2\n\tadd     $t0, $t0, $t1\n\tsw      $t0, z\n"));
        assert!(asm.ends_with("\tli      $v0, 10\n\tsyscall\n"));
    }

    #[test]
    fn print_variable_and_newline() {
        let asm = assembly("int x = 1; print(x);", MAX_POOL);
        assert!(asm.contains(
            "\tlw      $a0, x\n\tli      $v0, 1\n\tsyscall\n\tli      $a0, 10\n\tli      $v0, 11\n\tsyscall\n"
        ));

        let asm = assembly("float f; print(f * 2);", MAX_POOL);
        assert!(asm.contains("\tmov.s   $f12, $f2\n\tli      $v0, 2\n"));
    }

    #[test]
    fn int_widens_to_float() {
        let asm = assembly("float f = 2;", MAX_POOL);

        assert!(asm.contains(".data\nf: .float 0.0\n"));
        assert!(asm.contains("\tmtc1    $t0, $f2\n\tcvt.s.w $f2, $f2\n\ts.s     $f2, f\n"));
    }

    #[test]
    fn exhausted_pool_spills() {
        let asm = assembly("int a = 1 + (2 + (3 + 4));", 2);

        assert!(asm.contains("spill.i0: .word 0\nspill.i1: .word 0\n"));
        assert!(asm.contains("\tsw      $t0, spill.i0\n"));
        assert!(asm.contains("\tlw      $t1, spill.i1\n\tadd     $t1, $t1, $t0\n"));
        assert!(asm.contains("\tlw      $t0, spill.i0\n\tadd     $t0, $t0, $t1\n\tsw      $t0, a\n"));
    }

    #[test]
    fn float_pool_spills() {
        let asm = assembly("float g = 1.5 + (2.5 + (3.5 + 4.5));", 2);

        assert!(asm.contains("g: .float 0.0\nspill.f0: .float 0.0\nspill.f1: .float 0.0\n"));
        assert!(asm.contains("\ts.s     $f2, spill.f0\n"));
        assert!(asm.contains("\tl.s     $f3, spill.f1\n\tadd.s   $f3, $f3, $f2\n"));
        assert!(asm.contains("\tl.s     $f2, spill.f0\n\tadd.s   $f2, $f2, $f3\n\ts.s     $f2, g\n"));
    }

    #[test]
    fn entry_label_is_not_shadowed() {
        let asm = assembly("int main = 1; print(main);", 10);

        assert_eq!(asm.lines().filter(|line| *line == "main:").count(), 1);
        assert!(asm.contains("v.main: .word 0\n"));
        assert!(asm.contains("\tsw      $t0, v.main\n"));
        assert!(asm.contains("\tlw      $a0, v.main\n"));
    }

    #[test]
    fn pool_size_is_bounded() {
        let asm = assembly("int a = 1 + 2;", 0);
        assert!(asm.contains("\tadd     $t0, $t0, $t1\n"));
        assert!(!asm.contains("spill"));
    }

    #[test]
    fn conditional_branches() {
        let asm = assembly("int a = 1; if (a > 0) { print(a); } else { a = 2; }", MAX_POOL);

        assert!(asm.contains("\tble     $t0, $t1, else.0\n"));
        assert!(asm.contains("\tj       endif.0\nelse.0:\n"));
        assert!(asm.contains("endif.0:\n"));

        let asm = assembly("float f = 1.5; if (f >= 2.5) { print(f); }", MAX_POOL);
        assert!(asm.contains("\tc.lt.s  $f2, $f3\n\tbc1t    endif.0\n"));
        assert!(!asm.contains("else.0"));
    }

    #[test]
    fn generation_is_deterministic() {
        let text = "float f = 1; int i = 2; if (i != 2) { f = f / i; } print(f);";
        assert_eq!(assembly(text, 3), assembly(text, 3));
    }
}
