//! Asignación de registros por sentencia.
//!
//! Cada clase de registros (`$t*` para enteros, `$f*` para flotantes)
//! es un conjunto acotado de slots. Los resultados intermedios de una
//! expresión son temporales que viven en un slot. Si no hay slots libres,
//! el temporal más antiguo que no esté bloqueado se guarda en un slot de
//! spill en memoria y se recarga cuando se vuelva a leer.

use std::fmt::{self, Display, Write};

use super::Context;
use crate::semantic::Type;

/// Registros enteros disponibles.
const INT_FILE: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

/// Registros flotantes disponibles. `$f0` y `$f12` quedan reservados
/// para valores de retorno y argumentos de syscall.
const FLOAT_FILE: [u8; 10] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

/// Tamaño mínimo de un pool: una operación binaria bloquea dos registros.
pub const MIN_POOL: usize = 2;

/// Tamaño máximo de un pool.
pub const MAX_POOL: usize = INT_FILE.len();

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reg {
    class: Type,
    number: u8,
}

impl Display for Reg {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            Type::Int => write!(fmt, "$t{}", self.number),
            Type::Float => write!(fmt, "$f{}", self.number),
        }
    }
}

/// Resultado intermedio de una expresión.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Temp {
    id: usize,
    class: Type,
}

impl Temp {
    pub fn class(self) -> Type {
        self.class
    }
}

/// Slot de spill en la sección de datos.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spill {
    class: Type,
    index: usize,
}

impl Display for Spill {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            Type::Int => write!(fmt, "spill.i{}", self.index),
            Type::Float => write!(fmt, "spill.f{}", self.index),
        }
    }
}

/// Estado de ambos pools de registros.
pub struct Allocations {
    int: Pool,
    float: Pool,
    next_id: usize,
}

struct Pool {
    slots: Vec<Slot>,
    spilled: Vec<(usize, usize)>,
    free_spills: Vec<usize>,
    spill_count: usize,
}

struct Slot {
    reg: Reg,
    entry: Option<Entry>,
}

struct Entry {
    temp: usize,
    sequence: usize,
}

impl Context<'_> {
    /// Asigna un registro a un temporal nuevo de la clase indicada.
    pub fn fresh(
        &mut self,
        regs: &mut Allocations,
        class: Type,
        locked: &[Reg],
    ) -> Result<(Temp, Reg), fmt::Error> {
        let temp = Temp {
            id: regs.next_sequence(),
            class,
        };

        let reg = self.take_slot(regs, class, locked, temp.id)?;
        Ok((temp, reg))
    }

    /// Obtiene el registro de un temporal, recargándolo si fue
    /// desplazado a memoria.
    pub fn read(
        &mut self,
        regs: &mut Allocations,
        temp: Temp,
        locked: &[Reg],
    ) -> Result<Reg, fmt::Error> {
        if let Some(reg) = regs.pool(temp.class).find(temp.id) {
            return Ok(reg);
        }

        // El slot de spill se libera hasta después de la recarga, ya que
        // el spill de otro temporal podría reutilizarlo
        let reg = self.take_slot(regs, temp.class, locked, temp.id)?;
        let spill = regs.pool(temp.class).unspill(temp.id);

        match temp.class {
            Type::Int => emit!(self, "lw", "{}, {}", reg, spill)?,
            Type::Float => emit!(self, "l.s", "{}, {}", reg, spill)?,
        }

        Ok(reg)
    }

    fn take_slot(
        &mut self,
        regs: &mut Allocations,
        class: Type,
        locked: &[Reg],
        temp: usize,
    ) -> Result<Reg, fmt::Error> {
        let sequence = regs.next_sequence();
        let pool = regs.pool(class);

        let index = match pool.slots.iter().position(|slot| slot.entry.is_none()) {
            Some(index) => index,

            None => {
                // Todos los registros están ocupados, se hace spill del más antiguo
                let (index, victim) = pool
                    .slots
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| !locked.contains(&slot.reg))
                    .filter_map(|(index, slot)| slot.entry.as_ref().map(|entry| (index, entry)))
                    .min_by_key(|(_, entry)| entry.sequence)
                    .map(|(index, entry)| (index, entry.temp))
                    .expect("register pool exhaustion");

                let spill = pool.spill(victim);
                let reg = pool.slots[index].reg;

                match class {
                    Type::Int => emit!(self, "sw", "{}, {}", reg, spill)?,
                    Type::Float => emit!(self, "s.s", "{}, {}", reg, spill)?,
                }

                index
            }
        };

        let slot = &mut regs.pool(class).slots[index];
        slot.entry = Some(Entry { temp, sequence });

        Ok(slot.reg)
    }
}

impl Allocations {
    /// Construye pools de `size` registros cada uno.
    pub fn new(size: usize) -> Self {
        let size = size.clamp(MIN_POOL, MAX_POOL);

        Allocations {
            int: Pool::new(Type::Int, &INT_FILE[..size]),
            float: Pool::new(Type::Float, &FLOAT_FILE[..size]),
            next_id: 0,
        }
    }

    /// Cantidad máxima de slots de spill usados por una clase.
    pub fn spill_count(&self, class: Type) -> usize {
        match class {
            Type::Int => self.int.spill_count,
            Type::Float => self.float.spill_count,
        }
    }

    /// Libera el registro de un temporal que ya no se necesita.
    pub fn release(&mut self, temp: Temp) {
        let pool = self.pool(temp.class);

        match pool.slots.iter().position(|slot| slot.holds(temp.id)) {
            Some(index) => pool.slots[index].entry = None,
            None => {
                pool.unspill(temp.id);
            }
        }
    }

    /// Libera todos los registros. Ningún temporal sobrevive a su sentencia.
    pub fn clear(&mut self) {
        for pool in [&mut self.int, &mut self.float] {
            for slot in pool.slots.iter_mut() {
                slot.entry = None;
            }

            let spilled = pool.spilled.drain(..).map(|(_, index)| index);
            pool.free_spills.extend(spilled);
        }
    }

    /// Todos los registros están libres.
    pub fn is_clear(&self) -> bool {
        [&self.int, &self.float].iter().all(|pool| {
            pool.spilled.is_empty() && pool.slots.iter().all(|slot| slot.entry.is_none())
        })
    }

    fn pool(&mut self, class: Type) -> &mut Pool {
        match class {
            Type::Int => &mut self.int,
            Type::Float => &mut self.float,
        }
    }

    fn next_sequence(&mut self) -> usize {
        let next = self.next_id;
        self.next_id += 1;

        next
    }
}

impl Pool {
    fn new(class: Type, file: &[u8]) -> Self {
        let slots = file
            .iter()
            .map(|&number| Slot {
                reg: Reg { class, number },
                entry: None,
            })
            .collect();

        Pool {
            slots,
            spilled: Vec::new(),
            free_spills: Vec::new(),
            spill_count: 0,
        }
    }

    fn find(&self, temp: usize) -> Option<Reg> {
        self.slots
            .iter()
            .find(|slot| slot.holds(temp))
            .map(|slot| slot.reg)
    }

    fn unspill(&mut self, temp: usize) -> Spill {
        let position = self
            .spilled
            .iter()
            .position(|(id, _)| *id == temp)
            .expect("temporary is neither in a register nor spilled");

        let (_, index) = self.spilled.swap_remove(position);
        self.free_spills.push(index);

        Spill {
            class: self.class(),
            index,
        }
    }

    fn class(&self) -> Type {
        self.slots[0].reg.class
    }

    fn spill(&mut self, temp: usize) -> Spill {
        let index = self.free_spills.pop().unwrap_or_else(|| {
            self.spill_count += 1;
            self.spill_count - 1
        });

        self.spilled.push((temp, index));

        Spill {
            class: self.class(),
            index,
        }
    }
}

impl Slot {
    fn holds(&self, temp: usize) -> bool {
        matches!(&self.entry, Some(entry) if entry.temp == temp)
    }
}

/// Escribe las entradas de datos de los slots de spill usados.
pub fn write_spills<W: Write>(regs: &Allocations, output: &mut W) -> fmt::Result {
    for class in [Type::Int, Type::Float] {
        for index in 0..regs.spill_count(class) {
            let spill = Spill { class, index };
            match class {
                Type::Int => writeln!(output, "{}: .word 0", spill)?,
                Type::Float => writeln!(output, "{}: .float 0.0", spill)?,
            }
        }
    }

    Ok(())
}
