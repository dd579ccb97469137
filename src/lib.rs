//! Traductor para un lenguaje imperativo mínimo.
//!
//! # Front end
//! Cada programa deriva de un único texto fuente, registrado en
//! [`source`]. Este texto se somete primero a análisis léxico en
//! [`lex`], de lo cual se obtiene una secuencia de lexemas. Los lexemas
//! se disponen en un árbol sintáctico por medio de análisis sintáctico
//! en [`parse`], fase que a su vez conduce el análisis semántico de
//! [`semantic`] conforme avanza. Los errores de todas estas fases se
//! acumulan y se presentan por medio de [`error`].
//!
//! # Back ends
//! El árbol sintáctico se aplana en registros de declaraciones,
//! asignaciones e impresiones en [`extract`]. Sobre estos registros
//! operan dos back ends independientes: la generación de ensamblador
//! MIPS en [`codegen`] y la ejecución directa en [`interpret`].
//! Ninguno de los dos consulta los diagnósticos; la decisión de
//! detenerse ante errores corresponde a quien los invoca.

#[macro_use]
mod macros;

pub mod codegen;
pub mod error;
pub mod extract;
pub mod interpret;
pub mod lex;
pub mod parse;
pub mod semantic;
pub mod source;

use interpret::RuntimeError;
use source::{Located, Source};

/// Nombre de origen para textos que no provienen de un archivo.
const INPUT_NAME: &str = "<input>";

/// Traduce un texto fuente completo a ensamblador MIPS.
pub fn generate_assembly(text: &str) -> String {
    let records = records(text);
    codegen::generate(&records, &Default::default())
}

/// Ejecuta un texto fuente completo y retorna lo que imprime.
pub fn interpret(text: &str) -> Result<String, Located<RuntimeError>> {
    interpret::run(&records(text))
}

fn records(text: &str) -> Vec<extract::Record> {
    let lexed = lex::analyse(&Source::new(INPUT_NAME, text));
    let parsed = parse::parse(&lexed);

    extract::extract(parsed.ast())
}
