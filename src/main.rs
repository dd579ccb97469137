//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! traducción y expone una CLI. Cada fase solo se ejecuta si la
//! anterior concluyó sin errores.

use anyhow::{self, bail, Context};
use bitflags::bitflags;
use clap::{self, crate_version, Arg};
use ssptl::{
    codegen::{self, Options, MAX_POOL, MIN_POOL},
    error::{Diagnostics, Phase},
    extract, interpret, lex, parse,
    source::Source,
};

use std::{
    fs::{self, File},
    io::{self, Read, Write},
    mem,
    rc::Rc,
};

bitflags! {
    /// Salidas solicitadas.
    struct Emit: u8 {
        const TOKENS = 0b001;
        const ASM    = 0b010;
        const RUN    = 0b100;
    }
}

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = clap::Command::new("ssptl")
        .version(crate_version!())
        .about("Translator for a minimal imperative language")
        .arg(
            Arg::new("input")
                .required(true)
                .value_name("FILE")
                .help("Source file ('-' for stdin)"),
        )
        .arg(
            Arg::new("emit")
                .long("emit")
                .value_name("KIND")
                .takes_value(true)
                .multiple_values(true)
                .use_value_delimiter(true)
                .default_value("asm,run")
                .possible_values(["tokens", "asm", "run"])
                .help("Outputs to produce"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .takes_value(true)
                .value_name("FILE")
                .help("Assembly output file (stdout by default)"),
        )
        .arg(
            Arg::new("registers")
                .long("registers")
                .takes_value(true)
                .value_name("N")
                .default_value("10")
                .help("Registers per pool before spilling"),
        )
        .get_matches();

    // Se extraen argumentos necesarios
    let input = args.value_of("input").unwrap_or("-");
    let output = args.value_of("output");

    let emit = args
        .values_of("emit")
        .into_iter()
        .flatten()
        .fold(Emit::empty(), |emit, kind| match kind {
            "tokens" => emit | Emit::TOKENS,
            "asm" => emit | Emit::ASM,
            _ => emit | Emit::RUN,
        });

    let registers = args.value_of("registers").unwrap_or("10");
    let registers: usize = registers
        .parse()
        .with_context(|| format!("Invalid register count: {}", registers))?;

    if !(MIN_POOL..=MAX_POOL).contains(&registers) {
        bail!(
            "Register count must be between {} and {}, found {}",
            MIN_POOL,
            MAX_POOL,
            registers
        );
    }

    let source = read_source(input)?;

    // Si el ensamblador sale por stdout, todo lo demás va a stderr
    let mut report: Box<dyn Write> = if asm_on_stdout(emit, output) {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    let mut lexed = lex::analyse(&source);
    if emit.contains(Emit::TOKENS) {
        writeln!(report, "{:<16} {:<28} {}", "LEXEME", "CATEGORY", "RANK")?;
        for lexeme in &lexed.lexemes {
            let lexeme = lexeme.val();
            let category = lexeme.category().to_string();

            writeln!(report, "{:<16} {:<28} {}", lexeme.text(), category, lexeme.rank())?;
        }
    }

    stage(mem::take(&mut lexed.errors), Phase::Lexical)?;

    let (ast, syntax, semantic) = parse::parse(&lexed).split();
    stage(syntax, Phase::Syntax)?;
    stage(semantic, Phase::Semantic)?;

    let records = extract::extract(&ast);

    if emit.contains(Emit::ASM) {
        let asm = codegen::generate(&records, &Options { registers });
        match output {
            Some(path) => {
                let mut file = File::create(path)
                    .with_context(|| format!("Failed to open for writing: {}", path))?;

                file.write_all(asm.as_bytes())
                    .with_context(|| format!("Failed to emit to file: {}", path))?;
            }

            None => {
                io::stdout()
                    .write_all(asm.as_bytes())
                    .context("Failed to emit to stdout")?;
            }
        }
    }

    if emit.contains(Emit::RUN) {
        match interpret::run(&records) {
            Ok(printed) => {
                if !printed.is_empty() {
                    writeln!(report, "{}", printed)?;
                }
            }

            Err(error) => {
                eprint!("{}", Diagnostics::from(error).phase(Phase::Runtime));
                bail!("Execution failed");
            }
        }
    }

    Ok(())
}

/// Reporta los errores de una fase y falla si hubo alguno.
fn stage<E>(errors: Vec<E>, phase: Phase) -> anyhow::Result<()>
where
    Diagnostics: From<Vec<E>>,
{
    let count = errors.len();
    if count > 0 {
        eprint!("{}", Diagnostics::from(errors).phase(phase));
        bail!("{} analysis failed with {} error(s)", stage_name(phase), count);
    }

    eprintln!("{} analysis completed with no errors", stage_name(phase));
    Ok(())
}

fn asm_on_stdout(emit: Emit, output: Option<&str>) -> bool {
    emit.contains(Emit::ASM) && output.is_none()
}

fn stage_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Lexical => "Lexical",
        Phase::Syntax => "Syntax",
        Phase::Semantic => "Semantic",
        Phase::Runtime => "Runtime",
    }
}

fn read_source(input: &str) -> anyhow::Result<Rc<Source>> {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read from stdin")?;

        Ok(Source::new("<stdin>", text))
    } else {
        let text =
            fs::read_to_string(input).with_context(|| format!("Failed to read: {}", input))?;

        Ok(Source::new(input, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_is_reserved_for_assembly() {
        assert!(asm_on_stdout(Emit::ASM | Emit::RUN, None));
        assert!(!asm_on_stdout(Emit::ASM | Emit::RUN, Some("out.s")));
        assert!(!asm_on_stdout(Emit::TOKENS | Emit::RUN, None));
    }
}
