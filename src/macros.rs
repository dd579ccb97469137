/// Emite una instrucción con operandos alineados.
macro_rules! emit {
    ($context:expr, $opcode:expr) => {
        writeln!($context.output(), "\t{}", $opcode)
    };

    ($context:expr, $opcode:expr, $($format:tt)*) => {{
        write!($context.output(), "\t{:8}", $opcode)?;
        writeln!($context.output(), $($format)*)
    }};
}

/// Emite una etiqueta local.
macro_rules! label {
    ($context:expr, $($format:tt)*) => {{
        write!($context.output(), $($format)*)?;
        writeln!($context.output(), ":")
    }};
}
