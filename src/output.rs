use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 80;

/// Writes `message` to stdout and, when given, to `writer` as well.
pub fn println(message: &str, writer: &mut Option<&mut dyn Write>) -> io::Result<()> {
    if let Err(e) = writeln!(io::stdout(), "{message}") {
        tracing::warn!(error = %e, "failed to write to stdout");
    }

    if let Some(w) = writer {
        writeln!(w, "{message}")?;
    }

    Ok(())
}

pub fn separator(writer: &mut Option<&mut dyn Write>) -> io::Result<()> {
    println(&"-".repeat(SEPARATOR_WIDTH), writer)
}
