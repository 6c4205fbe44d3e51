//! Debug and progress lines Maltego reads from the transform's stderr.

use crate::error::{Result, TransformError};
use std::io::{self, Write};

/// Write a `D:<message>` debug line
pub fn write_debug<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "D:{}", message)
}

/// Write a `% <percent>` progress line. Fails unless 0 <= percent <= 100.
pub fn write_progress<W: Write>(out: &mut W, percent: i32) -> Result<()> {
    if !(0..=100).contains(&percent) {
        return Err(TransformError::OutOfRange(format!(
            "Percentage has to be in range 0-100, got {}",
            percent
        )));
    }
    writeln!(out, "% {}", percent)?;
    Ok(())
}

/// Debug line on stderr. A closed stderr is ignored.
pub fn debug(message: &str) {
    let _ = write_debug(&mut io::stderr().lock(), message);
}

/// Progress line on stderr
pub fn progress(percent: i32) -> Result<()> {
    write_progress(&mut io::stderr().lock(), percent)
}
