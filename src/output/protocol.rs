//! Munin line protocol writer

use std::io::Write;
use crate::plugin::{Field, PluginError, PluginResult};

fn output_error(err: std::io::Error) -> PluginError {
    PluginError::output_failed(err.to_string())
}

/// Writes protocol lines to an output sink
pub struct LineWriter<W: Write> {
    out: W,
    lines_written: usize,
}

impl<W: Write> LineWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines_written: 0 }
    }

    /// Write a bare line (suggestions, autoconf answers)
    pub fn write_line(&mut self, line: &str) -> PluginResult<()> {
        writeln!(self.out, "{}", line).map_err(output_error)?;
        self.lines_written += 1;
        Ok(())
    }

    /// Write one `field value` line
    pub fn write_field(&mut self, field: &Field) -> PluginResult<()> {
        writeln!(self.out, "{} {}", field.name, field.value).map_err(output_error)?;
        self.lines_written += 1;
        Ok(())
    }

    /// Write every field in order
    pub fn write_fields(&mut self, fields: &[Field]) -> PluginResult<()> {
        for field in fields {
            self.write_field(field)?;
        }
        Ok(())
    }

    /// Write one bare line per entry in order
    pub fn write_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> PluginResult<()> {
        for line in lines {
            self.write_line(line.as_ref())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> PluginResult<()> {
        self.out.flush().map_err(output_error)?;
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
