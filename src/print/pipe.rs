use serde_json::Value;
use std::fmt::{Arguments, Display, Result, Write};

/// Wraps some underlying buffer by providing methods that write to it
/// with indentation and in different formats.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
    /// Current nesting level, two spaces each.
    level: usize,
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer, level: 0 }
    }

    /// Increase the nesting level of lines written with [`Pipe::line`].
    #[inline]
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decrease the nesting level of lines written with [`Pipe::line`].
    #[inline]
    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Write the given text on a line of its own, at the current nesting
    /// level.
    pub fn line(&mut self, text: impl Display) -> Result {
        self.pad()?;
        writeln!(self.buffer, "{text}")
    }

    /// Write the indentation for the current nesting level.
    pub fn pad(&mut self) -> Result {
        for _ in 0..self.level {
            self.buffer.write_str("  ")?;
        }

        Ok(())
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// Strings are quoted and escaped, arrays are written with every item
    /// separated by a comma.
    pub fn write_value(&mut self, value: &Value) -> Result {
        match value {
            Value::Null => self.write_null(),
            Value::Array(array) => self.write_array(array),
            _ => self.write_display(value),
        }
    }

    /// Write the value to the buffer using the Display implementation.
    fn write_display(&mut self, value: impl Display) -> Result {
        write!(self.buffer, "{}", value)
    }

    /// Write the literal text "null" to the buffer.
    fn write_null(&mut self) -> Result {
        write!(self.buffer, "null")
    }

    /// Write the value to the buffer as a comma separated list and
    /// surrounded by brackets.
    fn write_array(&mut self, value: &[Value]) -> Result {
        write!(self.buffer, "[")?;
        for (n, item) in value.iter().enumerate() {
            if n > 0 {
                write!(self.buffer, ", ")?;
            }
            self.write_value(item)?;
        }
        write!(self.buffer, "]")
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}
