use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    cells, Visual, CARET, GUTTER, NOTE,
};
use crate::region::{Position, Region};

/// A type of `Visual` that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number is one indexed.
    line: usize,
    /// The display column that the Pointer is pointing to.
    ///
    /// This number is zero indexed and measured in terminal cells.
    column: usize,
    /// The length of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Visual over the given source text and Region.
    ///
    /// A `Region` that spans several lines is highlighted up to the end of
    /// its first line.
    pub fn new(source: &str, region: Region) -> Self {
        let Position { line, offset, .. } = Position::locate(source, region.begin);
        let line_begin = source[..offset].rfind('\n').map(|n| n + 1).unwrap_or(0);
        let line_end = source[offset..]
            .find('\n')
            .map(|n| offset + n)
            .unwrap_or(source.len());

        let text = source[line_begin..line_end].trim_end_matches('\r').to_string();
        let column = cells(&source[line_begin..offset]);
        let highlighted = Region::new(offset..region.end.clamp(offset, line_end));
        let length = max(1, cells(highlighted.literal(source)));

        Self {
            line,
            column,
            length,
            text,
        }
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        name: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = self.line.to_string();
        let col = self.column + 1;
        let pad = cells(&num);
        let align = self.column + self.length;

        let extra = "-".repeat(3_usize.saturating_sub(self.length));
        let name = name.unwrap_or("?");
        let text = &self.text;
        let underline = CARET.repeat(self.length);
        let blank = "";

        write!(
            formatter,
            "\n {blank:pad$}--> {name}:{num}:{col}\
             \n {blank:pad$} {GUTTER}\
             \n {num:>} {GUTTER} {text}\
             \n {blank:pad$} {GUTTER} {YELLOW}{underline:>align$}{RESET}{extra}\
             \n {blank:pad$} {GUTTER}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{blank:pad$} {NOTE} help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Pointer;

    #[test]
    fn test_pointer_second_line() {
        let pointer = Pointer::new("hello\n{{#each people}}", (9..13).into());

        assert_eq!(
            pointer,
            Pointer {
                line: 2,
                column: 3,
                length: 4,
                text: "{{#each people}}".to_string()
            }
        );
    }

    #[test]
    fn test_pointer_end_of_source() {
        let pointer = Pointer::new("{{foo", (5..5).into());

        assert_eq!(pointer.column, 5);
        assert_eq!(pointer.length, 1);
    }

    #[test]
    fn test_pointer_empty_source() {
        let pointer = Pointer::new("", (0..0).into());

        assert_eq!(pointer.text, "");
        assert_eq!(pointer.line, 1);
    }
}
