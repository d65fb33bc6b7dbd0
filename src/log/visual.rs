mod pointer;

pub use pointer::Pointer;

use std::fmt::{Debug, Formatter, Result};
use unicode_width::UnicodeWidthStr;

/// Gutter drawn between line numbers and source text.
const GUTTER: &str = "|";
/// Marker that introduces the help text.
const NOTE: &str = "=";
/// Character used to underline the highlighted source text.
const CARET: &str = "^";

/// A rendering attached to an [`Error`][`super::Error`] that illustrates
/// where in the template the failure happened.
///
/// Only written by the alternate form of `Display`, `{:#}`.
pub trait Visual: Debug {
    /// Write the visualization to the given Formatter.
    ///
    /// `name` is the template name, when the error has one, and `help` is
    /// the help text to close the visualization with.
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        name: Option<&str>,
        help: Option<&str>,
    ) -> Result;
}

/// Return the number of terminal cells the text occupies.
fn cells(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}
