use morel::{Finder, Syntax};

/// Markers that the [`Lexer`][`super::lex::Lexer`] searches for while
/// reading content.
///
/// Everything that follows an opening marker (`{{{`, `{{#`, `{{~`, ...) is
/// told apart by the lexer itself once the marker has been found.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Marker {
    /// Beginning of any mustache, `{{`.
    Open = 0,
}

impl Marker {
    /// Return the literal text of the [`Marker`].
    pub fn text(&self) -> &'static str {
        match self {
            Marker::Open => "{{",
        }
    }
}

impl From<Marker> for usize {
    fn from(k: Marker) -> Self {
        k as usize
    }
}

/// Return a [`Finder`] that locates every [`Marker`] in source text.
pub fn finder() -> Finder {
    let markers = vec![(Marker::Open.into(), Marker::Open.text().to_string())];

    Finder::new(Syntax::new(markers))
}
