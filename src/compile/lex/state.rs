/// Describes the internal state of a [`Lexer`][`super::Lexer`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CursorState {
    /// Indicates the [`Lexer`][`super::Lexer`] is reading content.
    Content,
    /// Indicates the [`Lexer`][`super::Lexer`] is reading content that
    /// follows an escaped mustache, `\{{`.
    Escaped,
    /// Indicates the [`Lexer`][`super::Lexer`] is at the beginning of
    /// a mustache and must read its opening delimiter.
    Open,
    /// Indicates the [`Lexer`][`super::Lexer`] is inside of a mustache.
    Inside,
    /// Indicates the [`Lexer`][`super::Lexer`] is reading the body of a
    /// raw block.
    Raw,
    /// Indicates the [`Lexer`][`super::Lexer`] has returned the end of input.
    Done,
}
