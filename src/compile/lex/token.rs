use crate::region::{Position, Region};
use serde::Serialize;
use std::fmt::Display;

/// Types emitted by the Lexer.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    /// Raw text outside of any mustache.
    Content,
    /// Beginning of an escaped mustache, `{{` or `{{&`.
    Open,
    /// Beginning of an unescaped mustache, `{{{`.
    OpenUnescaped,
    /// End of a mustache, `}}`.
    Close,
    /// End of an unescaped mustache, `}}}`.
    CloseUnescaped,
    /// Beginning of a block, `{{#`.
    OpenBlock,
    /// Beginning of a block close, `{{/`.
    OpenEndBlock,
    /// Beginning of an inverted block, `{{^`.
    OpenInverse,
    /// A complete `{{^}}` or `{{else}}` tag.
    Inverse,
    /// Beginning of a chained inverse, `{{else`.
    OpenInverseChain,
    /// Beginning of a partial, `{{>`.
    OpenPartial,
    /// A complete comment tag.
    Comment,
    /// Beginning of a raw block, `{{{{`.
    OpenRawBlock,
    /// End of the opening tag of a raw block, `}}}}`.
    CloseRawBlock,
    /// A complete `{{{{/name}}}}` tag.
    EndRawBlock,
    /// Beginning of a sub expression, `(`.
    OpenSexpr,
    /// End of a sub expression, `)`.
    CloseSexpr,
    /// Identifier, a single path segment.
    Id,
    /// Path separator, `.` or `/`.
    Sep,
    /// Hash pair assignment, `=`.
    Equals,
    /// Data variable marker, `@`.
    Data,
    /// Quoted string literal.
    String,
    /// Number literal.
    Number,
    /// `true` or `false`.
    Boolean,
    /// `undefined`.
    Undefined,
    /// `null`.
    Null,
    /// Beginning of block parameters, `as |`.
    OpenBlockParams,
    /// End of block parameters, `|`.
    CloseBlockParams,
    /// End of input.
    Eof,
}

impl Kind {
    /// Return the canonical name of the [`Kind`], as printed by
    /// [`tokens_to_text`][`crate::tokens_to_text`].
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Content => "CONTENT",
            Kind::Open => "OPEN",
            Kind::OpenUnescaped => "OPEN_UNESCAPED",
            Kind::Close => "CLOSE",
            Kind::CloseUnescaped => "CLOSE_UNESCAPED",
            Kind::OpenBlock => "OPEN_BLOCK",
            Kind::OpenEndBlock => "OPEN_ENDBLOCK",
            Kind::OpenInverse => "OPEN_INVERSE",
            Kind::Inverse => "INVERSE",
            Kind::OpenInverseChain => "OPEN_INVERSE_CHAIN",
            Kind::OpenPartial => "OPEN_PARTIAL",
            Kind::Comment => "COMMENT",
            Kind::OpenRawBlock => "OPEN_RAW_BLOCK",
            Kind::CloseRawBlock => "CLOSE_RAW_BLOCK",
            Kind::EndRawBlock => "END_RAW_BLOCK",
            Kind::OpenSexpr => "OPEN_SEXPR",
            Kind::CloseSexpr => "CLOSE_SEXPR",
            Kind::Id => "ID",
            Kind::Sep => "SEP",
            Kind::Equals => "EQUALS",
            Kind::Data => "DATA",
            Kind::String => "STRING",
            Kind::Number => "NUMBER",
            Kind::Boolean => "BOOLEAN",
            Kind::Undefined => "UNDEFINED",
            Kind::Null => "NULL",
            Kind::OpenBlockParams => "OPEN_BLOCK_PARAMS",
            Kind::CloseBlockParams => "CLOSE_BLOCK_PARAMS",
            Kind::Eof => "EOF",
        }
    }

    /// Return true if the [`Kind`] begins a mustache.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Kind::Open
                | Kind::OpenUnescaped
                | Kind::OpenBlock
                | Kind::OpenEndBlock
                | Kind::OpenInverse
                | Kind::OpenInverseChain
                | Kind::OpenPartial
                | Kind::OpenRawBlock
        )
    }

    /// Return true if the [`Kind`] ends a mustache.
    pub fn is_close(&self) -> bool {
        matches!(
            self,
            Kind::Close | Kind::CloseUnescaped | Kind::CloseRawBlock
        )
    }

    /// Return true if the [`Kind`] is a complete tag on its own.
    pub fn is_whole_tag(&self) -> bool {
        matches!(self, Kind::Inverse | Kind::Comment | Kind::EndRawBlock)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single token read from source text.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Token {
    /// The type of the token.
    pub kind: Kind,
    /// Text of the token.
    ///
    /// This is the matched source text, except for [`Kind::String`] which
    /// holds the unquoted and unescaped value, and [`Kind::EndRawBlock`]
    /// which holds the name of the block being closed.
    pub text: String,
    /// Area of the source text the token was read from.
    pub region: Region,
    /// Location of the first character of the token.
    pub position: Position,
}

impl Token {
    /// Create a new [`Token`].
    #[inline]
    pub fn new<T>(kind: Kind, text: T, region: Region, position: Position) -> Self
    where
        T: Into<String>,
    {
        Self {
            kind,
            text: text.into(),
            region,
            position,
        }
    }

    /// Return true if the token is of the given [`Kind`].
    #[inline]
    pub fn is(&self, kind: Kind) -> bool {
        self.kind == kind
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            Kind::Eof => write!(f, "end of input"),
            _ => write!(f, "{} ({})", self.text, self.kind),
        }
    }
}
