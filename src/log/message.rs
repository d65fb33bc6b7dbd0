use super::Error;
use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_CHARACTER: &str = "unexpected character";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_PATH: &str = "invalid path";
pub const UNKNOWN_HELPER: &str = "unknown helper";
pub const UNSUPPORTED_PARTIAL: &str = "unsupported partial arguments";
pub const UNTERMINATED_STRING: &str = "unterminated string";
pub const UNTERMINATED_COMMENT: &str = "unterminated comment";
pub const UNTERMINATED_SEGMENT: &str = "unterminated path segment";
pub const UNTERMINATED_RAW_BLOCK: &str = "unterminated raw block";

/// Return an [`Error`] explaining that the end of source was not expected
/// while lexing.
pub fn error_eof(source: &str) -> Error {
    let source_len = source.len();
    Error::lex(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help("expected additional tokens, did you close all mustaches?")
}

/// Return a string describing an unexpected token.
pub fn expected_token<T, Y>(expected: T, received: Y) -> String
where
    T: Display,
    Y: Display,
{
    format!("expected {expected}, found `{received}`")
}

/// Return a string describing a block whose close does not match its open.
pub fn expected_close<T, Y>(open: T, close: Y) -> String
where
    T: Display,
    Y: Display,
{
    format!("`{open}` doesn't match `{close}`")
}
