//! Canonical text renderings of tokens, syntax trees and compiled programs.
//!
//! The renderers are pure, the same input always produces the same text.
mod pipe;
mod program;
mod token;
mod tree;

pub use program::program_to_text;
pub use token::tokens_to_text;
pub use tree::ast_to_text;

use crate::{
    compile::{self, options::Options},
    log::Error,
};

/// Lex the source text and render the tokens.
pub fn lex_print(source: &str) -> Result<String, Error> {
    compile::lex(source).map(|tokens| tokens_to_text(&tokens))
}

/// Parse the source text and render the syntax tree.
///
/// # Examples
///
/// ```
/// assert_eq!(
///     stache::parse_print("{{! hi }}").unwrap(),
///     "{{! ' hi ' }}\n"
/// );
/// ```
pub fn parse_print(source: &str) -> Result<String, Error> {
    compile::parse(source).map(|program| ast_to_text(&program))
}

/// Compile the source text and render the opcode program.
pub fn compile_print(source: &str, options: &Options) -> Result<String, Error> {
    compile::compile(source, options).map(|program| program_to_text(&program))
}
