//! Stache - Handlebars Front End
//!
//! Turns Handlebars template text into tokens, a syntax tree and an opcode
//! program for a separate runtime to execute.
//!
//! ```
//! use stache::{compile, Options};
//!
//! let program = compile("Hello {{name}}!", &Options::new()).unwrap();
//! assert_eq!(program.opcodes.len(), 9);
//! ```
mod compile;
mod log;
mod print;
mod region;

pub use compile::{
    compile,
    emit::{Depths, Opcode, Program},
    lex,
    lex::token::{Kind, Token},
    options::{FixtureOptions, Flags, Options, BUILTIN_HELPERS},
    parse,
    parse::tree::{
        self as ast, BlockStatement, BooleanLiteral, CommentStatement, ContentStatement,
        Expression, Hash, HashPair, MustacheStatement, NumberLiteral, PartialStatement,
        PathExpression, Statement, StringLiteral, Strip, SubExpression,
    },
};
pub use log::{last_error, Error, ErrorKind, Pointer, Visual};
pub use print::{
    ast_to_text, compile_print, lex_print, parse_print, program_to_text, tokens_to_text,
};
pub use region::{Position, Region};

/// Return the version of this crate.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
