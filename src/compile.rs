pub mod emit;
pub mod lex;
pub mod options;
pub mod parse;
pub mod syntax;

use crate::{
    compile::{
        emit::{Compiler, Program},
        lex::{
            token::{Kind, Token},
            Lexer,
        },
        options::Options,
        parse::{tree, Parser},
    },
    log::{self, Error},
};
use tracing::debug;

/// Turn the given source text into tokens.
///
/// The trailing [`Kind::Eof`] token is not included.
///
/// # Examples
///
/// ```
/// use stache::{lex, Kind};
///
/// let tokens = lex("Hello {{name}}!").unwrap();
/// let kinds: Vec<Kind> = tokens.iter().map(|token| token.kind).collect();
///
/// assert_eq!(
///     kinds,
///     vec![Kind::Content, Kind::Open, Kind::Id, Kind::Close, Kind::Content]
/// );
/// ```
pub fn lex(source: &str) -> Result<Vec<Token>, Error> {
    log::record(tokenize(source).map(|mut tokens| {
        if tokens.last().is_some_and(|token| token.is(Kind::Eof)) {
            tokens.pop();
        }
        tokens
    }))
}

/// Parse the given source text into a syntax tree.
///
/// # Examples
///
/// ```
/// use stache::{parse, Statement};
///
/// let program = parse("{{#if ok}}yes{{/if}}").unwrap();
/// assert!(matches!(program.body[0], Statement::Block(_)));
///
/// assert!(parse("{{#if ok}}yes{{/each}}").is_err());
/// ```
pub fn parse(source: &str) -> Result<tree::Program, Error> {
    log::record(parse_source(source))
}

/// Compile the given source text into an opcode [`Program`].
///
/// # Examples
///
/// ```
/// use stache::{compile, Flags, Opcode, Options};
///
/// let options = Options::new().with_flags(Flags::KNOWN_HELPERS_ONLY);
/// let program = compile("{{name}}", &options).unwrap();
///
/// assert!(!program
///     .opcodes
///     .iter()
///     .any(|opcode| matches!(opcode, Opcode::InvokeAmbiguous { .. })));
/// ```
pub fn compile(source: &str, options: &Options) -> Result<Program, Error> {
    log::record(parse_source(source).and_then(|tree| {
        let program = Compiler::new(source, options).compile(&tree)?;
        debug!(
            flags = %options.flags(),
            opcodes = program.opcodes.len(),
            children = program.children.len(),
            "compiled template"
        );

        Ok(program)
    }))
}

fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let finder = syntax::finder();
    let tokens = Lexer::new(source, &finder).tokenize()?;
    debug!(length = source.len(), tokens = tokens.len(), "lexed template");

    Ok(tokens)
}

fn parse_source(source: &str) -> Result<tree::Program, Error> {
    let tokens = tokenize(source)?;
    let program = Parser::new(source, tokens).parse()?;
    debug!(statements = program.body.len(), "parsed template");

    Ok(program)
}
