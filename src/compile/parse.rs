//! Handlebars parser.
//!
//! Reads the tokens produced by the Lexer, along with the whitespace Shape
//! computed over them, and builds the Abstract Syntax Tree.
//!
//! Parsing is all-or-nothing, the first violation is returned as an Error and
//! no partial tree is produced.
pub mod tree;

mod block;

use self::{
    block::{Close, Open},
    tree::{
        BlockStatement, BooleanLiteral, CommentStatement, ContentStatement, Expression, Hash,
        HashPair, MustacheStatement, NumberLiteral, PartialStatement, PathExpression, Program,
        Statement, StringLiteral, Strip, SubExpression,
    },
};
use crate::{
    compile::lex::{
        token::{Kind, Token},
        Marks, Shape,
    },
    log::{
        expected_close, expected_token, Error, INVALID_PATH, INVALID_SYNTAX, UNEXPECTED_EOF,
        UNEXPECTED_TOKEN,
    },
    region::{Position, Region},
};
use serde_json::Number;
use std::fmt::Display;

pub struct Parser<'source> {
    /// Reference to the source text, used to point at errors.
    source: &'source str,
    /// Tokens to read, always ending with [`Kind::Eof`].
    tokens: Vec<Token>,
    /// Whitespace control computed over the tokens.
    shape: Shape,
    /// Index of the next token.
    index: usize,
}

impl<'source> Parser<'source> {
    /// Create a new Parser over the tokens read from the given source.
    ///
    /// A [`Kind::Eof`] token is appended when the tokens do not already end
    /// with one.
    pub fn new(source: &'source str, mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|token| token.is(Kind::Eof)) {
            let end = source.len();
            let position = Position::locate(source, end);
            tokens.push(Token::new(Kind::Eof, "", (end..end).into(), position));
        }
        let shape = Shape::new(&tokens);

        Self {
            source,
            tokens,
            shape,
            index: 0,
        }
    }

    /// Parse the template.
    ///
    /// # Errors
    ///
    /// Returns an Error when a block is not closed, a closing tag does not
    /// match its block, a path is malformed, or an unexpected token is found.
    pub fn parse(mut self) -> Result<Program, Error> {
        let program = self.parse_program()?;
        let next = self.next();

        match next.kind {
            Kind::Eof => Ok(program),
            Kind::OpenEndBlock => Err(Error::parse(UNEXPECTED_TOKEN)
                .with_pointer(self.source, next.region)
                .with_help("this closing tag does not belong to any open block")),
            _ => Err(Error::parse(UNEXPECTED_TOKEN)
                .with_pointer(self.source, next.region)
                .with_help("`{{else}}` and `{{^}}` may only appear inside of a block")),
        }
    }

    /// Parse statements until the end of input, a closing tag or an inverse.
    fn parse_program(&mut self) -> Result<Program, Error> {
        let begin = self.peek().region.begin;
        let mut body = vec![];

        while !matches!(
            self.peek().kind,
            Kind::Eof | Kind::OpenEndBlock | Kind::Inverse | Kind::OpenInverseChain
        ) {
            body.push(self.parse_statement()?);
        }
        let end = self.peek().region.begin;

        Ok(Program {
            body,
            block_params: vec![],
            chained: false,
            region: Region::new(begin..end),
        })
    }

    /// Parse a single statement.
    fn parse_statement(&mut self) -> Result<Statement, Error> {
        let index = self.index;
        let token = self.next();

        let statement = match token.kind {
            Kind::Content => {
                let trim = self.shape.trim(index);
                Statement::Content(ContentStatement {
                    value: self.shape.text(index, &token).to_string(),
                    original: token.text,
                    strip: Strip {
                        left_stripped: trim.start > 0,
                        right_stripped: trim.end > 0,
                        ..Strip::default()
                    },
                    region: token.region,
                })
            }
            Kind::Comment => Statement::Comment(CommentStatement {
                value: strip_comment(&token.text).to_string(),
                strip: inline_strip(self.shape.marks(index)),
                region: token.region,
            }),
            Kind::Open | Kind::OpenUnescaped => {
                Statement::Mustache(self.parse_mustache(index, token)?)
            }
            Kind::OpenBlock | Kind::OpenInverse => {
                Statement::Block(self.parse_block(index, token)?)
            }
            Kind::OpenRawBlock => Statement::Block(self.parse_raw_block(index, token)?),
            Kind::OpenPartial => Statement::Partial(self.parse_partial(index, token)?),
            _ => return Err(self.unexpected(&token, "content or a mustache")),
        };

        Ok(statement)
    }

    /// Parse a mustache, `{{foo bar}}`.
    ///
    /// Assumes the opening delimiter has been read.
    fn parse_mustache(&mut self, index: usize, open: Token) -> Result<MustacheStatement, Error> {
        let path = self.parse_helper_name()?;
        let (params, hash) = self.parse_arguments()?;
        let close = match open.kind {
            Kind::OpenUnescaped => self.next_must(Kind::CloseUnescaped)?,
            _ => self.next_must(Kind::Close)?,
        };

        let flag = open.text.get(2..).unwrap_or_default().trim_start_matches('~');
        let escaped = !(flag.starts_with('{') || flag.starts_with('&'));
        let marks = self.shape.marks(index);

        Ok(MustacheStatement {
            path,
            params,
            hash,
            escaped,
            strip: Strip {
                left: marks.left,
                right: marks.right,
                ..Strip::default()
            },
            region: open.region.combine(close.region),
        })
    }

    /// Parse a block, `{{#foo}}..{{else}}..{{/foo}}`.
    ///
    /// Inverted sections, `{{^foo}}..{{/foo}}`, swap the program and inverse.
    fn parse_block(&mut self, index: usize, token: Token) -> Result<BlockStatement, Error> {
        let inverted = token.is(Kind::OpenInverse);
        let open = self.parse_open(index, &token, Kind::Close, true)?;

        let mut program = self.parse_program()?;
        program.block_params = open.block_params.clone();

        let inverse = match self.peek().kind {
            Kind::Inverse => {
                self.next();
                Some(self.parse_program()?)
            }
            Kind::OpenInverseChain if !inverted => Some(self.parse_chain()?),
            _ => None,
        };

        let close = self.parse_close(&open)?;
        let region = open.region.combine(close.region);
        tracing::trace!(kind = %open.kind, name = %close.name, "parsed block");

        let (program, inverse) = if inverted {
            (inverse, Some(program))
        } else {
            (Some(program), inverse)
        };

        Ok(build_block(open, program, inverse, close.marks, region))
    }

    /// Parse an `{{else if ..}}` chain.
    ///
    /// Returns a program holding a single block, which is used as the inverse
    /// of the enclosing block. The closing tag is left for the enclosing block.
    fn parse_chain(&mut self) -> Result<Program, Error> {
        let index = self.index;
        let token = self.next();
        let open = self.parse_open(index, &token, Kind::Close, true)?;

        let mut program = self.parse_program()?;
        program.block_params = open.block_params.clone();

        let inverse = match self.peek().kind {
            Kind::Inverse => {
                self.next();
                Some(self.parse_program()?)
            }
            Kind::OpenInverseChain => Some(self.parse_chain()?),
            _ => None,
        };

        let region = Region::new(open.region.begin..self.peek().region.begin);
        let block = build_block(open, Some(program), inverse, Marks::default(), region);

        Ok(Program {
            body: vec![Statement::Block(block)],
            block_params: vec![],
            chained: true,
            region,
        })
    }

    /// Parse a raw block, `{{{{raw}}}}..{{{{/raw}}}}`.
    ///
    /// The body is kept as a single content statement.
    fn parse_raw_block(&mut self, index: usize, token: Token) -> Result<BlockStatement, Error> {
        let open = self.parse_open(index, &token, Kind::CloseRawBlock, false)?;

        let begin = self.peek().region.begin;
        let mut body = vec![];
        if self.next_is(Kind::Content) {
            let content = self.next();
            body.push(Statement::Content(ContentStatement {
                value: content.text.clone(),
                original: content.text,
                strip: Strip::default(),
                region: content.region,
            }));
        }

        let end = self.next_must(Kind::EndRawBlock)?;
        let name = open.name();
        if end.text != name {
            return Err(Error::parse(expected_close(&name, &end.text))
                .with_pointer(self.source, end.region)
                .with_help(format!("close the raw block with `{{{{{{{{/{name}}}}}}}}}`")));
        }

        let program = Program {
            body,
            block_params: vec![],
            chained: false,
            region: Region::new(begin..end.region.begin),
        };
        let region = open.region.combine(end.region);

        Ok(build_block(open, Some(program), None, Marks::default(), region))
    }

    /// Parse a partial, `{{> name context key=value}}`.
    ///
    /// The name may be a sub expression that resolves to the partial name.
    fn parse_partial(&mut self, index: usize, open: Token) -> Result<PartialStatement, Error> {
        let name = if self.next_is(Kind::OpenSexpr) {
            let token = self.next();
            Expression::SubExpression(self.parse_sexpr(token)?)
        } else {
            self.parse_helper_name()?
        };
        let (params, hash) = self.parse_arguments()?;
        let close = self.next_must(Kind::Close)?;

        Ok(PartialStatement {
            name,
            params,
            hash,
            indent: self.shape.indent(index).unwrap_or_default().to_string(),
            strip: inline_strip(self.shape.marks(index)),
            region: open.region.combine(close.region),
        })
    }

    /// Parse the remainder of an opening tag.
    ///
    /// Assumes the opening delimiter, found at `index`, has been read, and
    /// reads up to and including the closing delimiter of the given [`Kind`].
    fn parse_open(
        &mut self,
        index: usize,
        token: &Token,
        close: Kind,
        allow_block_params: bool,
    ) -> Result<Open, Error> {
        let path = self.parse_helper_name()?;
        let (params, hash) = self.parse_arguments()?;
        let block_params = if allow_block_params && self.next_is(Kind::OpenBlockParams) {
            self.parse_block_params()?
        } else {
            vec![]
        };
        let close = self.next_must(close)?;

        Ok(Open {
            kind: token.kind,
            path,
            params,
            hash,
            block_params,
            marks: self.shape.marks(index),
            region: token.region.combine(close.region),
        })
    }

    /// Parse the closing tag of the given block.
    ///
    /// # Errors
    ///
    /// Returns an Error if the closing tag is missing, or names a different
    /// block.
    fn parse_close(&mut self, open: &Open) -> Result<Close, Error> {
        let name = open.name();
        let index = self.index;
        let token = self.next();

        match token.kind {
            Kind::OpenEndBlock => {}
            Kind::Eof => {
                return Err(Error::parse(UNEXPECTED_EOF)
                    .with_pointer(self.source, open.region)
                    .with_help(format!(
                        "did you close the `{name}` block with `{{{{/{name}}}}}`?"
                    )))
            }
            _ => return Err(self.unexpected(&token, format!("`{{{{/{name}}}}}`"))),
        }

        let path = self.parse_helper_name()?;
        let end = self.next_must(Kind::Close)?;
        let close = path.original();

        if close != name {
            return Err(Error::parse(expected_close(&name, &close))
                .with_pointer(self.source, path.region())
                .with_help(format!("the block was opened as `{name}`")));
        }

        Ok(Close {
            name: close,
            marks: self.shape.marks(index),
            region: token.region.combine(end.region),
        })
    }

    /// Parse block parameters, `as |a b|`.
    fn parse_block_params(&mut self) -> Result<Vec<String>, Error> {
        self.next_must(Kind::OpenBlockParams)?;

        let mut names = vec![id(&self.next_must(Kind::Id)?.text).to_string()];
        while self.next_is(Kind::Id) {
            names.push(id(&self.next().text).to_string());
        }
        self.next_must(Kind::CloseBlockParams)?;

        Ok(names)
    }

    /// Parse positional parameters followed by an optional hash.
    fn parse_arguments(&mut self) -> Result<(Vec<Expression>, Option<Hash>), Error> {
        let mut params = vec![];

        loop {
            match self.peek().kind {
                Kind::Id if self.peek_at(1).is(Kind::Equals) => {
                    return Ok((params, Some(self.parse_hash()?)))
                }
                Kind::Id
                | Kind::Data
                | Kind::String
                | Kind::Number
                | Kind::Boolean
                | Kind::Undefined
                | Kind::Null
                | Kind::OpenSexpr => params.push(self.parse_param()?),
                _ => return Ok((params, None)),
            }
        }
    }

    /// Parse a Hash.
    ///
    /// Pairs keep their source order.
    fn parse_hash(&mut self) -> Result<Hash, Error> {
        let begin = self.peek().region;
        let mut pairs = vec![];

        while self.next_is(Kind::Id) && self.peek_at(1).is(Kind::Equals) {
            let key = self.next();
            self.next();
            let value = self.parse_param()?;
            let region = key.region.combine(value.region());

            pairs.push(HashPair {
                key: id(&key.text).to_string(),
                value,
                region,
            });
        }

        let region = pairs
            .last()
            .map(|pair| begin.combine(pair.region))
            .unwrap_or(begin);

        Ok(Hash { pairs, region })
    }

    /// Parse a parameter, which is a helper name or a sub expression.
    fn parse_param(&mut self) -> Result<Expression, Error> {
        if self.next_is(Kind::OpenSexpr) {
            let token = self.next();
            return Ok(Expression::SubExpression(self.parse_sexpr(token)?));
        }

        self.parse_helper_name()
    }

    /// Parse a sub expression, `(helper arg key=value)`.
    ///
    /// Assumes the opening parenthesis has been read.
    fn parse_sexpr(&mut self, open: Token) -> Result<SubExpression, Error> {
        let path = self.parse_helper_name()?;
        let (params, hash) = self.parse_arguments()?;
        let close = self.next_must(Kind::CloseSexpr)?;

        Ok(SubExpression {
            path: Box::new(path),
            params,
            hash,
            region: open.region.combine(close.region),
        })
    }

    /// Parse a path, data path or literal.
    ///
    /// # Errors
    ///
    /// Returns an Error if the next token can not begin any of them.
    fn parse_helper_name(&mut self) -> Result<Expression, Error> {
        let token = self.next();
        let region = token.region;

        let expression = match token.kind {
            Kind::Id => Expression::Path(self.parse_path(false, token)?),
            Kind::Data => {
                let first = self.next_must(Kind::Id)?;
                let mut path = self.parse_path(true, first)?;
                path.region = region.combine(path.region);
                Expression::Path(path)
            }
            Kind::String => Expression::String(StringLiteral {
                value: token.text,
                region,
            }),
            Kind::Number => {
                let value: Number = token.text.parse().map_err(|_| {
                    Error::parse(INVALID_SYNTAX)
                        .with_pointer(self.source, region)
                        .with_help(format!("`{}` is not a recognizable number", token.text))
                })?;
                Expression::Number(NumberLiteral {
                    value,
                    original: token.text,
                    region,
                })
            }
            Kind::Boolean => Expression::Boolean(BooleanLiteral {
                value: token.text == "true",
                region,
            }),
            Kind::Undefined => Expression::Undefined(region),
            Kind::Null => Expression::Null(region),
            _ => return Err(self.unexpected(&token, "a path or literal")),
        };

        Ok(expression)
    }

    /// Parse the segments of a path that begins with the given [`Kind::Id`].
    ///
    /// Leading `..` segments are counted as depth, while `.` and `this` are
    /// dropped. Bracket segments are never treated specially.
    ///
    /// # Errors
    ///
    /// Returns an Error if `..`, `.` or `this` follows another segment.
    fn parse_path(&mut self, data: bool, first: Token) -> Result<PathExpression, Error> {
        let mut region = first.region;
        let mut segments = vec![(String::new(), first.text)];

        while self.next_is(Kind::Sep) {
            let separator = self.next();
            let segment = self.next_must(Kind::Id)?;
            region = region.combine(segment.region);
            segments.push((separator.text, segment.text));
        }

        let mut original = if data { "@".to_string() } else { String::new() };
        let mut parts: Vec<String> = vec![];
        let mut depth = 0;

        for (separator, text) in &segments {
            let part = id(text);
            let literal = part.len() != text.len();
            original.push_str(separator);
            original.push_str(part);

            if !literal && matches!(part, ".." | "." | "this") {
                if !parts.is_empty() {
                    return Err(Error::parse(INVALID_PATH)
                        .with_pointer(self.source, region)
                        .with_help(format!(
                            "`{part}` may only appear at the beginning of a path, found `{original}`"
                        )));
                }
                if part == ".." {
                    depth += 1;
                }
            } else {
                parts.push(part.to_string());
            }
        }

        Ok(PathExpression {
            data,
            depth,
            parts,
            original,
            region,
        })
    }

    /// Peek the next token.
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Peek the token `n` places after the next token.
    ///
    /// Reading past the end returns the final [`Kind::Eof`].
    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;

        &self.tokens[(self.index + n).min(last)]
    }

    /// Get the next token.
    ///
    /// Once the end is reached, [`Kind::Eof`] is returned repeatedly.
    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }

        token
    }

    /// Returns true if the given kind matches the upcoming token.
    fn next_is(&self, kind: Kind) -> bool {
        self.peek().is(kind)
    }

    /// Get the next token, and compare it to the given kind.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token is not of the given kind.
    fn next_must(&mut self, kind: Kind) -> Result<Token, Error> {
        let token = self.next();
        if token.is(kind) {
            return Ok(token);
        }

        Err(self.unexpected(&token, kind))
    }

    /// Return an Error describing the given token as unexpected.
    fn unexpected<T>(&self, token: &Token, expected: T) -> Error
    where
        T: Display,
    {
        match token.kind {
            Kind::Eof => Error::parse(UNEXPECTED_EOF)
                .with_pointer(self.source, token.region)
                .with_help(format!("expected {expected}, did you close all blocks and mustaches?")),
            _ => Error::parse(UNEXPECTED_TOKEN)
                .with_pointer(self.source, token.region)
                .with_help(expected_token(expected, &token.text)),
        }
    }
}

/// Create a [`BlockStatement`] from its opening tag and programs.
fn build_block(
    open: Open,
    program: Option<Program>,
    inverse: Option<Program>,
    close: Marks,
    region: Region,
) -> BlockStatement {
    let is_simple = open.path.as_path().is_some_and(PathExpression::is_simple)
        && open.block_params.is_empty();

    BlockStatement {
        path: open.path,
        params: open.params,
        hash: open.hash,
        program,
        inverse,
        is_simple,
        strip: Strip {
            left: open.marks.left,
            right: close.right,
            open_standalone: open.marks.standalone,
            close_standalone: close.standalone,
            ..Strip::default()
        },
        region,
    }
}

/// Return the [`Strip`] of a partial or comment.
fn inline_strip(marks: Marks) -> Strip {
    Strip {
        left: marks.left,
        right: marks.right,
        inline_standalone: marks.standalone,
        ..Strip::default()
    }
}

/// Remove the brackets around a literal path segment.
fn id(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        return &text[1..text.len() - 1];
    }

    text
}

/// Remove the delimiters of a comment tag.
fn strip_comment(text: &str) -> &str {
    let text = text.strip_prefix("{{").unwrap_or(text);
    let text = text.strip_prefix('~').unwrap_or(text);
    let text = text.strip_prefix('!').unwrap_or(text);
    let text = text.strip_prefix('-').unwrap_or(text);
    let text = text.strip_prefix('-').unwrap_or(text);
    let text = text.strip_suffix("}}").unwrap_or(text);
    let text = text.strip_suffix('~').unwrap_or(text);
    let text = text.strip_suffix('-').unwrap_or(text);

    text.strip_suffix('-').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::{
        tree::{Expression, Program, Statement, Strip},
        Parser,
    };
    use crate::{
        compile::{lex::Lexer, syntax::finder},
        log::{Error, ErrorKind, INVALID_PATH, UNEXPECTED_EOF},
    };

    fn parse(source: &str) -> Result<Program, Error> {
        let finder = finder();
        let tokens = Lexer::new(source, &finder).tokenize()?;

        Parser::new(source, tokens).parse()
    }

    fn block(statement: &Statement) -> &super::tree::BlockStatement {
        match statement {
            Statement::Block(block) => block,
            other => panic!("expected block, found {other:?}"),
        }
    }

    fn content(statement: &Statement) -> &str {
        match statement {
            Statement::Content(content) => &content.value,
            other => panic!("expected content, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty() {
        let program = parse("").unwrap();

        assert!(program.body.is_empty());
    }

    #[test]
    fn test_parse_if_else() {
        let program = parse("{{#if cond}}A{{else}}B{{/if}}").unwrap();
        assert_eq!(program.body.len(), 1);

        let block = block(&program.body[0]);
        assert_eq!(block.path.original(), "if");
        assert_eq!(block.params.len(), 1);
        assert_eq!(content(&block.program.as_ref().unwrap().body[0]), "A");
        assert_eq!(content(&block.inverse.as_ref().unwrap().body[0]), "B");
        assert!(block.is_simple);
    }

    #[test]
    fn test_parse_mismatch() {
        let error = parse("{{#mismatch}}x{{/other}}").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Parse);
        assert_eq!(error.reason(), "`mismatch` doesn't match `other`");
        assert_eq!(error.position().unwrap().offset, 17);
    }

    #[test]
    fn test_parse_unclosed_block() {
        let error = parse("{{#each items}}x").unwrap_err();

        assert_eq!(error.reason(), UNEXPECTED_EOF);
    }

    #[test]
    fn test_parse_stray_close() {
        assert!(parse("{{/foo}}").is_err());
        assert!(parse("{{else}}").is_err());
    }

    #[test]
    fn test_parse_inverted_section() {
        let program = parse("{{^foo}}A{{else}}B{{/foo}}").unwrap();
        let block = block(&program.body[0]);

        assert_eq!(content(&block.program.as_ref().unwrap().body[0]), "B");
        assert_eq!(content(&block.inverse.as_ref().unwrap().body[0]), "A");

        let program = parse("{{^foo}}A{{/foo}}").unwrap();
        let block = super::tests::block(&program.body[0]);

        assert!(block.program.is_none());
        assert!(block.inverse.is_some());
    }

    #[test]
    fn test_parse_else_chain() {
        let program = parse("{{#if a}}x{{else if b}}y{{else}}z{{/if}}").unwrap();
        let outer = block(&program.body[0]);
        let chain = outer.inverse.as_ref().unwrap();
        assert!(chain.chained);

        let inner = block(&chain.body[0]);
        assert_eq!(inner.path.original(), "if");
        assert_eq!(content(&inner.program.as_ref().unwrap().body[0]), "y");
        assert_eq!(content(&inner.inverse.as_ref().unwrap().body[0]), "z");
    }

    #[test]
    fn test_parse_paths() {
        let program = parse("{{../foo.[bar baz]}}").unwrap();
        let Statement::Mustache(mustache) = &program.body[0] else {
            panic!("expected mustache");
        };
        let Expression::Path(path) = &mustache.path else {
            panic!("expected path");
        };

        assert_eq!(path.depth, 1);
        assert_eq!(path.parts, vec!["foo".to_string(), "bar baz".to_string()]);
        assert_eq!(path.original, "../foo.bar baz");
    }

    #[test]
    fn test_parse_invalid_path() {
        let error = parse("{{foo/../bar}}").unwrap_err();

        assert_eq!(error.reason(), INVALID_PATH);
        assert!(parse("{{foo/this}}").is_err());
        assert!(parse("{{foo/[this]}}").is_ok());
    }

    #[test]
    fn test_parse_params_and_hash() {
        let program = parse("{{foo bar \"baz\" 1 (qux 2) a=b c=true}}").unwrap();
        let Statement::Mustache(mustache) = &program.body[0] else {
            panic!("expected mustache");
        };

        assert_eq!(mustache.params.len(), 4);
        assert!(matches!(mustache.params[3], Expression::SubExpression(_)));

        let keys: Vec<&str> = mustache
            .hash
            .as_ref()
            .unwrap()
            .pairs
            .iter()
            .map(|pair| pair.key.as_str())
            .collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_parse_escaped_flag() {
        let program = parse("{{a}}{{{b}}}{{&c}}{{~{d}~}}").unwrap();
        let escaped: Vec<bool> = program
            .body
            .iter()
            .map(|statement| match statement {
                Statement::Mustache(mustache) => mustache.escaped,
                _ => panic!("expected mustache"),
            })
            .collect();

        assert_eq!(escaped, vec![true, false, false, false]);
    }

    #[test]
    fn test_parse_block_params() {
        let program = parse("{{#each items as |item i|}}{{item}}{{/each}}").unwrap();
        let block = block(&program.body[0]);

        assert_eq!(
            block.program.as_ref().unwrap().block_params,
            vec!["item".to_string(), "i".to_string()]
        );
        assert!(!block.is_simple);
    }

    #[test]
    fn test_parse_raw_block() {
        let program = parse("{{{{raw}}}}{{not a tag}}{{{{/raw}}}}").unwrap();
        let block = block(&program.body[0]);

        assert_eq!(
            content(&block.program.as_ref().unwrap().body[0]),
            "{{not a tag}}"
        );
        assert!(parse("{{{{raw}}}}x{{{{/other}}}}").is_err());
    }

    #[test]
    fn test_parse_partial() {
        let program = parse("  {{> foo bar baz=1}}\n").unwrap();
        let Statement::Partial(partial) = &program.body[1] else {
            panic!("expected partial");
        };

        assert_eq!(partial.name.original(), "foo");
        assert_eq!(partial.params.len(), 1);
        assert_eq!(partial.indent, "  ");
    }

    #[test]
    fn test_parse_comment() {
        let program = parse("{{!-- a }} b --}}{{! c }}").unwrap();
        let values: Vec<&str> = program
            .body
            .iter()
            .map(|statement| match statement {
                Statement::Comment(comment) => comment.value.as_str(),
                _ => panic!("expected comment"),
            })
            .collect();

        assert_eq!(values, vec![" a }} b ", " c "]);
    }

    #[test]
    fn test_parse_whitespace_control() {
        let program = parse("{{#a}}\n  x  {{~/a}}").unwrap();
        let block = block(&program.body[0]);

        assert_eq!(content(&block.program.as_ref().unwrap().body[0]), "  x");
    }

    #[test]
    fn test_parse_data_path() {
        let program = parse("{{@index}}").unwrap();
        let Statement::Mustache(mustache) = &program.body[0] else {
            panic!("expected mustache");
        };
        let path = mustache.path.as_path().unwrap();

        assert!(path.data);
        assert_eq!(path.original, "@index");
    }

    #[test]
    fn test_parse_strip_markers() {
        let program = parse(" {{~foo~}} ").unwrap();
        let Statement::Mustache(mustache) = &program.body[1] else {
            panic!("expected mustache");
        };

        assert_eq!(
            mustache.strip,
            Strip {
                left: true,
                right: true,
                ..Strip::default()
            }
        );

        let Statement::Content(before) = &program.body[0] else {
            panic!("expected content");
        };
        assert!(before.strip.right_stripped);
        assert!(!before.strip.left_stripped);
    }

    #[test]
    fn test_parse_standalone_strip() {
        let program = parse("{{#a}}\n  x\n{{/a}}\n").unwrap();
        let block = block(&program.body[0]);

        assert_eq!(
            block.strip,
            Strip {
                open_standalone: true,
                close_standalone: true,
                ..Strip::default()
            }
        );

        let Statement::Content(body) = &block.program.as_ref().unwrap().body[0] else {
            panic!("expected content");
        };
        assert_eq!(body.value, "  x\n");
        assert!(body.strip.left_stripped);
        assert!(!body.strip.right_stripped);
    }

    #[test]
    fn test_parse_inline_standalone() {
        let program = parse("a\n{{! c }}\n{{foo}}").unwrap();
        let Statement::Comment(comment) = &program.body[1] else {
            panic!("expected comment");
        };

        assert!(comment.strip.inline_standalone);
        assert!(!comment.strip.left);

        let Statement::Mustache(mustache) = &program.body[3] else {
            panic!("expected mustache");
        };
        assert!(mustache.strip.is_empty());
    }
}
