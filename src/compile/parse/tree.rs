use crate::region::Region;
use serde_json::Number;

/// The Abstract Syntax Tree.
///
/// A [`Program`] is an ordered list of statements, either the whole template
/// or the body of a block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Statement>,
    /// Names declared with `as |a b|` on the block that owns this program.
    pub block_params: Vec<String>,
    /// True when the program only exists to hold an `{{else if ..}}` chain.
    pub chained: bool,
    pub region: Region,
}

/// A single statement within a [`Program`].
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Render a value, `{{foo}}` or `{{{foo}}}`.
    Mustache(MustacheStatement),
    /// A block with a program and an optional inverse, `{{#foo}}..{{/foo}}`.
    Block(BlockStatement),
    /// Render another template, `{{> foo}}`.
    Partial(PartialStatement),
    /// Text outside of any mustache.
    Content(ContentStatement),
    /// `{{! .. }}`
    Comment(CommentStatement),
}

impl Statement {
    /// Return the [`Region`] of the underlying statement.
    pub fn region(&self) -> Region {
        match self {
            Statement::Mustache(mustache) => mustache.region,
            Statement::Block(block) => block.region,
            Statement::Partial(partial) => partial.region,
            Statement::Content(content) => content.region,
            Statement::Comment(comment) => comment.region,
        }
    }
}

/// Whitespace control recorded on a statement.
///
/// `left` and `right` are the `~` markers on the outer ends of the statement,
/// for a block the opening and closing tags. Content statements only carry
/// `left_stripped` and `right_stripped`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Strip {
    pub left: bool,
    pub right: bool,
    /// The opening tag of a block stands alone on its line.
    pub open_standalone: bool,
    /// The closing tag of a block stands alone on its line.
    pub close_standalone: bool,
    /// A partial or comment stands alone on its line.
    pub inline_standalone: bool,
    /// Whitespace was removed from the beginning of the content.
    pub left_stripped: bool,
    /// Whitespace was removed from the end of the content.
    pub right_stripped: bool,
}

impl Strip {
    /// Return true if no flag is set.
    pub fn is_empty(&self) -> bool {
        *self == Strip::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MustacheStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// False for `{{{ }}}` and `{{& }}`.
    pub escaped: bool,
    pub strip: Strip,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// Rendered when the block is truthy.
    ///
    /// Absent for an inverted section without an `{{else}}`.
    pub program: Option<Program>,
    /// Rendered when the block is falsy.
    pub inverse: Option<Program>,
    /// True when the block is called through a simple identifier and its
    /// program declares no block parameters.
    pub is_simple: bool,
    pub strip: Strip,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialStatement {
    /// Name of the partial, or a [`SubExpression`] that resolves to it.
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    /// Whitespace that preceded a standalone partial on its line.
    pub indent: String,
    pub strip: Strip,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentStatement {
    /// The text after whitespace control was applied.
    pub value: String,
    /// The text as it appears in the source.
    pub original: String,
    pub strip: Strip,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentStatement {
    /// Comment text without its delimiters.
    pub value: String,
    pub strip: Strip,
    pub region: Region,
}

/// Values that may appear as a call target, parameter or hash value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Path(PathExpression),
    SubExpression(SubExpression),
    String(StringLiteral),
    Number(NumberLiteral),
    Boolean(BooleanLiteral),
    Undefined(Region),
    Null(Region),
}

impl Expression {
    /// Get the Region from the underlying Expression kind.
    pub fn region(&self) -> Region {
        match self {
            Expression::Path(path) => path.region,
            Expression::SubExpression(sexpr) => sexpr.region,
            Expression::String(string) => string.region,
            Expression::Number(number) => number.region,
            Expression::Boolean(boolean) => boolean.region,
            Expression::Undefined(region) | Expression::Null(region) => *region,
        }
    }

    /// Return the text that names this expression.
    ///
    /// Sub expressions have no name and return an empty string.
    pub fn original(&self) -> String {
        match self {
            Expression::Path(path) => path.original.clone(),
            Expression::SubExpression(_) => String::new(),
            Expression::String(string) => string.value.clone(),
            Expression::Number(number) => number.original.clone(),
            Expression::Boolean(boolean) => boolean.value.to_string(),
            Expression::Undefined(_) => "undefined".to_string(),
            Expression::Null(_) => "null".to_string(),
        }
    }

    /// Return the name of the node type, as used by string parameters and
    /// tracked ids.
    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Path(_) => "PathExpression",
            Expression::SubExpression(_) => "SubExpression",
            Expression::String(_) => "StringLiteral",
            Expression::Number(_) => "NumberLiteral",
            Expression::Boolean(_) => "BooleanLiteral",
            Expression::Undefined(_) => "UndefinedLiteral",
            Expression::Null(_) => "NullLiteral",
        }
    }

    /// Return the inner [`PathExpression`], if this is a path.
    pub fn as_path(&self) -> Option<&PathExpression> {
        match self {
            Expression::Path(path) => Some(path),
            _ => None,
        }
    }
}

/// A reference to a value, such as `foo.bar`, `../foo` or `@index`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    /// True for `@` data paths.
    pub data: bool,
    /// Number of leading `../` segments.
    pub depth: usize,
    /// Segments that remain after `this`, `.` and `..` are removed.
    pub parts: Vec<String>,
    /// The path as written, with bracket segments unwrapped.
    pub original: String,
    pub region: Region,
}

impl PathExpression {
    /// Return true if the path is explicitly bound to the current context,
    /// as in `./foo` or `this.foo`.
    pub fn is_scoped(&self) -> bool {
        if self.original.starts_with('.') {
            return true;
        }

        self.original.match_indices("this").any(|(index, _)| {
            !self.original[index + 4..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        })
    }

    /// Return true if the path is a single unscoped identifier at depth zero.
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1 && !self.is_scoped() && self.depth == 0
    }
}

/// A nested call, `(helper arg key=value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubExpression {
    pub path: Box<Expression>,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: Number,
    pub original: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub region: Region,
}

/// Ordered `key=value` arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Hash {
    pub pairs: Vec<HashPair>,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    pub region: Region,
}
