use super::token::{Kind, Token};
use std::collections::HashMap;

/// Number of bytes removed from either end of a [`Kind::Content`] token.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Trim {
    /// Bytes removed from the beginning of the text.
    pub start: usize,
    /// Bytes removed from the end of the text.
    pub end: usize,
}

/// Whitespace control of a single tag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Marks {
    /// `~` after the opening delimiter.
    pub left: bool,
    /// `~` before the closing delimiter.
    pub right: bool,
    /// The tag sits on a line of its own and removed that line.
    pub standalone: bool,
}

/// Whitespace control applied to a token stream.
///
/// Tags with a `~` marker strip all whitespace from the neighboring content,
/// and standalone tags (blocks, inverses, partials and comments that sit on
/// a line of their own) remove the line they occupy. The tokens themselves
/// are never modified, a [`Shape`] only records how much of each content
/// token should be kept.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Shape {
    trims: Vec<Trim>,
    /// Whether the last strip of each end removed anything, as `(start, end)`.
    stripped: Vec<(bool, bool)>,
    /// Indentation of standalone partials, keyed by the index of their
    /// [`Kind::OpenPartial`] token.
    indents: HashMap<usize, String>,
    /// Markers of every tag, keyed by the index of its first token.
    marks: HashMap<usize, Marks>,
}

/// What sits next to a tag in the token stream.
#[derive(Debug, Clone, Copy)]
enum Side {
    /// Beginning or end of the template.
    Edge,
    /// A content token at the given index.
    Content(usize),
    /// Anything else.
    Tag,
}

impl Shape {
    /// Compute the [`Shape`] of the given tokens.
    pub fn new(tokens: &[Token]) -> Self {
        let mut shape = Self {
            trims: vec![Trim::default(); tokens.len()],
            stripped: vec![(false, false); tokens.len()],
            indents: HashMap::new(),
            marks: HashMap::new(),
        };

        for (first, last) in tags(tokens) {
            shape.apply(tokens, first, last);
        }

        shape
    }

    /// Return the [`Trim`] of the token at the given index.
    pub fn trim(&self, index: usize) -> Trim {
        self.trims.get(index).copied().unwrap_or_default()
    }

    /// Return the text of the token at the given index with its [`Trim`]
    /// applied.
    pub fn text<'token>(&self, index: usize, token: &'token Token) -> &'token str {
        current(token, self.trim(index))
    }

    /// Return the indentation of the standalone partial whose
    /// [`Kind::OpenPartial`] token is at the given index.
    pub fn indent(&self, index: usize) -> Option<&str> {
        self.indents.get(&index).map(String::as_str)
    }

    /// Return the [`Marks`] of the tag whose first token is at the given
    /// index.
    ///
    /// Raw blocks take no part in whitespace control and have none.
    pub fn marks(&self, index: usize) -> Marks {
        self.marks.get(&index).copied().unwrap_or_default()
    }

    /// Apply whitespace control for the tag spanning the tokens from `first`
    /// to `last`, inclusive.
    fn apply(&mut self, tokens: &[Token], first: usize, last: usize) {
        let open = &tokens[first];
        let before = before(tokens, first);
        let after = after(tokens, last);

        let (left, right) = strip_markers(open, &tokens[last]);
        if right {
            if let Side::Content(next) = after {
                self.strip_start(tokens, next, true);
            }
        }
        if left {
            if let Side::Content(previous) = before {
                self.strip_end(tokens, previous, true);
            }
        }

        let standalone = is_standalone_kind(open.kind) && is_standalone(tokens, before, after);
        self.marks.insert(
            first,
            Marks {
                left,
                right,
                standalone,
            },
        );
        if !standalone {
            return;
        }

        if let Side::Content(next) = after {
            self.strip_start(tokens, next, false);
        }
        if let Side::Content(previous) = before {
            if self.strip_end(tokens, previous, false) && open.is(Kind::OpenPartial) {
                let text = &tokens[previous].text;
                let kept = text.trim_end_matches([' ', '\t']).len();
                tracing::trace!(index = first, indent = ?&text[kept..], "standalone partial");
                self.indents.insert(first, text[kept..].to_string());
            }
        }
    }

    /// Strip leading whitespace from the content token at the given index.
    ///
    /// When `all` is set every whitespace character is removed, otherwise
    /// only spaces and tabs followed by a single line break. Returns true if
    /// anything was removed.
    fn strip_start(&mut self, tokens: &[Token], index: usize, all: bool) -> bool {
        if !all && self.stripped[index].0 {
            return false;
        }

        let value = current(&tokens[index], self.trims[index]);
        let rest = if all {
            value.trim_start()
        } else {
            let rest = value.trim_start_matches([' ', '\t']);
            let rest = rest.strip_prefix('\r').unwrap_or(rest);
            rest.strip_prefix('\n').unwrap_or(rest)
        };
        let removed = value.len() - rest.len();

        self.trims[index].start += removed;
        self.stripped[index].0 = removed > 0;

        removed > 0
    }

    /// Strip trailing whitespace from the content token at the given index.
    ///
    /// When `all` is set every whitespace character is removed, otherwise
    /// only spaces and tabs. Returns true if anything was removed.
    fn strip_end(&mut self, tokens: &[Token], index: usize, all: bool) -> bool {
        if !all && self.stripped[index].1 {
            return false;
        }

        let value = current(&tokens[index], self.trims[index]);
        let rest = if all {
            value.trim_end()
        } else {
            value.trim_end_matches([' ', '\t'])
        };
        let removed = value.len() - rest.len();

        self.trims[index].end += removed;
        self.stripped[index].1 = removed > 0;

        removed > 0
    }
}

/// Return true if only whitespace separates a tag from the line breaks on
/// either side of it.
fn is_standalone(tokens: &[Token], before: Side, after: Side) -> bool {
    let previous = match before {
        Side::Edge => true,
        Side::Content(previous) => is_previous_whitespace(&tokens[previous].text, previous == 0),
        Side::Tag => false,
    };
    let next = match after {
        Side::Edge => true,
        Side::Content(next) => is_next_whitespace(&tokens[next].text, is_last(tokens, next)),
        Side::Tag => false,
    };

    previous && next
}

/// Return the text of the token with the [`Trim`] applied.
fn current(token: &Token, trim: Trim) -> &str {
    let text = token.text.as_str();
    let end = text.len().saturating_sub(trim.end).max(trim.start);

    text.get(trim.start..end).unwrap_or_default()
}

/// Return the first and last token index of every tag that takes part in
/// whitespace control.
///
/// Raw blocks are left out.
fn tags(tokens: &[Token]) -> Vec<(usize, usize)> {
    let mut tags = vec![];
    let mut index = 0;

    while index < tokens.len() {
        let kind = tokens[index].kind;
        if matches!(kind, Kind::Inverse | Kind::Comment) {
            tags.push((index, index));
        } else if kind.is_open() && kind != Kind::OpenRawBlock {
            let close = tokens[index..]
                .iter()
                .position(|token| token.kind.is_close())
                .map(|n| index + n);
            match close {
                Some(close) => {
                    tags.push((index, close));
                    index = close;
                }
                None => break,
            }
        }
        index += 1;
    }

    tags
}

/// Return the `~` markers of a tag as `(open, close)`.
fn strip_markers(open: &Token, close: &Token) -> (bool, bool) {
    if open.kind.is_whole_tag() {
        return (open.text.starts_with("{{~"), open.text.ends_with("~}}"));
    }

    (
        open.text.get(2..).is_some_and(|rest| rest.starts_with('~')),
        close.text.contains('~'),
    )
}

/// Return true if a tag beginning with the given [`Kind`] may stand alone on
/// a line.
fn is_standalone_kind(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::OpenBlock
            | Kind::OpenInverse
            | Kind::OpenEndBlock
            | Kind::OpenInverseChain
            | Kind::OpenPartial
            | Kind::Inverse
            | Kind::Comment
    )
}

fn before(tokens: &[Token], first: usize) -> Side {
    match first.checked_sub(1) {
        None => Side::Edge,
        Some(index) if tokens[index].is(Kind::Content) => Side::Content(index),
        Some(_) => Side::Tag,
    }
}

fn after(tokens: &[Token], last: usize) -> Side {
    match tokens.get(last + 1) {
        None => Side::Edge,
        Some(token) if token.is(Kind::Eof) => Side::Edge,
        Some(token) if token.is(Kind::Content) => Side::Content(last + 1),
        Some(_) => Side::Tag,
    }
}

fn is_last(tokens: &[Token], index: usize) -> bool {
    tokens
        .get(index + 1)
        .map_or(true, |token| token.is(Kind::Eof))
}

/// Return true if the content ends with a line break followed only by
/// whitespace.
///
/// When `lenient` is set, whitespace-only content also qualifies.
fn is_previous_whitespace(text: &str, lenient: bool) -> bool {
    match text.rfind('\n') {
        Some(n) => text[n + 1..].chars().all(char::is_whitespace),
        None => lenient && text.chars().all(char::is_whitespace),
    }
}

/// Return true if the content begins with whitespace followed by a line
/// break.
///
/// When `lenient` is set, whitespace-only content also qualifies.
fn is_next_whitespace(text: &str, lenient: bool) -> bool {
    match text.find('\n') {
        Some(n) => text[..n].chars().all(char::is_whitespace),
        None => lenient && text.chars().all(char::is_whitespace),
    }
}

#[cfg(test)]
mod tests {
    use super::{Marks, Shape, Trim};
    use crate::compile::{
        lex::{token::Token, Lexer},
        syntax::finder,
    };

    fn shape(source: &str) -> (Vec<Token>, Shape) {
        let finder = finder();
        let tokens = Lexer::new(source, &finder).tokenize().unwrap();
        let shape = Shape::new(&tokens);

        (tokens, shape)
    }

    /// Helper function which joins the shaped text of all content tokens.
    fn helper_shaped(source: &str) -> Vec<String> {
        let (tokens, shape) = shape(source);

        tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is(super::Kind::Content))
            .map(|(index, token)| shape.text(index, token).to_string())
            .collect()
    }

    #[test]
    fn test_strip_markers() {
        let (_, shape) = shape(" {{~foo~}} ");

        assert_eq!(shape.trim(0), Trim { start: 0, end: 1 });
        assert_eq!(shape.trim(4), Trim { start: 1, end: 0 });
    }

    #[test]
    fn test_strip_markers_all_whitespace() {
        assert_eq!(
            helper_shaped("a \n\t{{~foo~}}\n  b"),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_standalone_block() {
        assert_eq!(
            helper_shaped("{{#a}}\n  x\n{{/a}}\n"),
            vec!["  x\n".to_string(), String::new()]
        );
    }

    #[test]
    fn test_standalone_else() {
        assert_eq!(
            helper_shaped("{{#a}}\nx\n  {{else}}  \ny\n{{/a}}"),
            vec!["x\n".to_string(), "y\n".to_string()]
        );
    }

    #[test]
    fn test_mustache_not_standalone() {
        assert_eq!(
            helper_shaped("  {{foo}}\n"),
            vec!["  ".to_string(), "\n".to_string()]
        );
    }

    #[test]
    fn test_block_with_text_not_standalone() {
        assert_eq!(
            helper_shaped("a {{#b}}\nc{{/b}}"),
            vec!["a ".to_string(), "\nc".to_string()]
        );
    }

    #[test]
    fn test_standalone_comment() {
        assert_eq!(
            helper_shaped("a\n{{! c }}\nb"),
            vec!["a\n".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_standalone_partial_indent() {
        let (_, shape) = shape("  {{> foo}}\n");

        assert_eq!(shape.indent(1), Some("  "));
        assert_eq!(shape.trim(0), Trim { start: 0, end: 2 });
        assert_eq!(shape.trim(4), Trim { start: 1, end: 0 });
    }

    #[test]
    fn test_inline_partial_no_indent() {
        let (_, shape) = shape("x {{> foo}}\n");

        assert_eq!(shape.indent(1), None);
    }

    #[test]
    fn test_marks() {
        let (_, shape) = shape(" {{~foo}} {{#a}}\n{{/a~}}");

        assert_eq!(
            shape.marks(1),
            Marks {
                left: true,
                right: false,
                standalone: false
            }
        );
        assert!(!shape.marks(5).standalone);
        assert!(shape.marks(9).right);
        assert_eq!(shape.marks(0), Marks::default());
    }

    #[test]
    fn test_marks_standalone() {
        let (_, shape) = shape("{{#a}}\nx\n{{/a}}\n");

        assert!(shape.marks(0).standalone);
        assert!(shape.marks(4).standalone);
    }
}
