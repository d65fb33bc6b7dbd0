pub mod token;

mod shape;
mod state;

pub use shape::{Marks, Shape, Trim};

use self::{
    state::CursorState,
    token::{Kind, Token},
};
use crate::{
    log::{
        error_eof, Error, UNEXPECTED_CHARACTER, UNEXPECTED_TOKEN, UNTERMINATED_COMMENT,
        UNTERMINATED_RAW_BLOCK, UNTERMINATED_SEGMENT, UNTERMINATED_STRING,
    },
    region::Locator,
};

use morel::Finder;
use std::ops::Range;

/// Result of a single read from the [`Lexer`].
///
/// `Ok(None)` is returned once the end of input has already been reported.
pub type TokenResult = Result<Option<Token>, Error>;

/// Provides methods to read a source string as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    pub cursor: usize,
    /// Compiled [`Finder`] instance used to search for markers
    /// in the source text.
    finder: &'source Finder,
    /// Tracks the [`Lexer`] state and determines the action taken
    /// when `.next` is called.
    state: CursorState,
    /// The opening delimiter of the mustache being read.
    opened: Kind,
    /// Offset of the most recent `{{{{`, used to point at unterminated
    /// raw blocks.
    raw_open: usize,
    /// Converts offsets to line and column.
    locator: Locator<'source>,
    /// Temporary storage for a [`Token`] that will be read
    /// on the following call to `.next`
    buffer: Option<Token>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] from the given source and [`Finder`].
    #[inline]
    pub fn new(source: &'source str, finder: &'source Finder) -> Self {
        Self {
            source,
            cursor: 0,
            finder,
            state: CursorState::Content,
            opened: Kind::Open,
            raw_open: 0,
            locator: Locator::new(source),
            buffer: None,
        }
    }

    /// Read every remaining [`Token`], including the final [`Kind::Eof`].
    ///
    /// # Errors
    ///
    /// Returns the first [`Error`] reported by `.next`, discarding any
    /// tokens read before it.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = vec![];
        while let Some(token) = self.next()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Return the next [`Token`].
    ///
    /// The end of input is reported once as [`Kind::Eof`], after which
    /// `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source ends inside of a mustache, comment,
    /// string or raw block, or when a character is not valid inside of a mustache.
    pub fn next(&mut self) -> TokenResult {
        loop {
            // Always prefer taking from the buffer when possible.
            if let Some(next) = self.buffer.take() {
                return Ok(Some(next));
            }

            let c = self.cursor;
            let result = match self.state {
                CursorState::Content => self.lex_content(c),
                CursorState::Escaped => self.lex_escaped(c),
                CursorState::Open => self.lex_open(c),
                CursorState::Inside => self.lex_inside(c),
                CursorState::Raw => self.lex_raw(c),
                CursorState::Done => return Ok(None),
            }?;

            if let Some(token) = result {
                return Ok(Some(token));
            }
        }
    }

    /// Return the next [`Token`] in [`CursorState::Content`] configuration.
    ///
    /// Returns `Ok(None)` when the state changed without reading any text.
    fn lex_content(&mut self, from: usize) -> TokenResult {
        let length = self.source.len();
        if from >= length {
            self.switch(CursorState::Done);
            return Ok(Some(self.emit(Kind::Eof, "", length..length)));
        }

        match self.finder.next(self.source, from) {
            Some((_, marker_begin, _)) => {
                let text = &self.source[from..marker_begin];

                // `\\{{` keeps one backslash and opens a mustache, while `\{{`
                // drops the backslash and escapes the mustache.
                let (end, state) = if text.ends_with("\\\\") {
                    (marker_begin - 1, CursorState::Open)
                } else if text.ends_with('\\') {
                    (marker_begin - 1, CursorState::Escaped)
                } else {
                    (marker_begin, CursorState::Open)
                };
                self.switch(state);

                if end == from {
                    self.cursor = marker_begin;

                    return Ok(None);
                }

                let token = self.emit_slice(Kind::Content, from..end);
                self.cursor = marker_begin;

                Ok(Some(token))
            }
            None => Ok(Some(self.emit_slice(Kind::Content, from..length))),
        }
    }

    /// Return the text of an escaped mustache as [`Kind::Content`].
    ///
    /// Assumes the cursor is on the `{{` that followed a backslash. The content
    /// runs until the next mustache or escaped mustache.
    fn lex_escaped(&mut self, from: usize) -> TokenResult {
        let floor = from + 2;
        let end = match self.finder.next(self.source, floor) {
            Some((_, marker_begin, _)) => {
                let bytes = self.source.as_bytes();
                let mut end = marker_begin;
                while end > floor && marker_begin - end < 2 && bytes[end - 1] == b'\\' {
                    end -= 1;
                }
                end
            }
            None => self.source.len(),
        };
        self.switch(CursorState::Content);

        Ok(Some(self.emit_slice(Kind::Content, from..end)))
    }

    /// Return the opening delimiter of a mustache.
    ///
    /// Assumes the cursor is on `{{`. Comments and `{{^}}` / `{{else}}` are
    /// returned as a single token.
    fn lex_open(&mut self, from: usize) -> TokenResult {
        self.switch(CursorState::Inside);

        if self.source[from..].starts_with("{{{{") {
            self.opened = Kind::OpenRawBlock;
            self.raw_open = from;

            return Ok(Some(self.emit_slice(Kind::OpenRawBlock, from..from + 4)));
        }

        let mut at = from + 2;
        if self.source[at..].starts_with('~') {
            at += 1;
        }
        let after = &self.source[at..];

        let kind = match after.chars().next() {
            Some('>') => Some(Kind::OpenPartial),
            Some('#') => Some(Kind::OpenBlock),
            Some('/') => Some(Kind::OpenEndBlock),
            Some('{') => Some(Kind::OpenUnescaped),
            Some('&') => Some(Kind::Open),
            Some('!') => return self.lex_comment(from, at).map(Some),
            Some('^') => match close_after(self.source, at + 1) {
                Some(end) => return Ok(Some(self.emit_tag(Kind::Inverse, from..end))),
                None => Some(Kind::OpenInverse),
            },
            _ => None,
        };

        if let Some(kind) = kind {
            self.opened = kind;

            return Ok(Some(self.emit_slice(kind, from..at + 1)));
        }

        let trimmed = after.trim_start();
        if let Some(tail) = trimmed.strip_prefix("else") {
            let else_end = at + (after.len() - trimmed.len()) + 4;
            if let Some(end) = close_after(self.source, else_end) {
                return Ok(Some(self.emit_tag(Kind::Inverse, from..end)));
            }
            if tail.starts_with(char::is_whitespace) {
                self.opened = Kind::OpenInverseChain;

                return Ok(Some(self.emit_slice(Kind::OpenInverseChain, from..else_end)));
            }
        }

        self.opened = Kind::Open;

        Ok(Some(self.emit_slice(Kind::Open, from..at)))
    }

    /// Return a [`Kind::Comment`] spanning the whole comment tag.
    ///
    /// `{{!-- --}}` comments may contain `}}`, while `{{! }}` comments end at
    /// the first `}}`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the comment is never closed.
    fn lex_comment(&mut self, from: usize, at: usize) -> Result<Token, Error> {
        let long = self.source[at..].starts_with("!--");
        let end = if long {
            long_comment_end(self.source, at + 1)
        } else {
            self.source[at..].find("}}").map(|n| at + n + 2)
        };

        match end {
            Some(end) => Ok(self.emit_tag(Kind::Comment, from..end)),
            None => {
                let close = if long { "--}}" } else { "}}" };

                Err(Error::lex(UNTERMINATED_COMMENT)
                    .with_pointer(self.source, from..at + 1)
                    .with_help(format!("close the comment with `{close}`")))
            }
        }
    }

    /// Return the next [`Token`] in [`CursorState::Inside`] configuration.
    ///
    /// Assumes the cursor is inside of a mustache. Whitespace between tokens
    /// is skipped.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source ends, or an unexpected character
    /// is found.
    fn lex_inside(&mut self, from: usize) -> TokenResult {
        let rest = &self.source[from..];
        let trimmed = rest.trim_start();
        let from = from + (rest.len() - trimmed.len());
        self.cursor = from;

        let Some(char) = trimmed.chars().next() else {
            return Err(error_eof(self.source));
        };

        if self.opened == Kind::OpenRawBlock && trimmed.starts_with("}}}}") {
            self.switch(CursorState::Raw);

            return Ok(Some(self.emit_slice(Kind::CloseRawBlock, from..from + 4)));
        }

        for (close, kind) in [
            ("}~}}", Kind::CloseUnescaped),
            ("}}}", Kind::CloseUnescaped),
            ("~}}", Kind::Close),
            ("}}", Kind::Close),
        ] {
            if trimmed.starts_with(close) {
                return Ok(Some(self.emit_tag(kind, from..from + close.len())));
            }
        }

        let single = from..from + 1;

        match char {
            '(' => Ok(Some(self.emit_slice(Kind::OpenSexpr, single))),
            ')' => Ok(Some(self.emit_slice(Kind::CloseSexpr, single))),
            '=' => Ok(Some(self.emit_slice(Kind::Equals, single))),
            '@' => Ok(Some(self.emit_slice(Kind::Data, single))),
            '|' => Ok(Some(self.emit_slice(Kind::CloseBlockParams, single))),
            '/' => Ok(Some(self.emit_slice(Kind::Sep, single))),
            '.' => {
                let (kind, range) = if trimmed.starts_with("..") {
                    (Kind::Id, from..from + 2)
                } else if is_id_lookahead(&trimmed[1..]) {
                    (Kind::Id, single)
                } else {
                    (Kind::Sep, single)
                };

                Ok(Some(self.emit_slice(kind, range)))
            }
            '"' | '\'' => self.lex_string(from, char),
            '[' => self.lex_segment(from),
            '{' if trimmed.starts_with("{{") => Err(Error::lex(UNEXPECTED_TOKEN)
                .with_pointer(self.source, from..from + 2)
                .with_help("did you close the previous mustache?")),
            _ => self.lex_word(from, trimmed, char),
        }
    }

    /// Return a [`Kind::String`] token holding the unquoted value.
    ///
    /// A backslash followed by the quote character escapes it, any other
    /// backslash is kept as is.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the string is not closed.
    fn lex_string(&mut self, from: usize, quote: char) -> TokenResult {
        let body = from + 1;
        let mut value = String::new();
        let mut iterator = self.source[body..].char_indices().peekable();

        while let Some((index, char)) = iterator.next() {
            match char {
                '\\' if iterator.peek().map(|(_, c)| *c) == Some(quote) => {
                    iterator.next();
                    value.push(quote);
                }
                c if c == quote => {
                    let end = body + index + 1;

                    return Ok(Some(self.emit(Kind::String, value, from..end)));
                }
                c => value.push(c),
            }
        }

        Err(Error::lex(UNTERMINATED_STRING)
            .with_pointer(self.source, from..from + 1)
            .with_help(format!(
                "this might be an undelimited string, try closing it with `{quote}`"
            )))
    }

    /// Return a [`Kind::Id`] token for a bracketed path segment such as
    /// `[foo bar]`.
    ///
    /// The brackets are kept in the token text, `\]` and `\\` are unescaped.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the segment is not closed.
    fn lex_segment(&mut self, from: usize) -> TokenResult {
        let body = from + 1;
        let mut text = String::from("[");
        let mut iterator = self.source[body..].char_indices().peekable();

        while let Some((index, char)) = iterator.next() {
            match char {
                '\\' => match iterator.peek().map(|(_, c)| *c) {
                    Some(c @ (']' | '\\')) => {
                        iterator.next();
                        text.push(c);
                    }
                    _ => text.push('\\'),
                },
                ']' => {
                    text.push(']');
                    let end = body + index + 1;

                    return Ok(Some(self.emit(Kind::Id, text, from..end)));
                }
                c => text.push(c),
            }
        }

        Err(Error::lex(UNTERMINATED_SEGMENT)
            .with_pointer(self.source, from..from + 1)
            .with_help("close the path segment with `]`"))
    }

    /// Return a literal, block parameter opening, or [`Kind::Id`] token.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when no token can be read at the cursor.
    fn lex_word(&mut self, from: usize, rest: &str, char: char) -> TokenResult {
        if let Some(tail) = rest.strip_prefix("as") {
            let after = tail.trim_start();
            if after.len() < tail.len() && after.starts_with('|') {
                let end = from + (rest.len() - after.len()) + 1;

                return Ok(Some(self.emit_slice(Kind::OpenBlockParams, from..end)));
            }
        }

        if let Some(length) = number_length(rest) {
            if is_literal_lookahead(&rest[length..]) {
                return Ok(Some(self.emit_slice(Kind::Number, from..from + length)));
            }
        }

        for (word, kind) in [
            ("true", Kind::Boolean),
            ("false", Kind::Boolean),
            ("undefined", Kind::Undefined),
            ("null", Kind::Null),
        ] {
            if rest.starts_with(word) && is_literal_lookahead(&rest[word.len()..]) {
                return Ok(Some(self.emit_slice(kind, from..from + word.len())));
            }
        }

        let length: usize = rest
            .chars()
            .take_while(|c| is_id_char(*c))
            .map(char::len_utf8)
            .sum();
        if length > 0 && is_id_lookahead(&rest[length..]) {
            return Ok(Some(self.emit_slice(Kind::Id, from..from + length)));
        }

        let (begin, char) = if length > 0 {
            // The identifier itself was fine, the character after it was not.
            let next = rest[length..].chars().next().unwrap_or(char);
            (from + length, next)
        } else {
            (from, char)
        };

        Err(Error::lex(UNEXPECTED_CHARACTER)
            .with_pointer(self.source, begin..begin + char.len_utf8())
            .with_help(format!(
                "`{char}` is not valid here, wrap path segments containing it in `[` and `]`"
            )))
    }

    /// Return the body of a raw block as a single [`Kind::Content`] token,
    /// and buffer the [`Kind::EndRawBlock`] that follows it.
    ///
    /// Nested `{{{{name}}}}` / `{{{{/name}}}}` pairs are part of the body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the raw block is never closed.
    fn lex_raw(&mut self, from: usize) -> TokenResult {
        let mut depth = 0_usize;
        let mut search = from;

        loop {
            let Some(found) = self.source[search..].find("{{{{") else {
                let open = self.raw_open;

                return Err(Error::lex(UNTERMINATED_RAW_BLOCK)
                    .with_pointer(self.source, open..open + 4)
                    .with_help("close the raw block with `{{{{/name}}}}`"));
            };
            let begin = search + found;

            match raw_close(&self.source[begin..]) {
                Some((name, length)) if depth == 0 => {
                    let name = name.to_string();
                    let content = (begin > from).then(|| self.emit_slice(Kind::Content, from..begin));
                    self.switch(CursorState::Content);
                    let close = self.emit(Kind::EndRawBlock, name, begin..begin + length);

                    return match content {
                        Some(content) => {
                            self.buffer = Some(close);
                            Ok(Some(content))
                        }
                        None => Ok(Some(close)),
                    };
                }
                Some((_, length)) => {
                    depth -= 1;
                    search = begin + length;
                }
                None if self.source[begin + 4..].starts_with('/') => search = begin + 4,
                None => {
                    depth += 1;
                    search = begin + 4;
                }
            }
        }
    }

    /// Create a [`Token`] over the given range with the given text, and move
    /// the cursor to the end of the range.
    fn emit<T>(&mut self, kind: Kind, text: T, range: Range<usize>) -> Token
    where
        T: Into<String>,
    {
        let position = self.locator.locate(range.start);
        self.cursor = range.end;

        Token::new(kind, text, range.into(), position)
    }

    /// Create a [`Token`] whose text is the source text of the range.
    fn emit_slice(&mut self, kind: Kind, range: Range<usize>) -> Token {
        let source = self.source;

        self.emit(kind, &source[range.clone()], range)
    }

    /// Create a [`Token`] that ends a tag, and return to content.
    fn emit_tag(&mut self, kind: Kind, range: Range<usize>) -> Token {
        self.switch(CursorState::Content);

        self.emit_slice(kind, range)
    }

    /// Move the [`Lexer`] to the given state.
    fn switch(&mut self, state: CursorState) {
        if self.state != state {
            tracing::trace!(from = ?self.state, to = ?state, cursor = self.cursor, "lexer state");
            self.state = state;
        }
    }
}

/// Return true if the given character may appear in an identifier.
fn is_id_char(c: char) -> bool {
    !(c.is_whitespace()
        || matches!(
            c,
            '!' | '"' | '#' | '%'..=',' | '.' | '/' | ';'..='>' | '@' | '['..='^' | '`' | '{'..='~'
        ))
}

/// Return true if the text may follow an identifier.
fn is_id_lookahead(rest: &str) -> bool {
    match rest.chars().next() {
        Some(c) => c.is_whitespace() || matches!(c, '=' | '~' | '}' | '/' | '.' | ')' | '|'),
        None => true,
    }
}

/// Return true if the text may follow a number, boolean, `null` or `undefined`.
fn is_literal_lookahead(rest: &str) -> bool {
    match rest.chars().next() {
        Some(c) => c.is_whitespace() || matches!(c, '~' | '}' | ')'),
        None => true,
    }
}

/// Return the length of the number at the beginning of the text, such as
/// `-1`, `10` or `1.5`.
fn number_length(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut length = usize::from(bytes.first() == Some(&b'-'));

    let digits = bytes[length..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    length += digits;

    if bytes.get(length) == Some(&b'.') {
        let fraction = bytes[length + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if fraction > 0 {
            length += 1 + fraction;
        }
    }

    Some(length)
}

/// Return the end of a `}}` that follows `at`, allowing whitespace and `~`
/// in between.
fn close_after(source: &str, at: usize) -> Option<usize> {
    let rest = &source[at..];
    let trimmed = rest.trim_start();
    let skipped = rest.len() - trimmed.len();
    let strip = usize::from(trimmed.starts_with('~'));

    trimmed[strip..]
        .starts_with("}}")
        .then_some(at + skipped + strip + 2)
}

/// Return the end of a `--}}` or `--~}}` found after `at`.
fn long_comment_end(source: &str, at: usize) -> Option<usize> {
    let mut search = at;
    while let Some(found) = source[search..].find("--") {
        let dashes = search + found + 2;
        let rest = &source[dashes..];
        if rest.starts_with("}}") {
            return Some(dashes + 2);
        }
        if rest.starts_with("~}}") {
            return Some(dashes + 3);
        }
        search = search + found + 1;
    }

    None
}

/// Return the name and length of a `{{{{/name}}}}` tag at the beginning of
/// the text.
fn raw_close(text: &str) -> Option<(&str, usize)> {
    let rest = text.strip_prefix("{{{{/")?;
    let length: usize = rest
        .chars()
        .take_while(|c| is_id_char(*c))
        .map(char::len_utf8)
        .sum();

    if length == 0 || !rest[length..].starts_with("}}}}") {
        return None;
    }

    Some((&rest[..length], 5 + length + 4))
}
