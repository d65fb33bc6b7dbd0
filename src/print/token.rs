use super::pipe::Pipe;
use crate::compile::lex::token::{Kind, Token};
use std::fmt::{Result, Write};

/// Render tokens as `KIND [text]` pairs separated by a single space.
///
/// Tabs and line breaks within the text are written as `\t`, `\r` and `\n`.
/// A trailing [`Kind::Eof`] is not rendered.
///
/// # Examples
///
/// ```
/// use stache::{lex, tokens_to_text};
///
/// let tokens = lex("a\n{{b}}").unwrap();
/// assert_eq!(tokens_to_text(&tokens), r"CONTENT [a\n] OPEN [{{] ID [b] CLOSE [}}]");
/// ```
pub fn tokens_to_text(tokens: &[Token]) -> String {
    let mut buffer = String::new();
    // Writing to a String does not fail.
    let _ = write_tokens(&mut Pipe::new(&mut buffer), tokens);

    buffer
}

fn write_tokens(pipe: &mut Pipe, tokens: &[Token]) -> Result {
    let tokens = tokens.iter().filter(|token| !token.is(Kind::Eof));
    for (n, token) in tokens.enumerate() {
        if n > 0 {
            pipe.write_char(' ')?;
        }
        write!(pipe, "{} [", token.kind.name())?;
        for c in token.text.chars() {
            match c {
                '\t' => pipe.write_str("\\t")?,
                '\r' => pipe.write_str("\\r")?,
                '\n' => pipe.write_str("\\n")?,
                c => pipe.write_char(c)?,
            }
        }
        pipe.write_char(']')?;
    }

    Ok(())
}
