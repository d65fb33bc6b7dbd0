use super::pipe::Pipe;
use crate::compile::parse::tree::{
    BlockStatement, Expression, Hash, MustacheStatement, PartialStatement, Program, Statement,
    SubExpression,
};
use std::fmt::Result;

/// Render a syntax tree with one node per line.
///
/// # Examples
///
/// ```
/// use stache::{ast_to_text, parse};
///
/// let program = parse("Hi {{name}}!").unwrap();
/// assert_eq!(
///     ast_to_text(&program),
///     "CONTENT[ 'Hi ' ]\n{{ PATH:name [] }}\nCONTENT[ '!' ]\n"
/// );
/// ```
pub fn ast_to_text(program: &Program) -> String {
    let mut buffer = String::new();
    // Writing to a String does not fail.
    let _ = write_program(&mut Pipe::new(&mut buffer), program);

    buffer
}

fn write_program(pipe: &mut Pipe, program: &Program) -> Result {
    if !program.block_params.is_empty() {
        pipe.line(format!("BLOCK PARAMS: [ {} ]", program.block_params.join(" ")))?;
    }

    for statement in program.body.iter() {
        match statement {
            Statement::Mustache(mustache) => write_mustache(pipe, mustache)?,
            Statement::Block(block) => write_block(pipe, block)?,
            Statement::Partial(partial) => write_partial(pipe, partial)?,
            Statement::Content(content) => pipe.line(format!("CONTENT[ '{}' ]", content.value))?,
            Statement::Comment(comment) => pipe.line(format!("{{{{! '{}' }}}}", comment.value))?,
        }
    }

    Ok(())
}

fn write_mustache(pipe: &mut Pipe, mustache: &MustacheStatement) -> Result {
    let call = call(&mustache.path, &mustache.params, mustache.hash.as_ref());

    pipe.line(format!("{{{{ {call} }}}}"))
}

fn write_block(pipe: &mut Pipe, block: &BlockStatement) -> Result {
    pipe.line("BLOCK:")?;
    pipe.indent();
    pipe.line(call(&block.path, &block.params, block.hash.as_ref()))?;

    if let Some(program) = &block.program {
        pipe.line("PROGRAM:")?;
        pipe.indent();
        write_program(pipe, program)?;
        pipe.dedent();
    }
    if let Some(inverse) = &block.inverse {
        pipe.line("{{^}}")?;
        pipe.indent();
        write_program(pipe, inverse)?;
        pipe.dedent();
    }

    pipe.dedent();

    Ok(())
}

fn write_partial(pipe: &mut Pipe, partial: &PartialStatement) -> Result {
    let mut content = match &partial.name {
        Expression::Path(path) => format!("PARTIAL:{}", path.original),
        name => format!("PARTIAL:{}", expression(name)),
    };
    if let Some(param) = partial.params.first() {
        content.push(' ');
        content.push_str(&expression(param));
    }
    if let Some(hash) = &partial.hash {
        content.push(' ');
        content.push_str(&hash_text(hash));
    }

    pipe.line(format!("{{{{> {content} }}}}"))
}

/// Return the text of a call, `PATH:name [params] HASH{..}`.
fn call(path: &Expression, params: &[Expression], hash: Option<&Hash>) -> String {
    let params: Vec<String> = params.iter().map(expression).collect();
    let mut text = format!("{} [{}]", expression(path), params.join(", "));
    if let Some(hash) = hash {
        text.push(' ');
        text.push_str(&hash_text(hash));
    }

    text
}

fn expression(value: &Expression) -> String {
    match value {
        Expression::Path(path) => {
            let data = if path.data { "@" } else { "" };
            format!("{data}PATH:{}", path.parts.join("/"))
        }
        Expression::SubExpression(SubExpression {
            path, params, hash, ..
        }) => call(path, params, hash.as_ref()),
        Expression::String(string) => format!("\"{}\"", string.value),
        Expression::Number(number) => format!("NUMBER{{{}}}", number.value),
        Expression::Boolean(boolean) => format!("BOOLEAN{{{}}}", boolean.value),
        Expression::Undefined(_) => "UNDEFINED".to_string(),
        Expression::Null(_) => "NULL".to_string(),
    }
}

fn hash_text(hash: &Hash) -> String {
    let pairs: Vec<String> = hash
        .pairs
        .iter()
        .map(|pair| format!("{}={}", pair.key, expression(&pair.value)))
        .collect();

    format!("HASH{{{}}}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::ast_to_text;
    use crate::compile::parse;

    fn helper_print(source: &str) -> String {
        ast_to_text(&parse(source).unwrap())
    }

    #[test]
    fn test_print_block() {
        assert_eq!(
            helper_print("{{#if a}}x{{else}}y{{/if}}"),
            "BLOCK:\n  PATH:if [PATH:a]\n  PROGRAM:\n    CONTENT[ 'x' ]\n  {{^}}\n    CONTENT[ 'y' ]\n"
        );
    }

    #[test]
    fn test_print_arguments() {
        assert_eq!(
            helper_print(r#"{{foo "s" 1 true undefined null (bar @baz) k=v}}"#),
            "{{ PATH:foo [\"s\", NUMBER{1}, BOOLEAN{true}, UNDEFINED, NULL, PATH:bar [@PATH:baz]] HASH{k=PATH:v} }}\n"
        );
    }

    #[test]
    fn test_print_block_params() {
        assert_eq!(
            helper_print("{{#each xs as |x i|}}{{x}}{{/each}}"),
            "BLOCK:\n  PATH:each [PATH:xs]\n  PROGRAM:\n    BLOCK PARAMS: [ x i ]\n    {{ PATH:x [] }}\n"
        );
    }

    #[test]
    fn test_print_partial_and_comment() {
        assert_eq!(
            helper_print("{{> foo bar k=1}}{{! note }}"),
            "{{> PARTIAL:foo PATH:bar HASH{k=NUMBER{1}} }}\n{{! ' note ' }}\n"
        );
    }

    #[test]
    fn test_print_scoped_path_uses_parts() {
        assert_eq!(helper_print("{{this.a/b}}"), "{{ PATH:a/b [] }}\n");
    }
}
