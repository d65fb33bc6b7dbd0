use super::pipe::Pipe;
use crate::compile::emit::Program;
use std::fmt::{Result, Write};

/// Render a compiled [`Program`] with one opcode per line.
///
/// Arguments follow the opcode name, separated by spaces. Depths are listed
/// after the opcodes, followed by each child program under a `CHILD n:`
/// header.
///
/// # Examples
///
/// ```
/// use stache::{compile, program_to_text, Options};
///
/// let program = compile("{{#if a}}x{{/if}}", &Options::new()).unwrap();
/// assert_eq!(
///     program_to_text(&program),
///     "getContext 0\n\
///      lookupOnContext [\"a\"] false false\n\
///      pushProgram 0\n\
///      pushProgram null\n\
///      emptyHash\n\
///      invokeKnownHelper 1 \"if\"\n\
///      append\n\
///      CHILD 0:\n  appendContent \"x\"\n"
/// );
/// ```
pub fn program_to_text(program: &Program) -> String {
    let mut buffer = String::new();
    // Writing to a String does not fail.
    let _ = write_program(&mut Pipe::new(&mut buffer), program);

    buffer
}

fn write_program(pipe: &mut Pipe, program: &Program) -> Result {
    for opcode in program.opcodes.iter() {
        pipe.pad()?;
        pipe.write_str(opcode.name())?;
        for arg in opcode.args() {
            pipe.write_char(' ')?;
            pipe.write_value(&arg)?;
        }
        pipe.write_char('\n')?;
    }

    if let Some(depths) = &program.depths {
        let list: Vec<String> = depths.list.iter().map(usize::to_string).collect();
        pipe.line(format!("DEPTHS [{}]", list.join(", ")))?;
    }

    for (n, child) in program.children.iter().enumerate() {
        pipe.line(format!("CHILD {n}:"))?;
        pipe.indent();
        write_program(pipe, child)?;
        pipe.dedent();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::program_to_text;
    use crate::compile::{
        compile,
        options::{Flags, Options},
    };

    #[test]
    fn test_print_depths() {
        let options = Options::new().with_flags(Flags::USE_DEPTHS | Flags::KNOWN_HELPERS_ONLY);
        let program = compile("{{../a}}", &options).unwrap();

        assert_eq!(
            program_to_text(&program),
            "getContext 1\nlookupOnContext [\"a\"] false false\nresolvePossibleLambda\nappendEscaped\nDEPTHS [1]\n"
        );
    }

    #[test]
    fn test_print_nested_children() {
        let program = compile("{{#a}}{{#b}}x{{/b}}{{/a}}", &Options::new()).unwrap();
        let text = program_to_text(&program);

        assert!(text.contains("CHILD 0:\n  getContext 0\n"));
        assert!(text.ends_with("  CHILD 0:\n    appendContent \"x\"\n"));
    }

    #[test]
    fn test_print_partial_args() {
        let program = compile("{{> (name)}}", &Options::new()).unwrap();

        assert!(program_to_text(&program).contains("invokePartial true null \"\"\n"));
    }
}
