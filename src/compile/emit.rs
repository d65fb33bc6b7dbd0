pub mod opcode;
pub mod program;

pub use opcode::Opcode;
pub use program::{Depths, Program};

use crate::{
    compile::{
        options::{Flags, Options},
        parse::tree::{
            self, BlockStatement, Expression, Hash, MustacheStatement, PartialStatement,
            PathExpression, Statement, SubExpression,
        },
    },
    log::{Error, UNKNOWN_HELPER, UNSUPPORTED_PARTIAL},
};
use serde_json::{json, Value};
use std::{borrow::Cow, collections::BTreeSet};

/// How a call target is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    /// Certainly a helper.
    Helper,
    /// Either a helper or a context value, decided at runtime.
    Ambiguous,
    /// Certainly a context value.
    Simple,
}

/// The parts of a mustache, block or sub expression that describe a call.
struct Call<'tree> {
    path: Cow<'tree, PathExpression>,
    params: &'tree [Expression],
    hash: Option<&'tree Hash>,
    is_sexpr: bool,
}

impl<'tree> Call<'tree> {
    fn mustache(mustache: &'tree MustacheStatement) -> Self {
        Self {
            path: call_path(&mustache.path),
            params: &mustache.params,
            hash: mustache.hash.as_ref(),
            is_sexpr: false,
        }
    }

    fn block(block: &'tree BlockStatement) -> Self {
        Self {
            path: call_path(&block.path),
            params: &block.params,
            hash: block.hash.as_ref(),
            is_sexpr: false,
        }
    }

    fn sexpr(sexpr: &'tree SubExpression) -> Self {
        Self {
            path: call_path(&sexpr.path),
            params: &sexpr.params,
            hash: sexpr.hash.as_ref(),
            is_sexpr: true,
        }
    }
}

/// Walks a syntax tree and emits a [`Program`].
///
/// Each nested block body is compiled by a child [`Compiler`] that shares
/// the [`Options`] and sees the block parameters of every enclosing program.
pub struct Compiler<'a> {
    source: &'a str,
    options: &'a Options,
    opcodes: Vec<Opcode>,
    children: Vec<Program>,
    depths: BTreeSet<usize>,
    use_partial: bool,
    /// Block parameters of the enclosing programs, innermost last.
    scopes: Vec<Vec<String>>,
}

impl<'a> Compiler<'a> {
    /// Create a new [`Compiler`].
    ///
    /// The source text is only used to point at the cause of an error.
    pub fn new(source: &'a str, options: &'a Options) -> Self {
        Self {
            source,
            options,
            opcodes: vec![],
            children: vec![],
            depths: BTreeSet::new(),
            use_partial: false,
            scopes: vec![],
        }
    }

    /// Compile the given [`tree::Program`].
    pub fn compile(mut self, program: &tree::Program) -> Result<Program, Error> {
        self.scopes.push(program.block_params.clone());
        for statement in program.body.iter() {
            self.compile_statement(statement)?;
        }
        self.scopes.pop();

        let flags = self.options.flags();
        let use_depths = flags.contains(Flags::USE_DEPTHS);

        Ok(Program {
            guid: self.children.len(),
            opcodes: self.opcodes,
            children: self.children,
            depths: use_depths.then(|| Depths {
                list: self.depths.into_iter().collect(),
            }),
            is_simple: program.block_params.is_empty() && !use_depths,
            use_partial: self.use_partial,
            track_ids: flags.contains(Flags::TRACK_IDS),
            string_params: flags.contains(Flags::STRING_PARAMS),
            block_params: program.block_params.len(),
            options: flags,
        })
    }

    /// Compile a nested program and return its index in `children`.
    fn compile_program(&mut self, program: &tree::Program) -> Result<usize, Error> {
        let mut child = Compiler::new(self.source, self.options);
        child.scopes = self.scopes.clone();
        let result = child.compile(program)?;

        if let Some(depths) = &result.depths {
            for depth in depths.list.iter().filter(|depth| **depth >= 2) {
                self.add_depth(depth - 1);
            }
        }
        self.use_partial |= result.use_partial;

        let index = self.children.len();
        tracing::trace!(index, opcodes = result.opcodes.len(), "compiled child program");
        self.children.push(result);

        Ok(index)
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), Error> {
        match statement {
            Statement::Mustache(mustache) => self.compile_mustache(mustache),
            Statement::Block(block) => self.compile_block(block),
            Statement::Partial(partial) => self.compile_partial(partial),
            Statement::Content(content) => {
                if !content.value.is_empty() {
                    self.emit(Opcode::AppendContent(content.value.clone()));
                }
                Ok(())
            }
            Statement::Comment(_) => Ok(()),
        }
    }

    fn compile_mustache(&mut self, mustache: &MustacheStatement) -> Result<(), Error> {
        self.compile_call(&Call::mustache(mustache))?;
        self.emit(match mustache.escaped {
            true => Opcode::AppendEscaped,
            false => Opcode::Append,
        });

        Ok(())
    }

    fn compile_block(&mut self, block: &BlockStatement) -> Result<(), Error> {
        let program = match &block.program {
            Some(program) => Some(self.compile_program(program)?),
            None => None,
        };
        let inverse = match &block.inverse {
            Some(inverse) => Some(self.compile_program(inverse)?),
            None => None,
        };

        let call = Call::block(block);
        match self.classify(&call) {
            Class::Helper => self.helper_sexpr(&call, program, inverse)?,
            Class::Simple => {
                self.simple_sexpr(&call.path);
                self.emit(Opcode::PushProgram(program));
                self.emit(Opcode::PushProgram(inverse));
                self.emit(Opcode::EmptyHash { omit_empty: false });
                self.emit(Opcode::BlockValue(call.path.original.clone()));
            }
            Class::Ambiguous => {
                self.ambiguous_sexpr(&call.path, program, inverse);
                self.emit(Opcode::PushProgram(program));
                self.emit(Opcode::PushProgram(inverse));
                self.emit(Opcode::EmptyHash { omit_empty: false });
                self.emit(Opcode::AmbiguousBlockValue);
            }
        }
        self.emit(Opcode::Append);

        Ok(())
    }

    fn compile_partial(&mut self, partial: &PartialStatement) -> Result<(), Error> {
        self.use_partial = true;

        if let Some(extra) = partial.params.get(1) {
            return Err(Error::compile(UNSUPPORTED_PARTIAL)
                .with_pointer(self.source, extra.region())
                .with_help(format!(
                    "a partial accepts a single context argument, found {}",
                    partial.params.len()
                )));
        }

        // Without an argument the partial renders with the current context.
        let context;
        let params = match partial.params.is_empty() {
            true => {
                context = [Expression::Path(PathExpression {
                    data: false,
                    depth: 0,
                    parts: vec![],
                    original: String::new(),
                    region: partial.name.region(),
                })];
                &context[..]
            }
            false => &partial.params[..],
        };

        let name = match &partial.name {
            Expression::SubExpression(sexpr) => {
                self.compile_call(&Call::sexpr(sexpr))?;
                None
            }
            name => Some(name.original()),
        };

        self.setup_full_params(params, partial.hash.as_ref(), None, None, true)?;
        self.emit(Opcode::InvokePartial {
            is_dynamic: name.is_none(),
            name,
            indent: partial.indent.clone(),
        });
        self.emit(Opcode::Append);

        Ok(())
    }

    /// Compile a mustache or sub expression call.
    fn compile_call(&mut self, call: &Call) -> Result<(), Error> {
        match self.classify(call) {
            Class::Helper => self.helper_sexpr(call, None, None)?,
            Class::Ambiguous => self.ambiguous_sexpr(&call.path, None, None),
            Class::Simple => self.simple_sexpr(&call.path),
        }

        Ok(())
    }

    fn classify(&self, call: &Call) -> Class {
        let path = &call.path;
        let is_simple = path.is_simple();
        let is_block_param = is_simple
            && path
                .parts
                .first()
                .is_some_and(|name| self.block_param_index(name).is_some());

        let mut is_helper = !is_block_param
            && (call.is_sexpr || !call.params.is_empty() || call.hash.is_some());
        let mut is_eligible = !is_block_param && (is_helper || is_simple);

        if is_eligible && !is_helper {
            if let Some(name) = path.parts.first() {
                if self.options.is_known_helper(name) {
                    is_helper = true;
                } else if self.options.has(Flags::KNOWN_HELPERS_ONLY) {
                    is_eligible = false;
                }
            }
        }

        match (is_helper, is_eligible) {
            (true, _) => Class::Helper,
            (false, true) => Class::Ambiguous,
            (false, false) => Class::Simple,
        }
    }

    fn helper_sexpr(
        &mut self,
        call: &Call,
        program: Option<usize>,
        inverse: Option<usize>,
    ) -> Result<(), Error> {
        let params = self.setup_full_params(call.params, call.hash, program, inverse, false)?;
        let path = &call.path;
        let name = path.parts.first().map(String::as_str).unwrap_or_default();

        if self.options.is_known_helper(name) {
            self.emit(Opcode::InvokeKnownHelper {
                params,
                name: name.to_string(),
            });
        } else if self.options.has(Flags::KNOWN_HELPERS_ONLY) {
            return Err(Error::compile(UNKNOWN_HELPER)
                .with_pointer(self.source, path.region)
                .with_help(format!(
                    "`{}` is not a known helper, and only known helpers are allowed",
                    path.original
                )));
        } else {
            self.compile_path(path, true);
            self.emit(Opcode::InvokeHelper {
                params,
                name: path.original.clone(),
                is_simple: path.is_simple(),
            });
        }

        Ok(())
    }

    fn ambiguous_sexpr(
        &mut self,
        path: &PathExpression,
        program: Option<usize>,
        inverse: Option<usize>,
    ) {
        let name = path.parts.first().cloned().unwrap_or_default();
        let is_block = program.is_some() || inverse.is_some();

        self.emit(Opcode::GetContext(path.depth));
        self.emit(Opcode::PushProgram(program));
        self.emit(Opcode::PushProgram(inverse));
        self.compile_path(path, false);
        self.emit(Opcode::InvokeAmbiguous { name, is_block });
    }

    fn simple_sexpr(&mut self, path: &PathExpression) {
        self.compile_path(path, false);
        self.emit(Opcode::ResolvePossibleLambda);
    }

    /// Push the params, programs and hash of a call, and return the number
    /// of params.
    fn setup_full_params(
        &mut self,
        params: &[Expression],
        hash: Option<&Hash>,
        program: Option<usize>,
        inverse: Option<usize>,
        omit_empty: bool,
    ) -> Result<usize, Error> {
        for param in params {
            self.push_param(param)?;
        }

        self.emit(Opcode::PushProgram(program));
        self.emit(Opcode::PushProgram(inverse));

        match hash {
            Some(hash) => self.compile_hash(hash)?,
            None => self.emit(Opcode::EmptyHash { omit_empty }),
        }

        Ok(params.len())
    }

    fn compile_hash(&mut self, hash: &Hash) -> Result<(), Error> {
        self.emit(Opcode::PushHash);
        for pair in hash.pairs.iter() {
            self.push_param(&pair.value)?;
        }
        for pair in hash.pairs.iter().rev() {
            self.emit(Opcode::AssignToHash(pair.key.clone()));
        }
        self.emit(Opcode::PopHash);

        Ok(())
    }

    fn push_param(&mut self, param: &Expression) -> Result<(), Error> {
        if self.options.has(Flags::STRING_PARAMS) {
            let (value, depth) = match param {
                Expression::Path(path) => (json!(string_param(&path.original)), path.depth),
                Expression::String(string) => (json!(string_param(&string.value)), 0),
                Expression::Number(number) => (Value::Number(number.value.clone()), 0),
                Expression::Boolean(boolean) => (json!(boolean.value), 0),
                _ => (json!(""), 0),
            };

            self.add_depth(depth);
            self.emit(Opcode::GetContext(depth));
            self.emit(Opcode::PushStringParam {
                value,
                kind: param.type_name(),
            });

            // Sub expressions are still evaluated.
            if let Expression::SubExpression(sexpr) = param {
                self.compile_call(&Call::sexpr(sexpr))?;
            }

            return Ok(());
        }

        if self.options.has(Flags::TRACK_IDS) {
            self.push_id(param);
        }

        self.compile_expression(param)
    }

    fn push_id(&mut self, param: &Expression) {
        let block_param = match param {
            Expression::Path(path) if !path.data && !path.is_scoped() && path.depth == 0 => path
                .parts
                .split_first()
                .and_then(|(name, rest)| {
                    self.block_param_index(name).map(|id| (id, rest.join(".")))
                }),
            _ => None,
        };

        if let Some((id, rest)) = block_param {
            self.emit(Opcode::PushBlockParamId { id, rest });
            return;
        }

        let id = match param {
            Expression::Path(path) => json!(track_id(&path.original)),
            Expression::String(string) => json!(track_id(&string.value)),
            Expression::Number(number) => Value::Number(number.value.clone()),
            Expression::Boolean(boolean) => json!(boolean.value),
            _ => json!(""),
        };
        self.emit(Opcode::PushId {
            kind: param.type_name(),
            id,
        });
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), Error> {
        match expression {
            Expression::Path(path) => self.compile_path(path, false),
            Expression::SubExpression(sexpr) => self.compile_call(&Call::sexpr(sexpr))?,
            Expression::String(string) => self.emit(Opcode::PushString(string.value.clone())),
            Expression::Number(number) => {
                self.emit(Opcode::PushLiteral(Value::Number(number.value.clone())))
            }
            Expression::Boolean(boolean) => self.emit(Opcode::PushLiteral(json!(boolean.value))),
            Expression::Undefined(_) => self.emit(Opcode::PushLiteral(json!("undefined"))),
            Expression::Null(_) => self.emit(Opcode::PushLiteral(json!("null"))),
        }

        Ok(())
    }

    fn compile_path(&mut self, path: &PathExpression, falsy: bool) {
        self.add_depth(path.depth);
        self.emit(Opcode::GetContext(path.depth));

        let scoped = path.is_scoped();
        let block_param = match path.parts.first() {
            Some(name) if !path.data && !scoped && path.depth == 0 => {
                self.block_param_index(name)
            }
            _ => None,
        };

        let opcode = if let Some(id) = block_param {
            Opcode::LookupBlockParam {
                id,
                parts: path.parts.clone(),
            }
        } else if path.parts.is_empty() {
            Opcode::PushContext
        } else if path.data {
            Opcode::LookupData {
                depth: path.depth,
                parts: path.parts.clone(),
            }
        } else {
            Opcode::LookupOnContext {
                parts: path.parts.clone(),
                falsy,
                scoped,
            }
        };
        self.emit(opcode);
    }

    /// Return the position of a block parameter as the number of programs
    /// between the innermost one and the one that declares it, followed by
    /// its index in the declaration.
    fn block_param_index(&self, name: &str) -> Option<[usize; 2]> {
        self.scopes
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, params)| {
                params
                    .iter()
                    .position(|param| param == name)
                    .map(|index| [depth, index])
            })
    }

    fn add_depth(&mut self, depth: usize) {
        if depth != 0 {
            self.depths.insert(depth);
        }
    }

    #[inline]
    fn emit(&mut self, opcode: Opcode) {
        self.opcodes.push(opcode);
    }
}

/// Return the path that names a call.
///
/// Literal call targets such as `{{"foo"}}` or `{{1}}` behave as a path
/// with a single part.
fn call_path(expression: &Expression) -> Cow<'_, PathExpression> {
    match expression {
        Expression::Path(path) => Cow::Borrowed(path),
        literal => {
            let original = literal.original();
            Cow::Owned(PathExpression {
                data: false,
                depth: 0,
                parts: vec![original.clone()],
                original,
                region: literal.region(),
            })
        }
    }
}

/// Return the text of a string parameter, without leading `../` and `./`
/// segments and with `/` separators replaced by `.`.
fn string_param(text: &str) -> String {
    let mut rest = text;
    loop {
        match rest.strip_prefix("../").or_else(|| rest.strip_prefix("./")) {
            Some(stripped) => rest = stripped,
            None => break,
        }
    }

    rest.replace('/', ".")
}

/// Return the tracked id of a parameter, without a leading `this` or `./`.
fn track_id(text: &str) -> String {
    let text = match text.strip_prefix("this") {
        Some("") => "",
        Some(rest) if rest.starts_with('.') => &rest[1..],
        _ => text,
    };
    let text = text.strip_prefix("./").unwrap_or(text);

    match text {
        "." => String::new(),
        text => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{string_param, track_id, Opcode, Program};
    use crate::{
        compile::{
            compile,
            options::{Flags, Options},
        },
        log::{Error, ErrorKind},
    };
    use serde_json::json;

    fn helper_compile(source: &str, flags: Flags) -> Result<Program, Error> {
        compile(source, &Options::new().with_flags(flags))
    }

    fn lookup(parts: &[&str], falsy: bool, scoped: bool) -> Opcode {
        Opcode::LookupOnContext {
            parts: parts.iter().map(|part| part.to_string()).collect(),
            falsy,
            scoped,
        }
    }

    #[test]
    fn test_ambiguous_mustache() {
        let program = helper_compile("{{foo}}", Flags::NONE).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::GetContext(0),
                Opcode::PushProgram(None),
                Opcode::PushProgram(None),
                Opcode::GetContext(0),
                lookup(&["foo"], false, false),
                Opcode::InvokeAmbiguous {
                    name: "foo".to_string(),
                    is_block: false
                },
                Opcode::AppendEscaped,
            ]
        );
        assert!(program.children.is_empty());
        assert!(program.depths.is_none());
    }

    #[test]
    fn test_known_helpers_only_lookup() {
        let program = helper_compile("{{foo}}", Flags::KNOWN_HELPERS_ONLY).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::GetContext(0),
                lookup(&["foo"], false, false),
                Opcode::ResolvePossibleLambda,
                Opcode::AppendEscaped,
            ]
        );
    }

    #[test]
    fn test_known_helpers_only_unknown_helper() {
        let error = helper_compile("{{foo bar}}", Flags::KNOWN_HELPERS_ONLY).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Compile);
        assert_eq!(error.reason(), "unknown helper");
        assert_eq!(error.position().map(|p| p.offset), Some(2));
    }

    #[test]
    fn test_declared_helper() {
        let options = Options::new()
            .with_flags(Flags::KNOWN_HELPERS_ONLY)
            .with_known_helper("foo");
        let program = compile("{{foo}}", &options).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::PushProgram(None),
                Opcode::PushProgram(None),
                Opcode::EmptyHash { omit_empty: false },
                Opcode::InvokeKnownHelper {
                    params: 0,
                    name: "foo".to_string()
                },
                Opcode::AppendEscaped,
            ]
        );
    }

    #[test]
    fn test_block_with_builtin_helper() {
        let program = helper_compile("{{#if a}}x{{/if}}", Flags::NONE).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::GetContext(0),
                lookup(&["a"], false, false),
                Opcode::PushProgram(Some(0)),
                Opcode::PushProgram(None),
                Opcode::EmptyHash { omit_empty: false },
                Opcode::InvokeKnownHelper {
                    params: 1,
                    name: "if".to_string()
                },
                Opcode::Append,
            ]
        );
        assert_eq!(program.children.len(), 1);
        assert_eq!(
            program.children[0].opcodes,
            vec![Opcode::AppendContent("x".to_string())]
        );
        assert_eq!(program.guid, 1);
    }

    #[test]
    fn test_ambiguous_block() {
        let program = helper_compile("{{#foo}}x{{else}}y{{/foo}}", Flags::NONE).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::GetContext(0),
                Opcode::PushProgram(Some(0)),
                Opcode::PushProgram(Some(1)),
                Opcode::GetContext(0),
                lookup(&["foo"], false, false),
                Opcode::InvokeAmbiguous {
                    name: "foo".to_string(),
                    is_block: true
                },
                Opcode::PushProgram(Some(0)),
                Opcode::PushProgram(Some(1)),
                Opcode::EmptyHash { omit_empty: false },
                Opcode::AmbiguousBlockValue,
                Opcode::Append,
            ]
        );
        assert_eq!(program.children.len(), 2);
    }

    #[test]
    fn test_simple_block() {
        let program = helper_compile("{{#foo.bar}}x{{/foo.bar}}", Flags::NONE).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::GetContext(0),
                lookup(&["foo", "bar"], false, false),
                Opcode::ResolvePossibleLambda,
                Opcode::PushProgram(Some(0)),
                Opcode::PushProgram(None),
                Opcode::EmptyHash { omit_empty: false },
                Opcode::BlockValue("foo.bar".to_string()),
                Opcode::Append,
            ]
        );
    }

    #[test]
    fn test_helper_with_params_and_hash() {
        let program = helper_compile(r#"{{helper "s" 1 key=true}}"#, Flags::NONE).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::PushString("s".to_string()),
                Opcode::PushLiteral(json!(1)),
                Opcode::PushProgram(None),
                Opcode::PushProgram(None),
                Opcode::PushHash,
                Opcode::PushLiteral(json!(true)),
                Opcode::AssignToHash("key".to_string()),
                Opcode::PopHash,
                Opcode::GetContext(0),
                lookup(&["helper"], true, false),
                Opcode::InvokeHelper {
                    params: 2,
                    name: "helper".to_string(),
                    is_simple: true
                },
                Opcode::AppendEscaped,
            ]
        );
    }

    #[test]
    fn test_hash_assigned_in_reverse() {
        let program = helper_compile("{{foo a=1 b=2}}", Flags::NONE).unwrap();
        let keys: Vec<&Opcode> = program
            .opcodes
            .iter()
            .filter(|opcode| matches!(opcode, Opcode::AssignToHash(_)))
            .collect();

        assert_eq!(
            keys,
            vec![
                &Opcode::AssignToHash("b".to_string()),
                &Opcode::AssignToHash("a".to_string())
            ]
        );
    }

    #[test]
    fn test_literal_call_target() {
        let program = helper_compile(r#"{{"foo bar"}}"#, Flags::KNOWN_HELPERS_ONLY).unwrap();

        assert_eq!(program.opcodes[1], lookup(&["foo bar"], false, false));
    }

    #[test]
    fn test_block_params() {
        let program =
            helper_compile("{{#each xs as |x i|}}{{x.name}}{{i}}{{/each}}", Flags::NONE).unwrap();
        let child = &program.children[0];

        assert_eq!(child.block_params, 2);
        assert!(!child.is_simple);
        assert_eq!(
            child.opcodes[..3],
            [
                Opcode::GetContext(0),
                Opcode::LookupBlockParam {
                    id: [0, 0],
                    parts: vec!["x".to_string(), "name".to_string()]
                },
                Opcode::ResolvePossibleLambda,
            ]
        );
        assert_eq!(
            child.opcodes[5],
            Opcode::LookupBlockParam {
                id: [0, 1],
                parts: vec!["i".to_string()]
            }
        );
    }

    #[test]
    fn test_outer_block_param() {
        let program = helper_compile(
            "{{#each xs as |x|}}{{#if y}}{{x}}{{/if}}{{/each}}",
            Flags::NONE,
        )
        .unwrap();
        let inner = &program.children[0].children[0];

        assert_eq!(
            inner.opcodes[1],
            Opcode::LookupBlockParam {
                id: [1, 0],
                parts: vec!["x".to_string()]
            }
        );
    }

    #[test]
    fn test_depths() {
        let source = "{{#foo}}{{../../bar}}{{../baz}}{{/foo}}";
        let program = helper_compile(source, Flags::USE_DEPTHS).unwrap();

        assert_eq!(program.depths.as_ref().map(|d| d.list.clone()), Some(vec![1]));
        assert_eq!(
            program.children[0].depths.as_ref().map(|d| d.list.clone()),
            Some(vec![1, 2])
        );
        assert!(!program.is_simple);

        let program = helper_compile(source, Flags::NONE).unwrap();
        assert!(program.depths.is_none());
        assert!(program.is_simple);
    }

    #[test]
    fn test_partial() {
        let program = helper_compile("{{> foo}}", Flags::NONE).unwrap();

        assert_eq!(
            program.opcodes,
            vec![
                Opcode::GetContext(0),
                Opcode::PushContext,
                Opcode::PushProgram(None),
                Opcode::PushProgram(None),
                Opcode::EmptyHash { omit_empty: true },
                Opcode::InvokePartial {
                    is_dynamic: false,
                    name: Some("foo".to_string()),
                    indent: String::new()
                },
                Opcode::Append,
            ]
        );
        assert!(program.use_partial);
    }

    #[test]
    fn test_partial_in_child_marks_parent() {
        let program = helper_compile("{{#if a}}{{> foo}}{{/if}}", Flags::NONE).unwrap();

        assert!(program.use_partial);
    }

    #[test]
    fn test_dynamic_partial() {
        let program = helper_compile("{{> (name) ctx}}", Flags::NONE).unwrap();

        assert_eq!(program.opcodes.last(), Some(&Opcode::Append));
        assert!(program.opcodes.contains(&Opcode::InvokePartial {
            is_dynamic: true,
            name: None,
            indent: String::new()
        }));
        assert_eq!(
            program.opcodes[5],
            Opcode::InvokeHelper {
                params: 0,
                name: "name".to_string(),
                is_simple: true
            }
        );
    }

    #[test]
    fn test_partial_too_many_arguments() {
        let error = helper_compile("{{> foo a b}}", Flags::NONE).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Compile);
        assert_eq!(error.reason(), "unsupported partial arguments");
    }

    #[test]
    fn test_string_params() {
        let program = helper_compile(r#"{{foo ../bar "baz"}}"#, Flags::STRING_PARAMS).unwrap();

        assert_eq!(
            program.opcodes[..4],
            [
                Opcode::GetContext(1),
                Opcode::PushStringParam {
                    value: json!("bar"),
                    kind: "PathExpression"
                },
                Opcode::GetContext(0),
                Opcode::PushStringParam {
                    value: json!("baz"),
                    kind: "StringLiteral"
                },
            ]
        );
        assert!(program.string_params);
    }

    #[test]
    fn test_track_ids() {
        let program = helper_compile("{{foo this.bar 1}}", Flags::TRACK_IDS).unwrap();

        assert_eq!(
            program.opcodes[..4],
            [
                Opcode::PushId {
                    kind: "PathExpression",
                    id: json!("bar")
                },
                Opcode::GetContext(0),
                lookup(&["bar"], false, true),
                Opcode::PushId {
                    kind: "NumberLiteral",
                    id: json!(1)
                },
            ]
        );
    }

    #[test]
    fn test_track_block_param_id() {
        let program =
            helper_compile("{{#each xs as |x|}}{{foo x.y}}{{/each}}", Flags::TRACK_IDS).unwrap();

        assert_eq!(
            program.children[0].opcodes[0],
            Opcode::PushBlockParamId {
                id: [0, 0],
                rest: "y".to_string()
            }
        );
    }

    #[test]
    fn test_data_and_context() {
        let program = helper_compile("{{foo @index .}}", Flags::NONE).unwrap();

        assert_eq!(
            program.opcodes[..4],
            [
                Opcode::GetContext(0),
                Opcode::LookupData {
                    depth: 0,
                    parts: vec!["index".to_string()]
                },
                Opcode::GetContext(0),
                Opcode::PushContext,
            ]
        );
    }

    #[test]
    fn test_unescaped_and_empty_content() {
        let program = helper_compile("{{{foo}}}", Flags::KNOWN_HELPERS_ONLY).unwrap();
        assert_eq!(program.opcodes.last(), Some(&Opcode::Append));

        let program = helper_compile("{{! nothing }}", Flags::NONE).unwrap();
        assert!(program.opcodes.is_empty());
    }

    #[test]
    fn test_else_chain_children() {
        let program = helper_compile("{{#if a}}x{{else if b}}y{{/if}}", Flags::NONE).unwrap();

        assert_eq!(program.children.len(), 2);
        assert_eq!(program.children[1].children.len(), 1);
    }

    #[test]
    fn test_string_param_text() {
        assert_eq!(string_param("../../foo/bar"), "foo.bar");
        assert_eq!(string_param("./foo"), "foo");
        assert_eq!(string_param("foo.bar"), "foo.bar");
    }

    #[test]
    fn test_track_id_text() {
        assert_eq!(track_id("this"), "");
        assert_eq!(track_id("this.foo"), "foo");
        assert_eq!(track_id("thisfoo"), "thisfoo");
        assert_eq!(track_id("./foo"), "foo");
        assert_eq!(track_id("."), "");
        assert_eq!(track_id("../foo"), "../foo");
    }

    #[test]
    fn test_known_helper_through_scoped_path() {
        let program = helper_compile("{{this.if a}}", Flags::KNOWN_HELPERS_ONLY).unwrap();

        assert_eq!(
            program.opcodes[2..],
            [
                Opcode::PushProgram(None),
                Opcode::PushProgram(None),
                Opcode::EmptyHash { omit_empty: false },
                Opcode::InvokeKnownHelper {
                    params: 1,
                    name: "if".to_string()
                },
                Opcode::AppendEscaped,
            ]
        );

        let program = helper_compile("{{#../each xs}}x{{/../each}}", Flags::NONE).unwrap();
        assert!(program.opcodes.contains(&Opcode::InvokeKnownHelper {
            params: 1,
            name: "each".to_string()
        }));
    }

    #[test]
    fn test_track_ids_without_name() {
        let program = helper_compile("{{foo (bar) undefined null}}", Flags::TRACK_IDS).unwrap();
        let ids: Vec<&Opcode> = program
            .opcodes
            .iter()
            .filter(|opcode| matches!(opcode, Opcode::PushId { .. }))
            .collect();

        assert_eq!(
            ids,
            vec![
                &Opcode::PushId {
                    kind: "SubExpression",
                    id: json!("")
                },
                &Opcode::PushId {
                    kind: "UndefinedLiteral",
                    id: json!("")
                },
                &Opcode::PushId {
                    kind: "NullLiteral",
                    id: json!("")
                },
            ]
        );
    }
}
