use serde_json::{json, Value};
use std::fmt::Display;

/// A single instruction for the runtime virtual machine.
///
/// The names returned by [`Opcode::name`] and the arguments returned by
/// [`Opcode::args`] form the wire contract consumed by the runtime, so the
/// variants map one to one onto the Handlebars instruction set.
#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    /// Append literal template text.
    AppendContent(String),
    /// Append the value on top of the stack without escaping.
    Append,
    /// Append the value on top of the stack, escaping HTML.
    AppendEscaped,
    /// Move the lookup context up by the given number of `../` segments.
    GetContext(usize),
    /// Push the current context.
    PushContext,
    /// Push a reference to a child program, or nothing.
    PushProgram(Option<usize>),
    /// Push a hash with no pairs.
    EmptyHash { omit_empty: bool },
    /// Begin collecting hash pairs.
    PushHash,
    /// Pop a value into the hash under the given key.
    AssignToHash(String),
    /// Finish collecting hash pairs.
    PopHash,
    /// Resolve a path against the current context.
    LookupOnContext {
        parts: Vec<String>,
        falsy: bool,
        scoped: bool,
    },
    /// Resolve an `@` data path.
    LookupData { depth: usize, parts: Vec<String> },
    /// Resolve a path through a block parameter.
    ///
    /// The id is the distance from the innermost program that declares
    /// block parameters, followed by the position of the parameter.
    LookupBlockParam { id: [usize; 2], parts: Vec<String> },
    /// Invoke the value on top of the stack if it is a function.
    ResolvePossibleLambda,
    /// Decide at runtime whether the name is a helper or a context value.
    InvokeAmbiguous { name: String, is_block: bool },
    /// Invoke a helper resolved at runtime.
    InvokeHelper {
        params: usize,
        name: String,
        is_simple: bool,
    },
    /// Invoke a helper known at compile time.
    InvokeKnownHelper { params: usize, name: String },
    /// Render a block through `blockHelperMissing`.
    BlockValue(String),
    /// Render a block whose call target was ambiguous.
    AmbiguousBlockValue,
    /// Render a partial.
    ///
    /// Dynamic partials carry no name, it is computed at runtime.
    InvokePartial {
        is_dynamic: bool,
        name: Option<String>,
        indent: String,
    },
    PushString(String),
    PushLiteral(Value),
    /// Push a parameter as its source text.
    PushStringParam { value: Value, kind: &'static str },
    /// Push the tracked id of the parameter that follows.
    PushId { kind: &'static str, id: Value },
    /// Push the tracked id of a parameter resolved through a block parameter.
    PushBlockParamId { id: [usize; 2], rest: String },
}

impl Opcode {
    /// Return the name of the instruction.
    ///
    /// [`Opcode::PushId`] and [`Opcode::PushBlockParamId`] share a name, and
    /// are told apart by their first argument.
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::AppendContent(_) => "appendContent",
            Opcode::Append => "append",
            Opcode::AppendEscaped => "appendEscaped",
            Opcode::GetContext(_) => "getContext",
            Opcode::PushContext => "pushContext",
            Opcode::PushProgram(_) => "pushProgram",
            Opcode::EmptyHash { .. } => "emptyHash",
            Opcode::PushHash => "pushHash",
            Opcode::AssignToHash(_) => "assignToHash",
            Opcode::PopHash => "popHash",
            Opcode::LookupOnContext { .. } => "lookupOnContext",
            Opcode::LookupData { .. } => "lookupData",
            Opcode::LookupBlockParam { .. } => "lookupBlockParam",
            Opcode::ResolvePossibleLambda => "resolvePossibleLambda",
            Opcode::InvokeAmbiguous { .. } => "invokeAmbiguous",
            Opcode::InvokeHelper { .. } => "invokeHelper",
            Opcode::InvokeKnownHelper { .. } => "invokeKnownHelper",
            Opcode::BlockValue(_) => "blockValue",
            Opcode::AmbiguousBlockValue => "ambiguousBlockValue",
            Opcode::InvokePartial { .. } => "invokePartial",
            Opcode::PushString(_) => "pushString",
            Opcode::PushLiteral(_) => "pushLiteral",
            Opcode::PushStringParam { .. } => "pushStringParam",
            Opcode::PushId { .. } | Opcode::PushBlockParamId { .. } => "pushId",
        }
    }

    /// Return the arguments of the instruction, in order.
    pub fn args(&self) -> Vec<Value> {
        match self {
            Opcode::Append
            | Opcode::AppendEscaped
            | Opcode::PushContext
            | Opcode::PushHash
            | Opcode::PopHash
            | Opcode::ResolvePossibleLambda
            | Opcode::AmbiguousBlockValue => vec![],
            Opcode::AppendContent(text)
            | Opcode::AssignToHash(text)
            | Opcode::BlockValue(text)
            | Opcode::PushString(text) => vec![json!(text)],
            Opcode::GetContext(depth) => vec![json!(depth)],
            Opcode::PushProgram(index) => vec![json!(index)],
            Opcode::EmptyHash { omit_empty } => match omit_empty {
                true => vec![json!(true)],
                false => vec![],
            },
            Opcode::LookupOnContext {
                parts,
                falsy,
                scoped,
            } => vec![json!(parts), json!(falsy), json!(scoped)],
            Opcode::LookupData { depth, parts } => vec![json!(depth), json!(parts)],
            Opcode::LookupBlockParam { id, parts } => vec![json!(id), json!(parts)],
            Opcode::InvokeAmbiguous { name, is_block } => vec![json!(name), json!(is_block)],
            Opcode::InvokeHelper {
                params,
                name,
                is_simple,
            } => vec![json!(params), json!(name), json!(is_simple)],
            Opcode::InvokeKnownHelper { params, name } => vec![json!(params), json!(name)],
            Opcode::InvokePartial {
                is_dynamic,
                name,
                indent,
            } => vec![json!(is_dynamic), json!(name), json!(indent)],
            Opcode::PushLiteral(value) => vec![value.clone()],
            Opcode::PushStringParam { value, kind } => vec![value.clone(), json!(kind)],
            Opcode::PushId { kind, id } => vec![json!(kind), id.clone()],
            Opcode::PushBlockParamId { id, rest } => {
                vec![json!("BlockParam"), json!(id), json!(rest)]
            }
        }
    }

    /// Return the `{opcode, args}` object used by fixtures.
    pub fn to_value(&self) -> Value {
        json!({ "opcode": self.name(), "args": self.args() })
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
