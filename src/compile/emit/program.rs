use super::opcode::Opcode;
use crate::compile::options::Flags;
use serde_json::{json, Map, Value};

/// Context depths referenced by a compiled [`Program`] and its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Depths {
    /// Ascending, without duplicates, never zero.
    pub list: Vec<usize>,
}

/// The result of compilation.
///
/// Nested block and inverse bodies are compiled into `children`, and are
/// referenced from [`Opcode::PushProgram`] by their index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub opcodes: Vec<Opcode>,
    pub children: Vec<Program>,
    /// Present only when compiled with [`Flags::USE_DEPTHS`].
    pub depths: Option<Depths>,
    /// True when the program declares no block parameters and depths are
    /// not tracked.
    pub is_simple: bool,
    /// Number of child programs.
    pub guid: usize,
    /// True when the program, or any of its children, renders a partial.
    pub use_partial: bool,
    pub track_ids: bool,
    pub string_params: bool,
    /// Number of block parameters declared for this program.
    pub block_params: usize,
    pub options: Flags,
}

impl Program {
    /// Return the view of this [`Program`] that conformance fixtures compare
    /// against.
    ///
    /// Debug fields are left out, and `depths` is reduced to its list.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{compile, Options};
    ///
    /// let program = compile("hello", &Options::new()).unwrap();
    /// assert_eq!(
    ///     program.canonical(),
    ///     serde_json::json!({
    ///         "opcodes": [{ "opcode": "appendContent", "args": ["hello"] }],
    ///         "children": []
    ///     })
    /// );
    /// ```
    pub fn canonical(&self) -> Value {
        let mut map = Map::new();
        map.insert("opcodes".to_string(), self.opcodes_value());
        map.insert(
            "children".to_string(),
            Value::Array(self.children.iter().map(Program::canonical).collect()),
        );
        if let Some(depths) = &self.depths {
            map.insert("depths".to_string(), json!({ "list": depths.list }));
        }

        Value::Object(map)
    }

    /// Return every field of this [`Program`], including debug metadata.
    pub fn full(&self) -> Value {
        let mut map = Map::new();
        map.insert("opcodes".to_string(), self.opcodes_value());
        map.insert(
            "children".to_string(),
            Value::Array(self.children.iter().map(Program::full).collect()),
        );
        if let Some(depths) = &self.depths {
            map.insert("depths".to_string(), json!({ "list": depths.list }));
        }
        map.insert("isSimple".to_string(), json!(self.is_simple));
        map.insert("guid".to_string(), json!(self.guid));
        map.insert("usePartial".to_string(), json!(self.use_partial));
        map.insert("trackIds".to_string(), json!(self.track_ids));
        map.insert("stringParams".to_string(), json!(self.string_params));
        map.insert("blockParams".to_string(), json!(self.block_params));
        map.insert("options".to_string(), json!(self.options.bits()));

        Value::Object(map)
    }

    fn opcodes_value(&self) -> Value {
        Value::Array(self.opcodes.iter().map(Opcode::to_value).collect())
    }
}
