use super::tree::{Expression, Hash};
use crate::{
    compile::lex::{token::Kind, Marks},
    region::Region,
};

/// The opening tag of a block, `{{#each items as |item|}}`.
///
/// Also used for `{{^x}}`, `{{else if x}}` and raw block tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Open {
    /// The delimiter that began the tag.
    pub kind: Kind,
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub block_params: Vec<String>,
    pub marks: Marks,
    /// Area from the opening delimiter to the closing delimiter.
    pub region: Region,
}

impl Open {
    /// Return the name that a closing tag must repeat.
    pub fn name(&self) -> String {
        self.path.original()
    }
}

/// The closing tag of a block, `{{/each}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Close {
    pub name: String,
    pub marks: Marks,
    pub region: Region,
}
