use serde_json::{Map, Value};

use crate::fields::{first_text, CAPTION_TEXT, OWNER_HANDLE};

/// Caption and owner hints inherited from ancestor nodes.
///
/// Borrowed from the payload being walked and copied per level, so sibling
/// branches never observe each other's hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionContext<'a> {
    pub caption: Option<&'a str>,
    pub owner: Option<&'a str>,
}

impl<'a> ExtractionContext<'a> {
    /// Context for `node` and its descendants: the node's own caption and
    /// owner where present, otherwise the inherited ones.
    #[must_use]
    pub fn descend(self, node: &'a Map<String, Value>) -> Self {
        Self {
            caption: first_text(node, CAPTION_TEXT).or(self.caption),
            owner: first_text(node, OWNER_HANDLE).or(self.owner),
        }
    }
}
