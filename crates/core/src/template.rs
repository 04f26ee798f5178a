//! Document template shape.
//!
//! Owned and persisted by the template editor; the engine only consumes
//! it. A template is a list of named sections, each holding typed
//! blocks. A block may carry a `binding` — a field id looked up in the
//! resolved-fields map at render time. The engine's sole obligation to
//! this shape is that an absent or unresolved binding renders as an
//! empty display value, never an error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Logo,
    Text,
    Field,
    Table,
    Divider,
    TwoColumns,
    Signature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub label: String,
    /// Field id whose resolved display value fills this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    /// Renderer-specific settings, opaque to the engine.
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub label: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub sections: Vec<Section>,
}
