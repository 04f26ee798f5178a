//! Template binding lookup.
//!
//! The one contract the engine owes the document renderer: a block's
//! `binding`, when present, indexes the resolved-fields map; an absent
//! or unresolved binding yields an empty display value, never an
//! error.

use std::collections::BTreeMap;

use folio_core::Block;

/// Display value for a block, or `""` when the block has no binding or
/// the binding does not resolve.
pub fn binding_value(block: &Block, resolved: &BTreeMap<String, String>) -> String {
    block
        .binding
        .as_deref()
        .and_then(|id| resolved.get(id))
        .cloned()
        .unwrap_or_default()
}
