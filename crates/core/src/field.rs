//! Field catalog types.
//!
//! A catalog is a flat list of [`FieldDefinition`]s describing every
//! reportable value of a proposal document: base fields read from the
//! data record, calculated fields defined by a formula over other
//! fields, and conditional fields selecting one of two branches by a
//! predicate. Catalogs are authored in the template editor and
//! persisted as JSON, so every type here carries serde derives matching
//! that shape.

use serde::{Deserialize, Serialize};

/// Evaluation strategy of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Base,
    Calculated,
    Conditional,
    /// Kind tag not recognized by this engine version; such a field
    /// always resolves to zero.
    Other,
}

// Hand-written so a catalog authored by a newer editor still
// deserializes; unrecognized kinds resolve to zero instead of
// aborting the whole catalog.
impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "base" => FieldKind::Base,
            "calculated" => FieldKind::Calculated,
            "conditional" => FieldKind::Conditional,
            _ => FieldKind::Other,
        })
    }
}

/// Display formatting applied after resolution. Never affects
/// evaluation, with one exception: a base field declared `Text` or
/// `Date` is exempt from numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Currency,
    Number,
    Percent,
    Date,
    #[default]
    Text,
}

// Hand-written so unrecognized tags fall back to Text instead of
// failing catalog deserialization.
impl<'de> Deserialize<'de> for OutputType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "currency" => OutputType::Currency,
            "number" => OutputType::Number,
            "percent" => OutputType::Percent,
            "date" => OutputType::Date,
            _ => OutputType::Text,
        })
    }
}

/// Branches of a conditional field. `if` is a boolean predicate over
/// the dependency scope; `then` / `else` are each independently
/// placeholder-substituted and opportunistically evaluated as an
/// expression, falling back to the literal substituted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalConfig {
    #[serde(rename = "if")]
    pub if_expr: String,
    #[serde(rename = "then")]
    pub then_value: String,
    #[serde(rename = "else")]
    pub else_value: String,
}

/// One reportable value of a proposal document.
///
/// `id` must be unique within a catalog: it is both the key of the
/// resolved-value maps and the `{id}` placeholder token in formulas.
/// A catalog with duplicate ids is a caller error (last one wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    /// Display name; never consulted by resolution.
    pub label: String,
    pub kind: FieldKind,
    /// Dotted path into the data record (base fields only), e.g.
    /// `client.name` or `items.0.price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,
    /// Formula string (calculated fields only). The reserved id
    /// `items_subtotal` computes the built-in line-item aggregate and
    /// ignores this string entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Ids whose resolved values populate the formula/predicate scope.
    /// Order is irrelevant; ids missing from the catalog are skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(
        default,
        rename = "conditionalConfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub conditional: Option<ConditionalConfig>,
    #[serde(default)]
    pub output_type: OutputType,
}

impl FieldDefinition {
    /// Look up a field by id within a catalog slice.
    pub fn find<'a>(catalog: &'a [FieldDefinition], id: &str) -> Option<&'a FieldDefinition> {
        catalog.iter().find(|f| f.id == id)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
