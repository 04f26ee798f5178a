//! Proposal data record.
//!
//! The record base fields resolve against. Typed structs mirror the
//! JSON shape the host application supplies; one resolution pass
//! flattens the record to a `serde_json::Value` once (via
//! [`ProposalData::to_record`]) and walks dotted source-key paths over
//! that tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Issuing company letterhead data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub cnpj: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub description: String,
    pub qty: Decimal,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalData {
    pub client: Client,
    pub company: CompanyInfo,
    pub items: Vec<LineItem>,
    /// Global discount percent applied on top of the item subtotal.
    pub discount: Decimal,
    /// ISO date (`YYYY-MM-DD`).
    pub valid_until: String,
    pub payment_conditions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

impl ProposalData {
    /// Flatten to a JSON tree for dotted-path lookup. Called once per
    /// resolution pass; the record is read-only for the rest of the
    /// pass.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Walk a dotted path (`client.name`, `items.0.price`) through a JSON
/// tree. Numeric segments index into arrays. Returns `None` when any
/// segment is absent.
pub fn lookup_path<'a>(record: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut cur = record;
    for segment in path.split('.') {
        cur = match cur {
            serde_json::Value::Object(map) => map.get(segment)?,
            serde_json::Value::Array(items) => {
                let idx: usize = segment.parse().ok()?;
                items.get(idx)?
            }
            _ => return None,
        };
    }
    Some(cur)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
