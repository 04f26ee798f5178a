//! Catalog resolver.
//!
//! Resolves an entire field catalog against one data record in a
//! single pass, sharing one memo cache so every field evaluates at
//! most once no matter how many dependents reference it. Two output
//! modes with identical resolution semantics: formatted display
//! strings, or raw numerics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use folio_core::{FieldDefinition, ProposalData};

use crate::format::format_field_value;
use crate::resolver::resolve_field_raw;
use crate::types::{RawValue, ResolvedCache};

/// Resolve every field to its display string.
///
/// Every id of the input catalog appears as a key of the output, even
/// when resolution degraded the field (failures surface as the
/// formatted zero value for the field's output type). Never fails, and
/// two calls over the same inputs produce identical maps.
pub fn resolve_all_fields(
    catalog: &[FieldDefinition],
    data: &ProposalData,
) -> BTreeMap<String, String> {
    let record = data.to_record();
    let mut cache = ResolvedCache::new();
    let mut out = BTreeMap::new();
    for field in catalog {
        let raw = resolve_field_raw(field, catalog, &record, &mut cache);
        out.insert(
            field.id.clone(),
            format_field_value(Some(&raw), field.output_type),
        );
    }
    out
}

/// Resolve every field to a raw number.
///
/// Same resolution pass as [`resolve_all_fields`], but the map holds
/// the raw decimal when the field resolved numerically and `0` when it
/// resolved to text (text and date-like fields always narrow to zero
/// here -- intentional, not an error).
pub fn resolve_all_fields_numeric(
    catalog: &[FieldDefinition],
    data: &ProposalData,
) -> BTreeMap<String, Decimal> {
    let record = data.to_record();
    let mut cache = ResolvedCache::new();
    let mut out = BTreeMap::new();
    for field in catalog {
        let n = match resolve_field_raw(field, catalog, &record, &mut cache) {
            RawValue::Number(d) => d,
            RawValue::Text(_) => Decimal::ZERO,
        };
        out.insert(field.id.clone(), n);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{FieldKind, OutputType};

    fn sample_data() -> ProposalData {
        serde_json::from_value(serde_json::json!({
            "client": {
                "name": "Maria Souza",
                "company": "Acme Ltda",
                "email": "maria@acme.com.br",
                "phone": "+55 11 99999-0000"
            },
            "company": {
                "name": "Folio Consultoria",
                "cnpj": "12.345.678/0001-90",
                "address": "Av. Paulista 1000, São Paulo",
                "phone": "+55 11 3333-0000",
                "email": "contato@folio.com.br"
            },
            "items": [
                { "id": "i1", "description": "Setup", "qty": 2, "price": 100 },
                { "id": "i2", "description": "Support", "qty": 1, "price": 50 }
            ],
            "discount": 10,
            "validUntil": "2025-12-31",
            "paymentConditions": "50% adiantado",
            "createdAt": "2025-11-01"
        }))
        .unwrap()
    }

    fn field(json: serde_json::Value) -> FieldDefinition {
        serde_json::from_value(json).unwrap()
    }

    fn sample_catalog() -> Vec<FieldDefinition> {
        vec![
            field(serde_json::json!({
                "id": "client_name", "label": "Cliente", "kind": "base",
                "sourceKey": "client.name", "outputType": "text"
            })),
            field(serde_json::json!({
                "id": "items_subtotal", "label": "Subtotal", "kind": "calculated",
                "outputType": "currency"
            })),
            field(serde_json::json!({
                "id": "discount", "label": "Desconto", "kind": "base",
                "sourceKey": "discount", "outputType": "percent"
            })),
            field(serde_json::json!({
                "id": "total", "label": "Total", "kind": "calculated",
                "formula": "{items_subtotal} * (1 - {discount} / 100)",
                "dependsOn": ["items_subtotal", "discount"],
                "outputType": "currency"
            })),
            field(serde_json::json!({
                "id": "valid_until", "label": "Validade", "kind": "base",
                "sourceKey": "validUntil", "outputType": "date"
            })),
        ]
    }

    #[test]
    fn formatted_mode_covers_every_field() {
        let out = resolve_all_fields(&sample_catalog(), &sample_data());
        assert_eq!(out.len(), 5);
        assert_eq!(out["client_name"], "Maria Souza");
        assert_eq!(out["items_subtotal"], "R$ 250,00");
        assert_eq!(out["discount"], "10%");
        assert_eq!(out["total"], "R$ 225,00");
        assert_eq!(out["valid_until"], "31/12/2025");
    }

    #[test]
    fn numeric_mode_narrows_text_to_zero() {
        let out = resolve_all_fields_numeric(&sample_catalog(), &sample_data());
        assert_eq!(out["items_subtotal"], Decimal::from(250));
        assert_eq!(out["total"], Decimal::from(225));
        assert_eq!(out["client_name"], Decimal::ZERO);
        assert_eq!(out["valid_until"], Decimal::ZERO);
    }

    #[test]
    fn failed_field_surfaces_as_formatted_zero_among_healthy_ones() {
        let mut catalog = sample_catalog();
        catalog.push(FieldDefinition {
            id: "broken".to_string(),
            label: "Broken".to_string(),
            kind: FieldKind::Calculated,
            source_key: None,
            formula: Some("invalid +++ 1".to_string()),
            depends_on: vec![],
            conditional: None,
            output_type: OutputType::Currency,
        });
        let out = resolve_all_fields(&catalog, &sample_data());
        assert_eq!(out["broken"], "R$ 0,00");
        assert_eq!(out["total"], "R$ 225,00");
    }
}
