//! Field resolver.
//!
//! Recursively resolves one field definition to its raw value, pulling
//! dependencies through the shared per-pass cache. Total containment:
//! whatever is malformed about a field (bad path, bad formula, bad
//! predicate, missing dependency, dependency cycle), the field resolves
//! to zero -- or, for a conditional branch value that fails to evaluate,
//! to the literal substituted branch text. Nothing here returns an
//! error to the caller, so one bad field can never abort rendering of
//! the rest of the document.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use folio_core::{
    lookup_path, parse_formula, substitute_placeholders, FieldDefinition, FieldKind, OutputType,
};

use crate::expr::eval_expr;
use crate::types::{RawValue, ResolvedCache};

/// Reserved calculated-field id: built-in line-item aggregate,
/// bypasses the formula string entirely.
pub const ITEMS_SUBTOTAL_ID: &str = "items_subtotal";

/// Resolve one field to its raw value.
///
/// `record` is the flattened proposal data (see
/// [`folio_core::ProposalData::to_record`]); `catalog` is consulted for
/// dependency lookup; `cache` is the pass-wide memo. Callers wanting an
/// isolated single-field preview pass a fresh cache.
pub fn resolve_field_raw(
    field: &FieldDefinition,
    catalog: &[FieldDefinition],
    record: &serde_json::Value,
    cache: &mut ResolvedCache,
) -> RawValue {
    // Memo check first: shared sub-dependencies must evaluate once.
    if let Some(hit) = cache.get(&field.id) {
        return hit.clone();
    }
    if !cache.enter(&field.id) {
        // Dependency cycle: fail this branch closed without memoizing,
        // so the field still gets its real value when its own
        // resolution completes.
        return RawValue::zero();
    }

    let value = match field.kind {
        FieldKind::Base => resolve_base(field, record),
        FieldKind::Calculated if field.id == ITEMS_SUBTOTAL_ID => items_subtotal(record),
        FieldKind::Calculated => resolve_calculated(field, catalog, record, cache),
        FieldKind::Conditional => resolve_conditional(field, catalog, record, cache),
        FieldKind::Other => RawValue::zero(),
    };

    cache.finish(&field.id, value)
}

// ──────────────────────────────────────────────
// Base fields
// ──────────────────────────────────────────────

fn resolve_base(field: &FieldDefinition, record: &serde_json::Value) -> RawValue {
    let Some(key) = field.source_key.as_deref() else {
        return RawValue::zero();
    };
    let Some(found) = lookup_path(record, key) else {
        return RawValue::Text(String::new());
    };

    if let serde_json::Value::Number(n) = found {
        return RawValue::Number(json_number_to_decimal(n));
    }

    let text = json_value_to_text(found);
    // A numeric-looking base value participates in arithmetic without
    // an explicit calculated wrapper -- unless the field is declared
    // text or date, which pins the string form.
    if !matches!(field.output_type, OutputType::Text | OutputType::Date) {
        if let Ok(d) = text.trim().parse::<Decimal>() {
            return RawValue::Number(d);
        }
    }
    RawValue::Text(text)
}

fn json_value_to_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_number_to_decimal(n: &serde_json::Number) -> Decimal {
    let s = n.to_string();
    s.parse()
        .or_else(|_| Decimal::from_scientific(&s))
        .unwrap_or(Decimal::ZERO)
}

/// Decimal view of a JSON leaf: numbers and numeric strings.
fn json_to_decimal(v: &serde_json::Value) -> Option<Decimal> {
    match v {
        serde_json::Value::Number(n) => Some(json_number_to_decimal(n)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ──────────────────────────────────────────────
// Calculated fields
// ──────────────────────────────────────────────

/// Built-in aggregate: sum of `qty * price` over the record's line
/// items. Items with a missing or non-numeric qty/price contribute
/// zero.
fn items_subtotal(record: &serde_json::Value) -> RawValue {
    let Some(items) = record.get("items").and_then(|v| v.as_array()) else {
        return RawValue::zero();
    };
    let mut sum = Decimal::ZERO;
    for item in items {
        let qty = item.get("qty").and_then(json_to_decimal);
        let price = item.get("price").and_then(json_to_decimal);
        if let (Some(qty), Some(price)) = (qty, price) {
            let line = qty.checked_mul(price).unwrap_or(Decimal::ZERO);
            sum = sum.checked_add(line).unwrap_or(sum);
        }
    }
    RawValue::Number(sum)
}

fn resolve_calculated(
    field: &FieldDefinition,
    catalog: &[FieldDefinition],
    record: &serde_json::Value,
    cache: &mut ResolvedCache,
) -> RawValue {
    let Some(formula) = field.formula.as_deref() else {
        return RawValue::zero();
    };
    let scope = build_scope(field, catalog, record, cache);
    match parse_formula(formula) {
        Ok(expr) => match eval_expr(&expr, &scope) {
            Ok(v) => v.into_raw(),
            Err(_) => RawValue::zero(),
        },
        Err(_) => RawValue::zero(),
    }
}

/// Resolve every `depends_on` id into the numeric substitution scope.
/// A dependency whose raw value is not numeric contributes zero; an id
/// absent from the catalog is skipped entirely, leaving its placeholder
/// unbound (the subsequent evaluation then fails and the dependent
/// field degrades to zero).
fn build_scope(
    field: &FieldDefinition,
    catalog: &[FieldDefinition],
    record: &serde_json::Value,
    cache: &mut ResolvedCache,
) -> BTreeMap<String, Decimal> {
    let mut scope = BTreeMap::new();
    for dep_id in &field.depends_on {
        let Some(dep) = FieldDefinition::find(catalog, dep_id) else {
            continue;
        };
        let raw = resolve_field_raw(dep, catalog, record, cache);
        scope.insert(dep_id.clone(), raw.as_number().unwrap_or(Decimal::ZERO));
    }
    scope
}

// ──────────────────────────────────────────────
// Conditional fields
// ──────────────────────────────────────────────

fn resolve_conditional(
    field: &FieldDefinition,
    catalog: &[FieldDefinition],
    record: &serde_json::Value,
    cache: &mut ResolvedCache,
) -> RawValue {
    let Some(cond) = &field.conditional else {
        return RawValue::zero();
    };
    let scope = build_scope(field, catalog, record, cache);

    // Predicate failure resolves the whole field to zero; the branches
    // are never reached.
    let verdict = parse_formula(&cond.if_expr)
        .ok()
        .and_then(|expr| eval_expr(&expr, &scope).ok());
    let Some(verdict) = verdict else {
        return RawValue::zero();
    };

    let branch = if verdict.truthy() {
        &cond.then_value
    } else {
        &cond.else_value
    };

    // Branch values are opportunistically evaluated as expressions.
    // A branch that does not evaluate falls back to its literal
    // substituted text -- deliberately different from predicate
    // failure.
    match parse_formula(branch)
        .ok()
        .and_then(|expr| eval_expr(&expr, &scope).ok())
    {
        Some(v) => v.into_raw(),
        None => RawValue::Text(substitute_placeholders(branch, &scope)),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{ConditionalConfig, OutputType};
    use serde_json::json;

    fn base(id: &str, source_key: Option<&str>, output_type: OutputType) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            label: id.to_string(),
            kind: FieldKind::Base,
            source_key: source_key.map(str::to_owned),
            formula: None,
            depends_on: vec![],
            conditional: None,
            output_type,
        }
    }

    fn calculated(id: &str, formula: Option<&str>, deps: &[&str]) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            label: id.to_string(),
            kind: FieldKind::Calculated,
            source_key: None,
            formula: formula.map(str::to_owned),
            depends_on: deps.iter().map(|s| s.to_string()).collect(),
            conditional: None,
            output_type: OutputType::Number,
        }
    }

    fn conditional(id: &str, cfg: (&str, &str, &str), deps: &[&str]) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            label: id.to_string(),
            kind: FieldKind::Conditional,
            source_key: None,
            formula: None,
            depends_on: deps.iter().map(|s| s.to_string()).collect(),
            conditional: Some(ConditionalConfig {
                if_expr: cfg.0.to_string(),
                then_value: cfg.1.to_string(),
                else_value: cfg.2.to_string(),
            }),
            output_type: OutputType::Text,
        }
    }

    fn resolve(field: &FieldDefinition, catalog: &[FieldDefinition], record: &serde_json::Value) -> RawValue {
        let mut cache = ResolvedCache::new();
        resolve_field_raw(field, catalog, record, &mut cache)
    }

    fn num(n: i64) -> RawValue {
        RawValue::Number(Decimal::from(n))
    }

    #[test]
    fn base_without_source_key_is_zero() {
        let f = base("x", None, OutputType::Number);
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn base_missing_path_is_empty_text() {
        let f = base("x", Some("client.fax"), OutputType::Text);
        assert_eq!(
            resolve(&f, &[f.clone()], &json!({"client": {}})),
            RawValue::Text(String::new())
        );
    }

    #[test]
    fn base_json_number_passes_verbatim() {
        let f = base("d", Some("discount"), OutputType::Percent);
        assert_eq!(resolve(&f, &[f.clone()], &json!({"discount": 10})), num(10));
    }

    #[test]
    fn base_numeric_string_coerces_unless_text_or_date() {
        let record = json!({"discount": "10", "validUntil": "2025-12-31"});
        let coerced = base("d", Some("discount"), OutputType::Percent);
        assert_eq!(resolve(&coerced, &[coerced.clone()], &record), num(10));

        let pinned = base("d", Some("discount"), OutputType::Text);
        assert_eq!(
            resolve(&pinned, &[pinned.clone()], &record),
            RawValue::Text("10".to_string())
        );

        let date = base("v", Some("validUntil"), OutputType::Date);
        assert_eq!(
            resolve(&date, &[date.clone()], &record),
            RawValue::Text("2025-12-31".to_string())
        );
    }

    #[test]
    fn items_subtotal_aggregates_qty_times_price() {
        let f = calculated(ITEMS_SUBTOTAL_ID, None, &[]);
        let record = json!({"items": [
            {"qty": 2, "price": 100},
            {"qty": 1, "price": 50}
        ]});
        assert_eq!(resolve(&f, &[f.clone()], &record), num(250));
    }

    #[test]
    fn items_subtotal_accepts_stringly_decimals() {
        let f = calculated(ITEMS_SUBTOTAL_ID, None, &[]);
        let record = json!({"items": [
            {"qty": "2", "price": "99.90"},
            {"qty": 1, "price": "bogus"}
        ]});
        assert_eq!(
            resolve(&f, &[f.clone()], &record),
            RawValue::Number("199.80".parse().unwrap())
        );
    }

    #[test]
    fn items_subtotal_without_items_is_zero() {
        let f = calculated(ITEMS_SUBTOTAL_ID, None, &[]);
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn calculated_without_formula_is_zero() {
        let f = calculated("t", None, &[]);
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn calculated_chain_resolves_recursively() {
        let catalog = vec![
            calculated("a", Some("10"), &[]),
            calculated("b", Some("{a} * 2"), &["a"]),
            calculated("c", Some("{b} + 5"), &["b"]),
        ];
        assert_eq!(resolve(&catalog[2], &catalog, &json!({})), num(25));
    }

    #[test]
    fn malformed_formula_contained_to_zero() {
        let f = calculated("bad", Some("invalid +++ 1"), &[]);
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn dependency_missing_from_catalog_degrades_to_zero() {
        // {ghost} stays unbound, so evaluation fails and the field
        // contains the failure
        let f = calculated("t", Some("{ghost} + 1"), &["ghost"]);
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn non_numeric_dependency_enters_scope_as_zero() {
        let catalog = vec![
            base("name", Some("client.name"), OutputType::Text),
            calculated("t", Some("{name} + 7"), &["name"]),
        ];
        let record = json!({"client": {"name": "Maria"}});
        assert_eq!(resolve(&catalog[1], &catalog, &record), num(7));
    }

    #[test]
    fn cycle_fails_closed_not_unbounded() {
        let catalog = vec![
            calculated("a", Some("{b} + 1"), &["b"]),
            calculated("b", Some("{a} + 1"), &["a"]),
        ];
        // Inner re-entry of `a` contributes 0, so b = 1 and a = 2;
        // the point is termination with contained values, not the
        // exact numbers.
        assert_eq!(resolve(&catalog[0], &catalog, &json!({})), num(2));
    }

    #[test]
    fn conditional_branches_on_predicate() {
        let catalog = vec![
            calculated("total", Some("225"), &[]),
            conditional("size", ("{total} > 100", "BIG", "SMALL"), &["total"]),
        ];
        assert_eq!(
            resolve(&catalog[1], &catalog, &json!({})),
            RawValue::Text("BIG".to_string())
        );

        let catalog = vec![
            calculated("total", Some("80"), &[]),
            conditional("size", ("{total} > 100", "BIG", "SMALL"), &["total"]),
        ];
        assert_eq!(
            resolve(&catalog[1], &catalog, &json!({})),
            RawValue::Text("SMALL".to_string())
        );
    }

    #[test]
    fn conditional_branch_may_be_expression() {
        let catalog = vec![
            calculated("total", Some("200"), &[]),
            conditional(
                "bonus",
                ("{total} > 100", "{total} * 0.1", "0"),
                &["total"],
            ),
        ];
        assert_eq!(resolve(&catalog[1], &catalog, &json!({})), num(20));
    }

    #[test]
    fn conditional_predicate_failure_is_zero_branches_unreached() {
        let f = conditional("x", ("nonsense ???", "BIG", "SMALL"), &[]);
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn conditional_branch_failure_falls_back_to_substituted_literal() {
        let catalog = vec![
            calculated("total", Some("225"), &[]),
            conditional(
                "msg",
                ("{total} > 100", "Total: {total} reais", "-"),
                &["total"],
            ),
        ];
        assert_eq!(
            resolve(&catalog[1], &catalog, &json!({})),
            RawValue::Text("Total: 225 reais".to_string())
        );
    }

    #[test]
    fn conditional_without_config_is_zero() {
        let mut f = conditional("x", ("1 > 0", "a", "b"), &[]);
        f.conditional = None;
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn unrecognized_kind_is_zero() {
        let mut f = calculated("x", Some("10"), &[]);
        f.kind = FieldKind::Other;
        assert_eq!(resolve(&f, &[f.clone()], &json!({})), num(0));
    }

    #[test]
    fn memo_hit_short_circuits_before_everything() {
        let f = calculated("a", Some("10"), &[]);
        let mut cache = ResolvedCache::new();
        cache.seed("a", num(99));
        assert_eq!(resolve_field_raw(&f, &[f.clone()], &json!({}), &mut cache), num(99));
    }
}
