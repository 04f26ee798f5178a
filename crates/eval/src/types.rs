//! Runtime types of the resolution engine.
//!
//! [`RawValue`] is the unformatted result of resolving one field, as
//! distinct from the locale-formatted display string produced by the
//! formatter. [`ResolvedCache`] is the per-pass memo that guarantees
//! at-most-one evaluation per field per pass and doubles as the cycle
//! guard.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;

// ──────────────────────────────────────────────
// Raw values
// ──────────────────────────────────────────────

/// Unformatted field value. Numbers use `rust_decimal::Decimal` --
/// never `f64` -- so document totals are exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Number(Decimal),
    Text(String),
}

impl RawValue {
    pub fn zero() -> Self {
        RawValue::Number(Decimal::ZERO)
    }

    /// Numeric view used when this value feeds a formula scope:
    /// numbers pass through, numeric-looking text coerces, anything
    /// else is `None` (scope building degrades that to zero).
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            RawValue::Number(d) => Some(*d),
            RawValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Canonical string rendering, independent of any output type.
    pub fn display(&self) -> String {
        match self {
            RawValue::Number(d) => d.normalize().to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }
}

// ──────────────────────────────────────────────
// Per-pass memo cache
// ──────────────────────────────────────────────

/// Memo cache scoped to a single resolution pass.
///
/// Created fresh at the start of each catalog-resolution entry point,
/// threaded by mutable reference through every recursive dependency
/// resolution, and discarded with the pass. The memo is a correctness
/// requirement, not an optimization: diamond-shaped dependency graphs
/// must observe a single evaluation of the shared field, and resolution
/// cost stays linear in catalog size instead of exponential in fan-out.
///
/// The `in_progress` set marks fields currently being resolved further
/// up the stack. Re-entering one means the catalog has a dependency
/// cycle; that field fails closed to zero instead of recursing without
/// bound. The zero is deliberately not memoized, so the field still
/// receives its real value when its own resolution completes.
#[derive(Debug, Default)]
pub struct ResolvedCache {
    values: BTreeMap<String, RawValue>,
    in_progress: BTreeSet<String>,
}

impl ResolvedCache {
    pub fn new() -> Self {
        ResolvedCache::default()
    }

    pub fn get(&self, id: &str) -> Option<&RawValue> {
        self.values.get(id)
    }

    /// Mark a field as being resolved. Returns `false` when the field
    /// is already on the resolution stack (a cycle).
    pub fn enter(&mut self, id: &str) -> bool {
        self.in_progress.insert(id.to_string())
    }

    /// Record the final value for a field and clear its in-progress
    /// marker.
    pub fn finish(&mut self, id: &str, value: RawValue) -> RawValue {
        self.in_progress.remove(id);
        self.values.insert(id.to_string(), value.clone());
        value
    }

    /// Pre-seed a value, e.g. for an editor previewing one in-progress
    /// field against already-resolved neighbors.
    pub fn seed(&mut self, id: &str, value: RawValue) {
        self.values.insert(id.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ──────────────────────────────────────────────
// Expression evaluation errors
// ──────────────────────────────────────────────

/// Errors raised while evaluating a parsed formula over a numeric
/// scope. Always contained at the field level by the resolver; they
/// never cross the public API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// `{id}` not present in the scope (dependency missing from the
    /// catalog, or not listed in `depends_on`).
    UnboundPlaceholder { id: String },
    /// Division by zero.
    DivisionByZero,
    /// Decimal overflow during arithmetic.
    Overflow,
    /// Operator applied to an operand kind it is not defined for.
    TypeError { message: String },
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::UnboundPlaceholder { id } => {
                write!(f, "unbound placeholder: {{{}}}", id)
            }
            ExprError::DivisionByZero => write!(f, "division by zero"),
            ExprError::Overflow => write!(f, "decimal overflow"),
            ExprError::TypeError { message } => write!(f, "type error: {}", message),
        }
    }
}

impl std::error::Error for ExprError {}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
