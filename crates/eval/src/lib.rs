//! folio-eval: proposal field-resolution engine.
//!
//! Resolves a declarative field catalog (base, calculated and
//! conditional fields) against a proposal data record, producing
//! display-ready or raw-numeric value maps for the template editor and
//! the document renderer.
//!
//! The engine is synchronous, pure computation: no I/O, no shared
//! state outside the per-pass memo cache, and a guarantee that the
//! catalog entry points never fail -- a malformed field degrades to its
//! zero display value while its siblings resolve normally. Concurrent
//! passes need no coordination as long as each gets its own cache.

pub mod catalog;
pub mod expr;
pub mod format;
pub mod resolver;
pub mod template;
pub mod types;

pub use catalog::{resolve_all_fields, resolve_all_fields_numeric};
pub use expr::{eval_expr, ExprValue};
pub use format::format_field_value;
pub use resolver::{resolve_field_raw, ITEMS_SUBTOTAL_ID};
pub use template::binding_value;
pub use types::{ExprError, RawValue, ResolvedCache};
