//! folio-core: data model and formula language for the proposal
//! field-resolution engine.
//!
//! Holds the declarative types exchanged with the engine's
//! collaborators (field catalogs, proposal data records, document
//! templates) and the formula expression language: a hand-rolled lexer
//! over `{placeholder}` tokens, a recursive-descent parser, and the
//! expression AST. Evaluation lives in `folio-eval`.

pub mod ast;
pub mod data;
pub mod error;
pub mod field;
pub mod lexer;
pub mod parser;
pub mod template;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{ArithOp, CmpOp, Expr};
pub use data::{lookup_path, Client, CompanyInfo, LineItem, ProposalData};
pub use error::FormulaError;
pub use field::{ConditionalConfig, FieldDefinition, FieldKind, OutputType};
pub use lexer::substitute_placeholders;
pub use parser::parse_formula;
pub use template::{Block, BlockType, Section, Template};
