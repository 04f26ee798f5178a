//! Formula expression AST.
//!
//! Produced by the parser, consumed by the evaluator in `folio-eval`.
//! A formula is parsed once into this tree and then evaluated over a
//! numeric scope; formula strings are never re-parsed at evaluation
//! time and never fed to a dynamic evaluator.

use rust_decimal::Decimal;

// ──────────────────────────────────────────────
// Operators
// ──────────────────────────────────────────────

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Comparison operator. `=` and `==` both map to `Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Decimal literal (`10`, `0.1`)
    Number(Decimal),
    /// Boolean literal (`true`, `false`)
    Bool(bool),
    /// `{field_id}` placeholder, resolved against the numeric scope
    Field(String),
    /// Unary minus
    Neg(Box<Expr>),
    /// `!e` / `not e`
    Not(Box<Expr>),
    /// Arithmetic: `e1 + e2`, `e1 - e2`, `e1 * e2`, `e1 / e2`
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison: `e1 > e2`, `e1 == e2`, ...
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `e1 && e2` / `e1 and e2`
    And(Box<Expr>, Box<Expr>),
    /// `e1 || e2` / `e1 or e2`
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Collect every `{placeholder}` id referenced by this expression.
    /// Ids are returned in first-occurrence order, deduplicated.
    pub fn placeholders(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_placeholders(&mut out);
        out
    }

    fn collect_placeholders(&self, out: &mut Vec<String>) {
        match self {
            Expr::Number(_) | Expr::Bool(_) => {}
            Expr::Field(id) => {
                if !out.iter().any(|x| x == id) {
                    out.push(id.clone());
                }
            }
            Expr::Neg(e) | Expr::Not(e) => e.collect_placeholders(out),
            Expr::Arith { left, right, .. } | Expr::Compare { left, right, .. } => {
                left.collect_placeholders(out);
                right.collect_placeholders(out);
            }
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_placeholders(out);
                r.collect_placeholders(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_deduplicated_in_order() {
        let e = Expr::Arith {
            op: ArithOp::Add,
            left: Box::new(Expr::Field("subtotal".to_string())),
            right: Box::new(Expr::Arith {
                op: ArithOp::Mul,
                left: Box::new(Expr::Field("subtotal".to_string())),
                right: Box::new(Expr::Field("tax_rate".to_string())),
            }),
        };
        assert_eq!(e.placeholders(), vec!["subtotal", "tax_rate"]);
    }
}
