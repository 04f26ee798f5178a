//! Formula AST evaluator.
//!
//! Evaluates a parsed [`Expr`] over a fixed numeric scope. The scope is
//! immutable during evaluation and holds only decimals, so a formula
//! can reference dependencies but never mutate or re-enter resolution.
//! All arithmetic is `rust_decimal` checked arithmetic.

use std::collections::BTreeMap;

use folio_core::ast::{ArithOp, CmpOp, Expr};
use rust_decimal::Decimal;

use crate::types::{ExprError, RawValue};

/// Result of evaluating one expression node: comparison and logical
/// nodes yield booleans, everything else numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprValue {
    Number(Decimal),
    Bool(bool),
}

impl ExprValue {
    fn as_number(&self) -> Result<Decimal, ExprError> {
        match self {
            ExprValue::Number(d) => Ok(*d),
            ExprValue::Bool(_) => Err(ExprError::TypeError {
                message: "arithmetic requires a numeric operand, got a boolean".to_string(),
            }),
        }
    }

    /// Truthiness in predicate position: a boolean is itself, a number
    /// is true when nonzero.
    pub fn truthy(&self) -> bool {
        match self {
            ExprValue::Bool(b) => *b,
            ExprValue::Number(d) => !d.is_zero(),
        }
    }

    /// Narrow to a raw field value; booleans become `1` / `0`.
    pub fn into_raw(self) -> RawValue {
        match self {
            ExprValue::Number(d) => RawValue::Number(d),
            ExprValue::Bool(true) => RawValue::Number(Decimal::ONE),
            ExprValue::Bool(false) => RawValue::Number(Decimal::ZERO),
        }
    }
}

/// Evaluate an expression over a numeric scope.
pub fn eval_expr(
    expr: &Expr,
    scope: &BTreeMap<String, Decimal>,
) -> Result<ExprValue, ExprError> {
    match expr {
        Expr::Number(d) => Ok(ExprValue::Number(*d)),
        Expr::Bool(b) => Ok(ExprValue::Bool(*b)),

        Expr::Field(id) => scope
            .get(id)
            .map(|d| ExprValue::Number(*d))
            .ok_or_else(|| ExprError::UnboundPlaceholder { id: id.clone() }),

        Expr::Neg(e) => {
            let n = eval_expr(e, scope)?.as_number()?;
            Ok(ExprValue::Number(-n))
        }

        Expr::Not(e) => {
            let v = eval_expr(e, scope)?;
            Ok(ExprValue::Bool(!v.truthy()))
        }

        Expr::Arith { op, left, right } => {
            let l = eval_expr(left, scope)?.as_number()?;
            let r = eval_expr(right, scope)?.as_number()?;
            let result = match op {
                ArithOp::Add => l.checked_add(r).ok_or(ExprError::Overflow)?,
                ArithOp::Sub => l.checked_sub(r).ok_or(ExprError::Overflow)?,
                ArithOp::Mul => l.checked_mul(r).ok_or(ExprError::Overflow)?,
                ArithOp::Div => {
                    if r.is_zero() {
                        return Err(ExprError::DivisionByZero);
                    }
                    l.checked_div(r).ok_or(ExprError::Overflow)?
                }
            };
            Ok(ExprValue::Number(result))
        }

        Expr::Compare { op, left, right } => {
            let l = eval_expr(left, scope)?;
            let r = eval_expr(right, scope)?;
            let result = match (l, r) {
                (ExprValue::Number(a), ExprValue::Number(b)) => match op {
                    CmpOp::Eq => a == b,
                    CmpOp::Neq => a != b,
                    CmpOp::Lt => a < b,
                    CmpOp::Lte => a <= b,
                    CmpOp::Gt => a > b,
                    CmpOp::Gte => a >= b,
                },
                (ExprValue::Bool(a), ExprValue::Bool(b)) => match op {
                    CmpOp::Eq => a == b,
                    CmpOp::Neq => a != b,
                    _ => {
                        return Err(ExprError::TypeError {
                            message: "booleans support only = and !=".to_string(),
                        });
                    }
                },
                _ => {
                    return Err(ExprError::TypeError {
                        message: "cannot compare a number with a boolean".to_string(),
                    });
                }
            };
            Ok(ExprValue::Bool(result))
        }

        Expr::And(l, r) => {
            if !eval_expr(l, scope)?.truthy() {
                // Short-circuit: left is false, skip right
                return Ok(ExprValue::Bool(false));
            }
            Ok(ExprValue::Bool(eval_expr(r, scope)?.truthy()))
        }

        Expr::Or(l, r) => {
            if eval_expr(l, scope)?.truthy() {
                // Short-circuit: left is true, skip right
                return Ok(ExprValue::Bool(true));
            }
            Ok(ExprValue::Bool(eval_expr(r, scope)?.truthy()))
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
