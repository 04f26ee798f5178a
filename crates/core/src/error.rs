//! Formula language errors.
//!
//! These errors never cross the resolution engine's public boundary:
//! the resolver contains them at the field level and degrades the
//! affected field to zero (or to the literal branch text, for
//! conditional branch values).

use std::fmt;

/// Error produced while lexing or parsing a formula string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    /// Character-level scan failure (unexpected character,
    /// unterminated `{placeholder}`, malformed number).
    Lex { pos: usize, message: String },
    /// Token-level structure failure (dangling operator,
    /// unbalanced parenthesis, trailing tokens).
    Parse { pos: usize, message: String },
}

impl FormulaError {
    pub fn lex(pos: usize, message: impl Into<String>) -> Self {
        FormulaError::Lex {
            pos,
            message: message.into(),
        }
    }

    pub fn parse(pos: usize, message: impl Into<String>) -> Self {
        FormulaError::Parse {
            pos,
            message: message.into(),
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaError::Lex { pos, message } => {
                write!(f, "lex error at offset {}: {}", pos, message)
            }
            FormulaError::Parse { pos, message } => {
                write!(f, "parse error at token {}: {}", pos, message)
            }
        }
    }
}

impl std::error::Error for FormulaError {}
