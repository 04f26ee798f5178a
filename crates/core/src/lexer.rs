//! Formula lexer.
//!
//! Tokenizes formula strings of the shape `{items_subtotal} * (1 - {discount} / 100)`
//! or predicates like `{total} > 100 && {qty} != 0`.
//!
//! `{placeholder}` references are scanned as whole tokens between the
//! braces, so an id like `total` can never capture a prefix of
//! `total_tax` the way naive substring replacement would.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{field_id}` placeholder (content without braces)
    Field(String),
    /// Numeric literal — kept as string to preserve exact representation
    Number(String),
    /// Bare identifier: `true`, `false`, `and`, `or`, `not` —
    /// distinguished in the parser
    Word(String),
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    // Comparison operators (`=` and `==` both lex to Eq)
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Logical operators
    AndAnd,
    OrOr,
    Bang,
    // Grouping
    LParen,
    RParen,
    // End of input
    Eof,
}

/// True for characters allowed inside a `{placeholder}` id.
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn lex(src: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // Placeholder: {field_id}
        if c == '{' {
            let start = pos;
            pos += 1;
            let id_start = pos;
            while pos < chars.len() && is_ident_char(chars[pos]) {
                pos += 1;
            }
            if pos >= chars.len() || chars[pos] != '}' {
                return Err(FormulaError::lex(start, "unterminated placeholder"));
            }
            if pos == id_start {
                return Err(FormulaError::lex(start, "empty placeholder"));
            }
            let id: String = chars[id_start..pos].iter().collect();
            pos += 1; // consume '}'
            tokens.push(Token::Field(id));
            continue;
        }

        // Number
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos < chars.len()
                && chars[pos] == '.'
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit()
            {
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            let s: String = chars[start..pos].iter().collect();
            tokens.push(Token::Number(s));
            continue;
        }

        // Operators
        match c {
            '+' => {
                tokens.push(Token::Plus);
                pos += 1;
                continue;
            }
            '-' => {
                tokens.push(Token::Minus);
                pos += 1;
                continue;
            }
            '*' => {
                tokens.push(Token::Star);
                pos += 1;
                continue;
            }
            '/' => {
                tokens.push(Token::Slash);
                pos += 1;
                continue;
            }
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
                continue;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
                continue;
            }
            '=' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    pos += 2;
                } else {
                    pos += 1;
                }
                tokens.push(Token::Eq);
                continue;
            }
            '!' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Token::Neq);
                    pos += 2;
                } else {
                    tokens.push(Token::Bang);
                    pos += 1;
                }
                continue;
            }
            '<' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Token::Lte);
                    pos += 2;
                } else {
                    tokens.push(Token::Lt);
                    pos += 1;
                }
                continue;
            }
            '>' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Token::Gte);
                    pos += 2;
                } else {
                    tokens.push(Token::Gt);
                    pos += 1;
                }
                continue;
            }
            '&' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '&' {
                    tokens.push(Token::AndAnd);
                    pos += 2;
                    continue;
                }
                return Err(FormulaError::lex(pos, "expected '&&'"));
            }
            '|' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '|' {
                    tokens.push(Token::OrOr);
                    pos += 2;
                    continue;
                }
                return Err(FormulaError::lex(pos, "expected '||'"));
            }
            _ => {}
        }

        // Bare identifier / keyword
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && is_ident_char(chars[pos]) {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Token::Word(word));
            continue;
        }

        return Err(FormulaError::lex(
            pos,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

// ──────────────────────────────────────────────
// Placeholder substitution (literal fallback rendering)
// ──────────────────────────────────────────────

/// Render `src` with every well-formed `{id}` replaced by the scope
/// value's canonical decimal string.
///
/// This is the literal-text fallback used when a conditional branch
/// value does not parse as an expression: the branch is shown with its
/// placeholders filled in. Ids missing from the scope keep their `{id}`
/// spelling, and malformed placeholders are copied through verbatim —
/// this function is total and never fails.
pub fn substitute_placeholders(src: &str, scope: &BTreeMap<String, Decimal>) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut pos = 0usize;

    while pos < chars.len() {
        if chars[pos] != '{' {
            out.push(chars[pos]);
            pos += 1;
            continue;
        }
        let start = pos;
        pos += 1;
        let id_start = pos;
        while pos < chars.len() && is_ident_char(chars[pos]) {
            pos += 1;
        }
        if pos >= chars.len() || chars[pos] != '}' || pos == id_start {
            // Malformed placeholder: copy what was consumed and move on
            for &c in &chars[start..pos.min(chars.len())] {
                out.push(c);
            }
            continue;
        }
        let id: String = chars[id_start..pos].iter().collect();
        pos += 1; // consume '}'
        match scope.get(&id) {
            Some(value) => out.push_str(&value.normalize().to_string()),
            None => {
                out.push('{');
                out.push_str(&id);
                out.push('}');
            }
        }
    }

    out
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
