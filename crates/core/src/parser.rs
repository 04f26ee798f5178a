//! Recursive-descent formula parser.
//!
//! Grammar, loosest-binding first:
//!
//! ```text
//! expr    := or
//! or      := and (("||" | "or") and)*
//! and     := cmp (("&&" | "and") cmp)*
//! cmp     := add (cmp_op add)?          -- non-associative
//! add     := mul (("+" | "-") mul)*
//! mul     := unary (("*" | "/") unary)*
//! unary   := ("-" | "!" | "not") unary | atom
//! atom    := number | "true" | "false" | "{id}" | "(" expr ")"
//! ```

use rust_decimal::Decimal;

use crate::ast::{ArithOp, CmpOp, Expr};
use crate::error::FormulaError;
use crate::lexer::{lex, Token};

/// Parse a formula string into an expression tree.
pub fn parse_formula(src: &str) -> Result<Expr, FormulaError> {
    let tokens = lex(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.peek() != &Token::Eof {
        return Err(parser.err(format!("unexpected token {:?}", parser.peek())));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(s) if s == w)
    }

    fn err(&self, message: impl Into<String>) -> FormulaError {
        FormulaError::parse(self.pos, message)
    }

    fn parse_or(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_and()?;
        while self.peek() == &Token::OrOr || self.is_word("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_cmp()?;
        while self.peek() == &Token::AndAnd || self.is_word("and") {
            self.advance();
            let right = self.parse_cmp()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> Result<Expr, FormulaError> {
        let left = self.parse_add()?;
        let op = match self.peek() {
            Token::Eq => CmpOp::Eq,
            Token::Neq => CmpOp::Neq,
            Token::Lt => CmpOp::Lt,
            Token::Lte => CmpOp::Lte,
            Token::Gt => CmpOp::Gt,
            Token::Gte => CmpOp::Gte,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_add()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_add(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Token::Plus => ArithOp::Add,
                Token::Minus => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_mul()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_mul(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => ArithOp::Mul,
                Token::Slash => ArithOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        if self.peek() == &Token::Minus {
            self.advance();
            let e = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(e)));
        }
        if self.peek() == &Token::Bang || self.is_word("not") {
            self.advance();
            let e = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(e)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Token::Number(s) => {
                let d: Decimal = s
                    .parse()
                    .map_err(|_| self.err(format!("invalid number '{}'", s)))?;
                Ok(Expr::Number(d))
            }
            Token::Field(id) => Ok(Expr::Field(id)),
            Token::Word(w) if w == "true" => Ok(Expr::Bool(true)),
            Token::Word(w) if w == "false" => Ok(Expr::Bool(false)),
            Token::LParen => {
                let e = self.parse_or()?;
                if self.advance() != Token::RParen {
                    return Err(self.err("expected ')'"));
                }
                Ok(e)
            }
            other => Err(self.err(format!("expected value, got {:?}", other))),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
