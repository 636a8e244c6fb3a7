//! Recursive-descent CQL parser.
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ("OR" and_expr)*
//! and_expr   := primary ("AND" primary)*
//! primary    := "(" expr ")" | comparison
//! comparison := IDENT OP value
//! ```

use crate::error::CqlError;

use super::ast::{BinaryOp, CompareOp, Expr, Value};
use super::lexer::{Token, TokenKind};

pub fn parse(tokens: &[Token]) -> Result<Expr, CqlError> {
    let mut parser = Parser { tokens, at: 0 };
    let expr = parser.or_expr()?;
    parser.expect(TokenKind::Eof, "end of query")?;
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    at: usize,
}

impl<'a> Parser<'a> {
    fn or_expr(&mut self) -> Result<Expr, CqlError> {
        let mut left = self.and_expr()?;
        while self.eat(TokenKind::Or) {
            let right = self.and_expr()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, CqlError> {
        let mut left = self.primary()?;
        while self.eat(TokenKind::And) {
            let right = self.primary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr, CqlError> {
        if self.eat(TokenKind::LeftParen) {
            let expr = self.or_expr()?;
            self.expect(TokenKind::RightParen, "')'")?;
            return Ok(expr);
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, CqlError> {
        let field = self.expect(TokenKind::Identifier, "a field name")?.text.clone();

        let op = match self.current().kind {
            TokenKind::Equals => CompareOp::Eq,
            TokenKind::NotEquals => CompareOp::NotEq,
            TokenKind::GreaterEquals => CompareOp::Ge,
            TokenKind::GreaterThan => CompareOp::Gt,
            TokenKind::LessEquals => CompareOp::Le,
            TokenKind::LessThan => CompareOp::Lt,
            TokenKind::Contains => CompareOp::Contains,
            _ => {
                return Err(self.unexpected("a comparison operator"));
            }
        };
        self.at += 1;

        let value = match self.current().kind {
            TokenKind::String => Value::Str(self.current().text.clone()),
            TokenKind::Number => {
                let text = &self.current().text;
                Value::Int(text.parse().map_err(|_| CqlError::UnexpectedToken {
                    expected: "an integer",
                    found: text.clone(),
                    pos: self.current().pos,
                })?)
            }
            _ => return Err(self.unexpected("a string or number value")),
        };
        self.at += 1;

        Ok(Expr::Comparison { field, op, value })
    }

    fn current(&self) -> &Token {
        &self.tokens[self.at.min(self.tokens.len() - 1)]
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current().kind == kind {
            self.at += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<&'a Token, CqlError> {
        if self.current().kind != kind {
            return Err(self.unexpected(expected));
        }
        let token = &self.tokens[self.at];
        self.at += 1;
        Ok(token)
    }

    fn unexpected(&self, expected: &'static str) -> CqlError {
        let current = self.current();
        CqlError::UnexpectedToken {
            expected,
            found: if current.kind == TokenKind::Eof {
                "end of query".to_string()
            } else {
                current.text.clone()
            },
            pos: current.pos,
        }
    }
}
