//parsing expressions (literals, binary op, assignment, calls, arrays...)

use crate::ast::{Expr, Op};
use crate::lexer::Token;
use crate::parser::{ParseError, Parser};

fn assign_op(token: &Token) -> Option<Op> {
    match token {
        Token::Assign => Some(Op::Assign),
        Token::PlusAssign => Some(Op::PlusAssign),
        Token::MinusAssign => Some(Op::MinusAssign),
        Token::MulAssign => Some(Op::MulAssign),
        Token::DivAssign => Some(Op::DivAssign),
        _ => None,
    }
}

fn comparison_op(token: &Token) -> Option<Op> {
    match token {
        Token::Eq => Some(Op::Eq),
        Token::Ne => Some(Op::Ne),
        Token::Lt => Some(Op::Lt),
        Token::Le => Some(Op::Le),
        Token::Gt => Some(Op::Gt),
        Token::Ge => Some(Op::Ge),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Assignment binds loosest and is right-associative. Two shapes are
    /// recognized by lookahead: `name op= expr` and `name [ index ] op= expr`;
    /// anything else falls through to the comparison tier.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        if let Some(Token::Identifier(name)) = self.current() {
            let name = name.clone();
            if let Some(op) = self.peek(1).and_then(assign_op) {
                self.advance();
                self.advance();
                let value = self.parse_assignment()?;
                return Ok(Expr::Assign {
                    target: name,
                    op,
                    value: Box::new(value),
                });
            }
            if self.peek(1) == Some(&Token::LBracket) {
                let start = self.position();
                self.advance();
                self.advance();
                let index = self.parse_expr()?;
                self.expect(&Token::RBracket)?;
                if let Some(op) = self.current().and_then(assign_op) {
                    self.advance();
                    let value = self.parse_assignment()?;
                    return Ok(Expr::ArrayWrite {
                        array: name,
                        index: Box::new(index),
                        op,
                        value: Box::new(value),
                    });
                }
                // plain indexed read, reparse as part of a larger expression
                self.rewind(start);
            }
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.current().and_then(comparison_op) {
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                Some(Token::Plus) => Op::Plus,
                Some(Token::Minus) => Op::Minus,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Some(Token::Star) => Op::Mul,
                Some(Token::Slash) => Op::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current() {
            Some(Token::Minus) => Op::Minus,
            Some(Token::Bang) => Op::Not,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let current = self.current().cloned();
        match current {
            Some(Token::Integer(v)) => {
                self.advance();
                Ok(Expr::Integer(v))
            }
            Some(Token::Double(v)) => {
                self.advance();
                Ok(Expr::Double(v))
            }
            Some(Token::Str(raw)) => {
                self.advance();
                Ok(Expr::Str(raw))
            }
            Some(Token::True) => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            Some(Token::False) => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            Some(Token::Identifier(name)) => {
                self.advance();
                match self.current() {
                    Some(Token::LParen) => self.parse_call(name),
                    Some(Token::LBracket) => {
                        self.advance();
                        let index = self.parse_expr()?;
                        self.expect(&Token::RBracket)?;
                        Ok(Expr::ArrayRead {
                            array: name,
                            index: Box::new(index),
                        })
                    }
                    _ => Ok(Expr::Identifier(name)),
                }
            }
            Some(Token::LBracket) => self.parse_array_literal(),
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(token) => Err(ParseError::new(
                format!("expected expression, found {:?}", token),
                self.span(),
            )),
            None => Err(ParseError::new(
                "expected expression, found end of input",
                self.span(),
            )),
        }
    }

    fn parse_call(&mut self, callee: String) -> Result<Expr, ParseError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }
        Ok(Expr::Call { callee, args })
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(&Token::LBracket)?;
        let mut items = Vec::new();
        if !self.eat(&Token::RBracket) {
            loop {
                items.push(self.parse_expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RBracket)?;
                break;
            }
        }
        Ok(Expr::Array(items))
    }
}
