//parsing statements (declarations, control flow, return...)

use crate::ast::{Block, Param, Stmt};
use crate::lexer::Token;
use crate::parser::{ParseError, Parser};

impl<'a> Parser<'a> {
    pub fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current() {
            Some(Token::Extern) => self.parse_extern(),
            Some(Token::Return) => self.parse_return(),
            Some(Token::If) => self.parse_if(),
            Some(Token::While) => self.parse_while(),
            Some(Token::Identifier(_)) if self.starts_declaration() => self.parse_declaration(),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(&Token::Semi)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    pub fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(&Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.current().is_none() {
                return Err(ParseError::new(
                    "unterminated block, expected '}'",
                    self.span(),
                ));
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(Block { stmts })
    }

    /// A statement opens a declaration when it looks like `type name`,
    /// `type [ ] name` or `type name (`. Whether `type` names a real type is
    /// the lowering's business, not the parser's.
    fn starts_declaration(&self) -> bool {
        match self.peek(1) {
            Some(Token::Identifier(_)) => true,
            Some(Token::LBracket) => matches!(self.peek(2), Some(Token::RBracket)),
            _ => false,
        }
    }

    fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
        let ty = self.expect_identifier()?;

        if self.eat(&Token::LBracket) {
            self.expect(&Token::RBracket)?;
            let name = self.expect_identifier()?;
            let init = if self.eat(&Token::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(&Token::Semi)?;
            return Ok(Stmt::ArrayDecl {
                elem_ty: ty,
                name,
                init,
            });
        }

        let name = self.expect_identifier()?;

        if self.current() == Some(&Token::LParen) {
            let params = self.parse_params()?;
            let body = self.parse_block()?;
            return Ok(Stmt::FunctionDecl {
                ret_ty: ty,
                name,
                params,
                body,
            });
        }

        let init = if self.eat(&Token::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&Token::Semi)?;
        Ok(Stmt::VarDecl { ty, name, init })
    }

    fn parse_extern(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::Extern)?;
        let ret_ty = self.expect_identifier()?;
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;
        self.expect(&Token::Semi)?;
        Ok(Stmt::ExternDecl {
            ret_ty,
            name,
            params,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                let ty = self.expect_identifier()?;
                let name = self.expect_identifier()?;
                params.push(Param { ty, name });
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }
        Ok(params)
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::Return)?;
        let expr = self.parse_expr()?;
        self.expect(&Token::Semi)?;
        Ok(Stmt::Return(expr))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat(&Token::Else) {
            self.parse_block()?
        } else {
            Block::default()
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::Loop { cond, body })
    }
}
