//! Text → [`Expression`] parsing. Graph text parsing lives on
//! [`crate::graph::Graph::parse`] instead, since it needs no tokenizer of
//! its own — this module exists for the richer expression grammar.

mod tokenizer;

use crate::error::IdentifyError;
use crate::expression::Expression;
use crate::variable::{Variable, VarSet};
use tokenizer::{Token, Tokenizer};

/// Parse a `P(...)`/`E[...;...]`/product/quotient expression.
pub fn parse_expression(input: &str) -> Result<Expression, IdentifyError> {
    let tokens = Tokenizer::new(input).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn error(&self, message: impl Into<String>) -> IdentifyError {
        IdentifyError::ParseError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), IdentifyError> {
        match self.advance() {
            Some(ref t) if t == expected => Ok(()),
            Some(other) => Err(self.error(format!("expected {expected:?}, found {other:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    fn expect_end(&mut self) -> Result<(), IdentifyError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error("trailing tokens after a complete expression"))
        }
    }

    /// `expr := term (('*' | '/') term)*`, left-associative.
    fn parse_expr(&mut self) -> Result<Expression, IdentifyError> {
        let mut expr = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    expr = Expression::product([expr, rhs]);
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.parse_term()?;
                    expr = Expression::quotient(expr, rhs);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// `term := 'P' '(' ... ')' | 'E' '[' expr ';' varlist ']' | '(' expr ')'`
    fn parse_term(&mut self) -> Result<Expression, IdentifyError> {
        match self.advance() {
            Some(Token::P) => self.parse_p_atom(),
            Some(Token::E) => self.parse_marginalization(),
            Some(Token::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(other) => Err(self.error(format!("expected a term, found {other:?}"))),
            None => Err(self.error("expected a term, found end of input")),
        }
    }

    /// `'(' varlist ('|' rhs_item (',' rhs_item)*)? ')'` where each
    /// `rhs_item` is `'do' '(' var ')'` or a bare variable.
    fn parse_p_atom(&mut self) -> Result<Expression, IdentifyError> {
        self.expect(&Token::LParen)?;
        let y = self.parse_var_list()?;

        let mut do_ = VarSet::new();
        let mut z = VarSet::new();
        if matches!(self.peek(), Some(Token::Pipe)) {
            self.advance();
            loop {
                if matches!(self.peek(), Some(Token::Do)) {
                    self.advance();
                    self.expect(&Token::LParen)?;
                    do_.insert(self.parse_var()?);
                    self.expect(&Token::RParen)?;
                } else {
                    z.insert(self.parse_var()?);
                }
                if matches!(self.peek(), Some(Token::Comma)) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen)?;
        Expression::p(y, do_, z)
    }

    /// `'[' expr ';' varlist ']'`
    fn parse_marginalization(&mut self) -> Result<Expression, IdentifyError> {
        self.expect(&Token::LBracket)?;
        let inner = self.parse_expr()?;
        self.expect(&Token::Semicolon)?;
        let margins = if matches!(self.peek(), Some(Token::RBracket)) {
            VarSet::new()
        } else {
            self.parse_var_list()?
        };
        self.expect(&Token::RBracket)?;
        Expression::marginalize(inner, margins)
    }

    fn parse_var_list(&mut self) -> Result<VarSet, IdentifyError> {
        let mut set = VarSet::new();
        set.insert(self.parse_var()?);
        while matches!(self.peek(), Some(Token::Comma)) {
            self.advance();
            set.insert(self.parse_var()?);
        }
        Ok(set)
    }

    fn parse_var(&mut self) -> Result<Variable, IdentifyError> {
        match self.advance() {
            Some(Token::Ident(name)) => Variable::new(name),
            Some(other) => Err(self.error(format!("expected a variable name, found {other:?}"))),
            None => Err(self.error("expected a variable name, found end of input")),
        }
    }
}
