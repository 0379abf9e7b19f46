// src/syntax/parser.rs
//! Recursive-descent parser turning tokens into clauses, queries, and
//! goals.
//!
//! Variable scoping is lexical per clause: within one clause a name
//! resolves to a single variable, `_` is fresh at every occurrence. A
//! query's free variables are collected in first-occurrence order into a
//! synthetic `##(V1, …, Vn)` head so the caller can extract bindings.

use std::collections::HashMap;

use crate::engine::database::Rule;
use crate::engine::expression::{Expr, Op};
use crate::engine::term::{Term, Var};
use crate::errors::ParseError;
use crate::syntax::token::{Token, TokenType};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    scope: HashMap<String, Var>,
    order: Vec<Var>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            scope: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Parses a clause sequence terminated by end of input.
    pub fn parse_rules(&mut self) -> Result<Vec<Rule>, ParseError> {
        let mut rules = Vec::new();
        while !self.check(TokenType::Eof) {
            self.enter_clause_scope();
            rules.push(self.parse_rule()?);
        }
        Ok(rules)
    }

    /// Parses a query: a goal conjunction whose free variables become
    /// the arguments of a synthetic `##` head.
    pub fn parse_query(&mut self) -> Result<Rule, ParseError> {
        self.enter_clause_scope();
        let body = self.parse_body()?;
        self.finish_sentence()?;
        let variables = self.order.iter().cloned().map(Term::Var).collect();
        Ok(Rule {
            head: Term::Compound("##".to_string(), variables),
            body,
        })
    }

    /// Parses a bare goal (or conjunction) without the `##` wrapper, for
    /// driving the engine directly.
    pub fn parse_terms(&mut self) -> Result<Term, ParseError> {
        self.enter_clause_scope();
        let body = self.parse_body()?;
        self.finish_sentence()?;
        Ok(body)
    }

    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        let line = self.peek().line;
        if self.check(TokenType::Eof) {
            return Err(ParseError::UnexpectedEof);
        }
        let head = self.parse_term()?;
        if !matches!(head, Term::Atom(_) | Term::Compound(..)) {
            return Err(ParseError::InvalidClauseHead { line });
        }
        if self.matches(TokenType::Dot) {
            return Ok(Rule {
                head,
                body: Term::True,
            });
        }
        self.consume(TokenType::ColonMinus, "`:-`")?;
        let body = self.parse_body()?;
        self.consume(TokenType::Dot, "`.`")?;
        Ok(Rule { head, body })
    }

    fn parse_body(&mut self) -> Result<Term, ParseError> {
        let mut goals = vec![self.parse_goal()?];
        while self.matches(TokenType::Comma) {
            goals.push(self.parse_goal()?);
        }
        if goals.len() == 1 {
            Ok(goals.remove(0))
        } else {
            Ok(Term::Conjunction(goals))
        }
    }

    fn parse_goal(&mut self) -> Result<Term, ParseError> {
        match self.peek().token_type {
            TokenType::Cut => {
                self.advance();
                Ok(Term::Cut)
            }
            TokenType::Fail => {
                self.advance();
                Ok(Term::Fail)
            }
            TokenType::Nl => {
                self.advance();
                Ok(Term::Nl)
            }
            TokenType::Tab => {
                self.advance();
                Ok(Term::Tab)
            }
            TokenType::Write => {
                self.advance();
                self.consume(TokenType::LeftParen, "`(`")?;
                let mut args = vec![self.parse_term()?];
                while self.matches(TokenType::Comma) {
                    args.push(self.parse_term()?);
                }
                self.consume(TokenType::RightParen, "`)`")?;
                Ok(Term::Write(args))
            }
            TokenType::Retract | TokenType::AssertA | TokenType::AssertZ => {
                let op = self.advance();
                self.consume(TokenType::LeftParen, "`(`")?;
                let arg = Box::new(self.parse_term()?);
                self.consume(TokenType::RightParen, "`)`")?;
                Ok(match op.token_type {
                    TokenType::Retract => Term::Retract(arg),
                    TokenType::AssertA => Term::AssertA(arg),
                    _ => Term::AssertZ(arg),
                })
            }
            TokenType::Variable if self.next_is(TokenType::Is) => {
                let name = self.advance().lexeme;
                let var = self.scoped_variable(&name);
                self.advance();
                let expr = self.parse_expression()?;
                Ok(Term::Arith(var, Box::new(expr)))
            }
            TokenType::Variable | TokenType::Number if self.next_is_operator() => {
                let line = self.peek().line;
                let expr = self.parse_expression()?;
                match &expr {
                    Expr::Binary { op, .. } if op.is_comparison() => {
                        Ok(Term::Logic(Box::new(expr)))
                    }
                    _ => Err(ParseError::MalformedExpression { line }),
                }
            }
            TokenType::LeftParen => {
                self.advance();
                let group = self.parse_body()?;
                self.consume(TokenType::RightParen, "`)`")?;
                Ok(group)
            }
            _ => self.parse_term(),
        }
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let token = self.peek().clone();
        match token.token_type {
            TokenType::Number => {
                self.advance();
                Ok(Term::Number(token.number.unwrap_or_default()))
            }
            TokenType::Variable => {
                self.advance();
                Ok(Term::Var(self.scoped_variable(&token.lexeme)))
            }
            TokenType::Underscore => {
                self.advance();
                Ok(Term::Var(Var::fresh("_")))
            }
            TokenType::Atom => {
                self.advance();
                if self.matches(TokenType::LeftParen) {
                    let mut args = vec![self.parse_term()?];
                    while self.matches(TokenType::Comma) {
                        args.push(self.parse_term()?);
                    }
                    self.consume(TokenType::RightParen, "`)`")?;
                    Ok(Term::Compound(token.lexeme, args))
                } else {
                    Ok(Term::Atom(token.lexeme))
                }
            }
            TokenType::LeftBracket => {
                self.advance();
                self.parse_list()
            }
            TokenType::Eof => Err(ParseError::UnexpectedEof),
            _ => Err(self.unexpected("a term")),
        }
    }

    fn parse_list(&mut self) -> Result<Term, ParseError> {
        if self.matches(TokenType::RightBracket) {
            return Ok(Term::List(Vec::new()));
        }
        let mut items = vec![self.parse_term()?];
        while self.matches(TokenType::Comma) {
            items.push(self.parse_term()?);
        }
        if self.matches(TokenType::Bar) {
            let tail = Box::new(self.parse_term()?);
            self.consume(TokenType::RightBracket, "`]`")?;
            return Ok(Term::Partial(items, tail));
        }
        self.consume(TokenType::RightBracket, "`]`")?;
        Ok(Term::List(items))
    }

    // Expressions: equality < comparison < additive < multiplicative <
    // primary, every level right-associative.

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_comparison()?;
        let op = match self.peek().token_type {
            TokenType::EqualEqual => Op::Eq,
            TokenType::EqualSlash => Op::Ne,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_equality()?;
        Ok(binary(left, op, right))
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_addition()?;
        let op = match self.peek().token_type {
            TokenType::Greater => Op::Gt,
            TokenType::GreaterEqual => Op::Ge,
            TokenType::Less => Op::Lt,
            TokenType::EqualLess => Op::Le,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_comparison()?;
        Ok(binary(left, op, right))
    }

    fn parse_addition(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_multiplicative()?;
        let op = match self.peek().token_type {
            TokenType::Plus => Op::Add,
            TokenType::Minus => Op::Sub,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_addition()?;
        Ok(binary(left, op, right))
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_primary()?;
        let op = match self.peek().token_type {
            TokenType::Star => Op::Mul,
            TokenType::Slash => Op::Div,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_multiplicative()?;
        Ok(binary(left, op, right))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match token.token_type {
            TokenType::Number => {
                self.advance();
                Ok(Expr::Primary(Term::Number(token.number.unwrap_or_default())))
            }
            TokenType::Variable => {
                self.advance();
                Ok(Expr::Primary(Term::Var(self.scoped_variable(&token.lexeme))))
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenType::RightParen, "`)`")?;
                Ok(expr)
            }
            _ => Err(ParseError::MalformedExpression { line: token.line }),
        }
    }

    fn enter_clause_scope(&mut self) {
        self.scope.clear();
        self.order.clear();
    }

    fn scoped_variable(&mut self, name: &str) -> Var {
        if let Some(var) = self.scope.get(name) {
            return var.clone();
        }
        let var = Var::fresh(name);
        self.scope.insert(name.to_string(), var.clone());
        self.order.push(var.clone());
        var
    }

    fn finish_sentence(&mut self) -> Result<(), ParseError> {
        if self.check(TokenType::Dot) {
            self.advance();
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn next_is(&self, token_type: TokenType) -> bool {
        self.tokens
            .get(self.current + 1)
            .map(|token| token.token_type == token_type)
            .unwrap_or(false)
    }

    fn next_is_operator(&self) -> bool {
        self.tokens
            .get(self.current + 1)
            .map(|token| {
                matches!(
                    token.token_type,
                    TokenType::Plus
                        | TokenType::Minus
                        | TokenType::Star
                        | TokenType::Slash
                        | TokenType::EqualEqual
                        | TokenType::EqualSlash
                        | TokenType::EqualLess
                        | TokenType::Less
                        | TokenType::GreaterEqual
                        | TokenType::Greater
                )
            })
            .unwrap_or(false)
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn matches(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            return true;
        }
        false
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.check(TokenType::Eof) {
            self.current += 1;
        }
        token
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> Result<Token, ParseError> {
        if self.check(token_type) {
            return Ok(self.advance());
        }
        Err(self.unexpected(expected))
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::UnexpectedToken {
            line: token.line,
            expected: expected.to_string(),
            found: token.to_string(),
        }
    }
}

fn binary(left: Expr, op: Op, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
