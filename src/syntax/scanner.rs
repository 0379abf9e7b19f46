// src/syntax/scanner.rs
//! Character-level scanner turning source text into tokens.

use crate::errors::ScanError;
use crate::syntax::token::{Token, TokenType};

pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ScanError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens
            .push(Token::new(TokenType::Eof, "", None, self.line));
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), ScanError> {
        let c = self.advance();
        match c {
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '%' => {
                while self.peek() != '\n' && !self.is_at_end() {
                    self.advance();
                }
            }
            '/' if self.matches('*') => self.block_comment()?,
            '\'' => self.string_literal()?,
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            '|' => self.add_token(TokenType::Bar),
            '!' => self.add_token(TokenType::Cut),
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '*' => self.add_token(TokenType::Star),
            '/' => self.add_token(TokenType::Slash),
            '+' => self.add_token(TokenType::Plus),
            '-' if self.peek().is_ascii_digit() => self.number()?,
            '-' => self.add_token(TokenType::Minus),
            '=' if self.matches('=') => self.add_token(TokenType::EqualEqual),
            '=' if self.matches('/') => self.add_token(TokenType::EqualSlash),
            '=' if self.matches('<') => self.add_token(TokenType::EqualLess),
            '<' => self.add_token(TokenType::Less),
            '>' if self.matches('=') => self.add_token(TokenType::GreaterEqual),
            '>' => self.add_token(TokenType::Greater),
            ':' if self.matches('-') => self.add_token(TokenType::ColonMinus),
            '.' => self.add_token(TokenType::Dot),
            ',' => self.add_token(TokenType::Comma),
            '_' => {
                if is_alphanumeric(self.peek()) {
                    self.variable();
                } else {
                    self.add_token(TokenType::Underscore);
                }
            }
            c if c.is_ascii_lowercase() => self.atom(),
            c if c.is_ascii_uppercase() => self.variable(),
            c if c.is_ascii_digit() => self.number()?,
            c => {
                return Err(ScanError::UnexpectedCharacter {
                    line: self.line,
                    character: c,
                })
            }
        }
        Ok(())
    }

    fn block_comment(&mut self) -> Result<(), ScanError> {
        loop {
            if self.is_at_end() {
                return Err(ScanError::UnterminatedComment { line: self.line });
            }
            let c = self.advance();
            if c == '\n' {
                self.line += 1;
            }
            if c == '*' && self.matches('/') {
                return Ok(());
            }
        }
    }

    fn string_literal(&mut self) -> Result<(), ScanError> {
        while self.peek() != '\'' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }
        if self.is_at_end() {
            return Err(ScanError::UnterminatedString { line: self.line });
        }
        self.advance();
        let literal: String = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect();
        self.tokens
            .push(Token::new(TokenType::Atom, &literal, None, self.line));
        Ok(())
    }

    fn atom(&mut self) {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }
        let token_type = keyword(&self.lexeme());
        self.add_token(token_type);
    }

    fn variable(&mut self) {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }
        self.add_token(TokenType::Variable);
    }

    fn number(&mut self) -> Result<(), ScanError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text = self.lexeme();
        let value = text.parse::<f64>().map_err(|_| ScanError::BadNumber {
            line: self.line,
            text: text.clone(),
        })?;
        self.tokens
            .push(Token::new(TokenType::Number, &text, Some(value), self.line));
        Ok(())
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, token_type: TokenType) {
        let lexeme = self.lexeme();
        self.tokens
            .push(Token::new(token_type, &lexeme, None, self.line));
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        self.current += 1;
        self.source[self.current - 1]
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }
}

fn is_alphanumeric(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword(lexeme: &str) -> TokenType {
    match lexeme {
        "fail" => TokenType::Fail,
        "write" => TokenType::Write,
        "nl" => TokenType::Nl,
        "tab" => TokenType::Tab,
        "is" => TokenType::Is,
        "retract" => TokenType::Retract,
        "asserta" => TokenType::AssertA,
        "assertz" => TokenType::AssertZ,
        _ => TokenType::Atom,
    }
}
