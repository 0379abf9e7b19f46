// src/errors.rs
//! Error types for the scanner, the parser, and the interpreter.
//!
//! Unification failure is deliberately NOT represented here: a failed
//! match is ordinary control flow (an `Option::None`) and triggers
//! backtracking instead of surfacing as an error.

use thiserror::Error;

/// Errors produced while turning source text into tokens.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("line {line}: unexpected character `{character}`")]
    UnexpectedCharacter { line: usize, character: char },
    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },
    #[error("line {line}: unterminated comment")]
    UnterminatedComment { line: usize },
    #[error("line {line}: `{text}` is not a number")]
    BadNumber { line: usize, text: String },
}

/// Errors produced while turning tokens into clauses and queries.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected} but found `{found}`")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },
    #[error("line {line}: a clause head must be an atom or a compound term")]
    InvalidClauseHead { line: usize },
    #[error("line {line}: malformed expression")]
    MalformedExpression { line: usize },
    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Errors raised while evaluating arithmetic and comparison expressions
/// during resolution. These terminate the current query but never the
/// runtime; side effects already performed are not rolled back.
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("operator `{0}` is not valid in this expression")]
    InvalidOperator(String),
    #[error("`{0}` is not a comparison")]
    NotAComparison(String),
}
