// src/engine/expression.rs
//! Arithmetic and comparison expression trees and the three walks over
//! them: numeric evaluation, truth evaluation, and variable binding.

use std::collections::HashMap;
use std::fmt;

use crate::engine::bindings::Bindings;
use crate::engine::term::{renamed, Term, Var};
use crate::errors::InterpreterError;

/// Binary operators, arithmetic and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Le,
    Lt,
    Ge,
    Gt,
}

impl Op {
    pub fn is_comparison(self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Le | Op::Lt | Op::Ge | Op::Gt)
    }

    fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Eq => "==",
            Op::Ne => "=/",
            Op::Le => "=<",
            Op::Lt => "<",
            Op::Ge => ">=",
            Op::Gt => ">",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An expression tree over numbers and variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        op: Op,
        right: Box<Expr>,
    },
    Primary(Term),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Primary(term) => write!(f, "{}", term),
        }
    }
}

/// Numeric evaluation. Only `Number` leaves are valid; comparison
/// operators are rejected in numeric position.
pub fn evaluate_math(expr: &Expr) -> Result<f64, InterpreterError> {
    match expr {
        Expr::Primary(Term::Number(value)) => Ok(*value),
        Expr::Primary(term) => Err(InterpreterError::NotANumber(term.to_string())),
        Expr::Binary { left, op, right } => {
            let left = evaluate_math(left)?;
            let right = evaluate_math(right)?;
            match op {
                Op::Add => Ok(left + right),
                Op::Sub => Ok(left - right),
                Op::Mul => Ok(left * right),
                Op::Div => {
                    if right == 0.0 {
                        Err(InterpreterError::DivisionByZero)
                    } else {
                        Ok(left / right)
                    }
                }
                _ => Err(InterpreterError::InvalidOperator(op.to_string())),
            }
        }
    }
}

/// Truth evaluation: a comparison over numerically evaluated operands.
pub fn evaluate_logic(expr: &Expr) -> Result<bool, InterpreterError> {
    match expr {
        Expr::Binary { left, op, right } if op.is_comparison() => {
            let left = evaluate_math(left)?;
            let right = evaluate_math(right)?;
            Ok(match op {
                Op::Eq => left == right,
                Op::Ne => left != right,
                Op::Le => left <= right,
                Op::Lt => left < right,
                Op::Ge => left >= right,
                Op::Gt => left > right,
                _ => unreachable!(),
            })
        }
        Expr::Binary { op, .. } => Err(InterpreterError::InvalidOperator(op.to_string())),
        Expr::Primary(term) => Err(InterpreterError::NotAComparison(term.to_string())),
    }
}

/// Rewrites variable leaves under the current bindings, by identity
/// first and by name as a fallback. The name-based lookup is deliberate:
/// expression variables reference clause variables that renaming may
/// have replaced.
pub fn bind_expression(expr: &Expr, bindings: &Bindings) -> Expr {
    match expr {
        Expr::Binary { left, op, right } => Expr::Binary {
            left: Box::new(bind_expression(left, bindings)),
            op: *op,
            right: Box::new(bind_expression(right, bindings)),
        },
        Expr::Primary(Term::Var(var)) => {
            if let Some(value) = bindings.get(var) {
                return Expr::Primary(value.substitute(bindings));
            }
            for (key, value) in bindings {
                if key.name == var.name {
                    return Expr::Primary(value.substitute(bindings));
                }
            }
            expr.clone()
        }
        Expr::Primary(_) => expr.clone(),
    }
}

/// Fresh-instantiation support: rewrites variable leaves through the
/// clause's rename map.
pub fn rename_expression(expr: &Expr, map: &mut HashMap<u64, Var>) -> Expr {
    match expr {
        Expr::Binary { left, op, right } => Expr::Binary {
            left: Box::new(rename_expression(left, map)),
            op: *op,
            right: Box::new(rename_expression(right, map)),
        },
        Expr::Primary(Term::Var(var)) => Expr::Primary(Term::Var(renamed(var, map))),
        Expr::Primary(_) => expr.clone(),
    }
}
