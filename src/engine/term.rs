// src/engine/term.rs
//! The term algebra: atoms, numbers, variables, compounds, lists, the
//! arithmetic and comparison goals, and the control/builtin markers that
//! flow through the answer stream.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::bindings::{merge, Bindings};
use crate::engine::expression::{bind_expression, rename_expression, Expr};

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// A named placeholder. Identity (the `id`) is the unification key: two
/// textually identical variables in different clauses are distinct. The
/// name is kept for display and for the expression binder's by-name
/// lookup.
#[derive(Debug, Clone)]
pub struct Var {
    pub name: String,
    pub id: u64,
}

impl Var {
    /// Allocates a variable with a process-unique identity.
    pub fn fresh(name: &str) -> Self {
        Var {
            name: name.to_string(),
            id: NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Var {}

impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The various kinds of terms.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A constant symbol.
    Atom(String),
    /// A numeric constant.
    Number(f64),
    /// A variable.
    Var(Var),
    /// A functor with a fixed-arity argument list.
    Compound(String, Vec<Term>),
    /// A fully built list.
    List(Vec<Term>),
    /// A partial list `[H1, …, Hn | Tail]`; only the parser produces it.
    Partial(Vec<Term>, Box<Term>),
    /// An arithmetic binding goal `Var is Expr`.
    Arith(Var, Box<Expr>),
    /// A comparison goal.
    Logic(Box<Expr>),
    /// An ordered sequence of sub-goals.
    Conjunction(Vec<Term>),
    /// Neutral success.
    True,
    /// One-shot failure value threaded through the answer stream.
    False,
    /// Commit marker threaded through the answer stream.
    Cut,
    /// The `fail` goal.
    Fail,
    /// Output builtins.
    Write(Vec<Term>),
    Nl,
    Tab,
    /// Database builtins.
    Retract(Box<Term>),
    AssertA(Box<Term>),
    AssertZ(Box<Term>),
}

impl Term {
    /// The predicate name of an atom or compound term.
    pub fn functor(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            Term::Compound(functor, _) => Some(functor),
            _ => None,
        }
    }

    /// Arguments of a compound term; everything else has none.
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Compound(_, args) => args,
            _ => &[],
        }
    }

    /// Structural matching. Returns the bindings that make both terms
    /// syntactically equal, or `None` when they cannot be unified. There
    /// is no occurs-check.
    pub fn unify(&self, other: &Term) -> Option<Bindings> {
        match (self, other) {
            (Term::Var(a), Term::Var(b)) if a.id == b.id => Some(Bindings::new()),
            (Term::Var(a), _) => {
                let mut bindings = Bindings::new();
                bindings.insert(a.clone(), other.clone());
                Some(bindings)
            }
            (_, Term::Var(b)) => {
                let mut bindings = Bindings::new();
                bindings.insert(b.clone(), self.clone());
                Some(bindings)
            }
            (Term::Atom(a), Term::Atom(b)) => (a == b).then(Bindings::new),
            (Term::Number(a), Term::Number(b)) => (a == b).then(Bindings::new),
            (Term::Compound(f1, args1), Term::Compound(f2, args2)) => {
                if f1 != f2 || args1.len() != args2.len() {
                    return None;
                }
                unify_pairwise(args1, args2)
            }
            (Term::List(items1), Term::List(items2)) => {
                if items1.len() != items2.len() {
                    return None;
                }
                unify_pairwise(items1, items2)
            }
            (Term::Partial(heads, tail), Term::List(items))
            | (Term::List(items), Term::Partial(heads, tail)) => {
                unify_split(heads, tail, items)
            }
            (Term::Partial(heads1, tail1), Term::Partial(heads2, tail2)) => {
                if heads1.len() != heads2.len() {
                    return None;
                }
                let prefix = unify_pairwise(heads1, heads2)?;
                let suffix = tail1.unify(tail2)?;
                merge(&prefix, &suffix)
            }
            (Term::Conjunction(args1), Term::Conjunction(args2)) => {
                if args1.len() != args2.len() {
                    return None;
                }
                unify_pairwise(args1, args2)
            }
            // An arithmetic goal stands for its variable: unifying it
            // against a term binds the variable to that term.
            (Term::Arith(var, _), _) => {
                let mut bindings = Bindings::new();
                bindings.insert(var.clone(), other.clone());
                Some(bindings)
            }
            (_, Term::Arith(var, _)) => {
                let mut bindings = Bindings::new();
                bindings.insert(var.clone(), self.clone());
                Some(bindings)
            }
            // Goals that never carry substitutions.
            (Term::Logic(_), Term::Logic(_))
            | (Term::Logic(_), Term::True)
            | (Term::Logic(_), Term::False)
            | (Term::True, Term::Logic(_))
            | (Term::False, Term::Logic(_)) => Some(Bindings::new()),
            (Term::True, Term::True)
            | (Term::False, Term::False)
            | (Term::Cut, Term::Cut)
            | (Term::Fail, Term::Fail)
            | (Term::Nl, Term::Nl)
            | (Term::Tab, Term::Tab)
            | (Term::Write(_), Term::Write(_))
            | (Term::Retract(_), Term::Retract(_))
            | (Term::AssertA(_), Term::AssertA(_))
            | (Term::AssertZ(_), Term::AssertZ(_)) => Some(Bindings::new()),
            _ => None,
        }
    }

    /// Rewrites the term under a binding map. Variables chase their
    /// binding chain transitively; the result is a fresh term.
    pub fn substitute(&self, bindings: &Bindings) -> Term {
        match self {
            Term::Var(var) => match bindings.get(var) {
                Some(value) => value.substitute(bindings),
                None => self.clone(),
            },
            Term::Compound(functor, args) => {
                Term::Compound(functor.clone(), substitute_all(args, bindings))
            }
            Term::List(items) => Term::List(substitute_all(items, bindings)),
            Term::Partial(heads, tail) => Term::Partial(
                substitute_all(heads, bindings),
                Box::new(tail.substitute(bindings)),
            ),
            Term::Conjunction(args) => Term::Conjunction(substitute_all(args, bindings)),
            Term::Arith(var, expr) => {
                // Once the arithmetic's own variable has a value, the
                // goal collapses to that value.
                if let Some(value) = bindings.get(var) {
                    if !matches!(value, Term::Var(_)) {
                        return value.substitute(bindings);
                    }
                }
                let var = match bindings.get(var) {
                    Some(Term::Var(renamed)) => renamed.clone(),
                    _ => rebind_by_name(var, bindings),
                };
                Term::Arith(var, Box::new(bind_expression(expr, bindings)))
            }
            Term::Logic(expr) => Term::Logic(Box::new(bind_expression(expr, bindings))),
            Term::Write(args) => Term::Write(substitute_all(args, bindings)),
            Term::Retract(arg) => Term::Retract(Box::new(arg.substitute(bindings))),
            Term::AssertA(arg) => Term::AssertA(Box::new(arg.substitute(bindings))),
            Term::AssertZ(arg) => Term::AssertZ(Box::new(arg.substitute(bindings))),
            _ => self.clone(),
        }
    }

    /// Fresh instantiation: rewrites every variable through `map`,
    /// allocating a new identity per distinct old identity. Names are
    /// preserved so arithmetic head lookup and display keep working.
    pub fn rename(&self, map: &mut HashMap<u64, Var>) -> Term {
        match self {
            Term::Var(var) => Term::Var(renamed(var, map)),
            Term::Compound(functor, args) => {
                Term::Compound(functor.clone(), rename_all(args, map))
            }
            Term::List(items) => Term::List(rename_all(items, map)),
            Term::Partial(heads, tail) => {
                Term::Partial(rename_all(heads, map), Box::new(tail.rename(map)))
            }
            Term::Conjunction(args) => Term::Conjunction(rename_all(args, map)),
            Term::Arith(var, expr) => {
                Term::Arith(renamed(var, map), Box::new(rename_expression(expr, map)))
            }
            Term::Logic(expr) => Term::Logic(Box::new(rename_expression(expr, map))),
            Term::Write(args) => Term::Write(rename_all(args, map)),
            Term::Retract(arg) => Term::Retract(Box::new(arg.rename(map))),
            Term::AssertA(arg) => Term::AssertA(Box::new(arg.rename(map))),
            Term::AssertZ(arg) => Term::AssertZ(Box::new(arg.rename(map))),
            _ => self.clone(),
        }
    }
}

fn substitute_all(terms: &[Term], bindings: &Bindings) -> Vec<Term> {
    terms.iter().map(|term| term.substitute(bindings)).collect()
}

fn rename_all(terms: &[Term], map: &mut HashMap<u64, Var>) -> Vec<Term> {
    terms.iter().map(|term| term.rename(map)).collect()
}

pub(crate) fn renamed(var: &Var, map: &mut HashMap<u64, Var>) -> Var {
    map.entry(var.id)
        .or_insert_with(|| Var::fresh(&var.name))
        .clone()
}

fn unify_pairwise(left: &[Term], right: &[Term]) -> Option<Bindings> {
    let mut accumulated = Bindings::new();
    for (a, b) in left.iter().zip(right.iter()) {
        let bindings = a.unify(b)?;
        accumulated = merge(&accumulated, &bindings)?;
    }
    Some(accumulated)
}

/// Splits a list against a partial list: the prefix matches the heads
/// pairwise, the (possibly empty) suffix matches the tail.
fn unify_split(heads: &[Term], tail: &Term, items: &[Term]) -> Option<Bindings> {
    if items.len() < heads.len() {
        return None;
    }
    let prefix = unify_pairwise(heads, &items[..heads.len()])?;
    let suffix = tail.unify(&Term::List(items[heads.len()..].to_vec()))?;
    merge(&prefix, &suffix)
}

/// By-name fallback for the arithmetic variable: if some binding maps a
/// variable with the same name to another variable, adopt that one.
fn rebind_by_name(var: &Var, bindings: &Bindings) -> Var {
    for (key, value) in bindings {
        if key.name == var.name {
            if let Term::Var(bound) = value {
                return bound.clone();
            }
        }
    }
    var.clone()
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => write!(f, "{}", name),
            Term::Number(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Term::Var(var) => write!(f, "{}", var),
            Term::Compound(functor, args) => {
                write!(f, "{}(", functor)?;
                write_joined(f, args)?;
                write!(f, ")")
            }
            Term::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Term::Partial(heads, tail) => {
                write!(f, "[")?;
                write_joined(f, heads)?;
                write!(f, " | {}]", tail)
            }
            Term::Conjunction(args) => write_joined(f, args),
            Term::Arith(var, expr) => write!(f, "{} is {}", var, expr),
            Term::Logic(expr) => write!(f, "{}", expr),
            Term::True => write!(f, "true"),
            Term::False => write!(f, "false"),
            Term::Cut => write!(f, "!"),
            Term::Fail => write!(f, "fail"),
            Term::Write(args) => {
                write!(f, "write(")?;
                write_joined(f, args)?;
                write!(f, ")")
            }
            Term::Nl => write!(f, "nl"),
            Term::Tab => write!(f, "tab"),
            Term::Retract(arg) => write!(f, "retract({})", arg),
            Term::AssertA(arg) => write!(f, "asserta({})", arg),
            Term::AssertZ(arg) => write!(f, "assertz({})", arg),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", term)?;
    }
    Ok(())
}
