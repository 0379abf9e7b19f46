// src/engine/database.rs
//! The ordered clause database and its mutation operations.

use std::fmt;

use log::debug;

use crate::engine::term::Term;

/// A clause: a fact is a rule whose body is `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub head: Term,
    pub body: Term,
}

impl Rule {
    pub fn fact(head: Term) -> Self {
        Rule {
            head,
            body: Term::True,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body {
            Term::True => write!(f, "{}.", self.head),
            _ => write!(f, "{} :- {}.", self.head, self.body),
        }
    }
}

/// An ordered sequence of clauses. Insertion keeps clauses grouped by
/// head predicate name so `asserta`/`assertz` land at the expected edge
/// of their predicate.
#[derive(Debug, Default)]
pub struct Database {
    rules: Vec<Rule>,
}

impl Database {
    pub fn new(rules: Vec<Rule>) -> Self {
        Database { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// A shallow copy of the current clause list. Resolution iterates
    /// snapshots so in-proof mutations never invalidate an outer goal's
    /// cursor.
    pub fn snapshot(&self) -> Vec<Rule> {
        self.rules.clone()
    }

    /// Places the clause before the first existing clause with the same
    /// head predicate name, or at the end when there is none (`asserta`).
    pub fn insert_left(&mut self, entry: Rule) {
        debug!("asserta {}", entry);
        let position = self
            .rules
            .iter()
            .position(|rule| same_functor(&rule.head, &entry.head));
        match position {
            Some(index) => self.rules.insert(index, entry),
            None => self.rules.push(entry),
        }
    }

    /// Places the clause after the last existing clause with the same
    /// head predicate name, or at the end when there is none (`assertz`).
    pub fn insert_right(&mut self, entry: Rule) {
        debug!("assertz {}", entry);
        let position = self
            .rules
            .iter()
            .rposition(|rule| same_functor(&rule.head, &entry.head));
        match position {
            Some(index) => self.rules.insert(index + 1, entry),
            None => self.rules.push(entry),
        }
    }

    /// Removes the first clause whose head matches the target at the
    /// surface level: same predicate name, same arity, and pairwise
    /// surface-equal arguments. A missing target is a silent no-op.
    pub fn retract(&mut self, target: &Term) {
        let position = self
            .rules
            .iter()
            .position(|rule| surface_matches(&rule.head, target));
        if let Some(index) = position {
            debug!("retract {}", self.rules[index]);
            self.rules.remove(index);
        }
    }
}

fn same_functor(head: &Term, other: &Term) -> bool {
    match (head.functor(), other.functor()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn surface_matches(head: &Term, target: &Term) -> bool {
    if !same_functor(head, target) || head.args().len() != target.args().len() {
        return false;
    }
    head.args()
        .iter()
        .zip(target.args().iter())
        .all(|(a, b)| surface_eq(a, b))
}

/// Shallow argument equality: atoms and compounds by predicate name
/// only, numbers by value, variables by name; anything else does not
/// match.
fn surface_eq(a: &Term, b: &Term) -> bool {
    match (a, b) {
        (Term::Atom(x), Term::Atom(y)) => x == y,
        (Term::Atom(x), Term::Compound(y, _)) | (Term::Compound(x, _), Term::Atom(y)) => x == y,
        (Term::Compound(x, _), Term::Compound(y, _)) => x == y,
        (Term::Number(x), Term::Number(y)) => x == y,
        (Term::Var(x), Term::Var(y)) => x.name == y.name,
        _ => false,
    }
}
