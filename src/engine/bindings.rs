// src/engine/bindings.rs
//! The variable binding map and its conflict-aware merge.

use std::collections::HashMap;

use crate::engine::term::{Term, Var};

/// A mapping from variable identity to term, representing a partial
/// substitution. Treated as a persistent value: merging never modifies
/// its inputs.
pub type Bindings = HashMap<Var, Term>;

/// Union with consistency check. For every binding in `right`: insert it
/// when the variable is unbound in `left`; otherwise the two values must
/// unify, and the unifier's own bindings are absorbed into the result.
/// Any conflict makes the whole merge fail.
pub fn merge(left: &Bindings, right: &Bindings) -> Option<Bindings> {
    let mut merged = left.clone();
    for (variable, value) in right {
        let existing = merged.get(variable).cloned();
        match existing {
            Some(other) => {
                let consistent = other.unify(value)?;
                merged.extend(consistent);
            }
            None => {
                merged.insert(variable.clone(), value.clone());
            }
        }
    }
    Some(merged)
}
