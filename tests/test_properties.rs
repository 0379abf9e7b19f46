#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use sprolog::engine::bindings::{merge, Bindings};
    use sprolog::engine::term::{Term, Var};

    quickcheck! {
        fn prop_substitute_is_idempotent(value: i32, name: String) -> bool {
            let x = Var::fresh("X");
            let term = Term::Compound(
                "f".to_string(),
                vec![
                    Term::Var(x.clone()),
                    Term::Number(value as f64),
                    Term::Atom(name.clone()),
                ],
            );
            let mut bindings = Bindings::new();
            bindings.insert(x, Term::Atom(name));

            let once = term.substitute(&bindings);
            once == once.substitute(&bindings)
        }
    }

    quickcheck! {
        fn prop_substitute_is_idempotent_through_chains(value: i32) -> bool {
            let x = Var::fresh("X");
            let y = Var::fresh("Y");
            let term = Term::List(vec![Term::Var(x.clone()), Term::Var(y.clone())]);
            let mut bindings = Bindings::new();
            bindings.insert(x, Term::Var(y.clone()));
            bindings.insert(y, Term::Number(value as f64));

            let once = term.substitute(&bindings);
            once == once.substitute(&bindings)
        }
    }

    quickcheck! {
        fn prop_unifier_makes_terms_equal(value: i32, name: String) -> bool {
            let x = Var::fresh("X");
            let y = Var::fresh("Y");
            let left = Term::Compound(
                "pair".to_string(),
                vec![Term::Var(x), Term::Number(value as f64)],
            );
            let right = Term::Compound(
                "pair".to_string(),
                vec![Term::Atom(name), Term::Var(y)],
            );

            match left.unify(&right) {
                Some(unifier) => {
                    left.substitute(&unifier) == right.substitute(&unifier)
                }
                None => false,
            }
        }
    }

    quickcheck! {
        fn prop_ground_unification_is_equality(a: i32, b: i32) -> bool {
            let left = Term::Number(a as f64);
            let right = Term::Number(b as f64);
            left.unify(&right).is_some() == (a == b)
        }
    }

    quickcheck! {
        fn prop_merge_of_disjoint_maps_is_their_union(a: i32, b: i32) -> bool {
            let x = Var::fresh("X");
            let y = Var::fresh("Y");
            let mut left = Bindings::new();
            left.insert(x.clone(), Term::Number(a as f64));
            let mut right = Bindings::new();
            right.insert(y.clone(), Term::Number(b as f64));

            match merge(&left, &right) {
                Some(merged) => {
                    merged.len() == 2
                        && merged.get(&x) == Some(&Term::Number(a as f64))
                        && merged.get(&y) == Some(&Term::Number(b as f64))
                }
                None => false,
            }
        }
    }

    quickcheck! {
        fn prop_merge_rejects_conflicting_ground_values(a: i32, b: i32) -> bool {
            let x = Var::fresh("X");
            let mut left = Bindings::new();
            left.insert(x.clone(), Term::Number(a as f64));
            let mut right = Bindings::new();
            right.insert(x, Term::Number(b as f64));

            merge(&left, &right).is_some() == (a == b)
        }
    }

    quickcheck! {
        fn prop_merge_never_mutates_its_inputs(a: i32, b: i32) -> bool {
            let x = Var::fresh("X");
            let mut left = Bindings::new();
            left.insert(x.clone(), Term::Number(a as f64));
            let mut right = Bindings::new();
            right.insert(x, Term::Number(b as f64));
            let left_before = left.clone();
            let right_before = right.clone();

            let _ = merge(&left, &right);
            left == left_before && right == right_before
        }
    }
}
