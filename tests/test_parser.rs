#[cfg(test)]
mod tests {
    use sprolog::engine::expression::{evaluate_math, Expr, Op};
    use sprolog::engine::term::Term;
    use sprolog::errors::ParseError;
    use sprolog::syntax::parser::Parser;
    use sprolog::syntax::scanner::Scanner;

    fn parser(source: &str) -> Parser {
        Parser::new(Scanner::new(source).tokenize().expect("scan failed"))
    }

    #[test]
    fn test_fact() {
        let rules = parser("location(computer, office).")
            .parse_rules()
            .expect("parse failed");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].head.to_string(), "location(computer, office)");
        assert_eq!(rules[0].body, Term::True);
    }

    #[test]
    fn test_atom_fact() {
        let rules = parser("sunny.").parse_rules().expect("parse failed");
        assert_eq!(rules[0].head, Term::Atom("sunny".to_string()));
    }

    #[test]
    fn test_rule_with_conjunction_body() {
        let rules = parser("sibling(X, Y) :- parent(Z, X), parent(Z, Y).")
            .parse_rules()
            .expect("parse failed");
        match &rules[0].body {
            Term::Conjunction(goals) => assert_eq!(goals.len(), 2),
            other => panic!("expected a conjunction body, got {}", other),
        }
    }

    #[test]
    fn test_single_goal_body_is_not_wrapped() {
        let rules = parser("p(X) :- q(X).").parse_rules().expect("parse failed");
        assert!(matches!(rules[0].body, Term::Compound(..)));
    }

    #[test]
    fn test_variables_share_identity_within_a_clause() {
        let rules = parser("same(X, X).").parse_rules().expect("parse failed");
        let args = rules[0].head.args();
        assert_eq!(args[0], args[1]);
    }

    #[test]
    fn test_variables_differ_across_clauses() {
        let rules = parser("p(X). q(X).").parse_rules().expect("parse failed");
        assert_ne!(rules[0].head.args()[0], rules[1].head.args()[0]);
    }

    #[test]
    fn test_anonymous_variable_is_fresh_per_occurrence() {
        let rules = parser("pair(_, _).").parse_rules().expect("parse failed");
        let args = rules[0].head.args();
        assert_ne!(args[0], args[1]);
    }

    #[test]
    fn test_query_collects_free_variables_in_order() {
        let query = parser("sibling(X, Y), parent(Y, Z).")
            .parse_query()
            .expect("parse failed");
        assert_eq!(query.head.to_string(), "##(X, Y, Z)");
    }

    #[test]
    fn test_query_without_variables_has_an_empty_head() {
        let query = parser("sunny.").parse_query().expect("parse failed");
        assert!(query.head.args().is_empty());
    }

    #[test]
    fn test_list_terms() {
        let rules = parser("rgb([red, green, blue]).")
            .parse_rules()
            .expect("parse failed");
        assert_eq!(rules[0].head.args()[0].to_string(), "[red, green, blue]");
    }

    #[test]
    fn test_partial_list_terms() {
        let rules = parser("split([H | T]).").parse_rules().expect("parse failed");
        match &rules[0].head.args()[0] {
            Term::Partial(heads, tail) => {
                assert_eq!(heads.len(), 1);
                assert!(matches!(**tail, Term::Var(_)));
            }
            other => panic!("expected a partial list, got {}", other),
        }
    }

    #[test]
    fn test_arithmetic_body_and_precedence() {
        let rules = parser("test(Y) :- Y is 5 + 2 * 3 - 1.")
            .parse_rules()
            .expect("parse failed");
        match &rules[0].body {
            Term::Arith(var, expr) => {
                assert_eq!(var.name, "Y");
                assert_eq!(evaluate_math(expr).unwrap(), 10.0);
            }
            other => panic!("expected an arithmetic body, got {}", other),
        }
    }

    #[test]
    fn test_parenthesized_expression_grouping() {
        let rules = parser("test(Z) :- Z is (5 + 2) * (3 - 1).")
            .parse_rules()
            .expect("parse failed");
        match &rules[0].body {
            Term::Arith(_, expr) => assert_eq!(evaluate_math(expr).unwrap(), 14.0),
            other => panic!("expected an arithmetic body, got {}", other),
        }
    }

    #[test]
    fn test_comparison_goal() {
        let rules = parser("bigger(X, Y) :- X > Y.")
            .parse_rules()
            .expect("parse failed");
        match &rules[0].body {
            Term::Logic(expr) => match expr.as_ref() {
                Expr::Binary { op, .. } => assert_eq!(*op, Op::Gt),
                other => panic!("expected a binary comparison, got {:?}", other),
            },
            other => panic!("expected a comparison body, got {}", other),
        }
    }

    #[test]
    fn test_builtin_goals() {
        let rules = parser("act(X) :- write(X), tab, nl, retract(f(X)), asserta(g(X)), assertz(h(X)), !, fail.")
            .parse_rules()
            .expect("parse failed");
        match &rules[0].body {
            Term::Conjunction(goals) => {
                assert!(matches!(goals[0], Term::Write(_)));
                assert!(matches!(goals[1], Term::Tab));
                assert!(matches!(goals[2], Term::Nl));
                assert!(matches!(goals[3], Term::Retract(_)));
                assert!(matches!(goals[4], Term::AssertA(_)));
                assert!(matches!(goals[5], Term::AssertZ(_)));
                assert!(matches!(goals[6], Term::Cut));
                assert!(matches!(goals[7], Term::Fail));
            }
            other => panic!("expected a conjunction body, got {}", other),
        }
    }

    #[test]
    fn test_parenthesized_goal_group_nests() {
        let rules = parser("p(X) :- (q(X), r(X)), s(X).")
            .parse_rules()
            .expect("parse failed");
        match &rules[0].body {
            Term::Conjunction(goals) => {
                assert_eq!(goals.len(), 2);
                assert!(matches!(goals[0], Term::Conjunction(_)));
            }
            other => panic!("expected a conjunction body, got {}", other),
        }
    }

    #[test]
    fn test_number_as_clause_head_is_rejected() {
        match parser("3.").parse_rules() {
            Err(ParseError::InvalidClauseHead { .. }) => {}
            other => panic!("expected an invalid clause head error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_colon_minus_is_rejected() {
        match parser("p(X) q(X).").parse_rules() {
            Err(ParseError::UnexpectedToken { .. }) => {}
            other => panic!("expected an unexpected token error, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_without_comparison_goal_is_rejected() {
        match parser("p(X) :- X + 1.").parse_rules() {
            Err(ParseError::MalformedExpression { .. }) => {}
            other => panic!("expected a malformed expression error, got {:?}", other),
        }
    }
}
