#[cfg(test)]
mod tests {
    use sprolog::engine::database::Rule;
    use sprolog::engine::runtime::Runtime;
    use sprolog::engine::term::Term;
    use sprolog::errors::InterpreterError;
    use sprolog::syntax::parser::Parser;
    use sprolog::syntax::scanner::Scanner;

    fn load(source: &str) -> Runtime {
        let tokens = Scanner::new(source).tokenize().expect("scan failed");
        let rules = Parser::new(tokens).parse_rules().expect("parse failed");
        Runtime::new(rules)
    }

    fn parse_query(source: &str) -> Rule {
        let tokens = Scanner::new(source).tokenize().expect("scan failed");
        Parser::new(tokens).parse_query().expect("parse failed")
    }

    fn first_binding(runtime: &Runtime, source: &str, name: &str) -> Option<String> {
        let query = parse_query(source);
        for answer in runtime.run_query(&query) {
            let solution = answer.expect("query failed");
            if matches!(solution, Term::False | Term::Cut) {
                continue;
            }
            let bindings = query.head.unify(&solution)?;
            return bindings
                .iter()
                .find(|(var, _)| var.name == name)
                .map(|(_, value)| value.to_string());
        }
        None
    }

    #[test]
    fn test_precedence_multiplication_before_addition() {
        let runtime = load("test(Y) :- Y is 5 + 2 * 3 - 1.");
        assert_eq!(first_binding(&runtime, "test(Y).", "Y").as_deref(), Some("10.0"));
    }

    #[test]
    fn test_parenthesized_grouping() {
        let runtime = load("test2(Z) :- Z is (5 + 2) * (3 - 1).");
        assert_eq!(first_binding(&runtime, "test2(Z).", "Z").as_deref(), Some("14.0"));
    }

    #[test]
    fn test_celsius_to_fahrenheit() {
        let runtime = load("c_to_f(C, F) :- F is C * 9 / 5 + 32.");
        assert_eq!(
            first_binding(&runtime, "c_to_f(100, X).", "X").as_deref(),
            Some("212.0")
        );
        assert_eq!(
            first_binding(&runtime, "c_to_f(0, X).", "X").as_deref(),
            Some("32.0")
        );
    }

    #[test]
    fn test_fractional_result_display() {
        let runtime = load("half(X, Y) :- Y is X / 2.");
        assert_eq!(first_binding(&runtime, "half(5, Y).", "Y").as_deref(), Some("2.5"));
    }

    #[test]
    fn test_arithmetic_inside_conjunction() {
        let runtime = load("area(W, H, A) :- A is W * H, write(A).");
        let query = parse_query("area(3, 4, A).");
        let answers: Vec<Term> = runtime
            .run_query(&query)
            .map(|answer| answer.expect("query failed"))
            .filter(|term| !matches!(term, Term::False | Term::Cut))
            .collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(runtime.stream_read(), "12.0");
    }

    #[test]
    fn test_comparison_selects_clause() {
        let runtime = load(
            "max(X, Y, X) :- X >= Y.
             max(X, Y, Y) :- X < Y.",
        );
        assert_eq!(
            first_binding(&runtime, "max(3, 4, M).", "M").as_deref(),
            Some("4.0")
        );
        assert_eq!(
            first_binding(&runtime, "max(7, 4, M).", "M").as_deref(),
            Some("7.0")
        );
    }

    #[test]
    fn test_comparison_guards_conjunction() {
        let runtime = load(
            "big(X) :- X is 2 + 3, X > 4.
             small(X) :- X is 2 + 3, X > 7.",
        );
        assert_eq!(first_binding(&runtime, "big(X).", "X").as_deref(), Some("5.0"));
        assert_eq!(first_binding(&runtime, "small(X).", "X"), None);
    }

    #[test]
    fn test_not_equal_comparison() {
        let runtime = load("different(X, Y) :- X =/ Y.");
        let succeeding = parse_query("different(1, 2).");
        let count = runtime
            .run_query(&succeeding)
            .filter(|answer| !matches!(answer, Ok(Term::False) | Ok(Term::Cut)))
            .count();
        assert_eq!(count, 1);

        let failing = parse_query("different(2, 2).");
        let count = runtime
            .run_query(&failing)
            .filter(|answer| !matches!(answer, Ok(Term::False) | Ok(Term::Cut)))
            .count();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let runtime = load("bad(X) :- X is 1 / 0.");
        let query = parse_query("bad(X).");
        let mut answers = runtime.run_query(&query);
        match answers.next() {
            Some(Err(InterpreterError::DivisionByZero)) => {}
            other => panic!("expected a division-by-zero error, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_operand_is_an_error() {
        let runtime = load("bad(X, Y) :- Y is X + 1.");
        let query = parse_query("bad(_, Y).");
        let mut answers = runtime.run_query(&query);
        match answers.next() {
            Some(Err(InterpreterError::NotANumber(_))) => {}
            other => panic!("expected a not-a-number error, got {:?}", other),
        }
    }

    #[test]
    fn test_direct_arithmetic_query() {
        let runtime = load("unused.");
        assert_eq!(
            first_binding(&runtime, "X is 3 + 4.", "X").as_deref(),
            Some("7.0")
        );
    }
}
