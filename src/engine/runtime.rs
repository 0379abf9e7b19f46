// src/engine/runtime.rs
//! The resolver: goal-directed SLD search over the rule database,
//! producing a lazy sequence of answers.
//!
//! Answers are pulled one at a time; suspension happens naturally
//! between producing one answer and starting work on the next. The
//! `False` and `Cut` sentinels travel through the answer stream: `False`
//! prunes the alternative that produced it, `Cut` commits the current
//! predicate to the choices made so far. Every [`Runtime::execute`]
//! boundary is a cut barrier.

use std::cell::RefCell;
use std::collections::HashMap;

use log::debug;

use crate::engine::bindings::{merge, Bindings};
use crate::engine::database::{Database, Rule};
use crate::engine::expression::{evaluate_logic, evaluate_math};
use crate::engine::stream::OutputStream;
use crate::engine::term::{Term, Var};
use crate::errors::InterpreterError;

/// A lazily produced stream of answers. Evaluation faults ride the
/// stream as `Err` items and end it.
pub type Answers<'a> = Box<dyn Iterator<Item = Result<Term, InterpreterError>> + 'a>;

/// A host-provided generator predicate: each invocation returns a fresh
/// iterator of argument tuples.
pub type Generator = Box<dyn Fn() -> Box<dyn Iterator<Item = Vec<Term>>>>;

/// The interpreter runtime: the rule database, the output stream, and
/// any registered generator predicates. Single-threaded; the interior
/// mutability lets `asserta`/`assertz`/`retract` run mid-proof while
/// outer goals keep iterating their own snapshots.
pub struct Runtime {
    database: RefCell<Database>,
    stream: RefCell<OutputStream>,
    functions: RefCell<HashMap<(String, usize), Generator>>,
}

impl Runtime {
    pub fn new(rules: Vec<Rule>) -> Self {
        Runtime {
            database: RefCell::new(Database::new(rules)),
            stream: RefCell::new(OutputStream::new()),
            functions: RefCell::new(HashMap::new()),
        }
    }

    /// The current clause list (a copy), mostly useful to tests and
    /// tooling.
    pub fn rules(&self) -> Vec<Rule> {
        self.database.borrow().snapshot()
    }

    pub fn stream_write(&self, text: &str) {
        self.stream.borrow_mut().write(text);
    }

    /// Drains the output produced since the previous read.
    pub fn stream_read(&self) -> String {
        self.stream.borrow_mut().read()
    }

    pub fn reset_stream(&self) {
        self.stream.borrow_mut().reset();
    }

    pub fn insert_rule_left(&self, entry: Rule) {
        self.database.borrow_mut().insert_left(entry);
    }

    pub fn insert_rule_right(&self, entry: Rule) {
        self.database.borrow_mut().insert_right(entry);
    }

    pub fn remove_rule(&self, target: &Term) {
        self.database.borrow_mut().retract(target);
    }

    /// Installs a host generator for goals with the given predicate name
    /// and arity. Each yielded tuple is packed into a fresh compound
    /// term and matched against the caller's goal like any other clause.
    pub fn register_function<F, I>(&self, generator: F, name: &str, arity: usize)
    where
        F: Fn() -> I + 'static,
        I: Iterator<Item = Vec<Term>> + 'static,
    {
        self.functions.borrow_mut().insert(
            (name.to_string(), arity),
            Box::new(move || Box::new(generator())),
        );
    }

    /// Resolves a plain goal against the database. An arithmetic goal
    /// produces a single answer: its evaluation.
    pub fn execute<'a>(&'a self, goal: &Term) -> Answers<'a> {
        debug!("execute {}", goal);
        if let Term::Arith(_, expr) = goal {
            let result = evaluate_math(expr).map(Term::Number);
            return Box::new(std::iter::once(result));
        }
        Box::new(Resolver::new(self, goal.clone(), self.all_rules(None)))
    }

    /// Resolves a query rule (the synthetic `##` head over the query's
    /// free variables): the query itself joins the snapshot so the
    /// resolver treats it uniformly.
    pub fn run_query<'a>(&'a self, query: &Rule) -> Answers<'a> {
        debug!("query {}", query);
        Box::new(Resolver::new(
            self,
            query.head.clone(),
            self.all_rules(Some(query)),
        ))
    }

    /// Produces the answers of a goal according to its kind; plain terms
    /// delegate to the resolver.
    pub fn solve<'a>(&'a self, goal: &Term) -> Answers<'a> {
        match goal {
            Term::True | Term::Cut => Box::new(std::iter::once(Ok(goal.clone()))),
            Term::Fail | Term::False => Box::new(std::iter::once(Ok(Term::False))),
            Term::Logic(expr) => {
                let result = evaluate_logic(expr)
                    .map(|truth| if truth { Term::True } else { Term::False });
                Box::new(std::iter::once(result))
            }
            Term::Conjunction(goals) => {
                Box::new(ConjunctionIter::new(self, goal.clone(), goals.clone()))
            }
            Term::Write(_) | Term::Nl | Term::Tab => {
                let goal = goal.clone();
                Box::new(std::iter::once_with(move || {
                    self.display(&goal);
                    Ok(goal)
                }))
            }
            Term::Retract(_) | Term::AssertA(_) | Term::AssertZ(_) => {
                let goal = goal.clone();
                Box::new(std::iter::once_with(move || {
                    self.apply_database_op(&goal);
                    Ok(goal)
                }))
            }
            _ => self.execute(goal),
        }
    }

    fn all_rules(&self, query: Option<&Rule>) -> Vec<Rule> {
        let mut rules = self.database.borrow().snapshot();
        if let Some(query) = query {
            rules.push(query.clone());
        }
        rules
    }

    fn display(&self, goal: &Term) {
        let mut stream = self.stream.borrow_mut();
        match goal {
            Term::Write(args) => {
                for arg in args {
                    stream.write(&arg.to_string());
                }
            }
            Term::Nl => stream.write("\n"),
            Term::Tab => stream.write("\t"),
            _ => {}
        }
    }

    /// Applies a database builtin. The argument is grounded through a
    /// one-answer query when one exists, so `retract(here(_))` removes
    /// the fact the pattern currently matches.
    fn apply_database_op(&self, op: &Term) {
        match op {
            Term::Retract(arg) => {
                let target = self.ground(arg);
                self.remove_rule(&target);
            }
            Term::AssertA(arg) => {
                let entry = self.ground(arg);
                self.insert_rule_left(Rule::fact(entry));
            }
            Term::AssertZ(arg) => {
                let entry = self.ground(arg);
                self.insert_rule_right(Rule::fact(entry));
            }
            _ => {}
        }
    }

    fn ground(&self, goal: &Term) -> Term {
        for answer in self.execute(goal) {
            match answer {
                Ok(term) if !matches!(term, Term::False | Term::Cut) => return term,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        goal.clone()
    }
}

fn rename_rule(rule: &Rule) -> Rule {
    let mut map = HashMap::new();
    Rule {
        head: rule.head.rename(&mut map),
        body: rule.body.rename(&mut map),
    }
}

/// Iterates the clause snapshot for one goal: every clause is freshly
/// instantiated at selection, its head matched against the goal, and its
/// body enumerated for answers.
struct Resolver<'a> {
    runtime: &'a Runtime,
    goal: Term,
    functor: Option<String>,
    external: Option<Box<dyn Iterator<Item = Vec<Term>>>>,
    clauses: std::vec::IntoIter<Rule>,
    current: Option<BodyFrame<'a>>,
    done: bool,
}

struct BodyFrame<'a> {
    head: Term,
    body: Term,
    answers: Answers<'a>,
}

impl<'a> Resolver<'a> {
    fn new(runtime: &'a Runtime, goal: Term, snapshot: Vec<Rule>) -> Self {
        let functor = goal.functor().map(str::to_string);
        let external = functor.as_ref().and_then(|name| {
            let functions = runtime.functions.borrow();
            functions
                .get(&(name.clone(), goal.args().len()))
                .map(|generator| generator())
        });
        Resolver {
            runtime,
            goal,
            functor,
            external,
            clauses: snapshot.into_iter(),
            current: None,
            done: false,
        }
    }
}

impl<'a> Iterator for Resolver<'a> {
    type Item = Result<Term, InterpreterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            // Drain the current clause body first.
            if let Some(frame) = self.current.as_mut() {
                match frame.answers.next() {
                    Some(Ok(item)) => {
                        if matches!(item, Term::False) {
                            // `fail` pruned this alternative; the outer
                            // conjunction discards the sentinel.
                            return Some(Ok(Term::False));
                        }
                        let committed = matches!(item, Term::Cut);
                        let answer = frame
                            .body
                            .unify(&item)
                            .map(|bindings| frame.head.substitute(&bindings));
                        if committed {
                            // Commit: stop iterating the remaining
                            // clauses. The sentinel itself stops here;
                            // a cut never escapes its predicate.
                            self.current = None;
                            self.done = true;
                            return answer.map(Ok);
                        }
                        if let Some(head) = answer {
                            return Some(Ok(head));
                        }
                        continue;
                    }
                    Some(Err(error)) => {
                        self.done = true;
                        return Some(Err(error));
                    }
                    None => self.current = None,
                }
            }
            // Registered generator tuples come before the clause list.
            if let Some(external) = self.external.as_mut() {
                match external.next() {
                    Some(tuple) => {
                        let name = self.functor.clone().unwrap_or_default();
                        let fact = if tuple.is_empty() {
                            Term::Atom(name)
                        } else {
                            Term::Compound(name, tuple)
                        };
                        if let Some(bindings) = fact.unify(&self.goal) {
                            return Some(Ok(fact.substitute(&bindings)));
                        }
                        continue;
                    }
                    None => self.external = None,
                }
            }
            // Select the next clause.
            let Some(rule) = self.clauses.next() else {
                self.done = true;
                return None;
            };
            let rule = rename_rule(&rule);
            let Some(unifier) = rule.head.unify(&self.goal) else {
                continue;
            };
            debug!("selected {}", rule);
            let head = rule.head.substitute(&unifier);
            let body = rule.body.substitute(&unifier);
            if let Term::Arith(var, expr) = &body {
                // A `p(X) :- X is E` clause binds the head argument
                // named like the arithmetic variable directly.
                match evaluate_math(expr) {
                    Ok(value) => {
                        if let Some(answer) = bind_arith_head(&head, var, value) {
                            return Some(Ok(answer));
                        }
                        continue;
                    }
                    Err(error) => {
                        self.done = true;
                        return Some(Err(error));
                    }
                }
            }
            let answers = self.runtime.solve(&body);
            self.current = Some(BodyFrame {
                head,
                body,
                answers,
            });
        }
    }
}

fn bind_arith_head(head: &Term, var: &Var, value: f64) -> Option<Term> {
    for arg in head.args() {
        if let Term::Var(candidate) = arg {
            if candidate.name == var.name {
                let mut bindings = Bindings::new();
                bindings.insert(candidate.clone(), Term::Number(value));
                return Some(head.substitute(&bindings));
            }
        }
    }
    None
}

/// Depth-first, left-to-right conjunction driver with backtracking,
/// realized as an explicit stack of choice frames. Deterministic goals
/// (output, database ops, arithmetic, comparisons, cut) advance in
/// place; resolver-dispatched goals push a frame holding their answer
/// sub-iterator.
struct ConjunctionIter<'a> {
    runtime: &'a Runtime,
    conjunction: Term,
    goals: Vec<Term>,
    stack: Vec<ChoiceFrame<'a>>,
    mode: Mode,
    cut_limit: Option<usize>,
    done: bool,
}

enum Mode {
    Advance { index: usize, bindings: Bindings },
    Backtrack,
}

struct ChoiceFrame<'a> {
    index: usize,
    goal: Term,
    bindings: Bindings,
    answers: Answers<'a>,
}

impl<'a> ConjunctionIter<'a> {
    fn new(runtime: &'a Runtime, conjunction: Term, goals: Vec<Term>) -> Self {
        ConjunctionIter {
            runtime,
            conjunction,
            goals,
            stack: Vec::new(),
            mode: Mode::Advance {
                index: 0,
                bindings: Bindings::new(),
            },
            cut_limit: None,
            done: false,
        }
    }
}

impl<'a> Iterator for ConjunctionIter<'a> {
    type Item = Result<Term, InterpreterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match std::mem::replace(&mut self.mode, Mode::Backtrack) {
                Mode::Advance { index, bindings } => {
                    if index >= self.goals.len() {
                        return Some(Ok(self.conjunction.substitute(&bindings)));
                    }
                    let goal = self.goals[index].substitute(&bindings);
                    match goal {
                        Term::Fail | Term::False => {
                            // Prune this branch; alternatives to the
                            // left stay live.
                            return Some(Ok(Term::False));
                        }
                        output @ (Term::Write(_) | Term::Nl | Term::Tab) => {
                            self.runtime.display(&output);
                            self.mode = Mode::Advance {
                                index: index + 1,
                                bindings,
                            };
                        }
                        op @ (Term::Retract(_) | Term::AssertA(_) | Term::AssertZ(_)) => {
                            self.runtime.apply_database_op(&op);
                            self.mode = Mode::Advance {
                                index: index + 1,
                                bindings,
                            };
                        }
                        Term::Arith(var, expr) => match evaluate_math(&expr) {
                            Ok(value) => {
                                let mut update = Bindings::new();
                                update.insert(var, Term::Number(value));
                                if let Some(unified) = merge(&update, &bindings) {
                                    self.mode = Mode::Advance {
                                        index: index + 1,
                                        bindings: unified,
                                    };
                                }
                            }
                            Err(error) => {
                                self.done = true;
                                return Some(Err(error));
                            }
                        },
                        Term::Logic(expr) => match evaluate_logic(&expr) {
                            Ok(true) => {
                                self.mode = Mode::Advance {
                                    index: index + 1,
                                    bindings,
                                };
                            }
                            Ok(false) => {}
                            Err(error) => {
                                self.done = true;
                                return Some(Err(error));
                            }
                        },
                        Term::Cut => {
                            // Bar every choice point open at this depth;
                            // goals to the right may still backtrack
                            // among themselves.
                            let limit = self.stack.len();
                            self.cut_limit =
                                Some(self.cut_limit.map_or(limit, |current| current.min(limit)));
                            self.mode = Mode::Advance {
                                index: index + 1,
                                bindings,
                            };
                        }
                        goal => {
                            let answers = self.runtime.solve(&goal);
                            self.stack.push(ChoiceFrame {
                                index,
                                goal,
                                bindings,
                                answers,
                            });
                        }
                    }
                }
                Mode::Backtrack => {
                    if let Some(limit) = self.cut_limit {
                        if self.stack.len() <= limit {
                            // Backtracking would re-open a committed
                            // choice point: emit the commit marker once
                            // and end the stream.
                            self.done = true;
                            return Some(Ok(Term::Cut));
                        }
                    }
                    let Some(frame) = self.stack.last_mut() else {
                        self.done = true;
                        return None;
                    };
                    match frame.answers.next() {
                        Some(Ok(item)) => {
                            if matches!(item, Term::False) {
                                continue;
                            }
                            if matches!(item, Term::Cut) {
                                // A cut escaping an inline group prunes
                                // the whole surrounding body; forward it
                                // so the owning resolver commits too.
                                self.done = true;
                                return Some(Ok(Term::Cut));
                            }
                            let unified = frame
                                .goal
                                .unify(&item)
                                .and_then(|bindings| merge(&bindings, &frame.bindings));
                            if let Some(bindings) = unified {
                                self.mode = Mode::Advance {
                                    index: frame.index + 1,
                                    bindings,
                                };
                            }
                        }
                        Some(Err(error)) => {
                            self.done = true;
                            return Some(Err(error));
                        }
                        None => {
                            self.stack.pop();
                        }
                    }
                }
            }
        }
    }
}
