// src/repl.rs
//! Line-based interactive query loop.
//!
//! Each input line is parsed as a query; solutions are pulled one at a
//! time. Output produced by `write`/`nl`/`tab` is drained between
//! solutions so side effects attach to the answer that caused them.
//! Entering `;` asks for the next solution, anything else stops with
//! `yes`; a query with no real answer prints `no`.

use std::io::{self, BufRead, Write};

use crate::engine::database::Rule;
use crate::engine::runtime::Runtime;
use crate::engine::term::Term;
use crate::syntax::parser::Parser;
use crate::syntax::scanner::Scanner;

pub fn run(runtime: &Runtime) -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    println!("Welcome to Simple Prolog");
    println!("ctrl-d to quit");
    loop {
        print!("?- ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if let Err(message) = run_query(runtime, query, &mut input) {
            println!("Error: {}", message);
        }
    }
}

fn run_query(
    runtime: &Runtime,
    source: &str,
    input: &mut impl BufRead,
) -> Result<(), String> {
    let tokens = Scanner::new(source)
        .tokenize()
        .map_err(|error| error.to_string())?;
    let query = Parser::new(tokens)
        .parse_query()
        .map_err(|error| error.to_string())?;
    runtime.reset_stream();

    let mut seen_solution = false;
    for answer in runtime.run_query(&query) {
        let solution = answer.map_err(|error| error.to_string())?;
        if matches!(solution, Term::False) {
            continue;
        }
        if seen_solution && !wants_more(input)? {
            println!("yes");
            return Ok(());
        }
        seen_solution = true;
        print!("{}", runtime.stream_read());
        display_bindings(&query, &solution);
    }
    print!("{}", runtime.stream_read());
    println!("{}", if seen_solution { "yes" } else { "no" });
    Ok(())
}

fn wants_more(input: &mut impl BufRead) -> Result<bool, String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|error| error.to_string())?;
    Ok(line.trim() == ";")
}

fn display_bindings(query: &Rule, solution: &Term) {
    let Some(bindings) = query.head.unify(solution) else {
        return;
    };
    let mut shown = false;
    for arg in query.head.args() {
        if let Term::Var(var) = arg {
            if let Some(value) = bindings.get(var) {
                print!("{} = {} ", var, value);
                shown = true;
            }
        }
    }
    if shown {
        println!();
    }
}
