// src/main.rs
use std::env;
use std::fs;
use std::process;

use sprolog::engine::runtime::Runtime;
use sprolog::repl;
use sprolog::syntax::parser::Parser;
use sprolog::syntax::scanner::Scanner;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: sprolog <rules.pl>");
        process::exit(1);
    }
    let runtime = match load(&args[1]) {
        Ok(runtime) => runtime,
        Err(message) => {
            eprintln!("Error loading rules: {}", message);
            process::exit(1);
        }
    };
    if let Err(error) = repl::run(&runtime) {
        eprintln!("{}", error);
        process::exit(1);
    }
}

fn load(path: &str) -> Result<Runtime, String> {
    let source = fs::read_to_string(path).map_err(|error| format!("{}: {}", path, error))?;
    let tokens = Scanner::new(&source)
        .tokenize()
        .map_err(|error| error.to_string())?;
    let rules = Parser::new(tokens)
        .parse_rules()
        .map_err(|error| error.to_string())?;
    Ok(Runtime::new(rules))
}
