//! Source-tree builders shared by the integration tests.
#![allow(dead_code)]

use rill::{
    config::Config,
    driver::{ProgramError, run_program},
    lang::{Arg, Definition, FormalDef, FunctionDef, Program, Sexp, Symbol},
    runtime::Value,
};

pub fn sym(name: &str) -> Sexp {
    Sexp::symbol(name)
}

pub fn num(value: f64) -> Sexp {
    Sexp::Double(value)
}

pub fn int(value: i32) -> Sexp {
    Sexp::Int(value)
}

pub fn text(value: &str) -> Sexp {
    Sexp::string(value)
}

pub fn dots() -> Sexp {
    Sexp::Symbol(Symbol::ellipsis())
}

pub fn arg(value: Sexp) -> Arg {
    Arg::positional(value)
}

pub fn named(name: &str, value: Sexp) -> Arg {
    Arg::named(name, value)
}

/// `name(args...)` with positional arguments only.
pub fn call(name: &str, args: Vec<Sexp>) -> Sexp {
    Sexp::call(name, args.into_iter().map(Arg::positional).collect())
}

pub fn call_with(name: &str, args: Vec<Arg>) -> Sexp {
    Sexp::call(name, args)
}

pub fn block(statements: Vec<Sexp>) -> Sexp {
    call("{", statements)
}

pub fn assign(name: &str, value: Sexp) -> Sexp {
    call("<-", vec![sym(name), value])
}

pub fn if_else(condition: Sexp, consequent: Sexp, alternative: Sexp) -> Sexp {
    call("if", vec![condition, consequent, alternative])
}

pub fn for_loop(variable: &str, sequence: Sexp, body: Sexp) -> Sexp {
    call("for", vec![sym(variable), sequence, body])
}

pub fn function(formals: &[&str], body: Sexp) -> FunctionDef {
    FunctionDef {
        formals: formals.iter().map(|name| FormalDef::new(name)).collect(),
        body,
    }
}

pub fn define(name: &str, function: FunctionDef) -> Definition {
    Definition {
        name: Symbol::from(name),
        function,
    }
}

pub fn program(definitions: Vec<Definition>, body: Sexp) -> Program {
    Program { definitions, body }
}

pub fn run_with(program: &Program, config: &Config) -> Result<Value, ProgramError> {
    run_program(program, config)
}

pub fn run(program: &Program) -> Result<Value, ProgramError> {
    run_with(program, &Config::default())
}

/// Runs with control flow left to the special forms.
pub fn run_without_inlining(program: &Program) -> Result<Value, ProgramError> {
    let mut config = Config::default();
    config.compiler.inline_control_flow = false;
    run_with(program, &config)
}

pub fn doubles(values: &[f64]) -> Value {
    Value::vector(values.iter().map(|v| Value::Double(*v)).collect())
}

pub fn strings(values: &[&str]) -> Value {
    Value::vector(values.iter().map(|v| Value::string(v)).collect())
}
