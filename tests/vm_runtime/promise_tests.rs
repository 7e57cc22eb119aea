#[path = "../support/mod.rs"]
mod support;

use std::{rc::Rc, sync::Arc};

use rill::{
    bytecode::{CodeUnit, Compiler},
    config::{CompilerOptions, RuntimeOptions},
    driver::ProgramError,
    ir::Translator,
    lang::{FormalDef, FunctionDef, Sexp, Symbol},
    runtime::{
        Context, EvalError, Value,
        promise::{Deferred, Promise},
    },
};
use support::*;

fn compiled(sexp: &Sexp) -> Arc<CodeUnit> {
    let options = CompilerOptions::default();
    let body = Translator::new(&options).translate_body(sexp).unwrap();
    Arc::new(Compiler::new("thunk", &options).compile_body(&body).unwrap())
}

#[test]
fn compiled_promise_runs_once() {
    let ctx = Context::new(RuntimeOptions::default());
    let env = ctx.global().child();
    env.set_variable(Symbol::from("a"), Value::Double(2.0));
    let promise = Promise::new(Deferred::Compiled {
        ctx: ctx.clone(),
        env: env.clone(),
        unit: compiled(&call("*", vec![sym("a"), num(3.0)])),
    });

    assert!(!promise.is_forced());
    assert_eq!(promise.force().unwrap(), Value::Double(6.0));
    env.set_variable(Symbol::from("a"), Value::Double(100.0));
    assert_eq!(promise.force().unwrap(), Value::Double(6.0));
    assert_eq!(promise.evaluations(), 1);
    assert!(promise.is_forced());
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn interpreted_promise_evaluates_in_its_environment() {
    let ctx = Context::new(RuntimeOptions::default());
    let env = ctx.global().child();
    env.set_variable(Symbol::from("b"), Value::Double(4.0));
    let promise = Promise::new(Deferred::Interpreted {
        ctx: ctx.clone(),
        env,
        expr: call("+", vec![sym("b"), num(1.0)]),
    });
    assert_eq!(promise.force().unwrap(), Value::Double(5.0));
}

#[test]
fn failed_force_can_be_retried() {
    let ctx = Context::new(RuntimeOptions::default());
    let env = ctx.global().child();
    let promise = Promise::new(Deferred::Variable {
        name: Symbol::from("late"),
        env: env.clone(),
    });

    assert!(matches!(
        promise.force(),
        Err(EvalError::UnboundVariable { name }) if name == "late"
    ));
    env.set_variable(Symbol::from("late"), Value::string("here"));
    assert_eq!(promise.force().unwrap(), Value::string("here"));
    assert_eq!(promise.evaluations(), 2);
}

#[test]
fn nested_promises_are_forced_through() {
    let inner = Value::Promise(Rc::new(Promise::forced(Value::Int(3))));
    let ctx = Context::new(RuntimeOptions::default());
    let env = ctx.global().child();
    env.set_variable(Symbol::from("p"), inner);
    let outer = Promise::new(Deferred::Variable {
        name: Symbol::from("p"),
        env,
    });
    assert_eq!(outer.force().unwrap(), Value::Int(3));
}

#[test]
fn self_referential_default_is_a_recursion_error() {
    let def = FunctionDef {
        formals: vec![FormalDef::with_default("y", sym("y"))],
        body: sym("y"),
    };
    let source = program(vec![define("f", def)], call("f", vec![]));
    match run(&source) {
        Err(ProgramError::Eval(EvalError::PromiseRecursion)) => {}
        other => panic!("expected promise recursion, got {:?}", other),
    }
}

#[test]
fn promise_argument_sees_later_caller_bindings() {
    // f <- function(x) function() x
    // { v <- 0; h <- f(v); v <- 1; h() }
    let getter = Sexp::function(vec![], sym("x"));
    let source = program(
        vec![define("f", FunctionDef { formals: vec![FormalDef::new("x")], body: getter })],
        block(vec![
            assign("v", num(0.0)),
            assign("h", call("f", vec![sym("v")])),
            assign("v", num(1.0)),
            call("h", vec![]),
        ]),
    );
    assert_eq!(run(&source).unwrap(), Value::Double(1.0));
}
