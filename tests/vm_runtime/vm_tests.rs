#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use rill::{
    bytecode::{Compiler, compile_program},
    config::{CompilerOptions, Config, RuntimeOptions},
    driver::{ProgramError, execute_program},
    ir::Translator,
    lang::{CallNode, Definition, FormalDef, FunctionDef, Sexp},
    runtime::{Context, EvalError, Machine, Value},
};
use support::*;

fn factorial() -> Definition {
    define(
        "fact",
        function(
            &["n"],
            if_else(
                call("<", vec![sym("n"), num(2.0)]),
                num(1.0),
                call(
                    "*",
                    vec![sym("n"), call("fact", vec![call("-", vec![sym("n"), num(1.0)])])],
                ),
            ),
        ),
    )
}

#[test]
fn recursive_closure() {
    let source = program(vec![factorial()], call("fact", vec![num(5.0)]));
    assert_eq!(run(&source).unwrap(), Value::Double(120.0));
    assert_eq!(run_without_inlining(&source).unwrap(), Value::Double(120.0));
}

#[test]
fn machine_runs_a_unit_in_a_given_environment() {
    let options = CompilerOptions::default();
    let sexp = call("+", vec![sym("a"), int(1)]);
    let body = Translator::new(&options).translate_body(&sexp).unwrap();
    let unit = Compiler::new("snippet", &options).compile_body(&body).unwrap();

    let ctx = Context::new(RuntimeOptions::default());
    let env = ctx.global().child();
    env.set_variable("a".into(), Value::Int(41));
    assert_eq!(Machine::new(&ctx).execute(&unit, &env).unwrap(), Value::Int(42));
    assert_eq!(ctx.depth(), 0);
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let source = program(
        vec![define("f", function(&["n"], call("f", vec![sym("n")])))],
        call("f", vec![num(1.0)]),
    );
    let mut config = Config::default();
    config.runtime.max_depth = 50;
    match run_with(&source, &config) {
        Err(ProgramError::Eval(EvalError::DepthExceeded { limit })) => assert_eq!(limit, 50),
        other => panic!("expected the depth limit, got {:?}", other),
    }
}

#[test]
fn default_argument_sees_the_frame() {
    let def = FunctionDef {
        formals: vec![FormalDef::new("x"), FormalDef::with_default("y", sym("z"))],
        body: block(vec![
            assign("z", call("+", vec![sym("x"), num(1.0)])),
            sym("y"),
        ]),
    };
    let source = program(vec![define("f", def)], call("f", vec![num(1.0)]));
    assert_eq!(run(&source).unwrap(), Value::Double(2.0));
}

#[test]
fn supplied_argument_overrides_default() {
    let def = FunctionDef {
        formals: vec![
            FormalDef::new("x"),
            FormalDef::with_default("y", call("*", vec![sym("x"), num(2.0)])),
        ],
        body: sym("y"),
    };
    let source = program(vec![define("f", def.clone())], call("f", vec![num(3.0)]));
    assert_eq!(run(&source).unwrap(), Value::Double(6.0));

    let source = program(vec![define("f", def)], call("f", vec![num(3.0), num(7.0)]));
    assert_eq!(run(&source).unwrap(), Value::Double(7.0));
}

#[test]
fn missing_argument_is_unbound() {
    let source = program(
        vec![define("f", function(&["x"], sym("x")))],
        call("f", vec![]),
    );
    match run(&source) {
        Err(ProgramError::Eval(EvalError::UnboundVariable { name })) => assert_eq!(name, "x"),
        other => panic!("expected an unbound variable, got {:?}", other),
    }
}

#[test]
fn duplicate_name_is_rejected() {
    let source = program(
        vec![define("f", function(&["x"], sym("x")))],
        call_with("f", vec![named("x", num(1.0)), named("x", num(2.0))]),
    );
    let err = run(&source).unwrap_err();
    assert!(matches!(
        err,
        ProgramError::Eval(EvalError::ArgumentCountMismatch { .. })
    ));
    assert!(err.to_string().starts_with("[E1000]"), "{err}");
}

#[test]
fn closures_capture_their_defining_environment() {
    // adder <- function(n) function(x) x + n; adder(2)(5)
    let inner = Sexp::function(
        vec![FormalDef::new("x")],
        call("+", vec![sym("x"), sym("n")]),
    );
    let make = Sexp::call("adder", vec![arg(num(2.0))]);
    let source = program(
        vec![define("adder", FunctionDef { formals: vec![FormalDef::new("n")], body: inner })],
        Sexp::Call(Arc::new(CallNode::new(make, vec![arg(num(5.0))]))),
    );
    assert_eq!(run(&source).unwrap(), Value::Double(7.0));
}

#[test]
fn tracing_does_not_change_results() {
    let source = program(vec![factorial()], call("fact", vec![num(4.0)]));
    let mut config = Config::default();
    config.runtime.trace = true;
    assert_eq!(run_with(&source, &config).unwrap(), Value::Double(24.0));
}

#[test]
fn compiled_program_can_run_twice() {
    let source = program(vec![factorial()], call("fact", vec![num(3.0)]));
    let compiled = compile_program(&source, &CompilerOptions::default()).unwrap();
    let runtime = RuntimeOptions::default();
    assert_eq!(execute_program(&compiled, &runtime).unwrap(), Value::Double(6.0));
    assert_eq!(execute_program(&compiled, &runtime).unwrap(), Value::Double(6.0));
}

#[test]
fn integer_arithmetic_overflow_is_an_error() {
    let source = program(vec![], call("+", vec![int(i32::MAX), int(1)]));
    match run(&source) {
        Err(ProgramError::Eval(EvalError::Primitive { function, .. })) => assert_eq!(function, "+"),
        other => panic!("expected an overflow error, got {:?}", other),
    }
}

#[test]
fn branches_with_integer_and_boxed_results_share_one_slot() {
    for (condition, expected) in [(true, Value::Int(1)), (false, Value::string("a"))] {
        let source = program(
            vec![],
            if_else(Sexp::Logical(condition), int(1), text("a")),
        );
        assert_eq!(run(&source).unwrap(), expected);
    }
}
