#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use rill::{
    config::Config,
    driver::ProgramError,
    lang::{CallNode, FormalDef, Sexp},
    runtime::{EvalError, Value},
};
use support::*;

fn list_of_two() -> rill::lang::Definition {
    define("f", function(&["x", "y"], call("list", vec![sym("x"), sym("y")])))
}

#[test]
fn named_argument_binds_first_positional_fills_the_rest() {
    let source = program(
        vec![list_of_two()],
        call_with("f", vec![named("y", num(1.0)), arg(num(2.0))]),
    );
    assert_eq!(run(&source).unwrap(), doubles(&[2.0, 1.0]));

    let source = program(
        vec![list_of_two()],
        call_with("f", vec![named("x", num(1.0)), arg(num(2.0))]),
    );
    assert_eq!(run(&source).unwrap(), doubles(&[1.0, 2.0]));
}

#[test]
fn builtin_receives_names_aligned_with_values() {
    let source = program(
        vec![],
        call_with(
            "paste",
            vec![arg(text("a")), named("sep", text("-")), arg(text("b"))],
        ),
    );
    assert_eq!(run(&source).unwrap(), Value::string("a-b"));
}

#[test]
fn ellipsis_splices_in_order_for_closures() {
    let source = program(
        vec![
            define("inner", function(&["..."], call("list", vec![dots()]))),
            define(
                "outer",
                function(&["..."], call("inner", vec![text("a"), dots(), text("b")])),
            ),
        ],
        call("outer", vec![text("x"), text("y")]),
    );
    assert_eq!(run(&source).unwrap(), strings(&["a", "x", "y", "b"]));
}

#[test]
fn ellipsis_splices_in_order_for_builtins() {
    let source = program(
        vec![define(
            "outer",
            function(&["..."], call("list", vec![text("a"), dots(), text("b")])),
        )],
        call("outer", vec![text("x"), text("y")]),
    );
    assert_eq!(run(&source).unwrap(), strings(&["a", "x", "y", "b"]));
}

#[test]
fn empty_ellipsis_removes_its_position() {
    let source = program(
        vec![define(
            "outer",
            function(&["..."], call("list", vec![text("a"), dots(), text("b")])),
        )],
        call("outer", vec![]),
    );
    assert_eq!(run(&source).unwrap(), strings(&["a", "b"]));
}

#[test]
fn forwarded_names_reach_a_builtin() {
    let source = program(
        vec![define("p", function(&["..."], call("paste", vec![dots()])))],
        call_with(
            "p",
            vec![arg(text("a")), arg(text("b")), named("sep", text("+"))],
        ),
    );
    assert_eq!(run(&source).unwrap(), Value::string("a+b"));
}

#[test]
fn forwarded_names_reach_a_closure() {
    let source = program(
        vec![
            list_of_two(),
            define("g", function(&["..."], call("f", vec![dots()]))),
        ],
        call_with("g", vec![named("y", num(1.0)), arg(num(2.0))]),
    );
    assert_eq!(run(&source).unwrap(), doubles(&[2.0, 1.0]));
}

#[test]
fn static_primitive_splices_like_a_dynamic_builtin() {
    let source = program(
        vec![define(
            "outer",
            function(&["..."], call("c", vec![text("a"), dots(), text("b")])),
        )],
        call("outer", vec![text("x"), text("y")]),
    );
    let mut config = Config::default();
    config.compiler.static_primitives = vec!["c".to_string()];
    assert_eq!(run_with(&source, &config).unwrap(), strings(&["a", "x", "y", "b"]));
}

#[test]
fn non_function_bindings_are_skipped_in_call_position() {
    let source = program(
        vec![define(
            "h",
            function(
                &[],
                block(vec![assign("c", num(1.0)), call("c", vec![num(2.0), num(3.0)])]),
            ),
        )],
        call("h", vec![]),
    );
    assert_eq!(run(&source).unwrap(), doubles(&[2.0, 3.0]));
}

#[test]
fn local_closure_shadows_a_builtin() {
    let constant = Sexp::function(vec![FormalDef::new("x")], num(42.0));
    let source = program(
        vec![define(
            "h",
            function(
                &[],
                block(vec![
                    assign("length", constant),
                    call("length", vec![call("nope", vec![])]),
                ]),
            ),
        )],
        call("h", vec![]),
    );
    // The closure never forces its argument.
    assert_eq!(run(&source).unwrap(), Value::Double(42.0));
}

#[test]
fn special_form_receives_unevaluated_arguments() {
    let source = program(
        vec![],
        if_else(Sexp::Logical(false), sym("undefined"), num(2.0)),
    );
    assert_eq!(run_without_inlining(&source).unwrap(), Value::Double(2.0));

    let quoted = call("f", vec![sym("x")]);
    let source = program(vec![], call("quote", vec![quoted.clone()]));
    assert_eq!(run(&source).unwrap(), Value::Language(quoted));
}

#[test]
fn computed_callee_is_checked_then_dispatched() {
    let literal = Sexp::function(vec![FormalDef::new("x")], sym("x"));
    let source = program(
        vec![],
        Sexp::Call(Arc::new(CallNode::new(literal, vec![arg(num(5.0))]))),
    );
    assert_eq!(run(&source).unwrap(), Value::Double(5.0));

    let source = program(
        vec![],
        Sexp::Call(Arc::new(CallNode::new(num(1.0), vec![arg(num(2.0))]))),
    );
    match run(&source) {
        Err(ProgramError::Eval(EvalError::NotCallable { call })) => assert_eq!(call, "1(2)"),
        other => panic!("expected a non-callable error, got {:?}", other),
    }
}

#[test]
fn unknown_function_is_reported_by_name() {
    let source = program(vec![], call("nope", vec![num(1.0)]));
    let err = run(&source).unwrap_err();
    assert!(matches!(
        &err,
        ProgramError::Eval(EvalError::UnresolvedFunction { name }) if name == "nope"
    ));
    assert_eq!(err.to_string(), "[E1002] error: could not find function \"nope\"");
}

#[test]
fn surplus_argument_is_rejected() {
    let source = program(
        vec![define("f", function(&["x"], sym("x")))],
        call("f", vec![num(1.0), num(2.0)]),
    );
    match run(&source) {
        Err(ProgramError::Eval(EvalError::ArgumentCountMismatch { detail, .. })) => {
            assert_eq!(detail, "unused argument (2)")
        }
        other => panic!("expected an argument mismatch, got {:?}", other),
    }
}

#[test]
fn promise_is_forced_at_most_once() {
    let bump = block(vec![
        assign("n", call("+", vec![sym("n"), num(1.0)])),
        sym("n"),
    ]);
    let source = program(
        vec![define("twice", function(&["x"], call("c", vec![sym("x"), sym("x")])))],
        block(vec![
            assign("n", num(0.0)),
            assign("r", call("twice", vec![bump])),
            call("list", vec![sym("n"), sym("r")]),
        ]),
    );
    assert_eq!(
        run(&source).unwrap(),
        Value::vector(vec![Value::Double(1.0), doubles(&[1.0, 1.0])])
    );
}

#[test]
fn unforced_argument_is_never_evaluated() {
    let source = program(
        vec![define("f", function(&["x"], num(1.0)))],
        call("f", vec![call("nope", vec![])]),
    );
    assert_eq!(run(&source).unwrap(), Value::Double(1.0));
}

#[test]
fn missing_formal_does_not_fall_back_to_an_outer_binding() {
    // x <- 5; f <- function(x) x; f()
    let source = program(
        vec![define("f", function(&["x"], sym("x")))],
        block(vec![assign("x", num(5.0)), call("f", vec![])]),
    );
    match run(&source) {
        Err(ProgramError::Eval(EvalError::UnboundVariable { name })) => assert_eq!(name, "x"),
        other => panic!("expected the missing formal to be reported, got {:?}", other),
    }
    match run_without_inlining(&source) {
        Err(ProgramError::Eval(EvalError::UnboundVariable { name })) => assert_eq!(name, "x"),
        other => panic!("expected the missing formal to be reported, got {:?}", other),
    }
}

#[test]
fn missing_formal_is_fine_when_never_read() {
    let source = program(
        vec![define("f", function(&["x", "y"], sym("x")))],
        block(vec![assign("y", num(5.0)), call("f", vec![num(1.0)])]),
    );
    assert_eq!(run(&source).unwrap(), Value::Double(1.0));
}
