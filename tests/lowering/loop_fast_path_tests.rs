#[path = "../support/mod.rs"]
mod support;

use rill::{
    bytecode::compile_program,
    config::{CompilerOptions, Config},
    lang::{Program, Sexp},
    runtime::Value,
};
use support::*;

/// `{ total <- 0; for (x in seq) total <- total + x; total }`
fn summing(sequence: Sexp) -> Program {
    program(
        vec![],
        block(vec![
            assign("total", num(0.0)),
            for_loop(
                "x",
                sequence,
                assign("total", call("+", vec![sym("total"), sym("x")])),
            ),
            sym("total"),
        ]),
    )
}

fn one_two_three() -> Sexp {
    call("c", vec![num(1.0), num(2.0), num(3.0)])
}

fn without_fast_path() -> Config {
    let mut config = Config::default();
    config.compiler.integer_fast_path = false;
    config
}

fn listing(source: &Program, options: &CompilerOptions) -> String {
    compile_program(source, options).unwrap().main.disassemble()
}

#[test]
fn counter_loop_sums_with_fast_path() {
    assert_eq!(run(&summing(one_two_three())).unwrap(), Value::Double(6.0));
}

#[test]
fn counter_loop_sums_without_fast_path() {
    let value = run_with(&summing(one_two_three()), &without_fast_path()).unwrap();
    assert_eq!(value, Value::Double(6.0));
}

#[test]
fn special_form_loop_agrees_with_inlined_loop() {
    let value = run_without_inlining(&summing(one_two_three())).unwrap();
    assert_eq!(value, Value::Double(6.0));
}

#[test]
fn fast_path_uses_native_compare_and_increment() {
    let code = listing(&summing(one_two_three()), &CompilerOptions::default());
    assert!(code.contains("OpJumpIfIntLess"), "{code}");
    assert!(code.contains("OpIncLocal"), "{code}");
    assert!(code.contains("OpStoreInt"), "{code}");
    assert!(!code.contains("OpGreaterEqual"), "{code}");
}

#[test]
fn fallback_compares_boxed_values() {
    let options = without_fast_path().compiler;
    let code = listing(&summing(one_two_three()), &options);
    assert!(code.contains("OpGreaterEqual"), "{code}");
    assert!(code.contains("OpTruthy"), "{code}");
    assert!(code.contains("OpBoxInt"), "{code}");
    assert!(!code.contains("OpJumpIfIntLess"), "{code}");
    assert!(!code.contains("OpIncLocal"), "{code}");
}

#[test]
fn empty_sequence_runs_no_iterations() {
    assert_eq!(run(&summing(call("c", vec![]))).unwrap(), Value::Double(0.0));
    let value = run_with(&summing(call("c", vec![])), &without_fast_path()).unwrap();
    assert_eq!(value, Value::Double(0.0));
}

#[test]
fn scalar_sequence_runs_once() {
    assert_eq!(run(&summing(num(5.0))).unwrap(), Value::Double(5.0));
}

#[test]
fn loop_variable_keeps_last_element() {
    let source = program(
        vec![],
        block(vec![
            for_loop("x", one_two_three(), Sexp::Null),
            sym("x"),
        ]),
    );
    assert_eq!(run(&source).unwrap(), Value::Double(3.0));
    assert_eq!(run_with(&source, &without_fast_path()).unwrap(), Value::Double(3.0));
}

#[test]
fn loop_inside_a_function_uses_its_frame() {
    let source = program(
        vec![define(
            "total_of",
            function(
                &["v"],
                block(vec![
                    assign("total", num(0.0)),
                    for_loop(
                        "x",
                        sym("v"),
                        assign("total", call("+", vec![sym("total"), sym("x")])),
                    ),
                    sym("total"),
                ]),
            ),
        )],
        block(vec![
            assign("total", num(100.0)),
            call("list", vec![call("total_of", vec![one_two_three()]), sym("total")]),
        ]),
    );
    assert_eq!(run(&source).unwrap(), doubles(&[6.0, 100.0]));
}
