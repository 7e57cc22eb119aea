#[path = "../support/mod.rs"]
mod support;

use rill::{
    bytecode::LoweringError,
    config::CompilerOptions,
    ir::{Callee, Expression, IrConstant, LValue, Statement, Translator},
    lang::{FormalDef, FunctionDef, Sexp},
};
use support::*;

fn returned(statement: Option<&Statement>) -> &Expression {
    match statement {
        Some(Statement::Return(value)) => value,
        other => panic!("expected a return, got {:?}", other),
    }
}

#[test]
fn call_arguments_become_thunks_unless_constant() {
    let options = CompilerOptions::default();
    let source = call_with(
        "f",
        vec![arg(num(1.0)), named("y", sym("y")), arg(call("g", vec![sym("z")]))],
    );
    let body = Translator::new(&options).translate_body(&source).unwrap();
    assert_eq!(body.len(), 1);

    let Expression::DynamicCall(call) = returned(body.statements.last()) else {
        panic!("expected a dynamic call");
    };
    assert!(matches!(&call.callee, Callee::Name(name) if name.as_str() == "f"));
    assert_eq!(call.args.names.len(), call.args.arguments.len());
    assert!(matches!(
        &call.args.arguments[0],
        Expression::Constant(IrConstant::Value(Sexp::Double(v))) if *v == 1.0
    ));
    match &call.args.arguments[1] {
        Expression::Thunk(thunk) => assert_eq!(thunk.variable().map(|n| n.as_str()), Some("y")),
        other => panic!("expected a thunk, got {}", other),
    }
    match &call.args.arguments[2] {
        Expression::Thunk(thunk) => {
            assert!(thunk.variable().is_none());
            assert_eq!(thunk.sexp.to_string(), "g(z)");
        }
        other => panic!("expected a thunk, got {}", other),
    }
    assert_eq!(call.args.names[1].as_ref().map(|n| n.as_str()), Some("y"));
}

#[test]
fn ellipsis_argument_is_a_splice_marker() {
    let options = CompilerOptions::default();
    let body = Translator::new(&options)
        .translate_body(&call("g", vec![dots(), num(2.0)]))
        .unwrap();
    let Expression::DynamicCall(call) = returned(body.statements.last()) else {
        panic!("expected a dynamic call");
    };
    assert_eq!(call.args.ellipsis_index(), Some(0));
}

#[test]
fn bare_ellipsis_is_rejected() {
    let options = CompilerOptions::default();
    let err = Translator::new(&options).translate_body(&dots()).unwrap_err();
    assert_eq!(err, LoweringError::MisplacedEllipsis);
}

#[test]
fn if_is_inlined_as_a_branch() {
    let options = CompilerOptions::default();
    let body = Translator::new(&options)
        .translate_body(&if_else(sym("c"), num(1.0), num(2.0)))
        .unwrap();
    assert!(matches!(body.statements.first(), Some(Statement::If { .. })));
    assert!(body
        .statements
        .iter()
        .all(|s| !matches!(s, Statement::Expr(Expression::DynamicCall(_)))));
}

#[test]
fn if_stays_a_call_without_inlining() {
    let options = CompilerOptions {
        inline_control_flow: false,
        ..CompilerOptions::default()
    };
    let body = Translator::new(&options)
        .translate_body(&if_else(sym("c"), num(1.0), num(2.0)))
        .unwrap();
    assert_eq!(body.len(), 1);
    let Expression::DynamicCall(call) = returned(body.statements.first()) else {
        panic!("expected a dynamic call");
    };
    assert!(matches!(&call.callee, Callee::Name(name) if name.as_str() == "if"));
}

#[test]
fn named_arguments_keep_if_a_call() {
    let options = CompilerOptions::default();
    let source = call_with("if", vec![named("cond", sym("c")), arg(num(1.0))]);
    let body = Translator::new(&options).translate_body(&source).unwrap();
    assert!(matches!(
        returned(body.statements.first()),
        Expression::DynamicCall(_)
    ));
}

#[test]
fn for_becomes_a_counter_loop() {
    let options = CompilerOptions::default();
    let source = for_loop("x", call("c", vec![num(1.0), num(2.0)]), sym("x"));
    let body = Translator::new(&options).translate_body(&source).unwrap();

    let locals: Vec<_> = body
        .statements
        .iter()
        .filter_map(|s| match s {
            Statement::Assignment {
                lhs: LValue::Local(local),
                rhs,
            } => Some((local.name.as_str().to_string(), rhs.clone())),
            _ => None,
        })
        .collect();
    assert!(matches!(&locals[0], (name, Expression::Length(_)) if name == "length"));
    assert!(matches!(&locals[1], (name, Expression::Constant(IrConstant::Int(0))) if name == "i"));
    assert!(matches!(&locals[2], (name, Expression::Increment(_)) if name == "i"));
    assert!(body.statements.iter().any(|s| matches!(
        s,
        Statement::If {
            condition: Expression::CmpGe(..),
            ..
        }
    )));
    assert!(body.statements.iter().any(|s| matches!(
        s,
        Statement::Assignment {
            lhs: LValue::Environment(var),
            rhs: Expression::ElementAccess { .. },
        } if var.name.as_str() == "x"
    )));
}

#[test]
fn static_primitive_arguments_are_evaluated_into_temps() {
    let options = CompilerOptions {
        static_primitives: vec!["c".to_string()],
        ..CompilerOptions::default()
    };
    let source = call("c", vec![num(1.0), call("f", vec![])]);
    let body = Translator::new(&options).translate_body(&source).unwrap();

    assert!(matches!(
        body.statements.first(),
        Some(Statement::Assignment {
            lhs: LValue::Temp(_),
            rhs: Expression::DynamicCall(_),
        })
    ));
    let Expression::PrimitiveCall(call) = returned(body.statements.last()) else {
        panic!("expected a primitive call");
    };
    assert_eq!(call.primitive.as_str(), "c");
    assert!(call.args.arguments.iter().all(Expression::is_trivial));
}

#[test]
fn default_values_become_thunks() {
    let options = CompilerOptions::default();
    let def = FunctionDef {
        formals: vec![FormalDef::new("x"), FormalDef::with_default("y", sym("x"))],
        body: sym("y"),
    };
    let function = Translator::new(&options).translate_function(None, &def).unwrap();

    assert_eq!(function.display_name(), "<anonymous>");
    assert!(function.formals[0].default.is_none());
    let default = function.formals[1].default.as_ref().unwrap();
    assert_eq!(default.variable().map(|n| n.as_str()), Some("x"));
}

#[test]
fn function_literal_is_a_closure_expression() {
    let options = CompilerOptions::default();
    let source = Sexp::function(vec![FormalDef::new("a")], sym("a"));
    let body = Translator::new(&options).translate_body(&source).unwrap();
    assert!(matches!(
        returned(body.statements.first()),
        Expression::MakeClosure(closure) if closure.function.formals.len() == 1
    ));
}
