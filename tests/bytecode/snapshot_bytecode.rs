#[path = "../support/mod.rs"]
mod support;

use insta::assert_snapshot;
use rill::{bytecode::compile_program, config::CompilerOptions};
use support::*;

#[test]
fn snapshot_named_and_positional_call() {
    let source = program(vec![], call_with("f", vec![named("x", num(1.0)), arg(num(2.0))]));
    let compiled = compile_program(&source, &CompilerOptions::default()).unwrap();

    assert_snapshot!(compiled.main.disassemble(), @r"
    == main (slots: 3) ==
    0000 OpFindFunction 0
    0003 OpDup
    0004 OpIsBuiltin
    0005 OpJumpIfNonZero 45
    0008 OpDup
    0009 OpIsClosure
    0010 OpJumpIfNonZero 24
    0013 OpLoad 0
    0015 OpLoad 1
    0017 OpConstant 1
    0020 OpApplySpecial
    0021 OpJump 77
    0024 OpCastClosure
    0025 OpLoad 0
    0027 OpConstant 1
    0030 OpNewArgList
    0031 OpConstant 2
    0034 OpArgAddNamed 3
    0037 OpConstant 4
    0040 OpArgAdd
    0041 OpApplyClosure
    0042 OpJump 77
    0045 OpCastBuiltin
    0046 OpLoad 0
    0048 OpLoad 1
    0050 OpConstant 1
    0053 OpNewNames 2
    0056 OpNameAt 0 3
    0061 OpNewValues 2
    0064 OpConstant 5
    0067 OpValueAt 0
    0070 OpConstant 6
    0073 OpValueAt 1
    0076 OpApplyBuiltin
    0077 OpReturn
    constants:
      0: name f
      1: call f(x = 1, 2)
      2: 1
      3: name x
      4: 2
      5: 1
      6: 2
    ");
}

#[test]
fn snapshot_static_primitive_with_ellipsis() {
    let source = program(
        vec![define("g", function(&["..."], call("c", vec![num(1.0), dots()])))],
        sym("g"),
    );
    let options = CompilerOptions {
        static_primitives: vec!["c".to_string()],
        ..CompilerOptions::default()
    };
    let compiled = compile_program(&source, &options).unwrap();
    let (name, unit) = &compiled.definitions[0];
    assert_eq!(name.as_str(), "g");

    assert_snapshot!(unit.body.disassemble(), @r"
    == g (slots: 3) ==
    0000 OpLoadEllipsis
    0001 OpStore 2
    0003 OpLoad 0
    0005 OpLoad 1
    0007 OpConstant 1
    0010 OpNewNames 2
    0013 OpLoad 2
    0015 OpSpliceNames 1
    0018 OpNewValues 2
    0021 OpConstant 2
    0024 OpValueAt 0
    0027 OpLoad 2
    0029 OpSpliceValues 1
    0032 OpCallPrimitive 0
    0035 OpReturn
    constants:
      0: primitive c
      1: call c(1, ...)
      2: 1
    ");
}

#[test]
fn fingerprint_is_stable_across_compilations() {
    let source = program(
        vec![define("id", function(&["x"], sym("x")))],
        call("id", vec![num(3.0)]),
    );
    let sequential = CompilerOptions {
        parallel: false,
        ..CompilerOptions::default()
    };
    let a = compile_program(&source, &CompilerOptions::default()).unwrap();
    let b = compile_program(&source, &sequential).unwrap();

    assert_eq!(a.main.fingerprint(), b.main.fingerprint());
    assert_eq!(a.definitions[0].1.body.fingerprint(), b.definitions[0].1.body.fingerprint());
    assert_eq!(a.disassemble(), b.disassemble());
}
