use rill::{
    ir::{BodyBuilder, ControlFlowGraph, Expression, Statement},
    lang::Sexp,
};

fn one() -> Expression {
    Expression::constant(Sexp::Double(1.0))
}

#[test]
fn branch_splits_into_three_blocks() {
    let mut b = BodyBuilder::new();
    let t = b.temp();
    let (yes, no) = (b.label(), b.label());
    b.assign(t, one())
        .branch(Expression::variable("c"), yes, no)
        .place(yes)
        .ret(t.into())
        .place(no)
        .ret(Expression::null());

    let cfg = ControlFlowGraph::build(&b.finish());
    assert_eq!(cfg.len(), 3);
    assert!(cfg.entry().labels.is_empty());
    assert_eq!(cfg.entry().statements.len(), 2);
    assert_eq!(cfg.entry().successors(), vec![yes, no]);
    assert_eq!(cfg.block_for(yes), Some(1));
    assert_eq!(cfg.block_for(no), Some(2));
    assert!(cfg.blocks()[2].successors().is_empty());
}

#[test]
fn fallthrough_into_label_becomes_goto() {
    let mut b = BodyBuilder::new();
    let t = b.temp();
    let next = b.label();
    b.assign(t, one()).place(next).ret(t.into());

    let cfg = ControlFlowGraph::build(&b.finish());
    assert_eq!(cfg.len(), 2);
    assert!(matches!(cfg.entry().terminator(), Some(Statement::Goto(target)) if *target == next));
}

#[test]
fn statements_after_a_transfer_are_dropped() {
    let mut b = BodyBuilder::new();
    let next = b.label();
    b.ret(one())
        .eval(Expression::variable("unreachable"))
        .place(next)
        .ret(Expression::null());

    let cfg = ControlFlowGraph::build(&b.finish());
    assert_eq!(cfg.len(), 2);
    assert_eq!(cfg.statements().count(), 2);
}

#[test]
fn label_at_end_of_body_returns_null() {
    let mut b = BodyBuilder::new();
    let end = b.label();
    b.goto(end).place(end);

    let cfg = ControlFlowGraph::build(&b.finish());
    assert_eq!(
        cfg.to_string(),
        format!("B0:\n  goto {end}\nB1 [{end}]:\n  return NULL\n")
    );
}

#[test]
fn every_block_ends_in_a_terminator() {
    let mut b = BodyBuilder::new();
    let (head, body, exit) = (b.label(), b.label(), b.label());
    let i = b.local("i");
    b.assign(i.clone(), Expression::int(0))
        .place(head)
        .branch(Expression::variable("done"), exit, body)
        .place(body)
        .eval(Expression::variable("work"))
        .place(exit);

    let cfg = ControlFlowGraph::build(&b.finish());
    assert_eq!(cfg.len(), 4);
    for block in cfg.blocks() {
        assert!(block.terminator().is_some(), "block without terminator:\n{cfg}");
    }
}

#[test]
fn empty_body_returns_null() {
    let cfg = ControlFlowGraph::build(&BodyBuilder::new().finish());
    assert_eq!(cfg.len(), 1);
    assert_eq!(cfg.to_string(), "B0:\n  return NULL\n");
}
