use crate::{
    config::RuntimeOptions,
    lang::{CallNode, Sexp, Symbol},
    runtime::{
        builtin_function::{BuiltinCall, BuiltinFn},
        context::Context,
        error::EvalError,
        value::Value,
    },
};

/// Runs `func` on positional `values`.
pub(super) fn call(func: BuiltinFn, values: Vec<Value>) -> Result<Value, EvalError> {
    let names = vec![None; values.len()];
    call_named(func, names, values)
}

pub(super) fn call_named(
    func: BuiltinFn,
    names: Vec<Option<Symbol>>,
    values: Vec<Value>,
) -> Result<Value, EvalError> {
    let ctx = Context::new(RuntimeOptions::default());
    let node = CallNode::new(Sexp::symbol("f"), vec![]);
    func(&BuiltinCall {
        ctx: &ctx,
        env: ctx.global(),
        call: &node,
        names: &names,
        values: &values,
    })
}
