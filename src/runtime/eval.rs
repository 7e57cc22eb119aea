//! Tree-walking evaluation of source expressions.
//!
//! Special forms and promises created outside compiled code go through
//! here. Calls follow the same category order as generated code: builtin,
//! then closure, then special form.
use std::{rc::Rc, sync::Arc};

use crate::{
    bytecode::Compiler,
    config::CompilerOptions,
    ir::Translator,
    lang::{CallNode, FunctionDef, Sexp, Symbol},
    runtime::{
        arg_list::ArgList,
        closure::Closure,
        context::Context,
        env::Env,
        error::EvalError,
        promise::{Deferred, Promise},
        value::Value,
    },
};

pub fn eval(ctx: &Context, env: &Env, sexp: &Sexp) -> Result<Value, EvalError> {
    match sexp {
        Sexp::Symbol(name) if name.is_ellipsis() => Err(EvalError::primitive(
            "eval",
            "'...' used in an incorrect context",
        )),
        Sexp::Symbol(name) => env.find_variable(name)?.force(),
        Sexp::Function(def) => make_closure(env, def),
        Sexp::Call(call) => apply_call(ctx, env, call),
        constant => Ok(Value::from_sexp(constant)),
    }
}

/// The `...` bound in `env`.
pub fn find_dots(env: &Env) -> Result<Rc<ArgList>, EvalError> {
    match env.find_variable(&Symbol::ellipsis())? {
        Value::Dots(dots) => Ok(dots),
        other => Err(EvalError::type_mismatch(
            "'...' used in an incorrect context",
            "...",
            other.type_name(),
        )),
    }
}

fn make_closure(env: &Env, def: &FunctionDef) -> Result<Value, EvalError> {
    let options = CompilerOptions::default();
    let function = Translator::new(&options).translate_function(None, def)?;
    let unit = Compiler::compile_function("closure", &function, &options)?;
    Ok(Value::Closure(Rc::new(Closure::new(
        Arc::new(unit),
        env.clone(),
    ))))
}

fn resolve_callee(ctx: &Context, env: &Env, call: &CallNode) -> Result<Value, EvalError> {
    match &call.function {
        Sexp::Symbol(name) if !name.is_ellipsis() => env.find_function(name),
        other => {
            let value = eval(ctx, env, other)?;
            if value.category().is_none() {
                return Err(EvalError::NotCallable {
                    call: call.to_string(),
                });
            }
            Ok(value)
        }
    }
}

pub fn apply_call(ctx: &Context, env: &Env, call: &CallNode) -> Result<Value, EvalError> {
    match resolve_callee(ctx, env, call)? {
        Value::Builtin(builtin) => {
            let mut names = Vec::with_capacity(call.args.len());
            let mut values = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                if arg.value.is_ellipsis() {
                    for dot in find_dots(env)?.iter() {
                        names.push(dot.name.clone());
                        values.push(dot.value.force()?);
                    }
                    continue;
                }
                names.push(arg.name.clone());
                values.push(eval(ctx, env, &arg.value)?);
            }
            builtin.invoke(ctx, env, call, &names, &values)
        }
        Value::Closure(closure) => {
            let args = promise_arguments(ctx, env, call)?;
            closure.apply(ctx, call, args)
        }
        Value::Special(special) => special.invoke(ctx, env, call),
        other => Err(EvalError::Internal(format!(
            "callee of `{}` resolved to {}",
            call,
            other.type_name()
        ))),
    }
}

/// Closure arguments: constants as is, bare names as variable promises,
/// anything else as an interpreted promise.
fn promise_arguments(ctx: &Context, env: &Env, call: &CallNode) -> Result<ArgList, EvalError> {
    let mut args = ArgList::new();
    for arg in &call.args {
        let value = match &arg.value {
            sexp if sexp.is_ellipsis() => {
                let dots = find_dots(env)?;
                args.extend_from(&dots);
                continue;
            }
            sexp if sexp.is_constant() => Value::from_sexp(sexp),
            Sexp::Symbol(name) => Value::Promise(Rc::new(Promise::new(Deferred::Variable {
                name: name.clone(),
                env: env.clone(),
            }))),
            expr => Value::Promise(Rc::new(Promise::new(Deferred::Interpreted {
                ctx: ctx.clone(),
                env: env.clone(),
                expr: expr.clone(),
            }))),
        };
        args.push(arg.name.clone(), value);
    }
    Ok(args)
}
