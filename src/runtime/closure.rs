use std::{rc::Rc, sync::Arc};

use crate::{
    bytecode::ClosureUnit,
    lang::{CallNode, Symbol},
    runtime::{
        arg_list::{Arg, ArgList},
        context::Context,
        env::Env,
        error::EvalError,
        promise::{Deferred, Promise},
        value::Value,
        vm::Machine,
    },
};

/// A compiled function literal paired with the environment it was created
/// in.
#[derive(Debug)]
pub struct Closure {
    pub unit: Arc<ClosureUnit>,
    pub env: Env,
}

impl Closure {
    pub fn new(unit: Arc<ClosureUnit>, env: Env) -> Self {
        Self { unit, env }
    }

    /// Binds `args` to the formals in a fresh frame and runs the body.
    pub fn apply(&self, ctx: &Context, call: &CallNode, args: ArgList) -> Result<Value, EvalError> {
        let frame = self.bind_arguments(ctx, call, args)?;
        let _guard = ctx.enter()?;
        Machine::new(ctx).execute(&self.unit.body, &frame)
    }

    /// Matches supplied arguments against formals: exact names first, then
    /// positions up to `...`, then whatever is left goes to `...`.
    pub fn bind_arguments(
        &self,
        ctx: &Context,
        call: &CallNode,
        args: ArgList,
    ) -> Result<Env, EvalError> {
        let formals = &self.unit.formals;
        let dots_at = formals.iter().position(|f| f.name.is_ellipsis());
        let args = args.into_args();

        let mut bound: Vec<Option<Value>> = vec![None; formals.len()];
        let mut consumed = vec![false; args.len()];

        for (i, arg) in args.iter().enumerate() {
            let Some(name) = &arg.name else { continue };
            let Some(f) = formals
                .iter()
                .position(|formal| !formal.name.is_ellipsis() && &formal.name == name)
            else {
                continue;
            };
            if bound[f].is_some() {
                return Err(count_mismatch(
                    call,
                    format!("formal argument \"{}\" matched by multiple actual arguments", name),
                ));
            }
            bound[f] = Some(arg.value.clone());
            consumed[i] = true;
        }

        let positional_limit = dots_at.unwrap_or(formals.len());
        let mut next_formal = 0;
        for (i, arg) in args.iter().enumerate() {
            if consumed[i] || arg.name.is_some() {
                continue;
            }
            while next_formal < positional_limit && bound[next_formal].is_some() {
                next_formal += 1;
            }
            if next_formal >= positional_limit {
                break;
            }
            bound[next_formal] = Some(arg.value.clone());
            consumed[i] = true;
        }

        let rest: ArgList = args
            .into_iter()
            .zip(consumed)
            .filter(|(_, consumed)| !consumed)
            .map(|(arg, _)| arg)
            .collect();
        if dots_at.is_none() {
            if let Some(unused) = rest.iter().next() {
                return Err(count_mismatch(call, unused_argument(unused)));
            }
        }

        let frame = self.env.child();
        let mut rest = Some(rest);
        for (formal, value) in formals.iter().zip(bound) {
            if formal.name.is_ellipsis() {
                let dots = rest.take().unwrap_or_default();
                frame.set_variable(Symbol::ellipsis(), Value::Dots(Rc::new(dots)));
                continue;
            }
            match (value, &formal.default) {
                (Some(value), _) => frame.set_variable(formal.name.clone(), value),
                (None, Some(default)) => {
                    let promise = Promise::new(Deferred::Compiled {
                        ctx: ctx.clone(),
                        env: frame.clone(),
                        unit: default.clone(),
                    });
                    frame.set_variable(formal.name.clone(), Value::Promise(Rc::new(promise)));
                }
                // Bound in the frame so an outer `x` cannot stand in for it.
                (None, None) => {
                    let missing = Promise::new(Deferred::Missing {
                        name: formal.name.clone(),
                    });
                    frame.set_variable(formal.name.clone(), Value::Promise(Rc::new(missing)));
                }
            }
        }
        Ok(frame)
    }
}

fn unused_argument(arg: &Arg) -> String {
    match &arg.name {
        Some(name) => format!("unused argument ({} = {})", name, describe(&arg.value)),
        None => format!("unused argument ({})", describe(&arg.value)),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Promise(_) => "<promise>".to_string(),
        other => other.to_string(),
    }
}

#[cold]
fn count_mismatch(call: &CallNode, detail: String) -> EvalError {
    EvalError::ArgumentCountMismatch {
        call: call.to_string(),
        detail,
    }
}
