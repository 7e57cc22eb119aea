use std::fmt;

use crate::{
    lang::{CallNode, Sexp, Symbol},
    runtime::{context::Context, env::Env, error::EvalError, eval::eval, value::Value},
};

pub type SpecialFn = fn(&Context, &Env, &CallNode) -> Result<Value, EvalError>;

/// A callable that receives the unevaluated call and decides itself what
/// to evaluate.
#[derive(Clone, Copy)]
pub struct SpecialForm {
    pub name: &'static str,
    pub func: SpecialFn,
}

impl SpecialForm {
    pub fn invoke(&self, ctx: &Context, env: &Env, call: &CallNode) -> Result<Value, EvalError> {
        (self.func)(ctx, env, call)
    }
}

impl fmt::Debug for SpecialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpecialForm({})", self.name)
    }
}

impl PartialEq for SpecialForm {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

pub static SPECIALS: &[SpecialForm] = &[
    SpecialForm {
        name: "quote",
        func: special_quote,
    },
    SpecialForm {
        name: "if",
        func: special_if,
    },
    SpecialForm {
        name: "{",
        func: special_block,
    },
    SpecialForm {
        name: "<-",
        func: special_assign,
    },
    SpecialForm {
        name: "for",
        func: special_for,
    },
];

pub fn lookup(name: &str) -> Option<SpecialForm> {
    SPECIALS.iter().find(|s| s.name == name).copied()
}

pub fn install(env: &Env) {
    for special in SPECIALS {
        env.set_variable(Symbol::from(special.name), Value::Special(*special));
    }
}

fn argument<'a>(call: &'a CallNode, index: usize, form: &str) -> Result<&'a Sexp, EvalError> {
    call.arg(index).ok_or_else(|| {
        EvalError::ArgumentCountMismatch {
            call: call.to_string(),
            detail: format!("`{}` is missing argument {}", form, index + 1),
        }
    })
}

fn special_quote(_ctx: &Context, _env: &Env, call: &CallNode) -> Result<Value, EvalError> {
    Ok(Value::from_sexp(argument(call, 0, "quote")?))
}

fn special_if(ctx: &Context, env: &Env, call: &CallNode) -> Result<Value, EvalError> {
    let condition = eval(ctx, env, argument(call, 0, "if")?)?;
    if condition.is_truthy()? {
        eval(ctx, env, argument(call, 1, "if")?)
    } else {
        match call.arg(2) {
            Some(alternative) => eval(ctx, env, alternative),
            None => Ok(Value::Null),
        }
    }
}

fn special_block(ctx: &Context, env: &Env, call: &CallNode) -> Result<Value, EvalError> {
    let mut result = Value::Null;
    for arg in &call.args {
        result = eval(ctx, env, &arg.value)?;
    }
    Ok(result)
}

fn assignment_target(target: &Sexp) -> Result<Symbol, EvalError> {
    match target {
        Sexp::Symbol(name) => Ok(name.clone()),
        Sexp::Str(name) => Ok(Symbol::from(&**name)),
        _ => Err(EvalError::primitive("<-", "invalid assignment target")),
    }
}

fn special_assign(ctx: &Context, env: &Env, call: &CallNode) -> Result<Value, EvalError> {
    let name = assignment_target(argument(call, 0, "<-")?)?;
    let value = eval(ctx, env, argument(call, 1, "<-")?)?;
    env.set_variable(name, value.clone());
    Ok(value)
}

fn special_for(ctx: &Context, env: &Env, call: &CallNode) -> Result<Value, EvalError> {
    let Some(variable) = argument(call, 0, "for")?.as_symbol() else {
        return Err(EvalError::primitive("for", "invalid for() loop sequence"));
    };
    let sequence = eval(ctx, env, argument(call, 1, "for")?)?;
    let body = argument(call, 2, "for")?;

    for index in 0..sequence.length() {
        let index = i32::try_from(index)
            .map_err(|_| EvalError::primitive("for", "sequence too long"))?;
        env.set_variable(variable.clone(), sequence.element_at(index)?);
        eval(ctx, env, body)?;
    }
    Ok(Value::Null)
}
