use std::fmt;

use crate::{
    lang::{CallNode, Symbol},
    runtime::{context::Context, env::Env, error::EvalError, value::Value},
};

/// Everything a builtin receives: fully evaluated values with a parallel
/// array of optional names.
pub struct BuiltinCall<'a> {
    pub ctx: &'a Context,
    pub env: &'a Env,
    pub call: &'a CallNode,
    pub names: &'a [Option<Symbol>],
    pub values: &'a [Value],
}

impl BuiltinCall<'_> {
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n.as_ref().is_some_and(|n| n.as_str() == name))
            .map(|i| &self.values[i])
    }

    /// Values without a name tag, in order.
    pub fn positional(&self) -> impl Iterator<Item = &Value> {
        self.names
            .iter()
            .zip(self.values)
            .filter(|(name, _)| name.is_none())
            .map(|(_, value)| value)
    }
}

pub type BuiltinFn = fn(&BuiltinCall) -> Result<Value, EvalError>;

#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl BuiltinFunction {
    pub fn invoke(
        &self,
        ctx: &Context,
        env: &Env,
        call: &CallNode,
        names: &[Option<Symbol>],
        values: &[Value],
    ) -> Result<Value, EvalError> {
        if names.len() != values.len() {
            return Err(EvalError::Internal(format!(
                "`{}` received {} names for {} values",
                self.name,
                names.len(),
                values.len()
            )));
        }
        (self.func)(&BuiltinCall {
            ctx,
            env,
            call,
            names,
            values,
        })
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
