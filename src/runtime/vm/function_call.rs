use crate::{
    lang::{CallNode, Symbol},
    runtime::{builtins, error::EvalError, value::Value},
};

use super::Machine;

impl Machine {
    /// A computed callee must be one of the three callable categories.
    pub(super) fn check_function(value: Value, call: &CallNode) -> Result<Value, EvalError> {
        if value.category().is_none() {
            return Err(EvalError::NotCallable {
                call: call.to_string(),
            });
        }
        Ok(value)
    }

    /// Stack: `callee ctx env call`.
    pub(super) fn apply_special(&mut self) -> Result<Value, EvalError> {
        let call = self.pop_call()?;
        let env = self.pop_env()?;
        let ctx = self.pop_context()?;
        match self.pop_value()? {
            Value::Special(special) => special.invoke(&ctx, &env, &call),
            other => Err(Self::callee_category_err("special", &other, &call)),
        }
    }

    /// Stack: `callee ctx call args`.
    pub(super) fn apply_closure(&mut self) -> Result<Value, EvalError> {
        let args = self.pop_args()?;
        let call = self.pop_call()?;
        let ctx = self.pop_context()?;
        match self.pop_value()? {
            Value::Closure(closure) => closure.apply(&ctx, &call, args),
            other => Err(Self::callee_category_err("closure", &other, &call)),
        }
    }

    /// Stack: `callee ctx env call names values`.
    pub(super) fn apply_builtin(&mut self) -> Result<Value, EvalError> {
        let values = self.pop_values()?;
        let names = self.pop_names()?;
        let call = self.pop_call()?;
        let env = self.pop_env()?;
        let ctx = self.pop_context()?;
        match self.pop_value()? {
            Value::Builtin(builtin) => builtin.invoke(&ctx, &env, &call, &names, &values),
            other => Err(Self::callee_category_err("builtin", &other, &call)),
        }
    }

    /// Stack: `ctx env call names values`; the builtin is named by the
    /// instruction.
    pub(super) fn call_primitive(&mut self, name: &Symbol) -> Result<Value, EvalError> {
        let builtin = builtins::lookup(name.as_str())
            .ok_or_else(|| EvalError::Internal(format!("no primitive named `{}`", name)))?;
        let values = self.pop_values()?;
        let names = self.pop_names()?;
        let call = self.pop_call()?;
        let env = self.pop_env()?;
        let ctx = self.pop_context()?;
        builtin.invoke(&ctx, &env, &call, &names, &values)
    }

    #[cold]
    #[inline(never)]
    fn callee_category_err(expected: &str, found: &Value, call: &CallNode) -> EvalError {
        EvalError::Internal(format!(
            "{} branch of `{}` reached with a {}",
            expected,
            call,
            found.type_name()
        ))
    }
}
