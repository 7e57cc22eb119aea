use crate::runtime::{builtin_function::BuiltinCall, error::EvalError, value::Value};

use super::helpers::check_arity;

/// Concatenation. Vector arguments are flattened one level; `NULL` drops out.
pub(super) fn builtin_c(call: &BuiltinCall) -> Result<Value, EvalError> {
    let mut out = Vec::with_capacity(call.values.len());
    for value in call.values {
        match value {
            Value::Null => {}
            Value::Vector(values) => out.extend(values.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    if out.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::vector(out))
}

/// Collects the arguments without flattening.
pub(super) fn builtin_list(call: &BuiltinCall) -> Result<Value, EvalError> {
    Ok(Value::vector(call.values.to_vec()))
}

pub(super) fn builtin_length(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity(call, 1)?;
    let len = call.values[0].length();
    i32::try_from(len)
        .map(Value::Int)
        .map_err(|_| EvalError::primitive("length", "length exceeds integer range"))
}

pub(super) fn builtin_identity(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity(call, 1)?;
    Ok(call.values[0].clone())
}

/// One-based element extraction.
pub(super) fn builtin_element(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity(call, 2)?;
    let index = call.values[1].as_int("subscript")?;
    call.values[0].element_at(index - 1)
}
