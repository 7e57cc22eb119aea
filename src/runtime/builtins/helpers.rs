use crate::runtime::{builtin_function::BuiltinCall, error::EvalError, value::Value};

pub(super) fn arity_error(call: &BuiltinCall, expected: &str, got: usize) -> EvalError {
    EvalError::ArgumentCountMismatch {
        call: call.call.to_string(),
        detail: format!("{} arguments passed where {} expected", got, expected),
    }
}

pub(super) fn check_arity(call: &BuiltinCall, expected: usize) -> Result<(), EvalError> {
    if call.values.len() != expected {
        return Err(arity_error(call, &expected.to_string(), call.values.len()));
    }
    Ok(())
}

pub(super) fn check_arity_range(
    call: &BuiltinCall,
    min: usize,
    max: usize,
) -> Result<(), EvalError> {
    let got = call.values.len();
    if got < min || got > max {
        return Err(arity_error(call, &format!("{} to {}", min, max), got));
    }
    Ok(())
}

/// Numeric operand after dropping length-one vector wrapping.
pub(super) enum Number {
    Int(i32),
    Double(f64),
}

pub(super) fn arg_number(value: &Value, function: &str) -> Result<Number, EvalError> {
    match value {
        Value::Int(v) => Ok(Number::Int(*v)),
        Value::Logical(v) => Ok(Number::Int(*v as i32)),
        Value::Double(v) => Ok(Number::Double(*v)),
        Value::Vector(values) if values.len() == 1 => arg_number(&values[0], function),
        other => Err(EvalError::type_mismatch(
            format!("non-numeric argument to `{}`", function),
            "numeric",
            other.type_name(),
        )),
    }
}

impl Number {
    pub(super) fn as_f64(&self) -> f64 {
        match self {
            Number::Int(v) => *v as f64,
            Number::Double(v) => *v,
        }
    }
}

/// Text form used by `paste`.
pub(super) fn as_text(value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Int(v) => Ok(v.to_string()),
        Value::Double(v) => Ok(v.to_string()),
        Value::Logical(v) => Ok(if *v { "TRUE" } else { "FALSE" }.to_string()),
        Value::Symbol(s) => Ok(s.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(EvalError::type_mismatch(
            "cannot coerce to character",
            "character",
            other.type_name(),
        )),
    }
}
