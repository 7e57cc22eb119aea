use crate::runtime::{builtin_function::BuiltinCall, error::EvalError, value::Value};

use super::helpers::as_text;

/// `paste(..., sep = " ")`. Vectors contribute each element.
pub(super) fn builtin_paste(call: &BuiltinCall) -> Result<Value, EvalError> {
    let sep = match call.named("sep") {
        Some(Value::Str(sep)) => sep.to_string(),
        Some(other) => {
            return Err(EvalError::type_mismatch(
                "invalid separator",
                "character",
                other.type_name(),
            ));
        }
        None => " ".to_string(),
    };

    let mut parts = Vec::new();
    for value in call.positional() {
        match value {
            Value::Vector(values) => {
                for value in values.iter() {
                    parts.push(as_text(value)?);
                }
            }
            Value::Null => {}
            other => parts.push(as_text(other)?),
        }
    }
    Ok(Value::string(&parts.join(&sep)))
}
