use crate::runtime::{builtin_function::BuiltinCall, error::EvalError, value::Value};

use super::helpers::{Number, arg_number, check_arity, check_arity_range};

fn arithmetic(
    call: &BuiltinCall,
    name: &str,
    int_op: fn(i32, i32) -> Option<i32>,
    double_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    check_arity(call, 2)?;
    let a = arg_number(&call.values[0], name)?;
    let b = arg_number(&call.values[1], name)?;
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => int_op(a, b)
            .map(Value::Int)
            .ok_or_else(|| EvalError::primitive(name, "integer overflow")),
        (a, b) => Ok(Value::Double(double_op(a.as_f64(), b.as_f64()))),
    }
}

pub(super) fn builtin_add(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity_range(call, 1, 2)?;
    if call.values.len() == 1 {
        return Ok(call.values[0].clone());
    }
    arithmetic(call, "+", i32::checked_add, |a, b| a + b)
}

pub(super) fn builtin_sub(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity_range(call, 1, 2)?;
    if call.values.len() == 1 {
        return match arg_number(&call.values[0], "-")? {
            Number::Int(v) => v
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| EvalError::primitive("-", "integer overflow")),
            Number::Double(v) => Ok(Value::Double(-v)),
        };
    }
    arithmetic(call, "-", i32::checked_sub, |a, b| a - b)
}

pub(super) fn builtin_mul(call: &BuiltinCall) -> Result<Value, EvalError> {
    arithmetic(call, "*", i32::checked_mul, |a, b| a * b)
}

/// Division always produces a double.
pub(super) fn builtin_div(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity(call, 2)?;
    let a = arg_number(&call.values[0], "/")?.as_f64();
    let b = arg_number(&call.values[1], "/")?.as_f64();
    Ok(Value::Double(a / b))
}

fn compare(call: &BuiltinCall, name: &str, op: fn(f64, f64) -> bool) -> Result<Value, EvalError> {
    check_arity(call, 2)?;
    let a = arg_number(&call.values[0], name)?.as_f64();
    let b = arg_number(&call.values[1], name)?.as_f64();
    Ok(Value::Logical(op(a, b)))
}

pub(super) fn builtin_ge(call: &BuiltinCall) -> Result<Value, EvalError> {
    compare(call, ">=", |a, b| a >= b)
}

pub(super) fn builtin_lt(call: &BuiltinCall) -> Result<Value, EvalError> {
    compare(call, "<", |a, b| a < b)
}

pub(super) fn builtin_eq(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity(call, 2)?;
    match (&call.values[0], &call.values[1]) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Logical(a == b)),
        _ => compare(call, "==", |a, b| a == b),
    }
}

pub(super) fn builtin_not(call: &BuiltinCall) -> Result<Value, EvalError> {
    check_arity(call, 1)?;
    Ok(Value::Logical(!call.values[0].is_truthy()?))
}

/// Sum of all arguments, vectors flattened. Integer unless any operand is
/// a double.
pub(super) fn builtin_sum(call: &BuiltinCall) -> Result<Value, EvalError> {
    let mut int_total: i32 = 0;
    let mut double_total = 0.0;
    let mut is_double = false;

    let mut pending: Vec<&Value> = call.values.iter().rev().collect();
    while let Some(value) = pending.pop() {
        if let Value::Vector(values) = value {
            pending.extend(values.iter().rev());
            continue;
        }
        if matches!(value, Value::Null) {
            continue;
        }
        match arg_number(value, "sum")? {
            Number::Int(v) if !is_double => {
                int_total = int_total
                    .checked_add(v)
                    .ok_or_else(|| EvalError::primitive("sum", "integer overflow"))?;
            }
            number => {
                if !is_double {
                    double_total = int_total as f64;
                    is_double = true;
                }
                double_total += number.as_f64();
            }
        }
    }

    Ok(if is_double {
        Value::Double(double_total)
    } else {
        Value::Int(int_total)
    })
}
