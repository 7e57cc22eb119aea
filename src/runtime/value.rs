use std::{fmt, rc::Rc};

use crate::{
    lang::{Sexp, Symbol},
    runtime::{
        arg_list::ArgList, builtin_function::BuiltinFunction, closure::Closure, error::EvalError,
        promise::Promise, special::SpecialForm,
    },
};

/// The three ways a value can be invoked. Exactly one applies to any
/// callable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableCategory {
    Builtin,
    Closure,
    Special,
}

/// Runtime value.
///
/// Heap-backed variants are `Rc`-shared and never copied on assignment.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Logical(bool),
    Int(i32),
    Double(f64),
    Str(Rc<str>),
    Vector(Rc<Vec<Value>>),
    Symbol(Symbol),
    /// A quoted call or function literal.
    Language(Sexp),
    Promise(Rc<Promise>),
    Closure(Rc<Closure>),
    Builtin(BuiltinFunction),
    Special(SpecialForm),
    /// The arguments bound to `...`.
    Dots(Rc<ArgList>),
}

impl Value {
    /// Type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Logical(_) => "logical",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::Str(_) => "character",
            Value::Vector(_) => "list",
            Value::Symbol(_) => "symbol",
            Value::Language(_) => "language",
            Value::Promise(_) => "promise",
            Value::Closure(_) => "closure",
            Value::Builtin(_) => "builtin",
            Value::Special(_) => "special",
            Value::Dots(_) => "...",
        }
    }

    pub fn string(value: &str) -> Self {
        Value::Str(Rc::from(value))
    }

    pub fn vector(values: Vec<Value>) -> Self {
        Value::Vector(Rc::new(values))
    }

    /// The value a literal evaluates to. Symbols and calls are quoted.
    pub fn from_sexp(sexp: &Sexp) -> Self {
        match sexp {
            Sexp::Null => Value::Null,
            Sexp::Logical(v) => Value::Logical(*v),
            Sexp::Int(v) => Value::Int(*v),
            Sexp::Double(v) => Value::Double(*v),
            Sexp::Str(v) => Value::Str(Rc::from(&**v)),
            Sexp::Symbol(symbol) => Value::Symbol(symbol.clone()),
            Sexp::Call(_) | Sexp::Function(_) => Value::Language(sexp.clone()),
        }
    }

    pub fn category(&self) -> Option<CallableCategory> {
        match self {
            Value::Builtin(_) => Some(CallableCategory::Builtin),
            Value::Closure(_) => Some(CallableCategory::Closure),
            Value::Special(_) => Some(CallableCategory::Special),
            _ => None,
        }
    }

    /// Forces a promise; any other value is returned as is.
    pub fn force(&self) -> Result<Value, EvalError> {
        match self {
            Value::Promise(promise) => promise.force(),
            other => Ok(other.clone()),
        }
    }

    pub fn length(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Vector(values) => values.len(),
            Value::Dots(args) => args.len(),
            _ => 1,
        }
    }

    /// Zero-based element access. Scalars are vectors of length one.
    pub fn element_at(&self, index: i32) -> Result<Value, EvalError> {
        let out_of_bounds = || EvalError::primitive("[[", "subscript out of bounds");
        let index = usize::try_from(index).map_err(|_| out_of_bounds())?;
        match self {
            Value::Vector(values) => values.get(index).cloned().ok_or_else(out_of_bounds),
            Value::Null => Err(out_of_bounds()),
            scalar if index == 0 => Ok(scalar.clone()),
            _ => Err(out_of_bounds()),
        }
    }

    /// Checked narrowing to a machine integer.
    pub fn as_int(&self, context: &str) -> Result<i32, EvalError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Logical(v) => Ok(*v as i32),
            Value::Double(v) if v.fract() == 0.0 && *v >= i32::MIN as f64 && *v <= i32::MAX as f64 => {
                Ok(*v as i32)
            }
            Value::Vector(values) if values.len() == 1 => values[0].as_int(context),
            other => Err(EvalError::type_mismatch(context, "integer", other.type_name())),
        }
    }

    pub fn as_double(&self, context: &str) -> Result<f64, EvalError> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Double(v) => Ok(*v),
            Value::Logical(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Value::Vector(values) if values.len() == 1 => values[0].as_double(context),
            other => Err(EvalError::type_mismatch(context, "numeric", other.type_name())),
        }
    }

    /// Condition of `if` and loops: a single non-zero, non-missing value.
    pub fn is_truthy(&self) -> Result<bool, EvalError> {
        match self {
            Value::Logical(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::Double(v) if v.is_nan() => Err(EvalError::primitive(
                "if",
                "missing value where TRUE/FALSE needed",
            )),
            Value::Double(v) => Ok(*v != 0.0),
            Value::Vector(values) if !values.is_empty() => values[0].is_truthy(),
            other => Err(EvalError::type_mismatch(
                "argument is not interpretable as logical",
                "logical",
                other.type_name(),
            )),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Logical(a), Value::Logical(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Language(a), Value::Language(b)) => a == b,
            (Value::Promise(a), Value::Promise(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Special(a), Value::Special(b)) => a == b,
            (Value::Dots(a), Value::Dots(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Logical(true) => write!(f, "TRUE"),
            Value::Logical(false) => write!(f, "FALSE"),
            Value::Int(v) => write!(f, "{}L", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "\"{}\"", v),
            Value::Vector(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Symbol(symbol) => write!(f, "{}", symbol),
            Value::Language(sexp) => write!(f, "{}", sexp),
            Value::Promise(_) => write!(f, "<promise>"),
            Value::Closure(closure) => write!(f, "<closure {}>", closure.unit.name),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
            Value::Special(special) => write!(f, "<special {}>", special.name),
            Value::Dots(args) => write!(f, "<... length {}>", args.len()),
        }
    }
}
