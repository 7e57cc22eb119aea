use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::lang::{
    call_node::{Arg, CallNode},
    symbol::Symbol,
};

/// An unevaluated source expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sexp {
    Null,
    Logical(bool),
    Int(i32),
    Double(f64),
    Str(Arc<str>),
    Symbol(Symbol),
    Call(Arc<CallNode>),
    Function(Arc<FunctionDef>),
}

/// A formal parameter of a function literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormalDef {
    pub name: Symbol,
    #[serde(default)]
    pub default: Option<Sexp>,
}

/// A `function(formals) body` literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub formals: Vec<FormalDef>,
    pub body: Sexp,
}

impl Sexp {
    pub fn symbol(name: &str) -> Self {
        Sexp::Symbol(Symbol::from(name))
    }

    pub fn string(value: &str) -> Self {
        Sexp::Str(Arc::from(value))
    }

    /// Builds `name(args...)`.
    pub fn call(name: &str, args: Vec<Arg>) -> Self {
        Sexp::Call(Arc::new(CallNode::new(Sexp::symbol(name), args)))
    }

    pub fn function(formals: Vec<FormalDef>, body: Sexp) -> Self {
        Sexp::Function(Arc::new(FunctionDef { formals, body }))
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Sexp::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&Arc<CallNode>> {
        match self {
            Sexp::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Self-evaluating literals. These never need a promise.
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Sexp::Null | Sexp::Logical(_) | Sexp::Int(_) | Sexp::Double(_) | Sexp::Str(_)
        )
    }

    pub fn is_ellipsis(&self) -> bool {
        self.as_symbol().is_some_and(Symbol::is_ellipsis)
    }
}

impl FormalDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: Symbol::from(name),
            default: None,
        }
    }

    pub fn with_default(name: &str, default: Sexp) -> Self {
        Self {
            name: Symbol::from(name),
            default: Some(default),
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Null => write!(f, "NULL"),
            Sexp::Logical(true) => write!(f, "TRUE"),
            Sexp::Logical(false) => write!(f, "FALSE"),
            Sexp::Int(v) => write!(f, "{}L", v),
            Sexp::Double(v) => write!(f, "{}", v),
            Sexp::Str(v) => write!(f, "\"{}\"", v),
            Sexp::Symbol(symbol) if symbol.is_syntactic() => write!(f, "{}", symbol),
            Sexp::Symbol(symbol) => write!(f, "`{}`", symbol),
            Sexp::Call(call) => write!(f, "{}", call),
            Sexp::Function(def) => write!(f, "{}", def),
        }
    }
}

impl fmt::Display for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formals: Vec<String> = self
            .formals
            .iter()
            .map(|formal| match &formal.default {
                Some(default) => format!("{} = {}", formal.name, default),
                None => formal.name.to_string(),
            })
            .collect();
        write!(f, "function({}) {}", formals.join(", "), self.body)
    }
}
