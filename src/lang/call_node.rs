use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lang::{sexp::Sexp, symbol::Symbol};

/// One supplied argument of a call, optionally tagged with a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    #[serde(default)]
    pub name: Option<Symbol>,
    pub value: Sexp,
}

impl Arg {
    pub fn positional(value: Sexp) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: &str, value: Sexp) -> Self {
        Self {
            name: Some(Symbol::from(name)),
            value,
        }
    }

    pub fn ellipsis() -> Self {
        Self::positional(Sexp::Symbol(Symbol::ellipsis()))
    }
}

/// A call as written in the source, before any argument is evaluated.
///
/// Compiled code embeds the node for three reasons: special forms receive
/// it in place of evaluated arguments, closures use it for argument
/// matching errors, and every runtime error names the offending call text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallNode {
    pub function: Sexp,
    pub args: Vec<Arg>,
}

impl CallNode {
    pub fn new(function: Sexp, args: Vec<Arg>) -> Self {
        Self { function, args }
    }

    pub fn function_name(&self) -> Option<&Symbol> {
        self.function.as_symbol()
    }

    pub fn arg(&self, index: usize) -> Option<&Sexp> {
        self.args.get(index).map(|arg| &arg.value)
    }

    pub fn named_arg(&self, name: &str) -> Option<&Sexp> {
        self.args
            .iter()
            .find(|arg| arg.name.as_ref().is_some_and(|n| n.as_str() == name))
            .map(|arg| &arg.value)
    }

    pub fn has_ellipsis(&self) -> bool {
        self.args.iter().any(|arg| arg.value.is_ellipsis())
    }
}

impl fmt::Display for CallNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Sexp::Symbol(name) if name.is_syntactic() => write!(f, "{}", name)?,
            Sexp::Symbol(name) => write!(f, "`{}`", name)?,
            Sexp::Function(def) => write!(f, "({})", def)?,
            other => write!(f, "{}", other)?,
        }
        write!(f, "(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match &arg.name {
                Some(name) => write!(f, "{} = {}", name, arg.value)?,
                None => write!(f, "{}", arg.value)?,
            }
        }
        write!(f, ")")
    }
}
