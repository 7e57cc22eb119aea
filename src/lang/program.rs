use serde::{Deserialize, Serialize};

use crate::lang::{sexp::FunctionDef, sexp::Sexp, symbol::Symbol};

/// A named top-level function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub name: Symbol,
    pub function: FunctionDef,
}

/// The unit the command line consumes: top-level functions bound in the
/// global environment, then a body evaluated against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub definitions: Vec<Definition>,
    pub body: Sexp,
}

impl Program {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
