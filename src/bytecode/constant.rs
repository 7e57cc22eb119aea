use std::{collections::HashMap, fmt, sync::Arc};

use serde::Serialize;

use crate::{
    bytecode::compiler::errors::{LoweringError, LoweringResult},
    lang::{CallNode, Sexp, Symbol},
};

/// Largest index a two-byte operand can address.
pub const MAX_CONSTANTS: usize = u16::MAX as usize + 1;

/// An entry of a unit's constant pool. The machine rebuilds a runtime value
/// from `Literal` and `Call` entries each time they are pushed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Constant {
    Literal(Sexp),
    /// Operand of lookups, stores and named-argument instructions.
    Name(Symbol),
    /// The unevaluated call node, passed to special forms and used in
    /// runtime diagnostics.
    Call(Arc<CallNode>),
    /// A builtin resolved when the unit is loaded.
    Primitive(Symbol),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Literal(sexp) => write!(f, "{}", sexp),
            Constant::Name(name) => write!(f, "name {}", name),
            Constant::Call(call) => write!(f, "call {}", call),
            Constant::Primitive(name) => write!(f, "primitive {}", name),
        }
    }
}

/// Per-unit constant pool. Names and primitives are shared by value, call
/// nodes by identity; literals are appended as they come.
#[derive(Debug)]
pub struct ConstantPool {
    unit: String,
    constants: Vec<Constant>,
    names: HashMap<Symbol, usize>,
    primitives: HashMap<Symbol, usize>,
    calls: HashMap<usize, usize>,
}

impl ConstantPool {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            constants: Vec::new(),
            names: HashMap::new(),
            primitives: HashMap::new(),
            calls: HashMap::new(),
        }
    }

    fn push(&mut self, constant: Constant) -> LoweringResult<usize> {
        if self.constants.len() >= MAX_CONSTANTS {
            return Err(LoweringError::TooManyConstants {
                unit: self.unit.clone(),
                limit: MAX_CONSTANTS,
            });
        }
        self.constants.push(constant);
        Ok(self.constants.len() - 1)
    }

    pub fn literal(&mut self, value: Sexp) -> LoweringResult<usize> {
        self.push(Constant::Literal(value))
    }

    pub fn name(&mut self, name: &Symbol) -> LoweringResult<usize> {
        if let Some(&index) = self.names.get(name) {
            return Ok(index);
        }
        let index = self.push(Constant::Name(name.clone()))?;
        self.names.insert(name.clone(), index);
        Ok(index)
    }

    pub fn primitive(&mut self, name: &Symbol) -> LoweringResult<usize> {
        if let Some(&index) = self.primitives.get(name) {
            return Ok(index);
        }
        let index = self.push(Constant::Primitive(name.clone()))?;
        self.primitives.insert(name.clone(), index);
        Ok(index)
    }

    pub fn call(&mut self, call: &Arc<CallNode>) -> LoweringResult<usize> {
        let key = Arc::as_ptr(call) as usize;
        if let Some(&index) = self.calls.get(&key) {
            return Ok(index);
        }
        let index = self.push(Constant::Call(call.clone()))?;
        self.calls.insert(key, index);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn into_constants(self) -> Vec<Constant> {
        self.constants
    }
}
