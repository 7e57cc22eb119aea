use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    lang::Symbol,
    runtime::{error::EvalError, value::Value},
};

struct EnvFrame {
    vars: RefCell<HashMap<Symbol, Value>>,
    parent: Option<Env>,
}

/// A mutable variable frame with a parent chain.
///
/// Closures, promises and generated code hold environments by reference:
/// a binding made after capture is visible to everything that captured it.
#[derive(Clone)]
pub struct Env(Rc<EnvFrame>);

impl Env {
    pub fn new_global() -> Self {
        Env(Rc::new(EnvFrame {
            vars: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    pub fn child(&self) -> Self {
        Env(Rc::new(EnvFrame {
            vars: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    pub fn parent(&self) -> Option<&Env> {
        self.0.parent.as_ref()
    }

    /// Binds `name` in this frame, replacing any existing binding.
    pub fn set_variable(&self, name: Symbol, value: Value) {
        self.0.vars.borrow_mut().insert(name, value);
    }

    pub fn get_local(&self, name: &Symbol) -> Option<Value> {
        self.0.vars.borrow().get(name).cloned()
    }

    /// Nearest binding of `name`, unforced.
    pub fn find_variable(&self, name: &Symbol) -> Result<Value, EvalError> {
        let mut env = Some(self);
        while let Some(frame) = env {
            if let Some(value) = frame.get_local(name) {
                return Ok(value);
            }
            env = frame.parent();
        }
        Err(EvalError::UnboundVariable {
            name: name.to_string(),
        })
    }

    /// Nearest binding of `name` that is callable. Promises met on the way
    /// are forced; non-function bindings are skipped.
    pub fn find_function(&self, name: &Symbol) -> Result<Value, EvalError> {
        let mut env = Some(self);
        while let Some(frame) = env {
            if let Some(value) = frame.get_local(name) {
                let value = value.force()?;
                if value.category().is_some() {
                    return Ok(value);
                }
            }
            env = frame.parent();
        }
        Err(EvalError::UnresolvedFunction {
            name: name.to_string(),
        })
    }

    pub fn ptr_eq(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<environment {:p}>", Rc::as_ptr(&self.0))
    }
}
