use std::{cell::Cell, fmt, rc::Rc};

use crate::{
    config::RuntimeOptions,
    runtime::{builtins, env::Env, error::EvalError, special},
};

struct ContextState {
    global: Env,
    options: RuntimeOptions,
    depth: Cell<usize>,
}

/// Per-evaluation state shared by every frame: the global environment,
/// runtime options and the current call depth.
#[derive(Clone)]
pub struct Context(Rc<ContextState>);

impl Context {
    /// A fresh context whose global environment holds the builtins and
    /// special forms.
    pub fn new(options: RuntimeOptions) -> Self {
        let global = Env::new_global();
        builtins::install(&global);
        special::install(&global);
        Context(Rc::new(ContextState {
            global,
            options,
            depth: Cell::new(0),
        }))
    }

    pub fn global(&self) -> &Env {
        &self.0.global
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.0.options
    }

    pub fn trace(&self) -> bool {
        self.0.options.trace
    }

    pub fn depth(&self) -> usize {
        self.0.depth.get()
    }

    /// Enters one nesting level. The level is released when the guard drops.
    pub fn enter(&self) -> Result<DepthGuard, EvalError> {
        let depth = self.0.depth.get();
        if depth >= self.0.options.max_depth {
            return Err(EvalError::DepthExceeded {
                limit: self.0.options.max_depth,
            });
        }
        self.0.depth.set(depth + 1);
        Ok(DepthGuard(self.clone()))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<context depth {}>", self.depth())
    }
}

pub struct DepthGuard(Context);

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let depth = &self.0.0.depth;
        depth.set(depth.get().saturating_sub(1));
    }
}
