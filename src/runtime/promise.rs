use std::{
    cell::{Cell, RefCell},
    sync::Arc,
};

use crate::{
    bytecode::CodeUnit,
    lang::{Sexp, Symbol},
    runtime::{context::Context, env::Env, error::EvalError, eval, value::Value, vm::Machine},
};

/// What a pending promise evaluates.
#[derive(Debug, Clone)]
pub enum Deferred {
    /// A bare variable reference, looked up when forced.
    Variable { name: Symbol, env: Env },
    /// A compiled thunk unit run against the captured environment.
    Compiled {
        ctx: Context,
        env: Env,
        unit: Arc<CodeUnit>,
    },
    /// An expression handed to the interpreter.
    Interpreted { ctx: Context, env: Env, expr: Sexp },
    /// A formal with neither a supplied argument nor a default.
    Missing { name: Symbol },
}

impl Deferred {
    fn evaluate(&self) -> Result<Value, EvalError> {
        match self {
            Deferred::Variable { name, env } => env.find_variable(name)?.force(),
            Deferred::Compiled { ctx, env, unit } => {
                let _guard = ctx.enter()?;
                Machine::new(ctx).execute(unit, env)
            }
            Deferred::Interpreted { ctx, env, expr } => eval::eval(ctx, env, expr),
            Deferred::Missing { name } => Err(EvalError::UnboundVariable {
                name: name.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
enum PromiseState {
    Pending(Deferred),
    Forcing,
    Forced(Value),
}

/// A lazily evaluated argument. Forcing evaluates at most once; later
/// forces return the cached value.
#[derive(Debug)]
pub struct Promise {
    state: RefCell<PromiseState>,
    evaluations: Cell<usize>,
}

impl Promise {
    pub fn new(deferred: Deferred) -> Self {
        Self {
            state: RefCell::new(PromiseState::Pending(deferred)),
            evaluations: Cell::new(0),
        }
    }

    pub fn forced(value: Value) -> Self {
        Self {
            state: RefCell::new(PromiseState::Forced(value)),
            evaluations: Cell::new(0),
        }
    }

    pub fn force(&self) -> Result<Value, EvalError> {
        let deferred = {
            let mut state = self.state.borrow_mut();
            match std::mem::replace(&mut *state, PromiseState::Forcing) {
                PromiseState::Pending(deferred) => deferred,
                PromiseState::Forced(value) => {
                    *state = PromiseState::Forced(value.clone());
                    return Ok(value);
                }
                PromiseState::Forcing => return Err(EvalError::PromiseRecursion),
            }
        };

        self.evaluations.set(self.evaluations.get() + 1);
        match deferred.evaluate() {
            Ok(value) => {
                *self.state.borrow_mut() = PromiseState::Forced(value.clone());
                Ok(value)
            }
            Err(err) => {
                *self.state.borrow_mut() = PromiseState::Pending(deferred);
                Err(err)
            }
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(&*self.state.borrow(), PromiseState::Forced(_))
    }

    /// How many times evaluation actually ran.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }
}
