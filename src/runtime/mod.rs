//! Reference host for generated code: values, environments, promises,
//! closures, builtins and the stack machine.
//!
//! Runtime values are `Rc`-based and single-threaded. Environments are
//! mutable and shared by reference, so a closure that captures the frame it
//! is bound in forms a reference cycle; such frames are not reclaimed.
pub mod arg_list;
pub mod builtin_function;
pub mod builtins;
pub mod closure;
pub mod context;
pub mod env;
pub mod error;
pub mod eval;
pub mod promise;
pub mod special;
pub mod value;
pub mod vm;

pub use arg_list::ArgList;
pub use context::Context;
pub use env::Env;
pub use error::EvalError;
pub use value::{CallableCategory, Value};
pub use vm::Machine;
