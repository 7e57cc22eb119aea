//! Source-level objects consumed by the compiler.
//!
//! The parser lives outside this crate; programs arrive as [`Sexp`] trees
//! (usually deserialized from JSON, see [`Program`]). Call nodes stay
//! available at run time so special forms can receive their arguments
//! unevaluated.
pub mod call_node;
pub mod program;
pub mod sexp;
pub mod symbol;

pub use call_node::{Arg, CallNode};
pub use program::{Definition, Program};
pub use sexp::{FormalDef, FunctionDef, Sexp};
pub use symbol::Symbol;
