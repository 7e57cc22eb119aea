//! Three-address-code intermediate representation.
//!
//! Bodies are linear statement lists with labels attached to statement
//! indexes; [`cfg::ControlFlowGraph`] partitions them into basic blocks
//! before lowering. Expression trees own their children except for
//! [`Temp`] and [`LocalVariable`], which refer to a logical slot by id.
pub mod builder;
pub mod cfg;
pub mod expression;
pub mod function;
pub mod label;
pub mod statement;
pub mod translate;

pub use builder::BodyBuilder;
pub use cfg::{BasicBlock, ControlFlowGraph};
pub use expression::{
    CallArguments, Callee, DynamicCall, EnvironmentVariable, Expression, IrConstant, IrThunk,
    LValue, LocalVariable, MakeClosure, NodeId, PrimitiveCall, SlotKey, Temp,
};
pub use function::{Formal, IrBody, IrFunction};
pub use label::Label;
pub use statement::Statement;
pub use translate::Translator;
