//! Lowering of IR bodies to stack-machine code units.
pub mod code_unit;
pub mod compilation_scope;
pub mod compiler;
pub mod constant;
pub mod generation_context;
pub mod label_table;
pub mod op_code;
pub mod program;
pub mod slot_allocator;

pub use code_unit::{ClosureUnit, CodeUnit, CompiledFormal};
pub use compiler::{
    Compiler,
    errors::{LoweringError, LoweringResult},
};
pub use program::{CompiledProgram, compile_program};
