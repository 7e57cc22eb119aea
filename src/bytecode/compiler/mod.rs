//! IR-to-bytecode lowering.
//!
//! One [`Compiler`] produces one [`CodeUnit`]. Nested thunks and closure
//! literals are compiled by fresh compilers and cached in the
//! [`GenerationContext`] by node identity.
use std::sync::Arc;

use log::debug;

use crate::{
    bytecode::{
        code_unit::{ClosureUnit, CodeUnit, CompiledFormal},
        compilation_scope::CompilationScope,
        constant::MAX_CONSTANTS,
        generation_context::{FIRST_LOCAL_SLOT, GenerationContext},
        label_table::LabelTable,
        slot_allocator::SlotAllocator,
    },
    config::CompilerOptions,
    ir::{ControlFlowGraph, IrBody, IrFunction, IrThunk, MakeClosure},
};

mod arguments;
mod builder;
mod call;
pub mod errors;
mod expression;
mod statement;

pub use arguments::{BuiltinArgument, ClosureArgument};
use errors::{LoweringError, LoweringResult};


pub struct Compiler {
    pub(super) context: GenerationContext,
    pub(super) scope: CompilationScope,
    pub(super) slots: SlotAllocator,
    pub(super) labels: LabelTable,
}

impl Compiler {
    pub fn new(unit_name: impl Into<String>, options: &CompilerOptions) -> Self {
        let unit_name = unit_name.into();
        Self {
            slots: SlotAllocator::new(unit_name.clone(), FIRST_LOCAL_SLOT),
            context: GenerationContext::new(unit_name, options),
            scope: CompilationScope::new(),
            labels: LabelTable::new(),
        }
    }

    pub fn compile_body(mut self, body: &IrBody) -> LoweringResult<CodeUnit> {
        let cfg = ControlFlowGraph::build(body);
        self.plan_slots(&cfg);

        for block in cfg.blocks() {
            for label in &block.labels {
                let machine = self.labels.resolve(*label);
                self.place(machine)?;
            }
            for statement in &block.statements {
                self.compile_statement(statement)?;
            }
            if !self.scope.ends_in_transfer() {
                return Err(LoweringError::invariant(format!(
                    "block of `{}` falls through",
                    self.context.unit_name
                )));
            }
        }

        self.finish()
    }

    /// Compiles a closure literal: one unit for the body and one per
    /// default-value expression.
    pub fn compile_function(
        name: impl Into<String>,
        function: &IrFunction,
        options: &CompilerOptions,
    ) -> LoweringResult<ClosureUnit> {
        let name = name.into();
        let mut formals = Vec::with_capacity(function.formals.len());
        for formal in &function.formals {
            let default = match &formal.default {
                Some(thunk) => {
                    let unit_name = format!("{}$default_{}", name, formal.name);
                    Some(Arc::new(
                        Compiler::new(unit_name, options).compile_body(&thunk.body)?,
                    ))
                }
                None => None,
            };
            formals.push(CompiledFormal {
                name: formal.name.clone(),
                default,
            });
        }

        let body = Compiler::new(name.clone(), options).compile_body(&function.body)?;
        Ok(ClosureUnit {
            name,
            formals,
            body: Arc::new(body),
        })
    }

    pub(super) fn thunk_index(&mut self, thunk: &IrThunk) -> LoweringResult<usize> {
        if let Some(index) = self.context.thunks.get(thunk.id) {
            return Ok(index);
        }
        self.check_registry_room(self.context.thunks.len())?;
        let name = self.context.nested_name("thunk", self.context.thunks.len());
        let unit = Compiler::new(name, &self.context.options).compile_body(&thunk.body)?;
        Ok(self.context.thunks.insert(thunk.id, unit))
    }

    pub(super) fn closure_index(&mut self, closure: &MakeClosure) -> LoweringResult<usize> {
        if let Some(index) = self.context.closures.get(closure.id) {
            return Ok(index);
        }
        self.check_registry_room(self.context.closures.len())?;
        let name = match &closure.function.name {
            Some(name) => name.to_string(),
            None => self
                .context
                .nested_name("closure", self.context.closures.len()),
        };
        let unit = Compiler::compile_function(name, &closure.function, &self.context.options)?;
        Ok(self.context.closures.insert(closure.id, unit))
    }

    fn check_registry_room(&self, len: usize) -> LoweringResult<()> {
        if len >= MAX_CONSTANTS {
            return Err(LoweringError::TooManyConstants {
                unit: self.context.unit_name.clone(),
                limit: MAX_CONSTANTS,
            });
        }
        Ok(())
    }

    fn finish(self) -> LoweringResult<CodeUnit> {
        let Compiler {
            context,
            mut scope,
            slots,
            labels,
        } = self;
        labels.apply(&mut scope.instructions)?;

        debug!(
            "compiled `{}`: {} bytes, {} slots, {} constants, {} thunks, {} closures",
            context.unit_name,
            scope.instructions.len(),
            slots.num_slots(),
            context.constants.len(),
            context.thunks.len(),
            context.closures.len()
        );

        Ok(CodeUnit {
            name: context.unit_name,
            instructions: scope.instructions,
            constants: context.constants.into_constants(),
            num_slots: slots.num_slots(),
            thunks: context.thunks.into_units(),
            closures: context.closures.into_units(),
        })
    }
}
