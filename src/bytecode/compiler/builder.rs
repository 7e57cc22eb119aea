use std::sync::Arc;

use crate::{
    bytecode::{
        generation_context::{CONTEXT_SLOT, ENVIRONMENT_SLOT, WORK_SLOT},
        label_table::MachineLabel,
        op_code::{OpCode, int_operand, make},
    },
    lang::{CallNode, Sexp, Symbol},
};

use super::{Compiler, errors::LoweringResult};

/// Placeholder operand of a jump until the label table patches it.
const UNPATCHED_JUMP: usize = 9999;

impl Compiler {
    pub(super) fn emit(&mut self, op_code: OpCode, operands: &[usize]) -> usize {
        let instruction = make(op_code, operands);
        self.scope.append(op_code, &instruction)
    }

    pub(super) fn emit_jump(&mut self, op_code: OpCode, target: MachineLabel) -> usize {
        let pos = self.emit(op_code, &[UNPATCHED_JUMP]);
        self.labels.record_patch(pos, target);
        pos
    }

    /// Binds `label` to the next instruction emitted.
    pub(super) fn place(&mut self, label: MachineLabel) -> LoweringResult<()> {
        self.labels.bind(label, self.scope.position())
    }

    pub(super) fn load_context(&mut self) {
        self.emit(OpCode::OpLoad, &[CONTEXT_SLOT as usize]);
    }

    pub(super) fn load_environment(&mut self) {
        self.emit(OpCode::OpLoad, &[ENVIRONMENT_SLOT as usize]);
    }

    pub(super) fn store_work(&mut self) {
        self.emit(OpCode::OpStore, &[WORK_SLOT as usize]);
    }

    pub(super) fn load_work(&mut self) {
        self.emit(OpCode::OpLoad, &[WORK_SLOT as usize]);
    }

    pub(super) fn push_literal(&mut self, value: &Sexp) -> LoweringResult<()> {
        let index = self.context.constants.literal(value.clone())?;
        self.emit(OpCode::OpConstant, &[index]);
        Ok(())
    }

    pub(super) fn push_int(&mut self, value: i32) {
        self.emit(OpCode::OpInt, &[int_operand(value)]);
    }

    pub(super) fn push_call_node(&mut self, call: &Arc<CallNode>) -> LoweringResult<()> {
        let index = self.context.constants.call(call)?;
        self.emit(OpCode::OpConstant, &[index]);
        Ok(())
    }

    pub(super) fn name_index(&mut self, name: &Symbol) -> LoweringResult<usize> {
        self.context.constants.name(name)
    }

    pub(super) fn call_index(&mut self, call: &Arc<CallNode>) -> LoweringResult<usize> {
        self.context.constants.call(call)
    }

    pub(super) fn primitive_index(&mut self, name: &Symbol) -> LoweringResult<usize> {
        self.context.constants.primitive(name)
    }

    /// Environment lookup of an ordinary variable, forced.
    pub(super) fn load_variable(&mut self, name: &Symbol) -> LoweringResult<()> {
        let index = self.name_index(name)?;
        self.emit(OpCode::OpFindVariable, &[index]);
        self.emit(OpCode::OpForce, &[]);
        Ok(())
    }
}
