use crate::{
    bytecode::{
        op_code::OpCode,
        slot_allocator::{Slot, SlotKind},
    },
    ir::{ControlFlowGraph, Expression, IrConstant, LValue, Label, SlotKey, Statement},
};

use super::{
    Compiler,
    errors::{LoweringError, LoweringResult},
};

impl Compiler {
    /// Settles slot kinds from every assignment before any code is emitted,
    /// so a temp assigned in two branches gets one kind.
    pub(super) fn plan_slots(&mut self, cfg: &ControlFlowGraph) {
        for block in cfg.blocks() {
            for statement in &block.statements {
                let Statement::Assignment { lhs, rhs } = statement else {
                    continue;
                };
                if let Some(key) = lhs.slot_key() {
                    let kind = self.kind_for(rhs);
                    self.slots.plan(key, kind);
                }
            }
        }
    }

    pub(super) fn compile_statement(&mut self, statement: &Statement) -> LoweringResult<()> {
        match statement {
            Statement::Assignment { lhs, rhs } => self.compile_assignment(lhs, rhs),
            Statement::Expr(expression) => {
                self.compile_expression(expression)?;
                self.emit(OpCode::OpPop, &[]);
                Ok(())
            }
            Statement::Goto(target) => {
                let target = self.labels.resolve(*target);
                self.emit_jump(OpCode::OpJump, target);
                Ok(())
            }
            Statement::If {
                condition,
                true_target,
                false_target,
            } => self.compile_if(condition, *true_target, *false_target),
            Statement::Return(value) => {
                self.compile_value(value)?;
                self.emit(OpCode::OpReturn, &[]);
                Ok(())
            }
        }
    }

    fn compile_assignment(&mut self, lhs: &LValue, rhs: &Expression) -> LoweringResult<()> {
        if let LValue::Environment(variable) = lhs {
            self.compile_value(rhs)?;
            let index = self.name_index(&variable.name)?;
            self.emit(OpCode::OpSetVariable, &[index]);
            return Ok(());
        }
        let key = lhs
            .slot_key()
            .ok_or_else(|| LoweringError::invariant(format!("`{}` has no slot", lhs)))?;

        if let Some(slot) = self.increment_in_place(key, rhs) {
            self.emit(OpCode::OpIncLocal, &[slot.index as usize]);
            return Ok(());
        }

        let slot = self.slots.slot_for(key, self.kind_for(rhs))?;
        match slot.kind {
            SlotKind::Int => {
                self.compile_int(rhs)?;
                self.emit(OpCode::OpStoreInt, &[slot.index as usize]);
            }
            SlotKind::Value => {
                self.compile_value(rhs)?;
                self.emit(OpCode::OpStore, &[slot.index as usize]);
            }
        }
        Ok(())
    }

    /// `x := increment(x)` on an integer slot.
    fn increment_in_place(&self, key: SlotKey, rhs: &Expression) -> Option<Slot> {
        if !self.context.options.integer_fast_path {
            return None;
        }
        let Expression::Increment(counter) = rhs else {
            return None;
        };
        if counter.slot_key() != Some(key) {
            return None;
        }
        self.slots
            .lookup(key)
            .filter(|slot| slot.kind == SlotKind::Int)
    }

    /// Kind of a slot first assigned from `rhs`.
    fn kind_for(&self, rhs: &Expression) -> SlotKind {
        if !self.context.options.integer_fast_path {
            return SlotKind::Value;
        }
        match rhs {
            Expression::Constant(IrConstant::Int(_))
            | Expression::Length(_)
            | Expression::Increment(_) => SlotKind::Int,
            _ => SlotKind::Value,
        }
    }

    fn compile_if(
        &mut self,
        condition: &Expression,
        true_target: Label,
        false_target: Label,
    ) -> LoweringResult<()> {
        let true_label = self.labels.resolve(true_target);
        let false_label = self.labels.resolve(false_target);

        if let Some((op1, op2)) = self.integer_comparison(condition) {
            self.emit(OpCode::OpLoadInt, &[op1.index as usize]);
            self.emit(OpCode::OpLoadInt, &[op2.index as usize]);
            self.emit_jump(OpCode::OpJumpIfIntLess, false_label);
        } else {
            self.compile_value(condition)?;
            self.emit(OpCode::OpTruthy, &[]);
            self.emit_jump(OpCode::OpJumpIfZero, false_label);
        }
        self.emit_jump(OpCode::OpJump, true_label);
        Ok(())
    }

    /// Both operands of `a >= b` held in integer slots.
    fn integer_comparison(&self, condition: &Expression) -> Option<(Slot, Slot)> {
        if !self.context.options.integer_fast_path {
            return None;
        }
        let Expression::CmpGe(op1, op2) = condition else {
            return None;
        };
        let int_slot = |operand: &Expression| {
            operand
                .slot_key()
                .and_then(|key| self.slots.lookup(key))
                .filter(|slot| slot.kind == SlotKind::Int)
        };
        Some((int_slot(op1)?, int_slot(op2)?))
    }
}
