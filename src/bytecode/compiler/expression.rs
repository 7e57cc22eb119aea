use crate::{
    bytecode::{op_code::OpCode, slot_allocator::SlotKind},
    ir::{Expression, IrConstant, IrThunk, SlotKey},
};

use super::{
    Compiler,
    errors::{LoweringError, LoweringResult},
};

impl Compiler {
    /// Emits code leaving exactly one word on the stack and returns whether
    /// that word is a native integer or a runtime value.
    pub(super) fn compile_expression(&mut self, expression: &Expression) -> LoweringResult<SlotKind> {
        match expression {
            Expression::Constant(IrConstant::Int(value)) => {
                self.push_int(*value);
                Ok(SlotKind::Int)
            }
            Expression::Constant(IrConstant::Value(sexp)) => {
                self.push_literal(sexp)?;
                Ok(SlotKind::Value)
            }
            Expression::Temp(_) | Expression::LocalVariable(_) => {
                let key = expression
                    .slot_key()
                    .ok_or_else(|| LoweringError::invariant("slot operand without a key"))?;
                self.load_slot(key, expression)
            }
            Expression::EnvironmentVariable(variable) => {
                self.load_variable(&variable.name)?;
                Ok(SlotKind::Value)
            }
            Expression::ElementAccess { vector, index } => {
                self.compile_value(vector)?;
                self.compile_int(index)?;
                self.emit(OpCode::OpElementAt, &[]);
                Ok(SlotKind::Value)
            }
            Expression::Length(vector) => {
                self.compile_value(vector)?;
                self.emit(OpCode::OpLength, &[]);
                Ok(SlotKind::Int)
            }
            Expression::Increment(counter) => {
                self.compile_int(counter)?;
                self.push_int(1);
                self.emit(OpCode::OpAddInt, &[]);
                Ok(SlotKind::Int)
            }
            Expression::CmpGe(op1, op2) => {
                self.compile_value(op1)?;
                self.compile_value(op2)?;
                self.emit(OpCode::OpGreaterEqual, &[]);
                Ok(SlotKind::Value)
            }
            Expression::MakeClosure(closure) => {
                let index = self.closure_index(closure)?;
                self.load_environment();
                self.emit(OpCode::OpMakeClosure, &[index]);
                Ok(SlotKind::Value)
            }
            Expression::Thunk(thunk) => {
                self.evaluate_thunk(thunk)?;
                Ok(SlotKind::Value)
            }
            Expression::Ellipsis => Err(LoweringError::MisplacedEllipsis),
            Expression::PrimitiveCall(call) => {
                self.compile_primitive_call(call)?;
                Ok(SlotKind::Value)
            }
            Expression::DynamicCall(call) => {
                self.compile_dynamic_call(call)?;
                Ok(SlotKind::Value)
            }
        }
    }

    pub(super) fn compile_value(&mut self, expression: &Expression) -> LoweringResult<()> {
        if self.compile_expression(expression)? == SlotKind::Int {
            self.emit(OpCode::OpBoxInt, &[]);
        }
        Ok(())
    }

    pub(super) fn compile_int(&mut self, expression: &Expression) -> LoweringResult<()> {
        if self.compile_expression(expression)? == SlotKind::Value {
            self.emit(OpCode::OpUnboxInt, &[]);
        }
        Ok(())
    }

    /// Evaluates a deferred expression now: a bare name becomes a forced
    /// lookup, anything else runs the thunk's unit in the current frame's
    /// environment.
    pub(super) fn evaluate_thunk(&mut self, thunk: &IrThunk) -> LoweringResult<()> {
        if let Some(name) = thunk.variable() {
            return self.load_variable(name);
        }
        let index = self.thunk_index(thunk)?;
        self.load_context();
        self.load_environment();
        self.emit(OpCode::OpEvalThunk, &[index]);
        Ok(())
    }

    fn load_slot(&mut self, key: SlotKey, expression: &Expression) -> LoweringResult<SlotKind> {
        let slot = self.slots.lookup(key).ok_or_else(|| {
            LoweringError::invariant(format!("`{}` read before assignment", expression))
        })?;
        match slot.kind {
            SlotKind::Int => self.emit(OpCode::OpLoadInt, &[slot.index as usize]),
            SlotKind::Value => self.emit(OpCode::OpLoad, &[slot.index as usize]),
        };
        Ok(slot.kind)
    }
}
