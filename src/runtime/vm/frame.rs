use crate::{
    bytecode::{
        CodeUnit,
        constant::Constant,
        generation_context::{CONTEXT_SLOT, ENVIRONMENT_SLOT, FIRST_LOCAL_SLOT},
        op_code::{read_u8, read_u16, read_u32},
    },
    lang::{CallNode, Symbol},
    runtime::{context::Context, env::Env, error::EvalError},
};

use super::Word;

/// Activation of one code unit: its slots and instruction pointer.
pub struct Frame<'a> {
    pub unit: &'a CodeUnit,
    pub env: Env,
    pub ip: usize,
    pub slots: Vec<Word>,
}

impl<'a> Frame<'a> {
    pub fn new(unit: &'a CodeUnit, ctx: &Context, env: &Env) -> Self {
        let mut slots = vec![Word::Empty; unit.num_slots.max(FIRST_LOCAL_SLOT)];
        slots[CONTEXT_SLOT as usize] = Word::Context(ctx.clone());
        slots[ENVIRONMENT_SLOT as usize] = Word::Env(env.clone());
        Self {
            unit,
            env: env.clone(),
            ip: 0,
            slots,
        }
    }

    pub fn u8_operand(&self) -> usize {
        read_u8(&self.unit.instructions, self.ip + 1) as usize
    }

    pub fn u16_operand(&self, n: usize) -> usize {
        read_u16(&self.unit.instructions, self.ip + 1 + 2 * n) as usize
    }

    pub fn i32_operand(&self) -> i32 {
        read_u32(&self.unit.instructions, self.ip + 1) as i32
    }

    pub fn slot(&self, index: usize) -> Result<&Word, EvalError> {
        self.slots
            .get(index)
            .ok_or_else(|| EvalError::Internal(format!("slot {} out of range", index)))
    }

    pub fn slot_mut(&mut self, index: usize) -> Result<&mut Word, EvalError> {
        self.slots
            .get_mut(index)
            .ok_or_else(|| EvalError::Internal(format!("slot {} out of range", index)))
    }

    pub fn constant(&self, index: usize) -> Result<&'a Constant, EvalError> {
        self.unit.constants.get(index).ok_or_else(|| {
            EvalError::Internal(format!(
                "constant {} out of range in `{}`",
                index, self.unit.name
            ))
        })
    }

    pub fn name_constant(&self, index: usize) -> Result<&'a Symbol, EvalError> {
        match self.constant(index)? {
            Constant::Name(name) | Constant::Primitive(name) => Ok(name),
            other => Err(EvalError::Internal(format!("expected a name, found `{}`", other))),
        }
    }

    pub fn call_constant(&self, index: usize) -> Result<&'a CallNode, EvalError> {
        match self.constant(index)? {
            Constant::Call(call) => Ok(call),
            other => Err(EvalError::Internal(format!("expected a call, found `{}`", other))),
        }
    }
}
