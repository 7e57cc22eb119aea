//! Stack machine executing [`CodeUnit`]s.
//!
//! The machine is re-entrant: closure bodies, thunks and default arguments
//! each run in a fresh `Machine` on the Rust stack, bounded by the context's
//! depth limit.
use std::sync::Arc;

use crate::{
    bytecode::{
        CodeUnit,
        op_code::{OpCode, operand_widths},
    },
    lang::{CallNode, Symbol},
    runtime::{
        arg_list::ArgList, context::Context, env::Env, error::EvalError, value::Value,
    },
};

mod dispatch;
mod frame;
mod function_call;
mod trace;

use frame::Frame;

/// A stack or slot entry. Generated code keeps native integers, the
/// evaluation context and argument arrays unboxed.
#[derive(Debug, Clone)]
pub enum Word {
    Empty,
    Int(i32),
    Value(Value),
    Context(Context),
    Env(Env),
    Call(Arc<CallNode>),
    Names(Vec<Option<Symbol>>),
    Values(Vec<Value>),
    Args(ArgList),
}

impl Word {
    fn kind(&self) -> &'static str {
        match self {
            Word::Empty => "empty",
            Word::Int(_) => "int",
            Word::Value(_) => "value",
            Word::Context(_) => "context",
            Word::Env(_) => "environment",
            Word::Call(_) => "call",
            Word::Names(_) => "names",
            Word::Values(_) => "values",
            Word::Args(_) => "argument list",
        }
    }
}

/// What the loop does after one instruction.
enum Flow {
    Next,
    Jump(usize),
    Return(Value),
}

pub struct Machine {
    ctx: Context,
    stack: Vec<Word>,
}

impl Machine {
    pub fn new(ctx: &Context) -> Self {
        Self {
            ctx: ctx.clone(),
            stack: Vec::with_capacity(16),
        }
    }

    /// Runs `unit` with `env` as its environment and returns its value.
    pub fn execute(&mut self, unit: &CodeUnit, env: &Env) -> Result<Value, EvalError> {
        let mut frame = Frame::new(unit, &self.ctx, env);
        let base = self.stack.len();
        let trace = self.ctx.trace();

        loop {
            let Some(&byte) = unit.instructions.get(frame.ip) else {
                return Err(EvalError::Internal(format!(
                    "`{}` ran past its last instruction",
                    unit.name
                )));
            };
            let op = OpCode::try_from(byte).map_err(Self::bad_opcode_err)?;
            if trace {
                self.trace_instruction(&frame, op);
            }

            match self.dispatch_instruction(&mut frame, op)? {
                Flow::Next => frame.ip += instruction_len(op),
                Flow::Jump(target) => frame.ip = target,
                Flow::Return(value) => {
                    self.stack.truncate(base);
                    return Ok(value);
                }
            }
        }
    }

    fn push(&mut self, word: Word) {
        self.stack.push(word);
    }

    fn push_value(&mut self, value: Value) {
        self.stack.push(Word::Value(value));
    }

    fn pop(&mut self) -> Result<Word, EvalError> {
        self.stack.pop().ok_or_else(Self::stack_underflow_err)
    }

    fn peek(&self) -> Result<&Word, EvalError> {
        self.stack.last().ok_or_else(Self::stack_underflow_err)
    }

    fn pop_value(&mut self) -> Result<Value, EvalError> {
        match self.pop()? {
            Word::Value(value) => Ok(value),
            other => Err(Self::word_mismatch_err("value", &other)),
        }
    }

    fn pop_int(&mut self) -> Result<i32, EvalError> {
        match self.pop()? {
            Word::Int(value) => Ok(value),
            other => Err(Self::word_mismatch_err("int", &other)),
        }
    }

    fn pop_context(&mut self) -> Result<Context, EvalError> {
        match self.pop()? {
            Word::Context(ctx) => Ok(ctx),
            other => Err(Self::word_mismatch_err("context", &other)),
        }
    }

    fn pop_env(&mut self) -> Result<Env, EvalError> {
        match self.pop()? {
            Word::Env(env) => Ok(env),
            other => Err(Self::word_mismatch_err("environment", &other)),
        }
    }

    fn pop_call(&mut self) -> Result<Arc<CallNode>, EvalError> {
        match self.pop()? {
            Word::Call(call) => Ok(call),
            other => Err(Self::word_mismatch_err("call", &other)),
        }
    }

    fn pop_names(&mut self) -> Result<Vec<Option<Symbol>>, EvalError> {
        match self.pop()? {
            Word::Names(names) => Ok(names),
            other => Err(Self::word_mismatch_err("names", &other)),
        }
    }

    fn pop_values(&mut self) -> Result<Vec<Value>, EvalError> {
        match self.pop()? {
            Word::Values(values) => Ok(values),
            other => Err(Self::word_mismatch_err("values", &other)),
        }
    }

    fn pop_args(&mut self) -> Result<ArgList, EvalError> {
        match self.pop()? {
            Word::Args(args) => Ok(args),
            other => Err(Self::word_mismatch_err("argument list", &other)),
        }
    }

    fn pop_dots(&mut self) -> Result<std::rc::Rc<ArgList>, EvalError> {
        match self.pop_value()? {
            Value::Dots(dots) => Ok(dots),
            other => Err(EvalError::type_mismatch(
                "'...' used in an incorrect context",
                "...",
                other.type_name(),
            )),
        }
    }

    fn top_mut(&mut self) -> Result<&mut Word, EvalError> {
        self.stack.last_mut().ok_or_else(Self::stack_underflow_err)
    }

    #[cold]
    #[inline(never)]
    fn stack_underflow_err() -> EvalError {
        EvalError::Internal("stack underflow".to_string())
    }

    #[cold]
    #[inline(never)]
    fn word_mismatch_err(expected: &str, found: &Word) -> EvalError {
        EvalError::Internal(format!("expected {} on stack, found {}", expected, found.kind()))
    }

    #[cold]
    #[inline(never)]
    fn bad_opcode_err(byte: u8) -> EvalError {
        EvalError::Internal(format!("unknown opcode {}", byte))
    }
}

fn instruction_len(op: OpCode) -> usize {
    1 + operand_widths(op).iter().sum::<usize>()
}
