use std::rc::Rc;

use crate::{
    bytecode::{constant::Constant, op_code::OpCode},
    lang::Symbol,
    runtime::{
        arg_list::{ArgList, splice_names, splice_values},
        closure::Closure,
        error::EvalError,
        eval::find_dots,
        promise::{Deferred, Promise},
        value::Value,
    },
};

use super::{Flow, Machine, Word, frame::Frame};

impl Machine {
    #[cold]
    #[inline(never)]
    fn empty_slot_err(index: usize) -> EvalError {
        EvalError::Internal(format!("read of unassigned slot {}", index))
    }

    #[cold]
    #[inline(never)]
    fn overflow_err() -> EvalError {
        EvalError::primitive("for", "integer overflow in loop counter")
    }

    #[cold]
    #[inline(never)]
    fn registry_err(kind: &str, index: usize, unit: &str) -> EvalError {
        EvalError::Internal(format!("{} {} out of range in `{}`", kind, index, unit))
    }

    pub(super) fn dispatch_instruction(
        &mut self,
        frame: &mut Frame,
        op: OpCode,
    ) -> Result<Flow, EvalError> {
        match op {
            OpCode::OpConstant => {
                let word = match frame.constant(frame.u16_operand(0))? {
                    Constant::Literal(sexp) => Word::Value(Value::from_sexp(sexp)),
                    Constant::Call(call) => Word::Call(call.clone()),
                    other => {
                        return Err(EvalError::Internal(format!(
                            "`{}` cannot be pushed",
                            other
                        )));
                    }
                };
                self.push(word);
                Ok(Flow::Next)
            }
            OpCode::OpInt => {
                self.push(Word::Int(frame.i32_operand()));
                Ok(Flow::Next)
            }
            OpCode::OpLoad => {
                let index = frame.u8_operand();
                let word = frame.slot(index)?.clone();
                if matches!(word, Word::Empty) {
                    return Err(Self::empty_slot_err(index));
                }
                self.push(word);
                Ok(Flow::Next)
            }
            OpCode::OpStore => {
                let word = self.pop()?;
                *frame.slot_mut(frame.u8_operand())? = word;
                Ok(Flow::Next)
            }
            OpCode::OpLoadInt => {
                let index = frame.u8_operand();
                match frame.slot(index)? {
                    Word::Int(value) => {
                        let value = *value;
                        self.push(Word::Int(value));
                        Ok(Flow::Next)
                    }
                    Word::Empty => Err(Self::empty_slot_err(index)),
                    other => Err(Self::word_mismatch_err("int", other)),
                }
            }
            OpCode::OpStoreInt => {
                let value = self.pop_int()?;
                *frame.slot_mut(frame.u8_operand())? = Word::Int(value);
                Ok(Flow::Next)
            }
            OpCode::OpIncLocal => {
                let index = frame.u8_operand();
                match frame.slot_mut(index)? {
                    Word::Int(value) => {
                        *value = value.checked_add(1).ok_or_else(Self::overflow_err)?;
                        Ok(Flow::Next)
                    }
                    other => Err(Self::word_mismatch_err("int", other)),
                }
            }
            OpCode::OpDup => {
                let word = self.peek()?.clone();
                self.push(word);
                Ok(Flow::Next)
            }
            OpCode::OpPop => {
                self.pop()?;
                Ok(Flow::Next)
            }
            OpCode::OpJump => Ok(Flow::Jump(frame.u16_operand(0))),
            OpCode::OpJumpIfZero => {
                if self.pop_int()? == 0 {
                    return Ok(Flow::Jump(frame.u16_operand(0)));
                }
                Ok(Flow::Next)
            }
            OpCode::OpJumpIfNonZero => {
                if self.pop_int()? != 0 {
                    return Ok(Flow::Jump(frame.u16_operand(0)));
                }
                Ok(Flow::Next)
            }
            OpCode::OpJumpIfIntLess => {
                let b = self.pop_int()?;
                let a = self.pop_int()?;
                if a < b {
                    return Ok(Flow::Jump(frame.u16_operand(0)));
                }
                Ok(Flow::Next)
            }
            OpCode::OpFindVariable => {
                let name = frame.name_constant(frame.u16_operand(0))?;
                let value = frame.env.find_variable(name)?;
                self.push_value(value);
                Ok(Flow::Next)
            }
            OpCode::OpFindFunction => {
                let name = frame.name_constant(frame.u16_operand(0))?;
                let value = frame.env.find_function(name)?;
                self.push_value(value);
                Ok(Flow::Next)
            }
            OpCode::OpSetVariable => {
                let name = frame.name_constant(frame.u16_operand(0))?;
                let value = self.pop_value()?;
                frame.env.set_variable(name.clone(), value);
                Ok(Flow::Next)
            }
            OpCode::OpForce => {
                let value = self.pop_value()?.force()?;
                self.push_value(value);
                Ok(Flow::Next)
            }
            OpCode::OpCheckFunction => {
                let call = frame.call_constant(frame.u16_operand(0))?;
                let value = self.pop_value()?.force()?;
                let callee = Self::check_function(value, call)?;
                self.push_value(callee);
                Ok(Flow::Next)
            }
            OpCode::OpIsBuiltin => {
                let value = self.pop_value()?;
                self.push(Word::Int(matches!(value, Value::Builtin(_)) as i32));
                Ok(Flow::Next)
            }
            OpCode::OpIsClosure => {
                let value = self.pop_value()?;
                self.push(Word::Int(matches!(value, Value::Closure(_)) as i32));
                Ok(Flow::Next)
            }
            OpCode::OpCastBuiltin => {
                match self.peek()? {
                    Word::Value(Value::Builtin(_)) => Ok(Flow::Next),
                    other => Err(Self::word_mismatch_err("builtin", other)),
                }
            }
            OpCode::OpCastClosure => {
                match self.peek()? {
                    Word::Value(Value::Closure(_)) => Ok(Flow::Next),
                    other => Err(Self::word_mismatch_err("closure", other)),
                }
            }
            OpCode::OpApplySpecial => {
                let result = self.apply_special()?;
                self.push_value(result);
                Ok(Flow::Next)
            }
            OpCode::OpNewArgList => {
                self.push(Word::Args(Default::default()));
                Ok(Flow::Next)
            }
            OpCode::OpArgAdd => {
                let value = self.pop_value()?;
                self.top_args()?.push(None, value);
                Ok(Flow::Next)
            }
            OpCode::OpArgAddNamed => {
                let name = frame.name_constant(frame.u16_operand(0))?;
                let value = self.pop_value()?;
                self.top_args()?.push(Some(name.clone()), value);
                Ok(Flow::Next)
            }
            OpCode::OpArgAddAll => {
                let dots = self.pop_dots()?;
                self.top_args()?.extend_from(&dots);
                Ok(Flow::Next)
            }
            OpCode::OpApplyClosure => {
                let result = self.apply_closure()?;
                self.push_value(result);
                Ok(Flow::Next)
            }
            OpCode::OpMakeVariablePromise => {
                let name = frame.name_constant(frame.u16_operand(0))?;
                let env = self.pop_env()?;
                let promise = Promise::new(Deferred::Variable {
                    name: name.clone(),
                    env,
                });
                self.push_value(Value::Promise(Rc::new(promise)));
                Ok(Flow::Next)
            }
            OpCode::OpMakeThunk => {
                let index = frame.u16_operand(0);
                let unit = frame
                    .unit
                    .thunks
                    .get(index)
                    .ok_or_else(|| Self::registry_err("thunk", index, &frame.unit.name))?;
                let env = self.pop_env()?;
                let ctx = self.pop_context()?;
                let promise = Promise::new(Deferred::Compiled {
                    ctx,
                    env,
                    unit: unit.clone(),
                });
                self.push_value(Value::Promise(Rc::new(promise)));
                Ok(Flow::Next)
            }
            OpCode::OpEvalThunk => {
                let index = frame.u16_operand(0);
                let unit = frame
                    .unit
                    .thunks
                    .get(index)
                    .ok_or_else(|| Self::registry_err("thunk", index, &frame.unit.name))?;
                let env = self.pop_env()?;
                let ctx = self.pop_context()?;
                let value = {
                    let _guard = ctx.enter()?;
                    Machine::new(&ctx).execute(unit, &env)?
                };
                self.push_value(value);
                Ok(Flow::Next)
            }
            OpCode::OpLoadEllipsis => {
                let dots = find_dots(&frame.env)?;
                self.push_value(Value::Dots(dots));
                Ok(Flow::Next)
            }
            OpCode::OpNewNames => {
                self.push(Word::Names(vec![None; frame.u16_operand(0)]));
                Ok(Flow::Next)
            }
            OpCode::OpNameAt => {
                let position = frame.u16_operand(0);
                let name = frame.name_constant(frame.u16_operand(1))?;
                let names = self.top_names()?;
                let slot = names
                    .get_mut(position)
                    .ok_or_else(|| Self::registry_err("name position", position, "names"))?;
                *slot = Some(name.clone());
                Ok(Flow::Next)
            }
            OpCode::OpSpliceNames => {
                let position = frame.u16_operand(0);
                let dots = self.pop_dots()?;
                splice_names(self.top_names()?, position, &dots)?;
                Ok(Flow::Next)
            }
            OpCode::OpNewValues => {
                self.push(Word::Values(vec![Value::Null; frame.u16_operand(0)]));
                Ok(Flow::Next)
            }
            OpCode::OpValueAt => {
                let position = frame.u16_operand(0);
                let value = self.pop_value()?;
                let values = self.top_values()?;
                let slot = values
                    .get_mut(position)
                    .ok_or_else(|| Self::registry_err("value position", position, "values"))?;
                *slot = value;
                Ok(Flow::Next)
            }
            OpCode::OpSpliceValues => {
                let position = frame.u16_operand(0);
                let dots = self.pop_dots()?;
                splice_values(self.top_values()?, position, &dots)?;
                Ok(Flow::Next)
            }
            OpCode::OpApplyBuiltin => {
                let result = self.apply_builtin()?;
                self.push_value(result);
                Ok(Flow::Next)
            }
            OpCode::OpCallPrimitive => {
                let name = frame.name_constant(frame.u16_operand(0))?;
                let result = self.call_primitive(name)?;
                self.push_value(result);
                Ok(Flow::Next)
            }
            OpCode::OpElementAt => {
                let index = self.pop_int()?;
                let vector = self.pop_value()?;
                self.push_value(vector.element_at(index)?);
                Ok(Flow::Next)
            }
            OpCode::OpLength => {
                let vector = self.pop_value()?;
                let len = i32::try_from(vector.length())
                    .map_err(|_| EvalError::primitive("length", "length exceeds integer range"))?;
                self.push(Word::Int(len));
                Ok(Flow::Next)
            }
            OpCode::OpAddInt => {
                let b = self.pop_int()?;
                let a = self.pop_int()?;
                self.push(Word::Int(a.checked_add(b).ok_or_else(Self::overflow_err)?));
                Ok(Flow::Next)
            }
            OpCode::OpGreaterEqual => {
                let b = self.pop_value()?.as_double(">=")?;
                let a = self.pop_value()?.as_double(">=")?;
                self.push_value(Value::Logical(a >= b));
                Ok(Flow::Next)
            }
            OpCode::OpMakeClosure => {
                let index = frame.u16_operand(0);
                let unit = frame
                    .unit
                    .closures
                    .get(index)
                    .ok_or_else(|| Self::registry_err("closure", index, &frame.unit.name))?;
                let env = self.pop_env()?;
                self.push_value(Value::Closure(Rc::new(Closure::new(unit.clone(), env))));
                Ok(Flow::Next)
            }
            OpCode::OpTruthy => {
                let value = self.pop_value()?;
                self.push(Word::Int(value.is_truthy()? as i32));
                Ok(Flow::Next)
            }
            OpCode::OpBoxInt => {
                let value = self.pop_int()?;
                self.push_value(Value::Int(value));
                Ok(Flow::Next)
            }
            OpCode::OpUnboxInt => {
                let value = self.pop_value()?.as_int("integer operand")?;
                self.push(Word::Int(value));
                Ok(Flow::Next)
            }
            OpCode::OpReturn => Ok(Flow::Return(self.pop_value()?)),
        }
    }

    fn top_args(&mut self) -> Result<&mut ArgList, EvalError> {
        match self.top_mut()? {
            Word::Args(args) => Ok(args),
            other => Err(Self::word_mismatch_err("argument list", other)),
        }
    }

    fn top_names(&mut self) -> Result<&mut Vec<Option<Symbol>>, EvalError> {
        match self.top_mut()? {
            Word::Names(names) => Ok(names),
            other => Err(Self::word_mismatch_err("names", other)),
        }
    }

    fn top_values(&mut self) -> Result<&mut Vec<Value>, EvalError> {
        match self.top_mut()? {
            Word::Values(values) => Ok(values),
            other => Err(Self::word_mismatch_err("values", other)),
        }
    }
}
