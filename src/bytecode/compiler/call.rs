use crate::{
    bytecode::{constant::MAX_CONSTANTS, op_code::OpCode},
    ir::{CallArguments, Callee, DynamicCall, PrimitiveCall},
    runtime::builtins,
};

use super::{
    Compiler,
    errors::{LoweringError, LoweringResult},
};

impl Compiler {
    /// Resolves the callee, tests its category (builtin, then closure, else
    /// special form) and emits one invocation sequence per category.
    pub(super) fn compile_dynamic_call(&mut self, call: &DynamicCall) -> LoweringResult<()> {
        self.validate_arguments(&call.args)?;

        match &call.callee {
            Callee::Name(name) => {
                let index = self.name_index(name)?;
                self.emit(OpCode::OpFindFunction, &[index]);
            }
            Callee::Expression(callee) => {
                self.compile_value(callee)?;
                let index = self.call_index(&call.args.call)?;
                self.emit(OpCode::OpCheckFunction, &[index]);
            }
        }

        let builtin_call = self.labels.fresh();
        let closure_call = self.labels.fresh();
        let finish = self.labels.fresh();

        self.emit(OpCode::OpDup, &[]);
        self.emit(OpCode::OpIsBuiltin, &[]);
        self.emit_jump(OpCode::OpJumpIfNonZero, builtin_call);
        self.emit(OpCode::OpDup, &[]);
        self.emit(OpCode::OpIsClosure, &[]);
        self.emit_jump(OpCode::OpJumpIfNonZero, closure_call);

        self.special_call(&call.args)?;
        self.emit_jump(OpCode::OpJump, finish);

        self.place(closure_call)?;
        self.closure_call(&call.args)?;
        self.emit_jump(OpCode::OpJump, finish);

        self.place(builtin_call)?;
        self.builtin_call(&call.args)?;

        self.place(finish)
    }

    /// The unevaluated call goes to the special form as is.
    fn special_call(&mut self, args: &CallArguments) -> LoweringResult<()> {
        self.load_context();
        self.load_environment();
        self.push_call_node(&args.call)?;
        self.emit(OpCode::OpApplySpecial, &[]);
        Ok(())
    }

    fn closure_call(&mut self, args: &CallArguments) -> LoweringResult<()> {
        self.emit(OpCode::OpCastClosure, &[]);
        self.load_context();
        self.push_call_node(&args.call)?;
        self.push_closure_arguments(args)?;
        self.emit(OpCode::OpApplyClosure, &[]);
        Ok(())
    }

    fn builtin_call(&mut self, args: &CallArguments) -> LoweringResult<()> {
        self.emit(OpCode::OpCastBuiltin, &[]);
        self.store_ellipsis(args);
        self.load_context();
        self.load_environment();
        self.push_call_node(&args.call)?;
        self.push_argument_names(args)?;
        self.push_argument_values(args)?;
        self.emit(OpCode::OpApplyBuiltin, &[]);
        Ok(())
    }

    /// A builtin known by name at compile time: no lookup, no category test.
    pub(super) fn compile_primitive_call(&mut self, call: &PrimitiveCall) -> LoweringResult<()> {
        self.validate_arguments(&call.args)?;
        if builtins::lookup(call.primitive.as_str()).is_none() {
            return Err(LoweringError::UnknownPrimitive(call.primitive.to_string()));
        }
        let primitive = self.primitive_index(&call.primitive)?;

        self.store_ellipsis(&call.args);
        self.load_context();
        self.load_environment();
        self.push_call_node(&call.args.call)?;
        self.push_argument_names(&call.args)?;
        self.push_argument_values(&call.args)?;
        self.emit(OpCode::OpCallPrimitive, &[primitive]);
        Ok(())
    }

    fn validate_arguments(&self, args: &CallArguments) -> LoweringResult<()> {
        if args.names.len() != args.arguments.len() {
            return Err(LoweringError::ArgumentNameMismatch {
                call: args.call.to_string(),
                names: args.names.len(),
                arguments: args.arguments.len(),
            });
        }
        if args.ellipsis_count() > 1 {
            return Err(LoweringError::MultipleEllipsis {
                call: args.call.to_string(),
            });
        }
        if args.len() >= MAX_CONSTANTS {
            return Err(LoweringError::invariant(format!(
                "`{}` has too many arguments",
                args.call
            )));
        }
        Ok(())
    }
}
