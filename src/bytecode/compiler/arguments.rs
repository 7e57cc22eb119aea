use crate::{
    bytecode::op_code::OpCode,
    ir::{CallArguments, Expression, IrThunk},
    lang::Symbol,
};

use super::{Compiler, errors::LoweringResult};

/// How one argument reaches a closure.
#[derive(Debug, Clone, Copy)]
pub enum ClosureArgument<'a> {
    /// The caller's `...`, flattened into the argument list.
    Splice,
    /// Promise that looks `name` up in the caller's environment when forced.
    VariablePromise(&'a Symbol),
    /// Promise over a compiled thunk, capturing the caller's environment.
    CompiledThunk(&'a IrThunk),
    Eager(&'a Expression),
}

impl<'a> ClosureArgument<'a> {
    pub fn classify(argument: &'a Expression) -> Self {
        match argument {
            Expression::Ellipsis => ClosureArgument::Splice,
            Expression::Thunk(thunk) => match thunk.variable() {
                Some(name) => ClosureArgument::VariablePromise(name),
                None => ClosureArgument::CompiledThunk(thunk),
            },
            other => ClosureArgument::Eager(other),
        }
    }
}

/// How one argument reaches a builtin. Builtins never see a promise.
#[derive(Debug, Clone, Copy)]
pub enum BuiltinArgument<'a> {
    /// The caller's `...`, spliced from the work slot after the arrays are
    /// built.
    Splice,
    /// Direct lookup and force, in place of building and forcing a promise.
    ForcedVariable(&'a Symbol),
    /// The thunk's unit run immediately in the caller's environment.
    EvaluatedThunk(&'a IrThunk),
    Eager(&'a Expression),
}

impl<'a> BuiltinArgument<'a> {
    pub fn classify(argument: &'a Expression) -> Self {
        match argument {
            Expression::Ellipsis => BuiltinArgument::Splice,
            Expression::Thunk(thunk) => match thunk.variable() {
                Some(name) => BuiltinArgument::ForcedVariable(name),
                None => BuiltinArgument::EvaluatedThunk(thunk),
            },
            other => BuiltinArgument::Eager(other),
        }
    }
}

impl Compiler {
    /// Pushes the argument list for a closure call. Expects `ctx, call` on
    /// the stack already.
    pub(super) fn push_closure_arguments(&mut self, args: &CallArguments) -> LoweringResult<()> {
        self.emit(OpCode::OpNewArgList, &[]);
        for (argument, name) in args.arguments.iter().zip(&args.names) {
            match ClosureArgument::classify(argument) {
                ClosureArgument::Splice => {
                    self.emit(OpCode::OpLoadEllipsis, &[]);
                    self.emit(OpCode::OpArgAddAll, &[]);
                    continue;
                }
                ClosureArgument::VariablePromise(variable) => {
                    let index = self.name_index(variable)?;
                    self.load_environment();
                    self.emit(OpCode::OpMakeVariablePromise, &[index]);
                }
                ClosureArgument::CompiledThunk(thunk) => {
                    let index = self.thunk_index(thunk)?;
                    self.load_context();
                    self.load_environment();
                    self.emit(OpCode::OpMakeThunk, &[index]);
                }
                ClosureArgument::Eager(expression) => self.compile_value(expression)?,
            }
            match name {
                Some(name) => {
                    let index = self.name_index(name)?;
                    self.emit(OpCode::OpArgAddNamed, &[index]);
                }
                None => {
                    self.emit(OpCode::OpArgAdd, &[]);
                }
            }
        }
        Ok(())
    }

    /// Parks the caller's `...` in the work slot when the call splices it.
    pub(super) fn store_ellipsis(&mut self, args: &CallArguments) {
        if args.has_ellipsis() {
            self.emit(OpCode::OpLoadEllipsis, &[]);
            self.store_work();
        }
    }

    /// Name array: allocated for every call, filled at tagged positions,
    /// then spliced with the names of `...`.
    pub(super) fn push_argument_names(&mut self, args: &CallArguments) -> LoweringResult<()> {
        self.emit(OpCode::OpNewNames, &[args.len()]);
        for (position, name) in args.names.iter().enumerate() {
            if let Some(name) = name {
                let index = self.name_index(name)?;
                self.emit(OpCode::OpNameAt, &[position, index]);
            }
        }
        if let Some(position) = args.ellipsis_index() {
            self.load_work();
            self.emit(OpCode::OpSpliceNames, &[position]);
        }
        Ok(())
    }

    /// Value array: every argument evaluated now, left to right, then the
    /// forced values of `...` spliced in.
    pub(super) fn push_argument_values(&mut self, args: &CallArguments) -> LoweringResult<()> {
        self.emit(OpCode::OpNewValues, &[args.len()]);
        for (position, argument) in args.arguments.iter().enumerate() {
            match BuiltinArgument::classify(argument) {
                BuiltinArgument::Splice => continue,
                BuiltinArgument::ForcedVariable(name) => self.load_variable(name)?,
                BuiltinArgument::EvaluatedThunk(thunk) => self.evaluate_thunk(thunk)?,
                BuiltinArgument::Eager(expression) => self.compile_value(expression)?,
            }
            self.emit(OpCode::OpValueAt, &[position]);
        }
        if let Some(position) = args.ellipsis_index() {
            self.load_work();
            self.emit(OpCode::OpSpliceValues, &[position]);
        }
        Ok(())
    }
}
