use std::sync::Arc;

use crate::{
    bytecode::{LoweringError, LoweringResult},
    config::CompilerOptions,
    ir::{
        builder::BodyBuilder,
        expression::{
            CallArguments, Callee, DynamicCall, EnvironmentVariable, Expression, IrThunk,
            MakeClosure, PrimitiveCall,
        },
        function::{Formal, IrBody, IrFunction},
    },
    lang::{CallNode, FunctionDef, Sexp, Symbol},
};

/// Builds IR from source expressions.
///
/// Calls become dynamic calls whose non-constant arguments are wrapped in
/// thunks with their own bodies. When `inline_control_flow` is set, `if`,
/// `for`, `{` and `<-` with a well-formed shape are expanded in place; any
/// other shape stays a call and reaches the special form at run time.
pub struct Translator<'a> {
    options: &'a CompilerOptions,
}

impl<'a> Translator<'a> {
    pub fn new(options: &'a CompilerOptions) -> Self {
        Self { options }
    }

    /// A body that evaluates `sexp` and returns its value.
    pub fn translate_body(&self, sexp: &Sexp) -> LoweringResult<IrBody> {
        let mut builder = BodyBuilder::new();
        let value = self.expression(&mut builder, sexp)?;
        builder.ret(value);
        Ok(builder.finish())
    }

    pub fn translate_function(
        &self,
        name: Option<Symbol>,
        def: &FunctionDef,
    ) -> LoweringResult<IrFunction> {
        let formals = def
            .formals
            .iter()
            .map(|formal| {
                let default = match &formal.default {
                    Some(sexp) => Some(self.thunk(sexp)?),
                    None => None,
                };
                Ok(Formal {
                    name: formal.name.clone(),
                    default,
                })
            })
            .collect::<LoweringResult<Vec<_>>>()?;

        Ok(IrFunction {
            name,
            formals,
            body: self.translate_body(&def.body)?,
        })
    }

    fn thunk(&self, sexp: &Sexp) -> LoweringResult<IrThunk> {
        Ok(IrThunk::new(sexp.clone(), self.translate_body(sexp)?))
    }

    fn expression(&self, b: &mut BodyBuilder, sexp: &Sexp) -> LoweringResult<Expression> {
        match sexp {
            Sexp::Symbol(symbol) if symbol.is_ellipsis() => Err(LoweringError::MisplacedEllipsis),
            Sexp::Symbol(symbol) => Ok(Expression::EnvironmentVariable(EnvironmentVariable {
                name: symbol.clone(),
            })),
            Sexp::Function(def) => Ok(Expression::MakeClosure(MakeClosure::new(
                self.translate_function(None, def)?,
            ))),
            Sexp::Call(call) => self.call(b, call),
            constant => Ok(Expression::constant(constant.clone())),
        }
    }

    fn call(&self, b: &mut BodyBuilder, call: &Arc<CallNode>) -> LoweringResult<Expression> {
        let unnamed = call.args.iter().all(|arg| arg.name.is_none());
        if let Some(name) = call.function_name() {
            if self.options.inline_control_flow && unnamed {
                let inlined = match name.as_str() {
                    "if" => self.inline_if(b, call)?,
                    "for" => self.inline_for(b, call)?,
                    "{" => Some(self.inline_sequence(b, call)?),
                    "<-" => self.inline_assign(b, call)?,
                    _ => None,
                };
                if let Some(expression) = inlined {
                    return Ok(expression);
                }
            }
            if self.options.is_static_primitive(name.as_str()) {
                return self.primitive_call(b, name.clone(), call);
            }
        }
        self.dynamic_call(b, call)
    }

    fn dynamic_call(&self, b: &mut BodyBuilder, call: &Arc<CallNode>) -> LoweringResult<Expression> {
        let callee = match &call.function {
            Sexp::Symbol(name) if !name.is_ellipsis() => Callee::Name(name.clone()),
            other => Callee::Expression(Box::new(self.expression(b, other)?)),
        };

        let mut arguments = Vec::with_capacity(call.args.len());
        let mut names = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let argument = if arg.value.is_ellipsis() {
                Expression::Ellipsis
            } else if arg.value.is_constant() {
                Expression::constant(arg.value.clone())
            } else {
                Expression::Thunk(self.thunk(&arg.value)?)
            };
            arguments.push(argument);
            names.push(arg.name.clone());
        }

        Ok(Expression::DynamicCall(DynamicCall {
            callee,
            args: CallArguments::new(call.clone(), arguments, names),
        }))
    }

    /// Builtin arguments are evaluated eagerly, left to right, into temps.
    fn primitive_call(
        &self,
        b: &mut BodyBuilder,
        primitive: Symbol,
        call: &Arc<CallNode>,
    ) -> LoweringResult<Expression> {
        let mut arguments = Vec::with_capacity(call.args.len());
        let mut names = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let argument = if arg.value.is_ellipsis() {
                Expression::Ellipsis
            } else {
                let value = self.expression(b, &arg.value)?;
                if value.is_trivial() {
                    value
                } else {
                    let temp = b.temp();
                    b.assign(temp, value);
                    Expression::Temp(temp)
                }
            };
            arguments.push(argument);
            names.push(arg.name.clone());
        }

        Ok(Expression::PrimitiveCall(PrimitiveCall {
            primitive,
            args: CallArguments::new(call.clone(), arguments, names),
        }))
    }

    fn inline_if(&self, b: &mut BodyBuilder, call: &CallNode) -> LoweringResult<Option<Expression>> {
        let (condition, consequent, alternative) = match call.args.as_slice() {
            [c, t] => (&c.value, &t.value, None),
            [c, t, f] => (&c.value, &t.value, Some(&f.value)),
            _ => return Ok(None),
        };

        let condition = self.expression(b, condition)?;
        let result = b.temp();
        let (true_label, false_label, done) = (b.label(), b.label(), b.label());
        b.branch(condition, true_label, false_label);

        b.place(true_label);
        let value = self.expression(b, consequent)?;
        b.assign(result, value).goto(done);

        b.place(false_label);
        let value = match alternative {
            Some(sexp) => self.expression(b, sexp)?,
            None => Expression::null(),
        };
        b.assign(result, value).goto(done);

        b.place(done);
        Ok(Some(Expression::Temp(result)))
    }

    /// `for (var in seq) body` as an integer counter loop over `seq`.
    fn inline_for(&self, b: &mut BodyBuilder, call: &CallNode) -> LoweringResult<Option<Expression>> {
        let [var, seq, body] = call.args.as_slice() else {
            return Ok(None);
        };
        let Some(var) = var.value.as_symbol().filter(|v| !v.is_ellipsis()) else {
            return Ok(None);
        };

        let sequence = b.temp();
        let value = self.expression(b, &seq.value)?;
        b.assign(sequence, value);

        let length = b.local("length");
        let counter = b.local("i");
        b.assign(length.clone(), Expression::length(Expression::Temp(sequence)));
        b.assign(counter.clone(), Expression::int(0));

        let (head, body_label, exit) = (b.label(), b.label(), b.label());
        b.place(head);
        b.branch(
            Expression::cmp_ge(
                Expression::LocalVariable(counter.clone()),
                Expression::LocalVariable(length),
            ),
            exit,
            body_label,
        );

        b.place(body_label);
        b.assign(
            EnvironmentVariable { name: var.clone() },
            Expression::element_access(
                Expression::Temp(sequence),
                Expression::LocalVariable(counter.clone()),
            ),
        );
        let value = self.expression(b, &body.value)?;
        if !value.is_trivial() {
            b.eval(value);
        }
        b.assign(
            counter.clone(),
            Expression::increment(Expression::LocalVariable(counter)),
        );
        b.goto(head);

        b.place(exit);
        Ok(Some(Expression::null()))
    }

    fn inline_sequence(&self, b: &mut BodyBuilder, call: &CallNode) -> LoweringResult<Expression> {
        let Some((last, init)) = call.args.split_last() else {
            return Ok(Expression::null());
        };
        for arg in init {
            let value = self.expression(b, &arg.value)?;
            if !value.is_trivial() {
                b.eval(value);
            }
        }
        self.expression(b, &last.value)
    }

    fn inline_assign(&self, b: &mut BodyBuilder, call: &CallNode) -> LoweringResult<Option<Expression>> {
        let [target, value] = call.args.as_slice() else {
            return Ok(None);
        };
        let Some(name) = target.value.as_symbol().filter(|n| !n.is_ellipsis()) else {
            return Ok(None);
        };

        let value = self.expression(b, &value.value)?;
        let temp = b.temp();
        b.assign(temp, value);
        b.assign(
            EnvironmentVariable { name: name.clone() },
            Expression::Temp(temp),
        );
        Ok(Some(Expression::Temp(temp)))
    }
}
