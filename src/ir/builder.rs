use crate::ir::{
    expression::{Expression, LValue, LocalVariable, Temp},
    function::IrBody,
    label::Label,
    statement::Statement,
};

/// Appends statements to an [`IrBody`].
#[derive(Debug, Default)]
pub struct BodyBuilder {
    body: IrBody,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temp(&self) -> Temp {
        Temp::fresh()
    }

    pub fn local(&self, name: &str) -> LocalVariable {
        LocalVariable::fresh(name)
    }

    pub fn label(&self) -> Label {
        Label::fresh()
    }

    pub fn assign(&mut self, lhs: impl Into<LValue>, rhs: Expression) -> &mut Self {
        self.body.push(Statement::assign(lhs, rhs));
        self
    }

    pub fn eval(&mut self, expression: Expression) -> &mut Self {
        self.body.push(Statement::Expr(expression));
        self
    }

    pub fn goto(&mut self, target: Label) -> &mut Self {
        self.body.push(Statement::Goto(target));
        self
    }

    pub fn branch(&mut self, condition: Expression, true_target: Label, false_target: Label) -> &mut Self {
        self.body.push(Statement::If {
            condition,
            true_target,
            false_target,
        });
        self
    }

    pub fn ret(&mut self, value: Expression) -> &mut Self {
        self.body.push(Statement::Return(value));
        self
    }

    /// Binds `label` at the current position.
    pub fn place(&mut self, label: Label) -> &mut Self {
        self.body.bind_label(label);
        self
    }

    pub fn finish(self) -> IrBody {
        self.body
    }
}
