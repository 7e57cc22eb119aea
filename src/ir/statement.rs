use std::fmt;

use crate::ir::{
    expression::{Expression, LValue},
    label::Label,
};

#[derive(Debug, Clone)]
pub enum Statement {
    Assignment {
        lhs: LValue,
        rhs: Expression,
    },
    /// Evaluated for effect; the value is discarded.
    Expr(Expression),
    Goto(Label),
    If {
        condition: Expression,
        true_target: Label,
        false_target: Label,
    },
    Return(Expression),
}

impl Statement {
    pub fn assign(lhs: impl Into<LValue>, rhs: Expression) -> Self {
        Statement::Assignment {
            lhs: lhs.into(),
            rhs,
        }
    }

    /// Only control transfers may end a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Statement::Goto(_) | Statement::If { .. } | Statement::Return(_)
        )
    }

    /// Labels this statement may transfer control to.
    pub fn successors(&self) -> Vec<Label> {
        match self {
            Statement::Goto(target) => vec![*target],
            Statement::If {
                true_target,
                false_target,
                ..
            } => vec![*true_target, *false_target],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assignment { lhs, rhs } => write!(f, "{} := {}", lhs, rhs),
            Statement::Expr(rhs) => write!(f, "{}", rhs),
            Statement::Goto(target) => write!(f, "goto {}", target),
            Statement::If {
                condition,
                true_target,
                false_target,
            } => write!(
                f,
                "if {} => {} else {}",
                condition, true_target, false_target
            ),
            Statement::Return(value) => write!(f, "return {}", value),
        }
    }
}
