use std::{collections::BTreeMap, fmt};

use crate::{
    ir::{expression::IrThunk, label::Label, statement::Statement},
    lang::Symbol,
};

/// A linear statement list with labels attached to statement indexes.
///
/// A label recorded at `statements.len()` marks the end of the body; the
/// control-flow graph turns it into an empty block that returns `NULL`.
#[derive(Debug, Clone, Default)]
pub struct IrBody {
    pub statements: Vec<Statement>,
    pub labels: BTreeMap<usize, Vec<Label>>,
}

impl IrBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Binds `label` before the next statement pushed.
    pub fn bind_label(&mut self, label: Label) {
        self.labels
            .entry(self.statements.len())
            .or_default()
            .push(label);
    }

    pub fn labels_at(&self, index: usize) -> &[Label] {
        self.labels.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for IrBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..=self.statements.len() {
            for label in self.labels_at(index) {
                writeln!(f, "{}:", label)?;
            }
            if let Some(statement) = self.statements.get(index) {
                writeln!(f, "  {}", statement)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Formal {
    pub name: Symbol,
    pub default: Option<IrThunk>,
}

#[derive(Debug, Clone)]
pub struct IrFunction {
    pub name: Option<Symbol>,
    pub formals: Vec<Formal>,
    pub body: IrBody,
}

impl IrFunction {
    pub fn display_name(&self) -> &str {
        self.name.as_ref().map(Symbol::as_str).unwrap_or("<anonymous>")
    }
}
