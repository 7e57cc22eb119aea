use std::fmt;

use log::debug;

use crate::ir::{
    expression::Expression, function::IrBody, label::Label, statement::Statement,
};

#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub labels: Vec<Label>,
    pub statements: Vec<Statement>,
}

impl BasicBlock {
    fn labeled(labels: Vec<Label>) -> Self {
        Self {
            labels,
            statements: Vec::new(),
        }
    }

    /// The final control transfer. Always present once the graph is built.
    pub fn terminator(&self) -> Option<&Statement> {
        self.statements.last().filter(|s| s.is_terminator())
    }

    pub fn successors(&self) -> Vec<Label> {
        self.terminator()
            .map(Statement::successors)
            .unwrap_or_default()
    }
}

/// Basic blocks of one body, in source order. Block 0 is the entry and
/// carries no labels.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    blocks: Vec<BasicBlock>,
}

impl ControlFlowGraph {
    pub fn build(body: &IrBody) -> Self {
        let mut blocks = Vec::new();
        let mut current = Some(BasicBlock::default());

        for index in 0..=body.statements.len() {
            let labels = body.labels_at(index);
            if let Some(first) = labels.first() {
                if let Some(mut open) = current.take() {
                    open.statements.push(Statement::Goto(*first));
                    blocks.push(open);
                }
                current = Some(BasicBlock::labeled(labels.to_vec()));
            }

            let Some(statement) = body.statements.get(index) else {
                break;
            };
            match current.as_mut() {
                Some(block) => block.statements.push(statement.clone()),
                None => debug!("dropping unreachable statement `{}`", statement),
            }
            if statement.is_terminator()
                && let Some(done) = current.take()
            {
                blocks.push(done);
            }
        }

        if let Some(mut open) = current {
            open.statements.push(Statement::Return(Expression::null()));
            blocks.push(open);
        }

        Self { blocks }
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn entry(&self) -> &BasicBlock {
        &self.blocks[0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Index of the block `label` is bound to.
    pub fn block_for(&self, label: Label) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.labels.contains(&label))
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.blocks.iter().flat_map(|block| block.statements.iter())
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, block) in self.blocks.iter().enumerate() {
            write!(f, "B{}", index)?;
            if !block.labels.is_empty() {
                let labels: Vec<String> = block.labels.iter().map(Label::to_string).collect();
                write!(f, " [{}]", labels.join(", "))?;
            }
            writeln!(f, ":")?;
            for statement in &block.statements {
                writeln!(f, "  {}", statement)?;
            }
        }
        Ok(())
    }
}
