use std::collections::HashMap;

use crate::{
    bytecode::{
        compiler::errors::{LoweringError, LoweringResult},
        op_code::{OpCode, is_jump, make},
    },
    ir::Label,
};

/// A branch target inside one unit's instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineLabel(usize);

#[derive(Debug)]
struct Entry {
    name: String,
    position: Option<usize>,
}

/// Resolves IR labels to machine labels and patches jump operands.
///
/// An IR label gets its machine label the first time it is referenced,
/// whether by a jump or by the block that binds it, so forward and backward
/// branches share one target. Jumps are emitted with a placeholder and
/// patched once every label is bound.
#[derive(Debug, Default)]
pub struct LabelTable {
    entries: Vec<Entry>,
    by_label: HashMap<Label, MachineLabel>,
    patches: Vec<(usize, MachineLabel)>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, label: Label) -> MachineLabel {
        if let Some(machine) = self.by_label.get(&label) {
            return *machine;
        }
        let machine = self.push(label.to_string());
        self.by_label.insert(label, machine);
        machine
    }

    /// A label with no IR counterpart, used inside call sequences.
    pub fn fresh(&mut self) -> MachineLabel {
        let name = format!("anon{}", self.entries.len());
        self.push(name)
    }

    fn push(&mut self, name: String) -> MachineLabel {
        self.entries.push(Entry {
            name,
            position: None,
        });
        MachineLabel(self.entries.len() - 1)
    }

    pub fn bind(&mut self, label: MachineLabel, position: usize) -> LoweringResult<()> {
        let entry = self
            .entries
            .get_mut(label.0)
            .ok_or_else(|| LoweringError::invariant("label from another table"))?;
        if entry.position.is_some() {
            return Err(LoweringError::invariant(format!(
                "label {} bound twice",
                entry.name
            )));
        }
        entry.position = Some(position);
        Ok(())
    }

    pub fn position(&self, label: MachineLabel) -> Option<usize> {
        self.entries.get(label.0).and_then(|entry| entry.position)
    }

    /// Records that the jump at `instruction` targets `label`.
    pub fn record_patch(&mut self, instruction: usize, label: MachineLabel) {
        self.patches.push((instruction, label));
    }

    /// Rewrites every recorded jump with its bound target.
    pub fn apply(&self, instructions: &mut [u8]) -> LoweringResult<()> {
        for &(at, label) in &self.patches {
            let entry = self
                .entries
                .get(label.0)
                .ok_or_else(|| LoweringError::invariant("label from another table"))?;
            let target = entry
                .position
                .ok_or_else(|| LoweringError::UnboundLabel(entry.name.clone()))?;
            if target > u16::MAX as usize {
                return Err(LoweringError::invariant(format!(
                    "jump target {} out of range",
                    target
                )));
            }
            let op = instructions
                .get(at)
                .and_then(|byte| OpCode::try_from(*byte).ok())
                .filter(|op| is_jump(*op))
                .ok_or_else(|| {
                    LoweringError::invariant(format!("no jump at offset {} to patch", at))
                })?;
            let patched = make(op, &[target]);
            instructions[at..at + patched.len()].copy_from_slice(&patched);
        }
        Ok(())
    }
}
