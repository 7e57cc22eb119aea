use crate::bytecode::op_code::{Instructions, OpCode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmittedInstruction {
    pub opcode: Option<OpCode>,
    pub position: usize,
}

/// Instruction buffer of the unit being compiled.
#[derive(Debug, Clone, Default)]
pub struct CompilationScope {
    pub instructions: Instructions,
    pub last_instruction: EmittedInstruction,
    pub previous_instruction: EmittedInstruction,
}

impl CompilationScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.instructions.len()
    }

    pub fn append(&mut self, op: OpCode, instruction: &[u8]) -> usize {
        let position = self.instructions.len();
        self.instructions.extend_from_slice(instruction);
        self.previous_instruction = self.last_instruction;
        self.last_instruction = EmittedInstruction {
            opcode: Some(op),
            position,
        };
        position
    }

    /// True when control cannot fall off the end of what was emitted.
    pub fn ends_in_transfer(&self) -> bool {
        matches!(
            self.last_instruction.opcode,
            Some(OpCode::OpReturn) | Some(OpCode::OpJump)
        )
    }
}
