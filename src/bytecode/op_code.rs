use std::fmt;

/// Machine instructions.
///
/// Operands are big-endian. One-byte operands are slot indexes; two-byte
/// operands are constant-pool indexes, registry indexes, counts or jump
/// targets; `OpInt` carries a four-byte immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    OpConstant = 0,
    OpInt = 1,
    OpLoad = 2,
    OpStore = 3,
    OpLoadInt = 4,
    OpStoreInt = 5,
    OpIncLocal = 6,
    OpDup = 7,
    OpPop = 8,
    OpJump = 9,
    OpJumpIfZero = 10,
    OpJumpIfNonZero = 11,
    OpJumpIfIntLess = 12,
    OpFindVariable = 13,
    OpFindFunction = 14,
    OpSetVariable = 15,
    OpForce = 16,
    OpCheckFunction = 17,
    OpIsBuiltin = 18,
    OpIsClosure = 19,
    OpCastBuiltin = 20,
    OpCastClosure = 21,
    OpApplySpecial = 22,
    OpNewArgList = 23,
    OpArgAdd = 24,
    OpArgAddNamed = 25,
    OpArgAddAll = 26,
    OpApplyClosure = 27,
    OpMakeVariablePromise = 28,
    OpMakeThunk = 29,
    OpEvalThunk = 30,
    OpLoadEllipsis = 31,
    OpNewNames = 32,
    OpNameAt = 33,
    OpSpliceNames = 34,
    OpNewValues = 35,
    OpValueAt = 36,
    OpSpliceValues = 37,
    OpApplyBuiltin = 38,
    OpCallPrimitive = 39,
    OpElementAt = 40,
    OpLength = 41,
    OpAddInt = 42,
    OpGreaterEqual = 43,
    OpMakeClosure = 44,
    OpTruthy = 45,
    OpBoxInt = 46,
    OpUnboxInt = 47,
    OpReturn = 48,
}

const OPCODES: [OpCode; 49] = [
    OpCode::OpConstant,
    OpCode::OpInt,
    OpCode::OpLoad,
    OpCode::OpStore,
    OpCode::OpLoadInt,
    OpCode::OpStoreInt,
    OpCode::OpIncLocal,
    OpCode::OpDup,
    OpCode::OpPop,
    OpCode::OpJump,
    OpCode::OpJumpIfZero,
    OpCode::OpJumpIfNonZero,
    OpCode::OpJumpIfIntLess,
    OpCode::OpFindVariable,
    OpCode::OpFindFunction,
    OpCode::OpSetVariable,
    OpCode::OpForce,
    OpCode::OpCheckFunction,
    OpCode::OpIsBuiltin,
    OpCode::OpIsClosure,
    OpCode::OpCastBuiltin,
    OpCode::OpCastClosure,
    OpCode::OpApplySpecial,
    OpCode::OpNewArgList,
    OpCode::OpArgAdd,
    OpCode::OpArgAddNamed,
    OpCode::OpArgAddAll,
    OpCode::OpApplyClosure,
    OpCode::OpMakeVariablePromise,
    OpCode::OpMakeThunk,
    OpCode::OpEvalThunk,
    OpCode::OpLoadEllipsis,
    OpCode::OpNewNames,
    OpCode::OpNameAt,
    OpCode::OpSpliceNames,
    OpCode::OpNewValues,
    OpCode::OpValueAt,
    OpCode::OpSpliceValues,
    OpCode::OpApplyBuiltin,
    OpCode::OpCallPrimitive,
    OpCode::OpElementAt,
    OpCode::OpLength,
    OpCode::OpAddInt,
    OpCode::OpGreaterEqual,
    OpCode::OpMakeClosure,
    OpCode::OpTruthy,
    OpCode::OpBoxInt,
    OpCode::OpUnboxInt,
    OpCode::OpReturn,
];

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OPCODES.get(byte as usize).copied().ok_or(byte)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn operand_widths(op: OpCode) -> &'static [usize] {
    match op {
        OpCode::OpInt => &[4],
        OpCode::OpLoad
        | OpCode::OpStore
        | OpCode::OpLoadInt
        | OpCode::OpStoreInt
        | OpCode::OpIncLocal => &[1],
        OpCode::OpConstant
        | OpCode::OpJump
        | OpCode::OpJumpIfZero
        | OpCode::OpJumpIfNonZero
        | OpCode::OpJumpIfIntLess
        | OpCode::OpFindVariable
        | OpCode::OpFindFunction
        | OpCode::OpSetVariable
        | OpCode::OpCheckFunction
        | OpCode::OpArgAddNamed
        | OpCode::OpMakeVariablePromise
        | OpCode::OpMakeThunk
        | OpCode::OpEvalThunk
        | OpCode::OpNewNames
        | OpCode::OpSpliceNames
        | OpCode::OpNewValues
        | OpCode::OpValueAt
        | OpCode::OpSpliceValues
        | OpCode::OpCallPrimitive
        | OpCode::OpMakeClosure => &[2],
        OpCode::OpNameAt => &[2, 2],
        _ => &[],
    }
}

pub fn is_jump(op: OpCode) -> bool {
    matches!(
        op,
        OpCode::OpJump | OpCode::OpJumpIfZero | OpCode::OpJumpIfNonZero | OpCode::OpJumpIfIntLess
    )
}

pub type Instructions = Vec<u8>;

pub fn make(op: OpCode, operands: &[usize]) -> Instructions {
    let widths = operand_widths(op);
    let mut instruction = vec![op as u8];

    for (i, operand) in operands.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(0);
        match width {
            1 => instruction.push(*operand as u8),
            2 => {
                instruction.push((*operand >> 8) as u8);
                instruction.push(*operand as u8);
            }
            4 => {
                instruction.push((*operand >> 24) as u8);
                instruction.push((*operand >> 16) as u8);
                instruction.push((*operand >> 8) as u8);
                instruction.push(*operand as u8);
            }
            _ => {}
        }
    }

    instruction
}

/// Encodes a signed immediate for `OpInt`.
pub fn int_operand(value: i32) -> usize {
    value as u32 as usize
}

pub fn read_u32(instructions: &[u8], offset: usize) -> u32 {
    ((instructions[offset] as u32) << 24)
        | ((instructions[offset + 1] as u32) << 16)
        | ((instructions[offset + 2] as u32) << 8)
        | (instructions[offset + 3] as u32)
}

pub fn read_u16(instructions: &[u8], offset: usize) -> u16 {
    ((instructions[offset] as u16) << 8) | (instructions[offset + 1] as u16)
}

pub fn read_u8(instructions: &[u8], offset: usize) -> u8 {
    instructions[offset]
}

/// Decodes the operands of the instruction at `ip`, returning them with the
/// offset of the next instruction.
pub fn read_operands(op: OpCode, instructions: &[u8], ip: usize) -> (Vec<usize>, usize) {
    let mut operands = Vec::new();
    let mut offset = ip + 1;

    for &width in operand_widths(op) {
        match width {
            1 => operands.push(read_u8(instructions, offset) as usize),
            2 => operands.push(read_u16(instructions, offset) as usize),
            4 => operands.push(read_u32(instructions, offset) as usize),
            _ => {}
        }
        offset += width;
    }

    (operands, offset)
}

pub fn disassemble(instructions: &[u8]) -> String {
    let mut result = String::new();
    let mut i = 0;

    while i < instructions.len() {
        let Ok(op) = OpCode::try_from(instructions[i]) else {
            result.push_str(&format!("{:04} <bad opcode {}>\n", i, instructions[i]));
            i += 1;
            continue;
        };
        let (operands, next) = read_operands(op, instructions, i);

        let operand_str = operands
            .iter()
            .map(|o| match op {
                OpCode::OpInt => (*o as u32 as i32).to_string(),
                _ => o.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        if operand_str.is_empty() {
            result.push_str(&format!("{:04} {}\n", i, op));
        } else {
            result.push_str(&format!("{:04} {} {}\n", i, op, operand_str));
        }
        i = next;
    }

    result
}
