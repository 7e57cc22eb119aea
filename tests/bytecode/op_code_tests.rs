use rill::bytecode::op_code::{
    OpCode, disassemble, int_operand, is_jump, make, operand_widths, read_operands, read_u16,
    read_u32,
};

#[test]
fn make_slot_operand() {
    assert_eq!(make(OpCode::OpLoad, &[7]), vec![OpCode::OpLoad as u8, 7]);
    assert_eq!(make(OpCode::OpIncLocal, &[255]), vec![OpCode::OpIncLocal as u8, 255]);
}

#[test]
fn make_u16_operand() {
    // Constant indexes and jump targets are two bytes, big-endian.
    let ins = make(OpCode::OpConstant, &[655]);
    assert_eq!(ins, vec![OpCode::OpConstant as u8, 0x02, 0x8F]);

    let ins = make(OpCode::OpJump, &[1024]);
    assert_eq!(ins, vec![OpCode::OpJump as u8, 0x04, 0x00]);
    assert_eq!(read_u16(&ins, 1), 1024);
}

#[test]
fn make_name_at_has_two_operands() {
    let ins = make(OpCode::OpNameAt, &[1, 258]);
    assert_eq!(ins, vec![OpCode::OpNameAt as u8, 0, 1, 1, 2]);
    assert_eq!(operand_widths(OpCode::OpNameAt), &[2, 2]);
}

#[test]
fn negative_int_immediate() {
    let ins = make(OpCode::OpInt, &[int_operand(-2)]);
    assert_eq!(ins.len(), 5);
    assert_eq!(read_u32(&ins, 1) as i32, -2);
    assert_eq!(disassemble(&ins), "0000 OpInt -2\n");
}

#[test]
fn read_operands_returns_next_offset() {
    let mut code = make(OpCode::OpNameAt, &[0, 3]);
    code.extend(make(OpCode::OpReturn, &[]));
    let (operands, next) = read_operands(OpCode::OpNameAt, &code, 0);
    assert_eq!(operands, vec![0, 3]);
    assert_eq!(next, 5);
}

#[test]
fn every_byte_below_the_table_decodes() {
    for byte in 0..=OpCode::OpReturn as u8 {
        let op = OpCode::try_from(byte).unwrap();
        assert_eq!(op as u8, byte);
    }
    assert_eq!(OpCode::try_from(OpCode::OpReturn as u8 + 1), Err(OpCode::OpReturn as u8 + 1));
}

#[test]
fn only_branches_are_jumps() {
    assert!(is_jump(OpCode::OpJump));
    assert!(is_jump(OpCode::OpJumpIfIntLess));
    assert!(!is_jump(OpCode::OpReturn));
    assert!(!is_jump(OpCode::OpCallPrimitive));
}

#[test]
fn disassemble_call_sequence() {
    let mut code = Vec::new();
    code.extend(make(OpCode::OpFindFunction, &[0]));
    code.extend(make(OpCode::OpDup, &[]));
    code.extend(make(OpCode::OpIsBuiltin, &[]));
    code.extend(make(OpCode::OpJumpIfNonZero, &[12]));
    code.extend(make(OpCode::OpNewNames, &[2]));
    code.extend(make(OpCode::OpNameAt, &[0, 1]));

    assert_eq!(
        disassemble(&code),
        "0000 OpFindFunction 0\n\
         0003 OpDup\n\
         0004 OpIsBuiltin\n\
         0005 OpJumpIfNonZero 12\n\
         0008 OpNewNames 2\n\
         0011 OpNameAt 0 1\n"
    );
}

#[test]
fn disassemble_flags_unknown_bytes() {
    assert_eq!(disassemble(&[200]), "0000 <bad opcode 200>\n");
}
