use log::trace;

use crate::bytecode::op_code::{OpCode, read_operands};

use super::{Machine, Word, frame::Frame};

impl Machine {
    pub(super) fn trace_instruction(&self, frame: &Frame, op: OpCode) {
        let (operands, _) = read_operands(op, &frame.unit.instructions, frame.ip);
        trace!(
            "{} {:04} {:<20} {:<12} | {}",
            frame.unit.name,
            frame.ip,
            op.to_string(),
            format_operands(&operands),
            format_stack(&self.stack)
        );
    }
}

fn format_operands(operands: &[usize]) -> String {
    operands
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Top of the stack, innermost last, at most four entries.
pub(super) fn format_stack(stack: &[Word]) -> String {
    const SHOWN: usize = 4;
    let start = stack.len().saturating_sub(SHOWN);
    let mut parts: Vec<String> = stack[start..].iter().map(format_word).collect();
    if start > 0 {
        parts.insert(0, format!("..{}", start));
    }
    format!("[{}]", parts.join(", "))
}

fn format_word(word: &Word) -> String {
    match word {
        Word::Empty => "_".to_string(),
        Word::Int(v) => format!("#{}", v),
        Word::Value(v) => v.to_string(),
        Word::Context(_) => "ctx".to_string(),
        Word::Env(_) => "env".to_string(),
        Word::Call(call) => format!("call {}", call),
        Word::Names(names) => format!("names({})", names.len()),
        Word::Values(values) => format!("values({})", values.len()),
        Word::Args(args) => format!("args({})", args.len()),
    }
}
