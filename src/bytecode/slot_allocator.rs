use std::collections::HashMap;

use crate::{
    bytecode::compiler::errors::{LoweringError, LoweringResult},
    ir::SlotKey,
};

/// Slot operands are one byte wide.
pub const MAX_SLOTS: usize = u8::MAX as usize + 1;

/// What a slot holds. A slot is `Int` only when every assignment to it in
/// the body is integer-shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Native machine integer (loop counters, lengths).
    Int,
    /// Runtime value.
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: u8,
    pub kind: SlotKind,
}

/// Maps IR temporaries and locals to frame slots.
///
/// Indexes are handed out in first-use order starting at `first_free` and
/// are never reused within a body.
#[derive(Debug)]
pub struct SlotAllocator {
    unit: String,
    first_free: usize,
    slots: HashMap<SlotKey, Slot>,
    planned: HashMap<SlotKey, SlotKind>,
}

impl SlotAllocator {
    pub fn new(unit: impl Into<String>, first_free: usize) -> Self {
        Self {
            unit: unit.into(),
            first_free,
            slots: HashMap::new(),
            planned: HashMap::new(),
        }
    }

    /// Records one assignment of `kind` to `key` ahead of allocation. Any
    /// boxed assignment makes the whole key `Value`.
    pub fn plan(&mut self, key: SlotKey, kind: SlotKind) {
        let planned = self.planned.entry(key).or_insert(kind);
        if kind == SlotKind::Value {
            *planned = SlotKind::Value;
        }
    }

    /// The slot of `key`, allocating it on first use. The planned kind wins
    /// over `kind` when it is `Value`.
    pub fn slot_for(&mut self, key: SlotKey, kind: SlotKind) -> LoweringResult<Slot> {
        if let Some(slot) = self.slots.get(&key) {
            if slot.kind == SlotKind::Int && kind == SlotKind::Value {
                return Err(LoweringError::invariant(format!(
                    "integer slot {} of `{}` assigned a boxed value",
                    slot.index, self.unit
                )));
            }
            return Ok(*slot);
        }
        let kind = match self.planned.get(&key) {
            Some(SlotKind::Value) => SlotKind::Value,
            _ => kind,
        };
        let index = self.first_free + self.slots.len();
        if index >= MAX_SLOTS {
            return Err(LoweringError::TooManySlots {
                unit: self.unit.clone(),
                limit: MAX_SLOTS,
            });
        }
        let slot = Slot {
            index: index as u8,
            kind,
        };
        self.slots.insert(key, slot);
        Ok(slot)
    }

    /// The slot of an already-assigned key.
    pub fn lookup(&self, key: SlotKey) -> Option<Slot> {
        self.slots.get(&key).copied()
    }

    /// Frame size needed by the body, reserved slots included.
    pub fn num_slots(&self) -> usize {
        self.first_free + self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
