use std::{fmt::Write, sync::Arc};

use sha2::{Digest, Sha256};

use crate::{
    bytecode::{
        constant::Constant,
        op_code::{Instructions, disassemble},
    },
    lang::Symbol,
};

/// Generated code for one body. Executed with `(context, environment)` and
/// returns a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeUnit {
    pub name: String,
    pub instructions: Instructions,
    pub constants: Vec<Constant>,
    /// Total frame slots, reserved slots included.
    pub num_slots: usize,
    /// Deferred-argument bodies, addressed by `OpMakeThunk` / `OpEvalThunk`.
    pub thunks: Vec<Arc<CodeUnit>>,
    /// Closure literals, addressed by `OpMakeClosure`.
    pub closures: Vec<Arc<ClosureUnit>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormal {
    pub name: Symbol,
    pub default: Option<Arc<CodeUnit>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosureUnit {
    pub name: String,
    pub formals: Vec<CompiledFormal>,
    pub body: Arc<CodeUnit>,
}

impl CodeUnit {
    pub fn fingerprint(&self) -> String {
        to_hex(&self.digest())
    }

    fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(&self.instructions);
        hasher.update((self.num_slots as u32).to_be_bytes());
        for constant in &self.constants {
            // Constants are plain data; serialization cannot fail.
            if let Ok(bytes) = serde_json::to_vec(constant) {
                hasher.update(&bytes);
            }
        }
        for thunk in &self.thunks {
            hasher.update(thunk.digest());
        }
        for closure in &self.closures {
            for formal in &closure.formals {
                hasher.update(formal.name.as_str().as_bytes());
                if let Some(default) = &formal.default {
                    hasher.update(default.digest());
                }
            }
            hasher.update(closure.body.digest());
        }
        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Disassembly of this unit followed by its nested units.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        self.write_listing(&mut out);
        out
    }

    fn write_listing(&self, out: &mut String) {
        let _ = writeln!(out, "== {} (slots: {}) ==", self.name, self.num_slots);
        out.push_str(&disassemble(&self.instructions));
        if !self.constants.is_empty() {
            let _ = writeln!(out, "constants:");
            for (index, constant) in self.constants.iter().enumerate() {
                let _ = writeln!(out, "  {}: {}", index, constant);
            }
        }
        for thunk in &self.thunks {
            thunk.write_listing(out);
        }
        for closure in &self.closures {
            for formal in &closure.formals {
                if let Some(default) = &formal.default {
                    default.write_listing(out);
                }
            }
            closure.body.write_listing(out);
        }
    }
}

fn to_hex(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
