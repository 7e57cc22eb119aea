use std::{collections::HashMap, sync::Arc};

use crate::{
    bytecode::{
        code_unit::{ClosureUnit, CodeUnit},
        constant::ConstantPool,
    },
    config::CompilerOptions,
    ir::NodeId,
};

/// Frame slot holding the execution context.
pub const CONTEXT_SLOT: u8 = 0;
/// Frame slot holding the active environment.
pub const ENVIRONMENT_SLOT: u8 = 1;
/// Scratch slot; the builtin call sequence parks the caller's `...` here.
pub const WORK_SLOT: u8 = 2;
/// First slot handed out to IR temporaries and locals.
pub const FIRST_LOCAL_SLOT: usize = WORK_SLOT as usize + 1;

/// Nested units keyed by the identity of the IR node they were built from.
#[derive(Debug)]
pub struct UnitRegistry<T> {
    ids: HashMap<NodeId, usize>,
    units: Vec<Arc<T>>,
}

impl<T> Default for UnitRegistry<T> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            units: Vec::new(),
        }
    }
}

impl<T> UnitRegistry<T> {
    pub fn get(&self, id: NodeId) -> Option<usize> {
        self.ids.get(&id).copied()
    }

    pub fn insert(&mut self, id: NodeId, unit: T) -> usize {
        let index = self.units.len();
        self.units.push(Arc::new(unit));
        self.ids.insert(id, index);
        index
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn into_units(self) -> Vec<Arc<T>> {
        self.units
    }
}

/// State shared by everything emitted for one body. Dropped once the body's
/// [`CodeUnit`] is built; nothing in it is shared with other bodies.
#[derive(Debug)]
pub struct GenerationContext {
    pub unit_name: String,
    pub options: CompilerOptions,
    pub constants: ConstantPool,
    pub thunks: UnitRegistry<CodeUnit>,
    pub closures: UnitRegistry<ClosureUnit>,
}

impl GenerationContext {
    pub fn new(unit_name: impl Into<String>, options: &CompilerOptions) -> Self {
        let unit_name = unit_name.into();
        Self {
            constants: ConstantPool::new(unit_name.clone()),
            unit_name,
            options: options.clone(),
            thunks: UnitRegistry::default(),
            closures: UnitRegistry::default(),
        }
    }

    pub fn nested_name(&self, kind: &str, index: usize) -> String {
        format!("{}${}{}", self.unit_name, kind, index)
    }
}
