//! The array registry: a side table of array shapes, keyed by the
//! identifier that declared them.
//!
//! Replaces the source's hashed `IS_STATIC` sentinel convention with a
//! small map of positional entries (see the "Array registry as arena"
//! redesign note).

use crate::common::{IdentId, Map, TypeId};

use super::ir::Value;

/// One array dimension: either known at compile time, or (only ever the
/// outermost dimension) a register holding the runtime element count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dim {
    Const(i64),
    Dynamic(Value),
}

#[derive(Debug, Clone)]
pub struct ArrayEntry {
    pub is_static: bool,
    /// Dimensions, outermost first.
    pub dims: Vec<Dim>,
    pub elem_type: TypeId,
}

impl ArrayEntry {
    /// Compile-time dimensions, for a fully static array. Panics if any
    /// dimension is dynamic; callers are expected to check `is_static`
    /// first.
    pub fn const_dims(&self) -> Vec<i64> {
        self.dims
            .iter()
            .map(|d| match d {
                Dim::Const(n) => *n,
                Dim::Dynamic(_) => panic!("const_dims called on a dynamic array entry"),
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct ArrayRegistry {
    entries: Map<IdentId, ArrayEntry>,
}

impl ArrayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, id: IdentId, entry: ArrayEntry) {
        self.entries.insert(id, entry);
    }

    pub fn get(&self, id: IdentId) -> Option<&ArrayEntry> {
        self.entries.get(&id)
    }

    pub fn is_static(&self, id: IdentId) -> bool {
        self.entries.get(&id).map(|e| e.is_static).unwrap_or(true)
    }
}
