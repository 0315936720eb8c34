//! The identifier pool.
//!
//! Builtin library functions (`print`, `printid`, `getid`, `assert`, `abs`)
//! occupy the low ids below [`BEGIN_USER_FUNC`]; every user local, global
//! and function is appended after it.

use crate::common::{IdentId, TypeId};

#[derive(Debug, Clone)]
pub struct IdentEntry {
    pub name: String,
    pub ty: TypeId,
    pub local: bool,
    /// Display value for enum-field-literal identifiers; `None` for
    /// ordinary variables and functions.
    pub display: Option<String>,
}

pub struct IdentPool {
    entries: Vec<IdentEntry>,
}

/// Names of the builtin functions, in id order starting at 0.
const BUILTIN_FUNCS: &[&str] = &["print", "printid", "getid", "assert", "abs"];

/// The first identifier id available for user-declared locals, globals and
/// functions; ids below this name builtin library functions.
pub const BEGIN_USER_FUNC: IdentId = IdentId(BUILTIN_FUNCS.len());

impl Default for IdentPool {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentPool {
    pub fn new() -> Self {
        // Builtin functions are declared with no fixed type here: the
        // expression emitter special-cases them by spelling, not by type,
        // matching how the source's library-call builders are already
        // expanded before code generation ever sees them.
        let entries = BUILTIN_FUNCS
            .iter()
            .map(|name| IdentEntry {
                name: (*name).to_string(),
                ty: TypeId(0),
                local: false,
                display: None,
            })
            .collect();
        IdentPool { entries }
    }

    pub fn declare(&mut self, name: impl Into<String>, ty: TypeId, local: bool) -> IdentId {
        let id = IdentId(self.entries.len());
        self.entries.push(IdentEntry {
            name: name.into(),
            ty,
            local,
            display: None,
        });
        id
    }

    pub fn declare_display(
        &mut self,
        name: impl Into<String>,
        ty: TypeId,
        display: impl Into<String>,
    ) -> IdentId {
        let id = IdentId(self.entries.len());
        self.entries.push(IdentEntry {
            name: name.into(),
            ty,
            local: false,
            display: Some(display.into()),
        });
        id
    }

    fn entry(&self, id: IdentId) -> &IdentEntry {
        &self.entries[id.0]
    }

    pub fn get_type(&self, id: IdentId) -> TypeId {
        self.entry(id).ty
    }

    pub fn is_local(&self, id: IdentId) -> bool {
        self.entry(id).local
    }

    pub fn get_spelling(&self, id: IdentId) -> &str {
        &self.entry(id).name
    }

    pub fn get_display(&self, id: IdentId) -> Option<&str> {
        self.entry(id).display.as_deref()
    }

    pub fn is_builtin(&self, id: IdentId) -> bool {
        id.0 < BEGIN_USER_FUNC.0
    }
}
