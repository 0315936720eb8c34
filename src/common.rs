//! Common definitions that are shared between different parts of the compiler.

// Use sorted sets and maps for consistent output
pub use std::collections::{BTreeMap as Map, BTreeSet as Set};

/// Identifiers (interned spellings), kept around for diagnostics and for
/// anything upstream of the type/identifier pools that still wants a cheap
/// string handle.
pub type Id = internment::Intern<String>;

/// A handle into the type pool (see [`crate::front::types`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub usize);

/// A handle into the identifier pool (see [`crate::front::idents`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentId(pub usize);

/// A handle into the string pool (see [`crate::front::strings`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringId(pub usize);
