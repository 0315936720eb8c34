//! The string literal pool.

use crate::common::StringId;

#[derive(Default)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: impl Into<String>) -> StringId {
        let id = StringId(self.strings.len());
        self.strings.push(s.into());
        id
    }

    pub fn amount(&self) -> usize {
        self.strings.len()
    }

    pub fn get(&self, id: StringId) -> &str {
        &self.strings[id.0]
    }

    pub fn length(&self, id: StringId) -> usize {
        self.get(id).len()
    }
}
