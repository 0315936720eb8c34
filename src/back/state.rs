//! The emission state threaded through every visit.

use std::io::Write;

use crate::common::TypeId;
use crate::front::types::TypePool;

use super::ir::{type_text, Label, Value};
use super::needs::Needs;
use super::registry::ArrayRegistry;

/// What an expression's caller wants back: a materialised value, an
/// address to store into, or no preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Reg,
    Mem,
    Free,
}

/// The type tag carried by a `Reg`/`Mem` answer: most of the time this is
/// just a handle into the type pool, but array-to-pointer decay and
/// `getelementptr` slicing produce pointer types with no counterpart in
/// the (front-end-owned) type pool, so those carry their already-printed
/// text directly instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerType {
    Id(TypeId),
    Text(String),
}

impl AnswerType {
    pub fn text(&self, types: &TypePool, needs: &mut Needs) -> String {
        match self {
            AnswerType::Id(id) => type_text(types, *id, needs),
            AnswerType::Text(s) => s.clone(),
        }
    }

    pub fn is_floating(&self, types: &TypePool) -> bool {
        match self {
            AnswerType::Id(id) => types.is_floating(*id),
            AnswerType::Text(_) => false,
        }
    }

    pub fn is_pointer(&self, types: &TypePool) -> bool {
        match self {
            AnswerType::Id(id) => types.is_pointer(*id),
            AnswerType::Text(s) => s.ends_with('*'),
        }
    }
}

impl From<TypeId> for AnswerType {
    fn from(id: TypeId) -> Self {
        AnswerType::Id(id)
    }
}

/// An expression's result, handed back from every `emit_expr` call instead
/// of threaded through shared mutable state (see the "Answer record
/// coupling" redesign note).
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// A value sitting in a register (or named slot used as a value),
    /// tagged with its semantic type.
    Reg(Value, AnswerType),
    IntConst(i64),
    FloatConst(f64),
    /// An `i1` register from a comparison or logical operator.
    Logic(Value),
    /// An address (of the given pointee type) to load from or store into.
    Mem(Value, AnswerType),
    Str(crate::common::StringId),
    Null,
}

/// The label targets in scope for the statement currently being emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelScope {
    pub label_true: Option<Label>,
    pub label_false: Option<Label>,
    pub label_break: Option<Label>,
    pub label_continue: Option<Label>,
    /// Exported by a ternary so an enclosing ternary can use it as a phi
    /// incoming label instead of its own arm label.
    pub label_ternary_end: Option<Label>,
}

pub struct Emit<'io> {
    next_reg: u64,
    next_label: u64,
    next_block: u64,
    pub location: Location,
    pub scope: LabelScope,
    pub needs: Needs,
    pub arrays: ArrayRegistry,
    /// Whether the function currently being emitted performed any dynamic
    /// array allocation (so `return` knows to `stackrestore` first).
    pub function_used_dynamic_stack: bool,
    /// Whether the function currently being emitted is `main` (`return`
    /// always yields `ret i32 0` there regardless of its declared type).
    pub in_main: bool,
    pub out: &'io mut dyn Write,
}

impl<'io> Emit<'io> {
    pub fn new(out: &'io mut dyn Write) -> Self {
        Emit {
            next_reg: 1,
            next_label: 0,
            next_block: 0,
            location: Location::Free,
            scope: LabelScope::default(),
            needs: Needs::default(),
            arrays: ArrayRegistry::new(),
            function_used_dynamic_stack: false,
            in_main: false,
            out,
        }
    }

    /// Issue a fresh virtual register. Registers are never reused; the
    /// counter is translation-unit-wide, not per-function.
    pub fn fresh_reg(&mut self) -> Value {
        let r = Value::Reg(self.next_reg);
        self.next_reg += 1;
        r
    }

    pub fn fresh_label(&mut self) -> Label {
        let l = Label::Synthetic(self.next_label);
        self.next_label += 1;
        l
    }

    pub fn fresh_block(&mut self) -> u64 {
        let b = self.next_block;
        self.next_block += 1;
        b
    }

    /// Write one already-formatted IR line, indented as the body of a
    /// function/global (the module-level lines are written directly by the
    /// module emitter).
    pub fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "  {}", text.as_ref());
    }

    /// Write a label line, unindented, as LLVM text expects.
    pub fn label_line(&mut self, label: Label) {
        let _ = writeln!(self.out, "{label}:");
    }

    pub fn raw(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }
}
