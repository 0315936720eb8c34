//! Type printing, operator printing, and the textual SSA value syntax.
//!
//! This plays the role the teacher's `Register`/`Memory`/`Location` enums
//! and their `derive_more::Display` impls play in `back::asm`: a small set
//! of value/opcode enums whose `Display` impl *is* the instruction-text
//! emission logic, so the rest of the generator never hand-formats strings.

use std::fmt;

use crate::common::{IdentId, StringId, TypeId};
use crate::front::ast::BinOp;
use crate::front::types::{Type, TypePool};

use super::needs::Needs;

/// An SSA value or named memory slot, as it appears on the right (or left)
/// of an instruction.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Value {
    /// An anonymous virtual register, `%.N`.
    Reg(u64),
    /// A scalar local's memory slot, `%var.N`.
    VarSlot(IdentId),
    /// A statically-shaped local array's memory slot, `%arr.N`.
    ArrSlot(IdentId),
    /// A dynamically-sized local array's memory slot, `%dynarr.N`.
    DynArrSlot(IdentId),
    /// A `stacksave` result slot, `%dyn.N` (N may be negative; the first
    /// dynamic allocation in a function always uses index -1).
    DynSlot(i64),
    /// A scalar global, `@var.N`.
    GlobalVar(IdentId),
    /// An array global, `@arr.N`.
    GlobalArr(IdentId),
    /// A string literal global, `@.strN`.
    StrGlobal(StringId),
    IntConst(i64),
    FloatConst(f64),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Reg(n) => write!(f, "%.{n}"),
            Value::VarSlot(id) => write!(f, "%var.{}", id.0),
            Value::ArrSlot(id) => write!(f, "%arr.{}", id.0),
            Value::DynArrSlot(id) => write!(f, "%dynarr.{}", id.0),
            Value::DynSlot(n) => write!(f, "%dyn.{n}"),
            Value::GlobalVar(id) => write!(f, "@var.{}", id.0),
            Value::GlobalArr(id) => write!(f, "@arr.{}", id.0),
            Value::StrGlobal(id) => write!(f, "@.str{}", id.0),
            Value::IntConst(n) => write!(f, "{n}"),
            Value::FloatConst(x) => write!(f, "{}", format_float(*x)),
            Value::Null => write!(f, "null"),
        }
    }
}

fn format_float(f: f64) -> String {
    // LLVM IR always wants a decimal point in float literals.
    if f.fract() == 0.0 && f.is_finite() {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// A label, printed as `labelN` for synthetic labels or a source-label-id
/// form for a `goto` target (disjoint from synthetic labels by construction
/// since one is always positive text and the other carries the negated
/// source id explicitly in its name).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Label {
    Synthetic(u64),
    Source(i64),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Synthetic(n) => write!(f, "label{n}"),
            Label::Source(n) => write!(f, "label.src.{n}"),
        }
    }
}

/// Print the full declaration-form type: nested array shapes spelled out,
/// struct types by their own alias name, no array-to-pointer decay. Used
/// for `alloca`, `global`, and `getelementptr`'s first (base) type operand.
pub fn type_text(types: &TypePool, id: TypeId, needs: &mut Needs) -> String {
    match types.get(id) {
        Type::Void => "void".to_string(),
        Type::Bool => "i1".to_string(),
        Type::Char => "i8".to_string(),
        Type::Int => "i32".to_string(),
        Type::Float => "double".to_string(),
        Type::NullPtr => "i8*".to_string(),
        Type::File => {
            needs.io_file = true;
            "%struct._IO_FILE".to_string()
        }
        Type::Vararg => "...".to_string(),
        Type::Pointer(inner) => format!("{}*", decayed_type_text(types, *inner, needs)),
        Type::Array(inner) => format!("{}*", decayed_type_text(types, *inner, needs)),
        Type::Struct(_) => format!("%struct_opt.{}", id.0),
        Type::Function { ret, params } => {
            let ret = type_text(types, *ret, needs);
            let params: Vec<_> = params
                .iter()
                .map(|p| decayed_type_text(types, *p, needs))
                .collect();
            format!("{ret} ({})", params.join(", "))
        }
    }
}

/// Print the decayed (value) form of a type: arrays decay to a pointer to
/// their element type, exactly as they would outside an aggregate
/// declaration.
pub fn decayed_type_text(types: &TypePool, id: TypeId, needs: &mut Needs) -> String {
    match types.get(id) {
        Type::Array(inner) => format!("{}*", decayed_type_text(types, *inner, needs)),
        _ => type_text(types, id, needs),
    }
}

/// Print the full nested-array declaration type `[N1 x [N2 x T]]` for a
/// fully static array, given its dimension constants outermost-first.
pub fn static_array_shape_text(types: &TypePool, elem: TypeId, dims: &[i64], needs: &mut Needs) -> String {
    let elem_text = type_text(types, elem, needs);
    dims.iter()
        .rev()
        .fold(elem_text, |inner, n| format!("[{n} x {inner}]"))
}

/// Operand-class hint for binary/comparison opcode selection.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandClass {
    Integer,
    Floating,
}

/// The textual opcode (and, for comparisons, predicate) for a binary
/// operator under a given operand class.
pub fn opcode_text(op: BinOp, class: OperandClass) -> &'static str {
    use BinOp::*;
    use OperandClass::*;
    match (op, class) {
        (Add, Integer) => "add nsw",
        (Add, Floating) => "fadd",
        (Sub, Integer) => "sub nsw",
        (Sub, Floating) => "fsub",
        (Mul, Integer) => "mul nsw",
        (Mul, Floating) => "fmul",
        (Div, Integer) => "sdiv",
        (Div, Floating) => "fdiv",
        (Rem, Integer) => "srem",
        (Rem, Floating) => unreachable!("rem is integer-only"),
        (Shl, _) => "shl",
        (Shr, _) => "ashr",
        (BitAnd, _) => "and",
        (BitOr, _) => "or",
        (BitXor, _) => "xor",
        (Eq, Integer) => "icmp eq",
        (Eq, Floating) => "fcmp oeq",
        (Ne, Integer) => "icmp ne",
        (Ne, Floating) => "fcmp one",
        (Lt, Integer) => "icmp slt",
        (Lt, Floating) => "fcmp olt",
        (Gt, Integer) => "icmp sgt",
        (Gt, Floating) => "fcmp ogt",
        (Le, Integer) => "icmp sle",
        (Le, Floating) => "fcmp ole",
        (Ge, Integer) => "icmp sge",
        (Ge, Floating) => "fcmp oge",
        (LogAnd, _) | (LogOr, _) => unreachable!("short-circuit ops have no single opcode"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reg_and_slot_display() {
        assert_eq!(Value::Reg(7).to_string(), "%.7");
        assert_eq!(Value::VarSlot(IdentId(3)).to_string(), "%var.3");
        assert_eq!(Value::DynSlot(-1).to_string(), "%dyn.-1");
        assert_eq!(Value::GlobalArr(IdentId(2)).to_string(), "@arr.2");
    }

    #[test]
    fn float_const_always_has_decimal_point() {
        assert_eq!(Value::FloatConst(1.0).to_string(), "1.0");
    }

    #[test]
    fn opcode_selection_picks_floating_variant() {
        assert_eq!(opcode_text(BinOp::Add, OperandClass::Floating), "fadd");
        assert_eq!(opcode_text(BinOp::Gt, OperandClass::Floating), "fcmp ogt");
        assert_eq!(opcode_text(BinOp::Lt, OperandClass::Integer), "icmp slt");
    }

    #[test]
    fn static_array_shape_nests_outermost_first() {
        let types = TypePool::new();
        let mut needs = Needs::default();
        let text = static_array_shape_text(&types, types.int(), &[3, 4], &mut needs);
        assert_eq!(text, "[3 x [4 x i32]]");
    }
}
