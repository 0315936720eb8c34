//! The expression emitter (§4.4): the largest component, visiting every
//! `Expr` variant and handing back an [`Answer`] instead of threading a
//! shared mutable "current answer" field.
//!
//! `emit_expr` always produces a *value-context* answer. Branching contexts
//! (`if`/`while`/`do`/`for` conditions, `&&`/`||`, `!`) go through
//! [`emit_condition`] instead, which is what makes short-circuit evaluation
//! possible without a separate "are we inside a branch" flag threaded
//! everywhere.

use crate::common::{IdentId, TypeId};
use crate::front::ast::{BinOp, Expr, UnaryOp};
use crate::front::idents::IdentPool;
use crate::front::strings::StringPool;
use crate::front::types::TypePool;

use super::errors::{ErrorCode, ErrorSink};
use super::ir::{decayed_type_text, opcode_text, static_array_shape_text, type_text, Label, OperandClass, Value};
use super::branch::check_and_branch;
use super::state::{Answer, AnswerType, Emit, Location};

const MAX_CALL_ARGS: usize = 128;

pub fn emit_expr(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    expr: &Expr,
) -> Answer {
    match expr {
        Expr::Cast { to, expr: inner } => {
            let saved = emit.location;
            emit.location = Location::Free;
            let ans = emit_expr(emit, types, idents, strings, errors, inner);
            emit.location = saved;
            let (v, from_ty) = lift(emit, types, ans);
            let to_floating = types.is_floating(*to);
            let from_floating = from_ty.is_floating(types);
            let result_v = if to_floating && !from_floating {
                match v {
                    Value::IntConst(c) => Value::FloatConst(c as f64),
                    _ => {
                        let r = emit.fresh_reg();
                        emit.line(format!("{r} = sitofp i32 {v} to double"));
                        r
                    }
                }
            } else if !to_floating && from_floating {
                match v {
                    Value::FloatConst(c) => Value::IntConst(c as i64),
                    _ => {
                        let r = emit.fresh_reg();
                        emit.line(format!("{r} = fptosi double {v} to i32"));
                        r
                    }
                }
            } else {
                v
            };
            Answer::Reg(result_v, AnswerType::Id(*to))
        }

        Expr::Identifier(id) => {
            let id = *id;
            let ty = idents.get_type(id);
            let local = idents.is_local(id);
            let slot = ident_slot(emit, types, id, ty, local);
            if types.is_array(ty) {
                emit_array_value(emit, types, id, ty, slot)
            } else {
                match emit.location {
                    Location::Mem => Answer::Mem(slot, AnswerType::Id(ty)),
                    _ => {
                        let ty_text = type_text(types, ty, &mut emit.needs);
                        let r = emit.fresh_reg();
                        emit.line(format!("{r} = load {ty_text}, {ty_text}* {slot}"));
                        Answer::Reg(r, AnswerType::Id(ty))
                    }
                }
            }
        }

        Expr::IntLiteral(n) => Answer::IntConst(*n),
        Expr::FloatLiteral(f) => Answer::FloatConst(*f),
        Expr::StringLiteral(sid) => Answer::Str(*sid),
        Expr::NullLiteral => Answer::Null,

        Expr::Subscript { .. } => emit_subscript(emit, types, idents, strings, errors, expr),

        Expr::Call { callee, args } => {
            if args.len() > MAX_CALL_ARGS {
                errors.report(ErrorCode::TooManyArguments);
                return Answer::Null;
            }
            let mut formatted_args = Vec::with_capacity(args.len());
            for a in args {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, a);
                emit.location = saved;
                formatted_args.push(format_call_argument(emit, types, strings, ans));
            }
            let callee = *callee;
            if idents.is_builtin(callee) {
                emit.needs.called_builtins.insert(callee);
            }
            let name = idents.get_spelling(callee).to_string();
            let joined = formatted_args.join(", ");
            if idents.is_builtin(callee) {
                match name.as_str() {
                    "print" | "printid" | "assert" => {
                        emit.line(format!("call void @{name}({joined})"));
                        Answer::Null
                    }
                    _ => {
                        // `getid` and anything else callable directly by name
                        // return `i32`; `abs` is never reached here — it is
                        // lowered directly by `Unary::Abs`.
                        let r = emit.fresh_reg();
                        emit.line(format!("{r} = call i32 @{name}({joined})"));
                        Answer::Reg(r, AnswerType::Id(types.int()))
                    }
                }
            } else {
                let ret_ty = idents.get_type(callee);
                if types.is_void(ret_ty) {
                    emit.line(format!("call void @{name}({joined})"));
                    Answer::Null
                } else {
                    let ret_text = type_text(types, ret_ty, &mut emit.needs);
                    let r = emit.fresh_reg();
                    emit.line(format!("{r} = call {ret_text} @{name}({joined})"));
                    Answer::Reg(r, AnswerType::Id(ret_ty))
                }
            }
        }

        Expr::Member { base, field, arrow } => {
            let (base_ptr, struct_tid) = if *arrow {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, base);
                emit.location = saved;
                let (v, ty) = lift(emit, types, ans);
                let struct_tid = match &ty {
                    AnswerType::Id(id) => types.element_type(*id),
                    AnswerType::Text(_) => panic!("arrow member base carries no pool type"),
                };
                (v, struct_tid)
            } else {
                let saved = emit.location;
                emit.location = Location::Mem;
                let ans = emit_expr(emit, types, idents, strings, errors, base);
                emit.location = saved;
                match ans {
                    Answer::Mem(addr, AnswerType::Id(id)) => (addr, id),
                    _ => panic!("member base is not an addressable struct"),
                }
            };
            let struct_text = type_text(types, struct_tid, &mut emit.needs);
            let field_ty = types.struct_fields(struct_tid)[*field];
            let r = emit.fresh_reg();
            emit.line(format!(
                "{r} = getelementptr inbounds {struct_text}, {struct_text}* {base_ptr}, i32 0, i32 {field}"
            ));
            match emit.location {
                Location::Mem => Answer::Mem(r, AnswerType::Id(field_ty)),
                _ => {
                    let ty_text = type_text(types, field_ty, &mut emit.needs);
                    let lr = emit.fresh_reg();
                    emit.line(format!("{lr} = load {ty_text}, {ty_text}* {r}"));
                    Answer::Reg(lr, AnswerType::Id(field_ty))
                }
            }
        }

        Expr::Unary { op, expr: inner } => match op {
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                let saved = emit.location;
                emit.location = Location::Mem;
                let dest = emit_expr(emit, types, idents, strings, errors, inner);
                emit.location = saved;
                let (addr, ty) = match dest {
                    Answer::Mem(a, t) => (a, t),
                    other => return other,
                };
                let ty_text = ty.text(types, &mut emit.needs);
                let old = emit.fresh_reg();
                emit.line(format!("{old} = load {ty_text}, {ty_text}* {addr}"));
                let floating = ty.is_floating(types);
                let inc = matches!(op, UnaryOp::PreInc | UnaryOp::PostInc);
                let new_reg = emit.fresh_reg();
                if floating {
                    let opc = if inc { "fadd" } else { "fsub" };
                    emit.line(format!("{new_reg} = {opc} double {old}, 1.0"));
                } else {
                    let opc = if inc { "add nsw" } else { "sub nsw" };
                    emit.line(format!("{new_reg} = {opc} i32 {old}, 1"));
                }
                emit.line(format!("store {ty_text} {new_reg}, {ty_text}* {addr}"));
                let pre = matches!(op, UnaryOp::PreInc | UnaryOp::PreDec);
                Answer::Reg(if pre { new_reg } else { old }, ty)
            }
            UnaryOp::Neg => {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, inner);
                emit.location = saved;
                let floating = answer_is_floating(types, &ans);
                let v = to_operand(emit, types, ans, floating);
                let r = emit.fresh_reg();
                if floating {
                    emit.line(format!("{r} = fsub double 0.0, {v}"));
                    Answer::Reg(r, AnswerType::Id(types.float()))
                } else {
                    emit.line(format!("{r} = sub nsw i32 0, {v}"));
                    Answer::Reg(r, AnswerType::Id(types.int()))
                }
            }
            UnaryOp::BitNot => {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, inner);
                emit.location = saved;
                let v = to_operand(emit, types, ans, false);
                let r = emit.fresh_reg();
                emit.line(format!("{r} = xor i32 {v}, -1"));
                Answer::Reg(r, AnswerType::Id(types.int()))
            }
            // Only correct in a branching context via `emit_condition`; as a
            // value it materialises through the phi-less two-arm sequence
            // below (see the open-question resolution this follows).
            UnaryOp::LogNot => materialize_condition_as_value(emit, types, idents, strings, errors, expr),
            UnaryOp::Abs => {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, inner);
                emit.location = saved;
                let floating = answer_is_floating(types, &ans);
                let v = to_operand(emit, types, ans, floating);
                if floating {
                    emit.needs.fabs = true;
                    let r = emit.fresh_reg();
                    emit.line(format!("{r} = call double @llvm.fabs.f64(double {v})"));
                    Answer::Reg(r, AnswerType::Id(types.float()))
                } else {
                    emit.needs.abs = true;
                    let r = emit.fresh_reg();
                    emit.line(format!("{r} = call i32 @abs(i32 {v})"));
                    Answer::Reg(r, AnswerType::Id(types.int()))
                }
            }
            UnaryOp::AddrOf => {
                let saved = emit.location;
                emit.location = Location::Mem;
                let ans = emit_expr(emit, types, idents, strings, errors, inner);
                emit.location = saved;
                match ans {
                    Answer::Mem(addr, ty) => {
                        let pointee_text = ty.text(types, &mut emit.needs);
                        Answer::Reg(addr, AnswerType::Text(format!("{pointee_text}*")))
                    }
                    other => other,
                }
            }
            UnaryOp::Deref => {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, inner);
                emit.location = saved;
                let (ptr_val, ptr_ty) = lift(emit, types, ans);
                let pointee = match &ptr_ty {
                    AnswerType::Id(id) if types.is_pointer(*id) => {
                        AnswerType::Id(types.element_type(*id))
                    }
                    AnswerType::Text(s) => AnswerType::Text(s.trim_end_matches('*').to_string()),
                    other => other.clone(),
                };
                match emit.location {
                    Location::Mem => Answer::Mem(ptr_val, pointee),
                    _ => {
                        let ty_text = pointee.text(types, &mut emit.needs);
                        let r = emit.fresh_reg();
                        emit.line(format!("{r} = load {ty_text}, {ty_text}* {ptr_val}"));
                        Answer::Reg(r, pointee)
                    }
                }
            }
        },

        Expr::Binary { op, .. } if op.is_short_circuit() => {
            materialize_condition_as_value(emit, types, idents, strings, errors, expr)
        }
        Expr::Binary { op, lhs, rhs } => {
            let saved = emit.location;
            emit.location = Location::Free;
            let lhs_answer = emit_expr(emit, types, idents, strings, errors, lhs);
            emit.location = saved;
            let saved = emit.location;
            emit.location = Location::Free;
            let rhs_answer = emit_expr(emit, types, idents, strings, errors, rhs);
            emit.location = saved;
            emit_binary_op(emit, types, *op, lhs_answer, rhs_answer)
        }

        Expr::Assign { op, lhs, rhs } => {
            let saved = emit.location;
            emit.location = Location::Mem;
            let dest = emit_expr(emit, types, idents, strings, errors, lhs);
            emit.location = saved;
            let (dest_addr, dest_ty) = match dest {
                Answer::Mem(addr, ty) => (addr, ty),
                other => return other,
            };

            let saved = emit.location;
            emit.location = Location::Free;
            let rhs_answer = emit_expr(emit, types, idents, strings, errors, rhs);
            emit.location = saved;

            let stored_value = if let Some(binop) = op {
                let combined = emit_binary_op(
                    emit,
                    types,
                    *binop,
                    Answer::Mem(dest_addr, dest_ty.clone()),
                    rhs_answer,
                );
                coerce_to_answer_type(emit, types, combined, &dest_ty)
            } else {
                coerce_to_answer_type(emit, types, rhs_answer, &dest_ty)
            };

            let ty_text = dest_ty.text(types, &mut emit.needs);
            emit.line(format!("store {ty_text} {stored_value}, {ty_text}* {dest_addr}"));
            Answer::Reg(stored_value, dest_ty)
        }

        Expr::Ternary { cond, tt, ff } => {
            let then_label = emit.fresh_label();
            let else_label = emit.fresh_label();
            let end_label = emit.fresh_label();
            emit_condition(emit, types, idents, strings, errors, cond, then_label, else_label);

            emit.label_line(then_label);
            emit.scope.label_ternary_end = None;
            let saved = emit.location;
            emit.location = Location::Free;
            let tt_answer = emit_expr(emit, types, idents, strings, errors, tt);
            emit.location = saved;
            let (tt_val, result_ty) = lift(emit, types, tt_answer);
            let then_incoming = emit.scope.label_ternary_end.take().unwrap_or(then_label);
            emit.line(format!("br label %{end_label}"));

            emit.label_line(else_label);
            emit.scope.label_ternary_end = None;
            let saved = emit.location;
            emit.location = Location::Free;
            let ff_answer = emit_expr(emit, types, idents, strings, errors, ff);
            emit.location = saved;
            let (ff_val, _) = lift(emit, types, ff_answer);
            let else_incoming = emit.scope.label_ternary_end.take().unwrap_or(else_label);
            emit.line(format!("br label %{end_label}"));

            emit.label_line(end_label);
            let ty_text = result_ty.text(types, &mut emit.needs);
            let r = emit.fresh_reg();
            emit.line(format!(
                "{r} = phi {ty_text} [ {tt_val}, %{then_incoming} ], [ {ff_val}, %{else_incoming} ]"
            ));
            emit.scope.label_ternary_end = Some(end_label);
            Answer::Reg(r, result_ty)
        }

        Expr::Initializer(items) => {
            let mut last = Answer::Null;
            for item in items {
                let saved = emit.location;
                emit.location = Location::Free;
                last = emit_expr(emit, types, idents, strings, errors, item);
                emit.location = saved;
            }
            last
        }

        Expr::Inline(text) => {
            emit.line(text);
            Answer::Null
        }
    }
}

/// The branching counterpart to [`emit_expr`]: used for `if`/`while`/`do`/
/// `for` conditions and recursively for `&&`/`||`/`!`, so short-circuit
/// lowering never has to materialise an intermediate `i1` value.
pub fn emit_condition(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    expr: &Expr,
    true_label: Label,
    false_label: Label,
) {
    match expr {
        Expr::Unary { op: UnaryOp::LogNot, expr: inner } => {
            emit_condition(emit, types, idents, strings, errors, inner, false_label, true_label);
        }
        Expr::Binary { op, lhs, rhs } if op.is_short_circuit() => {
            let next = emit.fresh_label();
            match op {
                BinOp::LogAnd => {
                    emit_condition(emit, types, idents, strings, errors, lhs, next, false_label);
                }
                BinOp::LogOr => {
                    emit_condition(emit, types, idents, strings, errors, lhs, true_label, next);
                }
                _ => unreachable!("is_short_circuit only admits LogAnd/LogOr"),
            }
            emit.label_line(next);
            emit_condition(emit, types, idents, strings, errors, rhs, true_label, false_label);
        }
        _ => {
            let saved = emit.location;
            emit.location = Location::Free;
            let answer = emit_expr(emit, types, idents, strings, errors, expr);
            emit.location = saved;
            check_and_branch(emit, types, answer, true_label, false_label);
        }
    }
}

/// Materialises a boolean-producing expression (`!`, `&&`, `||`, or a plain
/// comparison reached outside a branching context) as an `i1` value via an
/// `alloca`/`store`/`load` sequence instead of a `phi` — deliberately
/// phi-less, per the open-question resolution for "`!` as a value".
fn materialize_condition_as_value(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    expr: &Expr,
) -> Answer {
    let slot = emit.fresh_reg();
    emit.line(format!("{slot} = alloca i1, align 1"));
    let true_label = emit.fresh_label();
    let false_label = emit.fresh_label();
    let end_label = emit.fresh_label();
    emit_condition(emit, types, idents, strings, errors, expr, true_label, false_label);

    emit.label_line(true_label);
    emit.line(format!("store i1 1, i1* {slot}"));
    emit.line(format!("br label %{end_label}"));

    emit.label_line(false_label);
    emit.line(format!("store i1 0, i1* {slot}"));
    emit.line(format!("br label %{end_label}"));

    emit.label_line(end_label);
    let r = emit.fresh_reg();
    emit.line(format!("{r} = load i1, i1* {slot}"));
    // A ternary arm that bottoms out here left `end_label`, not the label it
    // entered with, as the current block — record it the same way a nested
    // ternary does so the enclosing phi names the true predecessor.
    emit.scope.label_ternary_end = Some(end_label);
    Answer::Logic(r)
}

fn emit_subscript(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    expr: &Expr,
) -> Answer {
    let (base_expr, index_exprs) = collect_subscript_chain(expr);
    let array_id = match base_expr {
        Expr::Identifier(id) => *id,
        _ => return Answer::Null,
    };
    let array_ty = idents.get_type(array_id);
    let local = idents.is_local(array_id);
    let slot = ident_slot(emit, types, array_id, array_ty, local);

    let mut index_values = Vec::with_capacity(index_exprs.len());
    for idx_expr in index_exprs.iter().copied() {
        let saved = emit.location;
        emit.location = Location::Free;
        let ans = emit_expr(emit, types, idents, strings, errors, idx_expr);
        emit.location = saved;
        index_values.push(to_operand(emit, types, ans, false));
    }

    let entry = emit.arrays.get(array_id).cloned();
    let is_static = entry.as_ref().map(|e| e.is_static).unwrap_or(true);
    let result_ty = nth_inner_array_type(types, array_ty, index_values.len());
    let still_array = types.is_array(result_ty);

    let elem_reg = if is_static {
        let e = entry.expect("static array subscript without a registry entry");
        let dims = e.const_dims();
        let base_ty = static_array_shape_text(types, e.elem_type, &dims, &mut emit.needs);
        let mut operands = vec!["i32 0".to_string()];
        operands.extend(index_values.iter().map(|v| format!("i32 {v}")));
        let r = emit.fresh_reg();
        emit.line(format!(
            "{r} = getelementptr inbounds {base_ty}, {base_ty}* {slot}, {}",
            operands.join(", ")
        ));
        r
    } else {
        let e = entry.expect("dynamic array subscript without a registry entry");
        let elem_text = decayed_type_text(types, e.elem_type, &mut emit.needs);
        let idx = index_values.first().copied().unwrap_or(Value::IntConst(0));
        let r = emit.fresh_reg();
        emit.line(format!(
            "{r} = getelementptr inbounds {elem_text}, {elem_text}* {slot}, i32 {idx}"
        ));
        r
    };

    if still_array {
        let elem = types.element_type(result_ty);
        let elem_ptr_text = format!("{}*", decayed_type_text(types, elem, &mut emit.needs));
        Answer::Reg(elem_reg, AnswerType::Text(elem_ptr_text))
    } else {
        match emit.location {
            Location::Mem => Answer::Mem(elem_reg, AnswerType::Id(result_ty)),
            _ => {
                let ty_text = type_text(types, result_ty, &mut emit.needs);
                let r = emit.fresh_reg();
                emit.line(format!("{r} = load {ty_text}, {ty_text}* {elem_reg}"));
                Answer::Reg(r, AnswerType::Id(result_ty))
            }
        }
    }
}

/// Walks a chain of nested `Subscript` nodes (`a[i][j]` parses as
/// `Subscript{Subscript{a, i}, j}`) down to its base identifier, returning
/// the index expressions outermost-first.
fn collect_subscript_chain(expr: &Expr) -> (&Expr, Vec<&Expr>) {
    let mut indices = Vec::new();
    let mut cur = expr;
    while let Expr::Subscript { base, index } = cur {
        indices.push(index.as_ref());
        cur = base.as_ref();
    }
    indices.reverse();
    (cur, indices)
}

fn nth_inner_array_type(types: &TypePool, ty: TypeId, n: usize) -> TypeId {
    let mut t = ty;
    for _ in 0..n {
        t = types.element_type(t);
    }
    t
}

fn ident_slot(emit: &Emit, types: &TypePool, id: IdentId, ty: TypeId, local: bool) -> Value {
    if types.is_array(ty) {
        if local {
            if emit.arrays.is_static(id) {
                Value::ArrSlot(id)
            } else {
                Value::DynArrSlot(id)
            }
        } else {
            Value::GlobalArr(id)
        }
    } else if local {
        Value::VarSlot(id)
    } else {
        Value::GlobalVar(id)
    }
}

/// An array identifier always decays to a pointer to its first element,
/// regardless of the requested location — there is no "address of an
/// array" distinct from the array's own value.
fn emit_array_value(emit: &mut Emit, types: &TypePool, id: IdentId, ty: TypeId, slot: Value) -> Answer {
    let elem = types.element_type(ty);
    let elem_ptr_text = format!("{}*", decayed_type_text(types, elem, &mut emit.needs));
    match emit.arrays.get(id) {
        Some(entry) if entry.is_static => {
            let dims = entry.const_dims();
            let base_ty = static_array_shape_text(types, entry.elem_type, &dims, &mut emit.needs);
            let r = emit.fresh_reg();
            emit.line(format!(
                "{r} = getelementptr inbounds {base_ty}, {base_ty}* {slot}, i32 0, i32 0"
            ));
            Answer::Reg(r, AnswerType::Text(elem_ptr_text))
        }
        // A dynamic array's slot is itself the flat pointer its `alloca`
        // produced; no further indexing needed to reach element zero.
        _ => Answer::Reg(slot, AnswerType::Text(elem_ptr_text)),
    }
}

fn format_call_argument(emit: &mut Emit, types: &TypePool, strings: &StringPool, answer: Answer) -> String {
    match answer {
        Answer::Str(sid) => {
            let len = strings.length(sid) + 1;
            format!(
                "i8* getelementptr inbounds ([{len} x i8], [{len} x i8]* {}, i32 0, i32 0)",
                Value::StrGlobal(sid)
            )
        }
        other => {
            let (v, ty) = lift(emit, types, other);
            let ty_text = ty.text(types, &mut emit.needs);
            format!("{ty_text} {v}")
        }
    }
}

fn answer_is_floating(types: &TypePool, a: &Answer) -> bool {
    match a {
        Answer::FloatConst(_) => true,
        Answer::Reg(_, ty) | Answer::Mem(_, ty) => ty.is_floating(types),
        _ => false,
    }
}

fn is_pointer_or_null(types: &TypePool, a: &Answer) -> bool {
    match a {
        Answer::Null => true,
        Answer::Reg(_, ty) | Answer::Mem(_, ty) => ty.is_pointer(types),
        _ => false,
    }
}

/// Materialise any answer into an operand register/constant, loading
/// through a `Mem` address or `zext`-ing a `Logic` result as needed, and
/// promoting to `double` via `sitofp` when `want_float` and not already
/// floating (the usual arithmetic conversion, §4.4).
pub(super) fn lift(emit: &mut Emit, types: &TypePool, answer: Answer) -> (Value, AnswerType) {
    match answer {
        Answer::Reg(v, ty) => (v, ty),
        Answer::IntConst(c) => (Value::IntConst(c), AnswerType::Id(types.int())),
        Answer::FloatConst(c) => (Value::FloatConst(c), AnswerType::Id(types.float())),
        Answer::Logic(v) => {
            let r = emit.fresh_reg();
            emit.line(format!("{r} = zext i1 {v} to i32"));
            (r, AnswerType::Id(types.int()))
        }
        Answer::Mem(addr, ty) => {
            let ty_text = ty.text(types, &mut emit.needs);
            let r = emit.fresh_reg();
            emit.line(format!("{r} = load {ty_text}, {ty_text}* {addr}"));
            (r, ty)
        }
        Answer::Null => (Value::Null, AnswerType::Id(types.null_ptr())),
        Answer::Str(_) => panic!("string literal used where a scalar value was required"),
    }
}

pub(super) fn to_operand(emit: &mut Emit, types: &TypePool, answer: Answer, want_float: bool) -> Value {
    let (v, ty) = lift(emit, types, answer);
    if want_float && !ty.is_floating(types) {
        match v {
            Value::IntConst(c) => Value::FloatConst(c as f64),
            _ => {
                let r = emit.fresh_reg();
                emit.line(format!("{r} = sitofp i32 {v} to double"));
                r
            }
        }
    } else {
        v
    }
}

/// Coerce an answer to the element type an assignment or initializer is
/// storing into: `null` passes through untouched for pointer destinations,
/// otherwise this is just [`to_operand`] with the destination's floatness.
pub(super) fn coerce_to_answer_type(
    emit: &mut Emit,
    types: &TypePool,
    answer: Answer,
    target: &AnswerType,
) -> Value {
    if target.is_floating(types) {
        to_operand(emit, types, answer, true)
    } else if target.is_pointer(types) {
        match answer {
            Answer::Null => Value::Null,
            other => lift(emit, types, other).0,
        }
    } else {
        to_operand(emit, types, answer, false)
    }
}

fn emit_binary_op(emit: &mut Emit, types: &TypePool, op: BinOp, lhs: Answer, rhs: Answer) -> Answer {
    if op.is_comparison() && (is_pointer_or_null(types, &lhs) || is_pointer_or_null(types, &rhs)) {
        let (lv, lty) = lift(emit, types, lhs);
        let (rv, rty) = lift(emit, types, rhs);
        if matches!(lv, Value::Null) && matches!(rv, Value::Null) {
            // both sides are the null literal: there is no pointee type to
            // compare against, so there is nothing meaningful to emit.
            return Answer::Null;
        }
        let ty_text = if !matches!(lv, Value::Null) {
            lty.text(types, &mut emit.needs)
        } else if !matches!(rv, Value::Null) {
            rty.text(types, &mut emit.needs)
        } else {
            "i8*".to_string()
        };
        let predicate = if matches!(op, BinOp::Eq) { "eq" } else { "ne" };
        let r = emit.fresh_reg();
        emit.line(format!("{r} = icmp {predicate} {ty_text} {lv}, {rv}"));
        return Answer::Logic(r);
    }

    let want_float = answer_is_floating(types, &lhs) || answer_is_floating(types, &rhs);
    let lv = to_operand(emit, types, lhs, want_float);
    let rv = to_operand(emit, types, rhs, want_float);
    let class = if want_float { OperandClass::Floating } else { OperandClass::Integer };
    let opcode = opcode_text(op, class);
    let ty_text = if want_float { "double" } else { "i32" };
    let r = emit.fresh_reg();
    emit.line(format!("{r} = {opcode} {ty_text} {lv}, {rv}"));
    if op.is_comparison() {
        Answer::Logic(r)
    } else {
        let result_ty = if want_float { types.float() } else { types.int() };
        Answer::Reg(r, AnswerType::Id(result_ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::back::errors::CollectingSink;
    use crate::front::idents::IdentPool;
    use crate::front::strings::StringPool;

    fn new_pools() -> (TypePool, IdentPool, StringPool) {
        (TypePool::new(), IdentPool::new(), StringPool::new())
    }

    #[test]
    fn int_literal_binary_add_folds_to_constants_then_emits_add() {
        let (types, idents, strings) = new_pools();
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let mut sink = CollectingSink::default();
        let expr = Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(Expr::IntLiteral(2)),
            rhs: Box::new(Expr::IntLiteral(3)),
        };
        let answer = emit_expr(&mut emit, &types, &idents, &strings, &mut sink, &expr);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("= add nsw i32 2, 3"));
        assert!(matches!(answer, Answer::Reg(_, _)));
    }

    #[test]
    fn identifier_under_mem_request_reports_its_slot_without_emitting() {
        let (types, mut idents, strings) = new_pools();
        let id = idents.declare("a", types.int(), true);
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let mut sink = CollectingSink::default();
        emit.location = Location::Mem;
        let answer = emit_expr(&mut emit, &types, &idents, &strings, &mut sink, &Expr::Identifier(id));
        let text = String::from_utf8(buf).unwrap();
        assert!(text.is_empty());
        assert!(matches!(answer, Answer::Mem(Value::VarSlot(i), _) if i == id));
    }

    #[test]
    fn too_many_call_arguments_reports_and_skips_emission() {
        let (types, mut idents, strings) = new_pools();
        let callee = idents.declare("f", types.void(), false);
        let args: Vec<Expr> = (0..(MAX_CALL_ARGS + 1)).map(|i| Expr::IntLiteral(i as i64)).collect();
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let mut sink = CollectingSink::default();
        let expr = Expr::Call { callee, args };
        emit_expr(&mut emit, &types, &idents, &strings, &mut sink, &expr);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.is_empty());
        assert_eq!(sink.errors, vec![ErrorCode::TooManyArguments]);
    }

    #[test]
    fn mixed_float_int_comparison_promotes_the_integer_side() {
        let (types, mut idents, strings) = new_pools();
        let x = idents.declare("x", types.float(), true);
        let i = idents.declare("i", types.int(), true);
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let mut sink = CollectingSink::default();
        let expr = Expr::Binary {
            op: BinOp::Gt,
            lhs: Box::new(Expr::Binary {
                op: BinOp::Add,
                lhs: Box::new(Expr::Identifier(x)),
                rhs: Box::new(Expr::Identifier(i)),
            }),
            rhs: Box::new(Expr::IntLiteral(0)),
        };
        let answer = emit_expr(&mut emit, &types, &idents, &strings, &mut sink, &expr);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("sitofp i32"));
        assert!(text.contains("fadd double"));
        assert!(text.contains("fcmp ogt"));
        assert!(matches!(answer, Answer::Logic(_)));
    }
}
