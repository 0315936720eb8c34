//! The declaration emitter (§4.7): scalar/array locals and globals, and the
//! function definition shell around a statement-emitted body.

use crate::common::{IdentId, TypeId};
use crate::front::ast::{ArrayInit, Decl, Expr, Function};
use crate::front::idents::IdentPool;
use crate::front::strings::StringPool;
use crate::front::types::{Type, TypePool};

use super::errors::{ErrorCode, ErrorSink};
use super::expr::{coerce_to_answer_type, emit_expr, to_operand};
use super::ir::{decayed_type_text, static_array_shape_text, type_text, Value};
use super::registry::{ArrayEntry, Dim};
use super::state::{AnswerType, Emit, Location};
use super::stmt::emit_stmt;

enum DimShape {
    Static(Vec<i64>),
    Dynamic,
    MixedBorders,
    Unsupported,
}

fn classify_dims(dim_consts: &[Option<i64>]) -> DimShape {
    let dyn_positions: Vec<usize> = dim_consts
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_none())
        .map(|(i, _)| i)
        .collect();
    if dyn_positions.is_empty() {
        DimShape::Static(dim_consts.iter().map(|d| d.unwrap()).collect())
    } else if dyn_positions.len() > 1 || dyn_positions[0] != 0 {
        DimShape::Unsupported
    } else if dim_consts.len() > 1 {
        DimShape::MixedBorders
    } else {
        DimShape::Dynamic
    }
}

fn scalar_elem_type(types: &TypePool, mut t: TypeId) -> TypeId {
    while types.is_array(t) {
        t = types.element_type(t);
    }
    t
}

/// A local declaration, as a statement inside a function body.
pub fn emit_local_decl(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    decl: &Decl,
) {
    match decl {
        Decl::Scalar { id, init } => {
            let ty = idents.get_type(*id);
            let ty_text = type_text(types, ty, &mut emit.needs);
            let slot = Value::VarSlot(*id);
            emit.line(format!("{slot} = alloca {ty_text}, align 4"));
            if let Some(expr) = init {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, expr);
                emit.location = saved;
                let v = coerce_to_answer_type(emit, types, ans, &AnswerType::Id(ty));
                emit.line(format!("store {ty_text} {v}, {ty_text}* {slot}"));
            }
        }
        Decl::Array { id, dims, init } => {
            emit_local_array_decl(emit, types, idents, strings, errors, *id, dims, init);
        }
    }
}

fn emit_local_array_decl(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    id: IdentId,
    dims: &[Expr],
    init: &Option<ArrayInit>,
) {
    let array_ty = idents.get_type(id);
    let scalar_ty = scalar_elem_type(types, array_ty);
    let dim_consts: Vec<Option<i64>> = dims
        .iter()
        .map(|d| match d {
            Expr::IntLiteral(n) => Some(*n),
            _ => None,
        })
        .collect();

    match classify_dims(&dim_consts) {
        DimShape::Unsupported => errors.report(ErrorCode::SuchArrayIsNotSupported),
        DimShape::MixedBorders => errors.report(ErrorCode::ArrayBordersCannotBeStaticDynamic),
        DimShape::Static(const_dims) => {
            emit.arrays.declare(
                id,
                ArrayEntry {
                    is_static: true,
                    dims: const_dims.iter().map(|n| Dim::Const(*n)).collect(),
                    elem_type: scalar_ty,
                },
            );
            let slot = Value::ArrSlot(id);
            let base_ty = static_array_shape_text(types, scalar_ty, &const_dims, &mut emit.needs);
            emit.line(format!("{slot} = alloca {base_ty}, align 4"));
            emit_static_array_init(emit, types, idents, strings, errors, id, &const_dims, scalar_ty, init);
        }
        DimShape::Dynamic => {
            let saved = emit.location;
            emit.location = Location::Free;
            let size_ans = emit_expr(emit, types, idents, strings, errors, &dims[0]);
            emit.location = saved;
            let size_v = to_operand(emit, types, size_ans, false);

            if !emit.function_used_dynamic_stack {
                let save = Value::DynSlot(-1);
                emit.line(format!("{save} = call i8* @llvm.stacksave()"));
                emit.needs.stacksave = true;
                emit.function_used_dynamic_stack = true;
            }

            emit.arrays.declare(
                id,
                ArrayEntry {
                    is_static: false,
                    dims: vec![Dim::Dynamic(size_v)],
                    elem_type: scalar_ty,
                },
            );
            let slot = Value::DynArrSlot(id);
            let elem_text = type_text(types, scalar_ty, &mut emit.needs);
            emit.line(format!("{slot} = alloca {elem_text}, i32 {size_v}"));
        }
    }
}

/// Slices and stores each initializer element. The source AST models array
/// initializers as a flat list regardless of declared dimensionality, so
/// (matching the one worked multi-dim example in the input contract: a
/// single-dimension list) every element is addressed by its flat index into
/// the outermost dimension.
fn emit_static_array_init(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    id: IdentId,
    const_dims: &[i64],
    scalar_ty: TypeId,
    init: &Option<ArrayInit>,
) {
    let Some(init) = init else { return };
    let slot = Value::ArrSlot(id);
    let base_ty = static_array_shape_text(types, scalar_ty, const_dims, &mut emit.needs);
    let elem_ty_text = type_text(types, scalar_ty, &mut emit.needs);

    let values: Vec<Value> = match init {
        ArrayInit::List(items) => items
            .iter()
            .map(|e| {
                let saved = emit.location;
                emit.location = Location::Free;
                let ans = emit_expr(emit, types, idents, strings, errors, e);
                emit.location = saved;
                coerce_to_answer_type(emit, types, ans, &AnswerType::Id(scalar_ty))
            })
            .collect(),
        ArrayInit::Str(sid) => strings
            .get(*sid)
            .bytes()
            .map(|b| Value::IntConst(b as i64))
            .chain(std::iter::once(Value::IntConst(0)))
            .collect(),
    };

    for (i, v) in values.into_iter().enumerate() {
        let r = emit.fresh_reg();
        emit.line(format!(
            "{r} = getelementptr inbounds {base_ty}, {base_ty}* {slot}, i32 0, i32 {i}"
        ));
        emit.line(format!("store {elem_ty_text} {v}, {elem_ty_text}* {r}"));
    }
}

fn global_const_text(expr: &Expr) -> Value {
    match expr {
        Expr::IntLiteral(n) => Value::IntConst(*n),
        Expr::FloatLiteral(f) => Value::FloatConst(*f),
        Expr::NullLiteral => Value::Null,
        other => panic!("global initializer must be a compile-time constant, got {other:?}"),
    }
}

/// A top-level global declaration. Globals are written straight to the
/// module's write sink (unindented, per `@name = ...` syntax) rather than
/// through the per-function instruction stream.
pub fn emit_global_decl(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    decl: &Decl,
) {
    match decl {
        Decl::Scalar { id, init } => {
            let ty = idents.get_type(*id);
            let ty_text = type_text(types, ty, &mut emit.needs);
            match init {
                Some(expr) => {
                    let v = global_const_text(expr);
                    emit.raw(format!("@var.{} = global {ty_text} {v}", id.0));
                }
                None => {
                    let zero = if types.is_floating(ty) { "0.0" } else { "0" };
                    emit.raw(format!("@var.{} = common global {ty_text} {zero}", id.0));
                }
            }
        }
        Decl::Array { id, dims, init } => {
            let array_ty = idents.get_type(*id);
            let scalar_ty = scalar_elem_type(types, array_ty);
            let const_dims: Vec<i64> = dims
                .iter()
                .map(|d| match d {
                    Expr::IntLiteral(n) => *n,
                    _ => panic!("global array dimensions must be compile-time constants"),
                })
                .collect();
            emit.arrays.declare(
                *id,
                ArrayEntry {
                    is_static: true,
                    dims: const_dims.iter().map(|n| Dim::Const(*n)).collect(),
                    elem_type: scalar_ty,
                },
            );
            let base_ty = static_array_shape_text(types, scalar_ty, &const_dims, &mut emit.needs);
            let elem_text = type_text(types, scalar_ty, &mut emit.needs);
            match init {
                Some(ArrayInit::List(items)) => {
                    let values: Vec<String> = items
                        .iter()
                        .map(|e| format!("{elem_text} {}", global_const_text(e)))
                        .collect();
                    emit.raw(format!("@arr.{} = global {base_ty} [ {} ]", id.0, values.join(", ")));
                }
                Some(ArrayInit::Str(sid)) => {
                    let bytes: Vec<String> = strings
                        .get(*sid)
                        .bytes()
                        .map(|b| format!("{elem_text} {b}"))
                        .chain(std::iter::once(format!("{elem_text} 0")))
                        .collect();
                    emit.raw(format!("@arr.{} = global {base_ty} [ {} ]", id.0, bytes.join(", ")));
                }
                None => {
                    emit.raw(format!("@arr.{} = common global {base_ty} zeroinitializer", id.0));
                }
            }
            let _ = errors; // globals never hit the dynamic/mixed-dims error paths
        }
    }
}

/// A function definition: `alloca`+`store` every parameter in the entry
/// block, emit the body, then append the implicit trailing `ret` if the
/// body didn't supply one.
pub fn emit_function(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    func: &Function,
    main_id: IdentId,
) {
    emit.function_used_dynamic_stack = false;
    emit.in_main = func.id == main_id;

    let fn_ty = idents.get_type(func.id);
    let (ret_ty, param_tys): (TypeId, Vec<TypeId>) = match types.get(fn_ty) {
        Type::Function { ret, params } => (*ret, params.clone()),
        _ => (types.int(), func.params.iter().map(|p| idents.get_type(*p)).collect()),
    };
    let ret_text = type_text(types, ret_ty, &mut emit.needs);
    let name = idents.get_spelling(func.id).to_string();
    let param_list = param_tys
        .iter()
        .enumerate()
        .map(|(i, pty)| format!("{} %{i}", decayed_type_text(types, *pty, &mut emit.needs)))
        .collect::<Vec<_>>()
        .join(", ");
    emit.raw(format!("define {ret_text} @{name}({param_list}) {{"));

    for (i, param_id) in func.params.iter().enumerate() {
        let pty = idents.get_type(*param_id);
        let pty_text = type_text(types, pty, &mut emit.needs);
        let slot = Value::VarSlot(*param_id);
        emit.line(format!("{slot} = alloca {pty_text}, align 4"));
        emit.line(format!("store {pty_text} %{i}, {pty_text}* {slot}"));
    }

    let mut returned = false;
    for stmt in &func.body {
        emit_stmt(emit, types, idents, strings, errors, stmt);
        returned = matches!(stmt, crate::front::ast::Stmt::Return(_));
    }

    if emit.in_main {
        if !returned {
            if emit.function_used_dynamic_stack {
                emit.line(format!("call void @llvm.stackrestore(i8* {})", Value::DynSlot(-1)));
            }
            emit.line("ret i32 0");
        }
    } else if !returned {
        if emit.function_used_dynamic_stack {
            emit.line(format!("call void @llvm.stackrestore(i8* {})", Value::DynSlot(-1)));
        }
        if types.is_void(ret_ty) {
            emit.line("ret void");
        } else {
            emit.line(format!("ret {ret_text} undef"));
        }
    }

    emit.raw("}");
}
