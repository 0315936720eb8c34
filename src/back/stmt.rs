//! The statement emitter (§4.6): control flow, labels and the
//! block-scoped dynamic-stack discipline for nested compounds.

use crate::front::ast::Stmt;
use crate::front::idents::IdentPool;
use crate::front::strings::StringPool;
use crate::front::types::TypePool;

use super::decl::emit_local_decl;
use super::errors::ErrorSink;
use super::expr::{emit_condition, emit_expr, lift};
use super::ir::{Label, Value};
use super::state::{Emit, Location};

pub fn emit_stmt(
    emit: &mut Emit,
    types: &TypePool,
    idents: &IdentPool,
    strings: &StringPool,
    errors: &mut dyn ErrorSink,
    stmt: &Stmt,
) {
    match stmt {
        Stmt::Decl(decl) => emit_local_decl(emit, types, idents, strings, errors, decl),

        Stmt::Label(id, inner) => {
            let label = Label::Source(-*id);
            emit.line(format!("br label %{label}"));
            emit.label_line(label);
            emit_stmt(emit, types, idents, strings, errors, inner);
        }

        // Recognised but not lowered: the core generator has no switch
        // dispatch, so a bare case/default reached outside one emits
        // nothing rather than falling through unconditionally.
        Stmt::Case(_, _) | Stmt::Default(_) | Stmt::Switch { .. } => {}

        Stmt::Compound(stmts) => {
            let block = emit.fresh_block();
            let save = Value::DynSlot(block as i64);
            emit.line(format!("{save} = call i8* @llvm.stacksave()"));
            emit.needs.stacksave = true;
            for s in stmts {
                emit_stmt(emit, types, idents, strings, errors, s);
            }
            emit.line(format!("call void @llvm.stackrestore(i8* {save})"));
        }

        Stmt::Expr(expr) => {
            let saved = emit.location;
            emit.location = Location::Free;
            emit_expr(emit, types, idents, strings, errors, expr);
            emit.location = saved;
        }

        Stmt::Null => {}

        Stmt::If { cond, tt, ff } => {
            let then_label = emit.fresh_label();
            let else_label = emit.fresh_label();
            let end_label = emit.fresh_label();
            emit_condition(emit, types, idents, strings, errors, cond, then_label, else_label);
            emit.label_line(then_label);
            emit_stmt(emit, types, idents, strings, errors, tt);
            emit.line(format!("br label %{end_label}"));
            emit.label_line(else_label);
            if let Some(ff) = ff {
                emit_stmt(emit, types, idents, strings, errors, ff);
            }
            emit.line(format!("br label %{end_label}"));
            emit.label_line(end_label);
        }

        Stmt::While { cond, body } => {
            let cond_label = emit.fresh_label();
            let body_label = emit.fresh_label();
            let end_label = emit.fresh_label();
            emit.line(format!("br label %{cond_label}"));
            emit.label_line(cond_label);
            emit_condition(emit, types, idents, strings, errors, cond, body_label, end_label);
            emit.label_line(body_label);
            let saved_scope = emit.scope;
            emit.scope.label_break = Some(end_label);
            emit.scope.label_continue = Some(cond_label);
            emit_stmt(emit, types, idents, strings, errors, body);
            emit.scope = saved_scope;
            emit.line(format!("br label %{cond_label}"));
            emit.label_line(end_label);
        }

        Stmt::Do { body, cond } => {
            let loop_label = emit.fresh_label();
            let cond_label = emit.fresh_label();
            let end_label = emit.fresh_label();
            emit.line(format!("br label %{loop_label}"));
            emit.label_line(loop_label);
            let saved_scope = emit.scope;
            emit.scope.label_break = Some(end_label);
            emit.scope.label_continue = Some(cond_label);
            emit_stmt(emit, types, idents, strings, errors, body);
            emit.scope = saved_scope;
            emit.line(format!("br label %{cond_label}"));
            emit.label_line(cond_label);
            emit_condition(emit, types, idents, strings, errors, cond, loop_label, end_label);
            emit.label_line(end_label);
        }

        Stmt::For { init, cond, incr, body } => {
            if let Some(init_stmt) = init {
                emit_stmt(emit, types, idents, strings, errors, init_stmt);
            }
            let cond_label = emit.fresh_label();
            let body_label = emit.fresh_label();
            let incr_label = emit.fresh_label();
            let end_label = emit.fresh_label();
            emit.line(format!("br label %{cond_label}"));
            emit.label_line(cond_label);
            match cond {
                Some(c) => emit_condition(emit, types, idents, strings, errors, c, body_label, end_label),
                None => emit.line(format!("br label %{body_label}")),
            }
            emit.label_line(incr_label);
            if let Some(incr_expr) = incr {
                let saved = emit.location;
                emit.location = Location::Free;
                emit_expr(emit, types, idents, strings, errors, incr_expr);
                emit.location = saved;
            }
            emit.line(format!("br label %{cond_label}"));
            emit.label_line(body_label);
            let saved_scope = emit.scope;
            emit.scope.label_break = Some(end_label);
            emit.scope.label_continue = Some(incr_label);
            emit_stmt(emit, types, idents, strings, errors, body);
            emit.scope = saved_scope;
            emit.line(format!("br label %{incr_label}"));
            emit.label_line(end_label);
        }

        Stmt::Goto(id) => {
            emit.line(format!("br label %{}", Label::Source(-*id)));
        }

        Stmt::Continue => {
            let target = emit.scope.label_continue.expect("continue outside a loop");
            emit.line(format!("br label %{target}"));
        }

        Stmt::Break => {
            let target = emit.scope.label_break.expect("break outside a loop/switch");
            emit.line(format!("br label %{target}"));
        }

        Stmt::Return(expr) => {
            if emit.function_used_dynamic_stack {
                emit.line(format!("call void @llvm.stackrestore(i8* {})", Value::DynSlot(-1)));
            }
            if emit.in_main {
                emit.line("ret i32 0");
                return;
            }
            match expr {
                Some(e) => {
                    let saved = emit.location;
                    emit.location = Location::Free;
                    let ans = emit_expr(emit, types, idents, strings, errors, e);
                    emit.location = saved;
                    let (v, ty) = lift(emit, types, ans);
                    let ty_text = ty.text(types, &mut emit.needs);
                    emit.line(format!("ret {ty_text} {v}"));
                }
                None => emit.line("ret void"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::back::errors::CollectingSink;
    use crate::back::state::Emit;
    use crate::front::ast::{BinOp, Expr};
    use crate::front::strings::StringPool;

    #[test]
    fn if_without_else_still_joins_at_end_label() {
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let types = TypePool::new();
        let idents = IdentPool::new();
        let strings = StringPool::new();
        let mut sink = CollectingSink::default();
        let stmt = Stmt::If {
            cond: Expr::IntLiteral(1),
            tt: Box::new(Stmt::Null),
            ff: None,
        };
        emit_stmt(&mut emit, &types, &idents, &strings, &mut sink, &stmt);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("label0:"));
        assert!(text.contains("label1:"));
        assert!(text.contains("label2:"));
        assert!(sink.errors.is_empty());
    }

    #[test]
    fn break_inside_while_jumps_to_the_loop_end_label() {
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let types = TypePool::new();
        let idents = IdentPool::new();
        let strings = StringPool::new();
        let mut sink = CollectingSink::default();
        let stmt = Stmt::While {
            cond: Expr::IntLiteral(1),
            body: Box::new(Stmt::Break),
        };
        emit_stmt(&mut emit, &types, &idents, &strings, &mut sink, &stmt);
        let text = String::from_utf8(buf).unwrap();
        // the end label is the third one allocated (cond, body, end)
        assert!(text.contains("br label %label2"));
    }

    #[test]
    fn nested_compound_wraps_its_body_in_stacksave_restore() {
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let types = TypePool::new();
        let idents = IdentPool::new();
        let strings = StringPool::new();
        let mut sink = CollectingSink::default();
        let stmt = Stmt::Compound(vec![Stmt::Null]);
        emit_stmt(&mut emit, &types, &idents, &strings, &mut sink, &stmt);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("call i8* @llvm.stacksave()"));
        assert!(text.contains("call void @llvm.stackrestore(i8* %dyn.0)"));
        assert!(emit.needs.stacksave);
    }

    #[test]
    fn return_in_main_always_yields_ret_i32_zero() {
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        emit.in_main = true;
        let types = TypePool::new();
        let idents = IdentPool::new();
        let strings = StringPool::new();
        let mut sink = CollectingSink::default();
        let stmt = Stmt::Return(Some(Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(Expr::IntLiteral(1)),
            rhs: Box::new(Expr::IntLiteral(2)),
        }));
        emit_stmt(&mut emit, &types, &idents, &strings, &mut sink, &stmt);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim(), "ret i32 0");
    }
}
