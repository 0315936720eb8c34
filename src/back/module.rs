//! The module emitter (§4.8): the whole-translation-unit entry point.
//!
//! A single [`Emit`] is constructed here and threaded by `&mut` through
//! every global/function visit — the register/label counters, the
//! [`Needs`] epilogue flags and the array registry are scoped to the whole
//! translation unit, never reconstructed per declaration.

use std::io::Write;

use crate::front::idents::IdentPool;
use crate::front::strings::StringPool;
use crate::front::syntax::{Syntax, Workspace};
use crate::front::types::TypePool;

use super::decl::{emit_function, emit_global_decl};
use super::errors::ErrorSink;
use super::ir::type_text;
use super::needs::Needs;
use super::state::Emit;

fn escape_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' => "\\0A".to_string(),
            '\\' => "\\5C".to_string(),
            '"' => "\\22".to_string(),
            c => c.to_string(),
        })
        .collect()
}

fn emit_prologue(emit: &mut Emit, workspace: &Workspace, types: &TypePool, strings: &StringPool) {
    let _ = write!(emit.out, "{}", workspace.target.header());

    for id in types.user_struct_ids() {
        let fields: Vec<String> = types
            .struct_fields(id)
            .iter()
            .map(|f| type_text(types, *f, &mut emit.needs))
            .collect();
        emit.raw(format!("%struct_opt.{} = type {{ {} }}", id.0, fields.join(", ")));
    }

    for i in 0..strings.amount() {
        let sid = crate::common::StringId(i);
        let text = strings.get(sid);
        let len = text.len() + 1;
        emit.raw(format!(
            "@.str{} = private unnamed_addr constant [{len} x i8] c\"{}\\00\", align 1",
            i,
            escape_string(text)
        ));
    }
}

fn emit_epilogue(emit: &mut Emit, idents: &IdentPool, needs: &Needs) {
    for id in &needs.called_builtins {
        match idents.get_spelling(*id) {
            "print" => emit.raw("declare void @print(...)"),
            "printid" => emit.raw("declare void @printid(...)"),
            "getid" => emit.raw("declare i32 @getid(...)"),
            "assert" => emit.raw("declare void @assert(...)"),
            _ => {}
        }
    }
    if needs.stacksave {
        emit.raw("declare i8* @llvm.stacksave()");
        emit.raw("declare void @llvm.stackrestore(i8*)");
    }
    if needs.abs {
        emit.raw("declare i32 @abs(i32)");
    }
    if needs.fabs {
        emit.raw("declare double @llvm.fabs.f64(double)");
    }
    if needs.io_file {
        emit.raw(
            "%struct._IO_marker = type { %struct._IO_marker*, %struct._IO_FILE*, i32 }",
        );
        emit.raw(
            "%struct._IO_FILE = type { i32, i8*, i8*, i8*, i8*, i8*, i8*, i8*, i8*, i8*, i8*, \
             i8*, %struct._IO_marker*, %struct._IO_FILE*, i32, i32, i64, i16, i8, [1 x i8], i8*, \
             i64, i8*, i8*, i8*, i8*, i64, i32, [20 x i8] }",
        );
    }
    emit.raw("!llvm.module.flags = !{!0}");
    emit.raw("!0 = !{i32 1, !\"wchar_size\", i32 4}");
}

/// An `ErrorSink` wrapper that forwards every report to the caller's sink
/// while also counting them, so `encode` can return the accumulated count
/// without requiring anything of the caller-provided sink itself.
struct CountingSink<'a> {
    inner: &'a mut dyn ErrorSink,
    count: i32,
}

impl ErrorSink for CountingSink<'_> {
    fn report(&mut self, code: super::errors::ErrorCode) {
        self.count += 1;
        self.inner.report(code);
    }
}

/// Walk the whole translation unit, returning the accumulated error count,
/// or `-1` if `syntax.main` does not name a function actually present in
/// the program (a configuration error — see §7).
pub fn encode(workspace: &Workspace, syntax: &mut Syntax, errors: &mut dyn ErrorSink) -> i32 {
    if !syntax.program.functions.iter().any(|f| f.id == syntax.main) {
        return -1;
    }

    let types = &syntax.types;
    let idents: &IdentPool = &syntax.idents;
    let strings: &StringPool = &syntax.strings;
    let main_id = syntax.main;
    let mut sink = CountingSink { inner: errors, count: 0 };

    let mut emit = Emit::new(&mut *syntax.io);
    emit_prologue(&mut emit, workspace, types, strings);

    for decl in &syntax.program.globals {
        emit_global_decl(&mut emit, types, idents, strings, &mut sink, decl);
    }
    for func in &syntax.program.functions {
        emit_function(&mut emit, types, idents, strings, &mut sink, func, main_id);
    }

    let needs = emit.needs.clone();
    emit_epilogue(&mut emit, idents, &needs);

    sink.count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::IdentId;
    use crate::front::ast::{BinOp, Decl, Expr, Function, Program, Stmt};
    use crate::front::types::Type;
    use crate::back::errors::CollectingSink;

    fn function_ident(idents: &mut IdentPool, types: &mut TypePool, name: &str, ret: crate::common::TypeId) -> IdentId {
        let fn_ty = types.push(Type::Function { ret, params: vec![] });
        idents.declare(name, fn_ty, false)
    }

    #[test]
    fn empty_main_returns_zero_unconditionally() {
        let mut types = TypePool::new();
        let mut idents = IdentPool::new();
        let strings = StringPool::new();
        let main_id = function_ident(&mut idents, &mut types, "main", types.int());
        let program = Program {
            structs: vec![],
            globals: vec![],
            functions: vec![Function { id: main_id, params: vec![], body: vec![] }],
        };
        let mut buf = Vec::new();
        let mut syntax = Syntax { types, idents, strings, main: main_id, program, io: &mut buf };
        let mut sink = CollectingSink::default();
        let rc = encode(&Workspace::default(), &mut syntax, &mut sink);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(rc, 0);
        assert!(text.contains("define i32 @main() {"));
        assert!(text.contains("ret i32 0"));
    }

    #[test]
    fn const_folded_arithmetic_stores_then_loads_the_local() {
        let mut types = TypePool::new();
        let mut idents = IdentPool::new();
        let strings = StringPool::new();
        let main_id = function_ident(&mut idents, &mut types, "main", types.int());
        let a_id = idents.declare("a", types.int(), true);
        let body = vec![
            Stmt::Decl(Decl::Scalar {
                id: a_id,
                init: Some(Expr::Binary {
                    op: BinOp::Add,
                    lhs: Box::new(Expr::IntLiteral(2)),
                    rhs: Box::new(Expr::Binary {
                        op: BinOp::Mul,
                        lhs: Box::new(Expr::IntLiteral(3)),
                        rhs: Box::new(Expr::IntLiteral(4)),
                    }),
                }),
            }),
            Stmt::Return(Some(Expr::Identifier(a_id))),
        ];
        let program = Program {
            structs: vec![],
            globals: vec![],
            functions: vec![Function { id: main_id, params: vec![], body }],
        };
        let mut buf = Vec::new();
        let mut syntax = Syntax { types, idents, strings, main: main_id, program, io: &mut buf };
        let mut sink = CollectingSink::default();
        let rc = encode(&Workspace::default(), &mut syntax, &mut sink);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(rc, 0);
        assert!(text.contains("mul nsw i32 3, 4"));
        assert!(text.contains("add nsw i32 2,"));
        assert!(text.contains(&format!("store i32 %.2, i32* %var.{}", a_id.0)));
        assert!(text.contains("ret i32 0"));
    }

    #[test]
    fn missing_main_is_a_configuration_error() {
        let types = TypePool::new();
        let idents = IdentPool::new();
        let strings = StringPool::new();
        let program = Program { structs: vec![], globals: vec![], functions: vec![] };
        let mut buf = Vec::new();
        let mut syntax = Syntax {
            types,
            idents,
            strings,
            main: IdentId(0),
            program,
            io: &mut buf,
        };
        let mut sink = CollectingSink::default();
        let rc = encode(&Workspace::default(), &mut syntax, &mut sink);
        assert_eq!(rc, -1);
    }
}
