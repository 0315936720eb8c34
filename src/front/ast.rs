//! The abstract syntax tree.
//!
//! A sum type over expression and statement variants with exhaustive
//! matching, rather than the source's tagged tree table: see the
//! "Polymorphic AST" redesign note this crate follows.

use crate::common::{IdentId, StringId, TypeId};

#[derive(Debug)]
pub struct Program {
    pub structs: Vec<TypeId>,
    pub globals: Vec<Decl>,
    pub functions: Vec<Function>,
}

#[derive(Debug)]
pub struct Function {
    pub id: IdentId,
    pub params: Vec<IdentId>,
    pub body: Vec<Stmt>,
}

/// A declaration: scalar or array, local or global depending on context.
#[derive(Debug)]
pub enum Decl {
    Scalar {
        id: IdentId,
        init: Option<Expr>,
    },
    Array {
        id: IdentId,
        dims: Vec<Expr>,
        init: Option<ArrayInit>,
    },
}

#[derive(Debug)]
pub enum ArrayInit {
    List(Vec<Expr>),
    Str(StringId),
}

#[derive(Debug)]
pub enum Stmt {
    Decl(Decl),
    /// A source label id; `Stmt::Goto` and `Stmt::Label` share this id
    /// space, negated on emission to keep it disjoint from synthetic
    /// labels (see register/label allocation).
    Label(i64, Box<Stmt>),
    Case(i64, Box<Stmt>),
    Default(Box<Stmt>),
    Compound(Vec<Stmt>),
    Expr(Expr),
    Null,
    If {
        cond: Expr,
        tt: Box<Stmt>,
        ff: Option<Box<Stmt>>,
    },
    Switch {
        cond: Expr,
        body: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Do {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        incr: Option<Expr>,
        body: Box<Stmt>,
    },
    Goto(i64),
    Continue,
    Break,
    Return(Option<Expr>),
}

#[derive(Debug)]
pub enum Expr {
    Cast {
        to: TypeId,
        expr: Box<Expr>,
    },
    Identifier(IdentId),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(StringId),
    NullLiteral,
    Subscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: IdentId,
        args: Vec<Expr>,
    },
    Member {
        base: Box<Expr>,
        field: usize,
        arrow: bool,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Plain or compound (`+=` etc.) assignment; `op = None` is plain `=`.
    Assign {
        op: Option<BinOp>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        tt: Box<Expr>,
        ff: Box<Expr>,
    },
    Initializer(Vec<Expr>),
    /// Raw pass-through text, for constructs the front end has already
    /// lowered to something the back end need not understand structurally.
    Inline(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Neg,
    BitNot,
    LogNot,
    Abs,
    AddrOf,
    Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LogAnd,
    LogOr,
}

impl BinOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    pub fn is_short_circuit(&self) -> bool {
        matches!(self, BinOp::LogAnd | BinOp::LogOr)
    }
}
