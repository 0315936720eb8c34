//! The bundle handed to the code generator: the whole of the "upstream
//! producer" contract the code generator treats as an external
//! collaborator.

use std::io::Write;

use crate::common::IdentId;
use crate::front::ast::Program;
use crate::front::idents::IdentPool;
use crate::front::strings::StringPool;
use crate::front::types::TypePool;

/// Target selection from the workspace's command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    X86_64,
    MipsEl,
}

impl Target {
    /// The `target triple` / `target datalayout` prologue lines.
    pub fn header(&self) -> &'static str {
        match self {
            Target::X86_64 => {
                "target datalayout = \"e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-f80:128-n8:16:32:64-S128\"\n\
                 target triple = \"x86_64-unknown-linux-gnu\"\n"
            }
            Target::MipsEl => {
                "target datalayout = \"e-m:m-p:32:32-i8:8:32-i16:16:32-i64:64-n32-S64\"\n\
                 target triple = \"mipsel-unknown-linux-gnu\"\n"
            }
        }
    }
}

/// Workspace-wide flags; everything but the target is ignored by the code
/// generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Workspace {
    pub target: Target,
}

/// The semantic model produced by the (out of scope) front end: type pool,
/// identifier pool, string pool, the AST root, and the `main` identifier.
pub struct Syntax<'a> {
    pub types: TypePool,
    pub idents: IdentPool,
    pub strings: StringPool,
    pub main: IdentId,
    pub program: Program,
    pub io: &'a mut dyn Write,
}
