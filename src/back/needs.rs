//! Epilogue-gating flags.
//!
//! Replaces the source's bitset-over-builtin-ids plus scattered `was_*`
//! booleans with one struct the module emitter's epilogue reads by name.

#[derive(Debug, Clone, Default)]
pub struct Needs {
    /// Set when any `stacksave`/`stackrestore` pair was emitted anywhere in
    /// the translation unit.
    pub stacksave: bool,
    /// Set when an integer `abs` unary was lowered to a call to `@abs`.
    pub abs: bool,
    /// Set when a floating `abs` unary was lowered to a call to
    /// `@llvm.fabs.f64`.
    pub fabs: bool,
    /// Set when a `FILE` type was printed, requiring the `%struct._IO_FILE`
    /// / `%struct._IO_marker` definitions in the epilogue.
    pub io_file: bool,
    /// Builtin library functions (by identifier id) that were actually
    /// called, so the module epilogue only emits the extern declaration
    /// each one needs.
    pub called_builtins: std::collections::BTreeSet<crate::common::IdentId>,
}
