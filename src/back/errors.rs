//! The error sink contract (§6/§7): a stable set of error codes, reported
//! through an injected sink rather than returned as a `Result` or raised
//! as a panic — the generator keeps emitting what it can after a report.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A call site passed more than the supported argument-buffer size.
    TooManyArguments,
    /// An array has more than one dynamic dimension, or a dynamic
    /// dimension anywhere but the outermost position.
    SuchArrayIsNotSupported,
    /// An array mixes static and dynamic dimensions in an unsupported way
    /// (a constant dimension cannot appear inside a dynamic outer one).
    ArrayBordersCannotBeStaticDynamic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorCode::TooManyArguments => "too_many_arguments",
            ErrorCode::SuchArrayIsNotSupported => "such_array_is_not_supported",
            ErrorCode::ArrayBordersCannotBeStaticDynamic => {
                "array_borders_cannot_be_static_dynamic"
            }
        };
        write!(f, "{msg}")
    }
}

/// The external error-reporting collaborator. `encode` takes this by
/// `&mut dyn ErrorSink` and returns the accumulated count itself; the sink
/// need not count anything (a logging sink is a valid impl).
pub trait ErrorSink {
    fn report(&mut self, code: ErrorCode);
}

/// The sink used by the CLI and by tests: every reported code is kept, in
/// order, for inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub errors: Vec<ErrorCode>,
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, code: ErrorCode) {
        self.errors.push(code);
    }
}
