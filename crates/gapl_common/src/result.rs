//! Common result and error types for the GAPL compiler.

/// The standard result type for operations that can only fail through a bug.
///
/// `Err` indicates a broken internal invariant (a bug in the compiler), not a
/// user-facing error. User errors are reported through each stage's own
/// error enum.
pub type GaplResult<T> = Result<T, InternalError>;

/// An internal compiler error indicating a bug, not a user input problem.
///
/// Unsatisfiable retiming and dangling netlist references are reported this way:
/// they cannot be provoked by any well-formed program.
#[derive(Debug, thiserror::Error)]
#[error("internal compiler error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
