//! Error types for name resolution.

/// Errors produced while resolving a program.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A name that no enclosing scope declares and that is not predefined.
    #[error("unresolved symbol `{name}`")]
    UnresolvedSymbol {
        /// The name as written.
        name: String,
    },
    /// A name declared twice in one scope, or a predefined function name redeclared.
    #[error("redeclaration of `{name}` in {scope}")]
    Redeclaration {
        /// The duplicated name.
        name: String,
        /// Description of the scope.
        scope: String,
    },
    /// An expression used in a role its category does not allow.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// What the context requires.
        expected: &'static str,
        /// What was written.
        found: String,
    },
}
