//! Errors reported while building netlist modules.

use gapl_common::InternalError;

/// Errors that abort the build of a design.
///
/// Names and shapes are rendered to strings when the error is raised, so the
/// error can be displayed without access to the interner.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An invocation names a function that is neither defined nor predefined.
    #[error("unknown function `{name}`")]
    UnknownFunction {
        /// The function name.
        name: String,
    },

    /// An interface expression names an interface that is not defined.
    #[error("unknown interface `{name}`")]
    UnknownInterface {
        /// The interface name.
        name: String,
    },

    /// A generic parameter is used but has no bound value.
    #[error("generic `{name}` has no bound value")]
    UnboundGeneric {
        /// The generic parameter name.
        name: String,
    },

    /// A reference, member or port group does not exist.
    #[error("no port or node `{name}` in `{module}`")]
    UnresolvedPort {
        /// The module being built.
        module: String,
        /// The missing name.
        name: String,
    },

    /// Two connected ends differ in count or structure.
    #[error("cannot connect {driver} to {driven} in `{module}`")]
    ConnectionShape {
        /// The module being built.
        module: String,
        /// Description of the driving side.
        driver: String,
        /// Description of the driven side.
        driven: String,
    },

    /// A value of the wrong kind was supplied.
    #[error("{context}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Where the mismatch was found.
        context: String,
        /// What was required.
        expected: String,
        /// What was supplied.
        found: String,
    },

    /// An instantiation supplies the wrong number of generic values.
    #[error("`{name}` expects {expected} {kind} argument(s), found {found}")]
    GenericArity {
        /// The instantiated definition.
        name: String,
        /// `interface` or `parameter`.
        kind: &'static str,
        /// Number of declared generics of that kind.
        expected: usize,
        /// Number of supplied values of that kind.
        found: usize,
    },

    /// A wire is driven by more than one source.
    #[error("wire {wire} in `{module}` has more than one driver")]
    MultipleDrivers {
        /// The module being built.
        module: String,
        /// The doubly driven wire.
        wire: String,
    },

    /// A vector index or slice bound lies outside the vector.
    #[error("index {index} is out of range for a vector of {len} in `{module}`")]
    IndexOutOfRange {
        /// The module being built.
        module: String,
        /// The offending index.
        index: i64,
        /// Length of the accessed vector.
        len: u32,
    },

    /// A slice whose first bound lies after its last.
    #[error("slice [{first}:{last}] is reversed in `{module}`")]
    ReversedSlice {
        /// The module being built.
        module: String,
        /// The first bound.
        first: i64,
        /// The last bound.
        last: i64,
    },

    /// A vector size evaluated to a negative number.
    #[error("vector size must be non-negative, found {value}")]
    NegativeSize {
        /// The evaluated size.
        value: i64,
    },

    /// A vector size or an interface's total width does not fit in 32 bits.
    #[error("size {value} does not fit in 32 bits")]
    SizeTooLarge {
        /// The evaluated size.
        value: i64,
    },

    /// A static expression divides by zero.
    #[error("division by zero in static expression")]
    DivisionByZero,

    /// An invocation or interface is instantiated while already being built.
    #[error("recursive instantiation of `{name}`")]
    RecursiveInstantiation {
        /// The invocation or interface being re-entered.
        name: String,
    },

    /// A builder invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unresolved_port() {
        let err = BuildError::UnresolvedPort {
            module: "top()".to_string(),
            name: "q".to_string(),
        };
        assert_eq!(format!("{err}"), "no port or node `q` in `top()`");
    }

    #[test]
    fn display_generic_arity() {
        let err = BuildError::GenericArity {
            name: "add".to_string(),
            kind: "parameter",
            expected: 1,
            found: 2,
        };
        assert_eq!(
            format!("{err}"),
            "`add` expects 1 parameter argument(s), found 2"
        );
    }

    #[test]
    fn display_internal_is_transparent() {
        let err = BuildError::from(InternalError::new("dangling node"));
        assert_eq!(format!("{err}"), "internal compiler error: dangling node");
    }

    #[test]
    fn display_recursive_instantiation() {
        let err = BuildError::RecursiveInstantiation {
            name: "loop()".to_string(),
        };
        assert_eq!(format!("{err}"), "recursive instantiation of `loop()`");
    }
}
