//! Errors reported by the retiming pass.

use gapl_common::InternalError;
use gapl_graph::GraphError;

/// Errors that abort retiming.
#[derive(Debug, thiserror::Error)]
pub enum RetimeError {
    /// The module's circuit graph is invalid, e.g. it has a combinational loop.
    #[error("cannot retime `{module}`: {source}")]
    Graph {
        /// Name of the module.
        module: String,
        /// The graph failure.
        #[source]
        source: GraphError,
    },

    /// No legal retiming reaches the requested clock period.
    #[error("clock period {target} is unreachable for `{module}` (current period {original})")]
    TargetUnreachable {
        /// Name of the module.
        module: String,
        /// Requested period.
        target: i64,
        /// Period before retiming.
        original: i64,
    },

    /// The delay model names a function outside the predefined catalog.
    #[error("delay model names unknown function `{name}`")]
    UnknownDelayFunction {
        /// The configured name.
        name: String,
    },

    /// A retiming invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl RetimeError {
    pub(crate) fn graph(module: &str) -> impl FnOnce(GraphError) -> RetimeError + '_ {
        move |source| match source {
            GraphError::Internal(err) => RetimeError::Internal(err),
            source => RetimeError::Graph {
                module: module.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_target_unreachable() {
        let err = RetimeError::TargetUnreachable {
            module: "top".to_string(),
            target: 0,
            original: 3,
        };
        assert_eq!(
            format!("{err}"),
            "clock period 0 is unreachable for `top` (current period 3)"
        );
    }

    #[test]
    fn graph_internal_errors_stay_internal() {
        let err = RetimeError::graph("top")(GraphError::Internal(InternalError::new("lost lags")));
        assert!(matches!(err, RetimeError::Internal(_)));
        let err = RetimeError::graph("top")(GraphError::CombinationalLoop { nodes: 2 });
        assert!(matches!(err, RetimeError::Graph { module, .. } if module == "top"));
    }
}
