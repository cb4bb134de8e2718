//! Error types for graph algorithms.

use gapl_common::InternalError;

/// Errors produced by graph algorithms and circuit validation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A topological order was requested for a cyclic graph.
    #[error("graph contains a cycle: {remaining} of {total} nodes could not be ordered")]
    Cycle {
        /// Nodes left unordered.
        remaining: usize,
        /// Total node count.
        total: usize,
    },
    /// A cycle without any register.
    #[error("combinational loop through {nodes} node(s)")]
    CombinationalLoop {
        /// Nodes on or behind the loop.
        nodes: usize,
    },
    /// A node with a negative propagation delay.
    #[error("node {node} has negative delay {weight}")]
    NegativeNodeWeight {
        /// Raw node ID.
        node: u32,
        /// The offending delay.
        weight: i64,
    },
    /// An edge with a negative register count.
    #[error("edge {edge} has negative register count {weight}")]
    NegativeEdgeWeight {
        /// Raw edge ID.
        edge: u32,
        /// The offending count.
        weight: i64,
    },
    /// A broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_cycle() {
        let err = GraphError::Cycle {
            remaining: 2,
            total: 5,
        };
        assert_eq!(
            err.to_string(),
            "graph contains a cycle: 2 of 5 nodes could not be ordered"
        );
    }

    #[test]
    fn internal_is_transparent() {
        let err: GraphError = InternalError::new("unsatisfiable").into();
        assert_eq!(err.to_string(), "internal compiler error: unsatisfiable");
    }
}
