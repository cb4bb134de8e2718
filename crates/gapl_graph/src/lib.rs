//! Weighted directed graphs and Leiserson–Saxe retiming.
//!
//! [`WeightedGraph`] carries an integer weight on every node and edge plus an
//! arbitrary payload. [`CircuitGraph`] interprets node weights as
//! propagation delays and edge weights as register counts, and
//! [`Retiming`] moves registers across nodes to minimize the clock period.
//!
//! The crate knows nothing about netlists; callers map their own node and
//! edge payloads in and out.

#![warn(missing_docs)]

pub mod circuit;
pub mod dot;
pub mod error;
pub mod graph;
pub mod ids;
pub mod retiming;

pub use circuit::CircuitGraph;
pub use error::GraphError;
pub use graph::{GraphEdge, GraphNode, WeightedGraph};
pub use ids::{GraphEdgeId, GraphNodeId};
pub use retiming::{minimize_clock_period, RetimedCircuit, Retiming};
