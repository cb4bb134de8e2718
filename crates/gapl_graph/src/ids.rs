//! Opaque ID newtypes for graph entities.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a node in a [`WeightedGraph`](crate::graph::WeightedGraph).
    GraphNodeId
);

define_id!(
    /// Opaque, copyable ID for an edge in a [`WeightedGraph`](crate::graph::WeightedGraph).
    GraphEdgeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrip() {
        assert_eq!(GraphNodeId::from_raw(7).as_raw(), 7);
        assert_eq!(GraphEdgeId::from_raw(3).index(), 3);
    }
}
