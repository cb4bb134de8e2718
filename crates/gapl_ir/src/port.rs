//! Ports, wire addressing, and port trees.
//!
//! Every node port owns a [`PortTree`] that mirrors its interface structure and
//! numbers the leaf wires in declaration order. Connections refer to single
//! leaf wires through [`WireRef`]s, so a connection never owns the port it
//! touches.

use crate::ids::NodeId;
use crate::interface::{InterfaceKind, InterfaceStructure, PortDescription};
use gapl_common::Ident;
use serde::{Deserialize, Serialize};

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Consumed by the node.
    Input,
    /// Produced by the node.
    Output,
}

/// The structure of a port with each leaf wire numbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortTree {
    /// A single wire and its leaf index within the port.
    Wire(u32),
    /// Named members in declaration order.
    Record(Vec<(Ident, PortTree)>),
    /// Vector elements. The element structure is kept so empty vectors keep their shape.
    Vector {
        /// Shape of one element.
        element: InterfaceStructure,
        /// Element trees.
        items: Vec<PortTree>,
    },
}

impl PortTree {
    /// Numbers the leaves of `structure` starting at zero.
    pub fn new(structure: &InterfaceStructure) -> Self {
        let mut next = 0;
        Self::build(structure, &mut next)
    }

    fn build(structure: &InterfaceStructure, next: &mut u32) -> Self {
        match structure {
            InterfaceStructure::Wire => {
                let leaf = *next;
                *next += 1;
                Self::Wire(leaf)
            }
            InterfaceStructure::Record(fields) => Self::Record(
                fields
                    .iter()
                    .map(|(name, s)| (*name, Self::build(s, next)))
                    .collect(),
            ),
            InterfaceStructure::Vector { element, size } => Self::Vector {
                element: (**element).clone(),
                items: (0..*size).map(|_| Self::build(element, next)).collect(),
            },
        }
    }

    /// Recovers the interface structure this tree covers.
    pub fn structure(&self) -> InterfaceStructure {
        match self {
            Self::Wire(_) => InterfaceStructure::Wire,
            Self::Record(fields) => {
                InterfaceStructure::Record(fields.iter().map(|(n, t)| (*n, t.structure())).collect())
            }
            Self::Vector { element, items } => {
                InterfaceStructure::vector(element.clone(), items.len() as u32)
            }
        }
    }

    /// Leaf indices in layout order.
    pub fn leaves(&self) -> Vec<u32> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<u32>) {
        match self {
            Self::Wire(leaf) => out.push(*leaf),
            Self::Record(fields) => fields.iter().for_each(|(_, t)| t.collect_leaves(out)),
            Self::Vector { items, .. } => items.iter().for_each(|t| t.collect_leaves(out)),
        }
    }

    /// Selects a record member.
    pub fn member(&self, name: Ident) -> Option<&PortTree> {
        match self {
            Self::Record(fields) => fields.iter().find(|(n, _)| *n == name).map(|(_, t)| t),
            _ => None,
        }
    }

    /// Number of elements if this is a vector.
    pub fn vector_len(&self) -> Option<u32> {
        match self {
            Self::Vector { items, .. } => Some(items.len() as u32),
            _ => None,
        }
    }

    /// Selects one vector element.
    pub fn index(&self, index: u32) -> Option<&PortTree> {
        match self {
            Self::Vector { items, .. } => items.get(index as usize),
            _ => None,
        }
    }

    /// Selects the inclusive element range `start..=end` of a vector.
    pub fn slice(&self, start: u32, end: u32) -> Option<PortTree> {
        match self {
            Self::Vector { element, items } if start <= end && (end as usize) < items.len() => {
                Some(Self::Vector {
                    element: element.clone(),
                    items: items[start as usize..=end as usize].to_vec(),
                })
            }
            _ => None,
        }
    }

    /// Pairs the leaves of two trees with equal structure.
    ///
    /// Records are matched by member name, so member order does not matter.
    /// Returns `None` if the structures differ.
    pub fn pair_leaves(&self, other: &PortTree) -> Option<Vec<(u32, u32)>> {
        let mut pairs = Vec::new();
        self.pair_into(other, &mut pairs).then_some(pairs)
    }

    fn pair_into(&self, other: &PortTree, pairs: &mut Vec<(u32, u32)>) -> bool {
        match (self, other) {
            (Self::Wire(a), Self::Wire(b)) => {
                pairs.push((*a, *b));
                true
            }
            (Self::Record(a), Self::Record(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(name, sub)| {
                        other
                            .member(*name)
                            .is_some_and(|theirs| sub.pair_into(theirs, pairs))
                    })
            }
            (
                Self::Vector {
                    element: ea,
                    items: a,
                },
                Self::Vector {
                    element: eb,
                    items: b,
                },
            ) => {
                ea == eb
                    && a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.pair_into(y, pairs))
            }
            _ => false,
        }
    }
}

/// Locates a port: its node, the side it sits on, and its position on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortParent {
    /// Owning node.
    pub node: NodeId,
    /// Input or output side.
    pub side: Side,
    /// Position among the node's ports on that side.
    pub index: u32,
}

/// A port on a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Port name.
    pub name: Ident,
    /// Expanded interface.
    pub structure: InterfaceStructure,
    /// Signal or stream.
    pub kind: InterfaceKind,
    /// Where the port lives.
    pub parent: PortParent,
    /// Numbered leaves.
    pub tree: PortTree,
}

impl Port {
    /// Creates a port from its description.
    pub fn new(description: PortDescription, parent: PortParent) -> Self {
        let tree = PortTree::new(&description.structure);
        Self {
            name: description.name,
            structure: description.structure,
            kind: description.kind,
            parent,
            tree,
        }
    }

    /// Returns `true` if the port carries a valid/ready handshake.
    pub fn has_handshake(&self) -> bool {
        self.kind == InterfaceKind::Stream
    }

    /// Addresses one wire of this port.
    pub fn wire(&self, slot: WireSlot) -> WireRef {
        WireRef {
            node: self.parent.node,
            side: self.parent.side,
            port: self.parent.index,
            slot,
        }
    }
}

/// One wire of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WireSlot {
    /// A data leaf.
    Data(u32),
    /// Handshake valid, travels with the data.
    Valid,
    /// Handshake ready, travels against the data.
    Ready,
}

/// A single wire within a module, addressed by node, side, port index and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireRef {
    /// Node owning the port.
    pub node: NodeId,
    /// Side of the port.
    pub side: Side,
    /// Port position on that side.
    pub port: u32,
    /// Wire within the port.
    pub slot: WireSlot,
}

impl WireRef {
    /// Returns `true` if the node owning this wire drives it.
    ///
    /// Data and valid wires flow from outputs to inputs; ready wires flow back.
    pub fn is_produced(&self) -> bool {
        match self.slot {
            WireSlot::Data(_) | WireSlot::Valid => self.side == Side::Output,
            WireSlot::Ready => self.side == Side::Input,
        }
    }
}
