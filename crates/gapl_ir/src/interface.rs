//! Concrete interface shapes.
//!
//! An [`InterfaceStructure`] is the fully expanded, generic-free shape of a
//! port: a single wire, a named record of sub-interfaces, or a fixed-size
//! vector. Record fields keep their declaration order for layout, but two
//! records compare equal whenever they map the same names to equal
//! structures.

use gapl_common::{Ident, Interner};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// The expanded shape of an interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InterfaceStructure {
    /// A single bit.
    Wire,
    /// Named sub-interfaces in declaration order. Names are unique.
    Record(Vec<(Ident, InterfaceStructure)>),
    /// `size` copies of `element`.
    Vector {
        /// Element shape.
        element: Box<InterfaceStructure>,
        /// Number of elements.
        size: u32,
    },
}

impl InterfaceStructure {
    /// Creates a vector of `size` copies of `element`.
    pub fn vector(element: InterfaceStructure, size: u32) -> Self {
        Self::Vector {
            element: Box::new(element),
            size,
        }
    }

    /// Creates a `size`-bit wide bus, the shape of most predefined function ports.
    pub fn bus(size: u32) -> Self {
        Self::vector(Self::Wire, size)
    }

    /// Returns the number of leaf wires in this interface.
    ///
    /// Saturates at `u32::MAX`; structures coming out of the builder have
    /// passed [`checked_width`](Self::checked_width).
    pub fn width(&self) -> u32 {
        self.checked_width().unwrap_or(u32::MAX)
    }

    /// Returns the number of leaf wires, or `None` if it does not fit in 32 bits.
    pub fn checked_width(&self) -> Option<u32> {
        u32::try_from(self.full_width()).ok()
    }

    /// Leaf count without the 32-bit limit, saturating at `u64::MAX`.
    pub fn full_width(&self) -> u64 {
        match self {
            Self::Wire => 1,
            Self::Record(fields) => fields
                .iter()
                .fold(0u64, |acc, (_, s)| acc.saturating_add(s.full_width())),
            Self::Vector { element, size } => element.full_width().saturating_mul(u64::from(*size)),
        }
    }

    /// Returns the structure of a record field.
    pub fn field(&self, name: Ident) -> Option<&InterfaceStructure> {
        match self {
            Self::Record(fields) => fields.iter().find(|(n, _)| *n == name).map(|(_, s)| s),
            _ => None,
        }
    }

    /// Renders the structure with resolved names, for diagnostics.
    pub fn describe(&self, interner: &Interner) -> String {
        match self {
            Self::Wire => "wire".to_string(),
            Self::Vector { element, size } => format!("{}[{size}]", element.describe(interner)),
            Self::Record(fields) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|(n, s)| format!("{}: {}", interner.resolve(*n), s.describe(interner)))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }

    fn sorted_fields(fields: &[(Ident, InterfaceStructure)]) -> Vec<&(Ident, InterfaceStructure)> {
        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(n, _)| *n);
        sorted
    }
}

impl PartialEq for InterfaceStructure {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Wire, Self::Wire) => true,
            (
                Self::Vector { element, size },
                Self::Vector {
                    element: other_element,
                    size: other_size,
                },
            ) => size == other_size && element == other_element,
            (Self::Record(a), Self::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(name, s)| other.field(*name).is_some_and(|o| o == s))
            }
            _ => false,
        }
    }
}

impl Eq for InterfaceStructure {}

impl Hash for InterfaceStructure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Wire => {}
            Self::Vector { element, size } => {
                size.hash(state);
                element.hash(state);
            }
            Self::Record(fields) => {
                fields.len().hash(state);
                for (name, s) in Self::sorted_fields(fields) {
                    name.hash(state);
                    s.hash(state);
                }
            }
        }
    }
}

/// Whether a port carries plain signals or a valid/ready stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceKind {
    /// Data wires only.
    #[default]
    Signal,
    /// Data wires plus a valid (forward) and ready (reverse) handshake pair.
    Stream,
}

/// A named, expanded port of a module or predefined function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortDescription {
    /// Port name.
    pub name: Ident,
    /// Expanded shape.
    pub structure: InterfaceStructure,
    /// Signal or stream.
    pub kind: InterfaceKind,
}

impl PortDescription {
    /// Creates a plain signal port.
    pub fn signal(name: Ident, structure: InterfaceStructure) -> Self {
        Self {
            name,
            structure,
            kind: InterfaceKind::Signal,
        }
    }
}
