//! Netlist intermediate representation for the GAPL compiler.
//!
//! The builder turns each distinct [`ModuleInvocation`] into one [`Module`]
//! stored in a [`Design`]. Modules hold arenas of [`Node`]s whose ports mirror
//! expanded [`InterfaceStructure`]s, and connect individual leaf wires through
//! [`WireRef`]s.

#![warn(missing_docs)]

pub mod arena;
pub mod design;
pub mod ids;
pub mod interface;
pub mod invocation;
pub mod module;
pub mod naming;
pub mod port;
pub mod predefined;

pub use arena::{Arena, ArenaId};
pub use design::Design;
pub use ids::{ModuleId, NodeId};
pub use interface::{InterfaceKind, InterfaceStructure, PortDescription};
pub use invocation::{ModuleInvocation, ParameterValue};
pub use module::{ConnectError, Connection, Module, Node, NodeKind};
pub use naming::module_name;
pub use port::{Port, PortParent, PortTree, Side, WireRef, WireSlot};
pub use predefined::{PredefinedArgumentError, PredefinedFunction, PredefinedOp, Signature};
