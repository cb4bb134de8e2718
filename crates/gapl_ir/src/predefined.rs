//! Catalog of predefined (primitive) functions.
//!
//! Predefined functions are never built from GAPL source. An invocation whose
//! name appears in [`PredefinedOp::ALL`] becomes a [`PredefinedFunction`] node
//! carrying its generic arguments, and its port signature is derived here.

use crate::interface::{InterfaceStructure, PortDescription};
use crate::invocation::{ModuleInvocation, ParameterValue};
use gapl_common::Interner;
use serde::{Deserialize, Serialize};

/// Name of a predefined function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredefinedOp {
    /// `less_than(size)`
    LessThan,
    /// `greater_than(size)`
    GreaterThan,
    /// `less_than_equals(size)`
    LessThanEquals,
    /// `greater_than_equals(size)`
    GreaterThanEquals,
    /// `equals(size)`
    Equals,
    /// `not_equals(size)`
    NotEquals,
    /// `and()` over single wires.
    And,
    /// `or()` over single wires.
    Or,
    /// `not()` over a single wire.
    Not,
    /// `bitwise_and(size)`
    BitwiseAnd,
    /// `bitwise_or(size)`
    BitwiseOr,
    /// `bitwise_xor(size)`
    BitwiseXor,
    /// `bitwise_not(size)`
    BitwiseNot,
    /// `add(size)`
    Add,
    /// `subtract(size)`
    Subtract,
    /// `multiply(size)`
    Multiply,
    /// `left_shift(size)`
    LeftShift,
    /// `right_shift(size)`
    RightShift,
    /// `register(T)`
    Register,
    /// `literal(size, value)`
    Literal,
    /// `mux(T)(count)`
    Mux,
    /// `demux(T)(count)`
    Demux,
    /// `priority(T)(count)`
    Priority,
}

impl PredefinedOp {
    /// Every predefined function, in catalog order.
    pub const ALL: [PredefinedOp; 23] = [
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanEquals,
        Self::GreaterThanEquals,
        Self::Equals,
        Self::NotEquals,
        Self::And,
        Self::Or,
        Self::Not,
        Self::BitwiseAnd,
        Self::BitwiseOr,
        Self::BitwiseXor,
        Self::BitwiseNot,
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::LeftShift,
        Self::RightShift,
        Self::Register,
        Self::Literal,
        Self::Mux,
        Self::Demux,
        Self::Priority,
    ];

    /// Returns the source-level name.
    pub fn name(self) -> &'static str {
        match self {
            Self::LessThan => "less_than",
            Self::GreaterThan => "greater_than",
            Self::LessThanEquals => "less_than_equals",
            Self::GreaterThanEquals => "greater_than_equals",
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::BitwiseAnd => "bitwise_and",
            Self::BitwiseOr => "bitwise_or",
            Self::BitwiseXor => "bitwise_xor",
            Self::BitwiseNot => "bitwise_not",
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::LeftShift => "left_shift",
            Self::RightShift => "right_shift",
            Self::Register => "register",
            Self::Literal => "literal",
            Self::Mux => "mux",
            Self::Demux => "demux",
            Self::Priority => "priority",
        }
    }

    /// Looks up a predefined function by its source-level name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan
                | Self::GreaterThan
                | Self::LessThanEquals
                | Self::GreaterThanEquals
                | Self::Equals
                | Self::NotEquals
        )
    }
}

/// A predefined function with its generic arguments applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredefinedFunction {
    /// Two `size`-bit operands. Comparisons produce a single wire, every other
    /// operator produces `size` bits.
    Binary {
        /// Operator.
        op: PredefinedOp,
        /// Operand width.
        size: u32,
    },
    /// Logical `and` / `or` over single wires.
    Logical(PredefinedOp),
    /// Logical negation of a single wire.
    Not,
    /// Bitwise negation of a `size`-bit operand.
    BitwiseNot {
        /// Operand width.
        size: u32,
    },
    /// A clocked register holding one value of the given interface.
    Register(InterfaceStructure),
    /// A constant.
    Literal {
        /// Output width.
        size: u32,
        /// Constant value.
        value: i64,
    },
    /// `mux`, `demux` or `priority` over `count` values of `element`.
    Selection {
        /// Operator.
        op: PredefinedOp,
        /// Shape of one value.
        element: InterfaceStructure,
        /// Number of alternatives.
        count: u32,
    },
}

/// Input and output ports of a predefined function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Input ports in order.
    pub inputs: Vec<PortDescription>,
    /// Output ports in order.
    pub outputs: Vec<PortDescription>,
}

/// Errors produced when generic arguments do not fit a predefined function.
#[derive(Debug, thiserror::Error)]
pub enum PredefinedArgumentError {
    /// Wrong number of interface or parameter arguments.
    #[error(
        "`{function}` expects {expected_interfaces} interface and {expected_parameters} parameter argument(s), found {found_interfaces} and {found_parameters}"
    )]
    Arity {
        /// Predefined function name.
        function: &'static str,
        /// Expected interface argument count.
        expected_interfaces: usize,
        /// Expected parameter argument count.
        expected_parameters: usize,
        /// Actual interface argument count.
        found_interfaces: usize,
        /// Actual parameter argument count.
        found_parameters: usize,
    },
    /// A parameter that must be an integer was a function.
    #[error("parameter {index} of `{function}` must be an integer")]
    ExpectedInteger {
        /// Predefined function name.
        function: &'static str,
        /// Position of the offending parameter.
        index: usize,
    },
    /// A width or count parameter was negative or too large.
    #[error("parameter {index} of `{function}` must be a non-negative 32-bit size, found {value}")]
    InvalidSize {
        /// Predefined function name.
        function: &'static str,
        /// Position of the offending parameter.
        index: usize,
        /// Value found.
        value: i64,
    },
}

impl PredefinedFunction {
    /// Applies the generic arguments of `invocation` to `op`.
    pub fn from_invocation(
        op: PredefinedOp,
        invocation: &ModuleInvocation,
    ) -> Result<Self, PredefinedArgumentError> {
        let (interfaces, parameters) = match op {
            PredefinedOp::And | PredefinedOp::Or | PredefinedOp::Not => (0, 0),
            PredefinedOp::Register => (1, 0),
            PredefinedOp::Literal => (0, 2),
            PredefinedOp::Mux | PredefinedOp::Demux | PredefinedOp::Priority => (1, 1),
            _ => (0, 1),
        };
        if invocation.interfaces.len() != interfaces || invocation.parameters.len() != parameters {
            return Err(PredefinedArgumentError::Arity {
                function: op.name(),
                expected_interfaces: interfaces,
                expected_parameters: parameters,
                found_interfaces: invocation.interfaces.len(),
                found_parameters: invocation.parameters.len(),
            });
        }

        let integer = |index: usize| match &invocation.parameters[index] {
            ParameterValue::Integer(v) => Ok(*v),
            ParameterValue::Function(_) => Err(PredefinedArgumentError::ExpectedInteger {
                function: op.name(),
                index,
            }),
        };
        let size = |index: usize| {
            let value = integer(index)?;
            u32::try_from(value).map_err(|_| PredefinedArgumentError::InvalidSize {
                function: op.name(),
                index,
                value,
            })
        };

        Ok(match op {
            PredefinedOp::And | PredefinedOp::Or => Self::Logical(op),
            PredefinedOp::Not => Self::Not,
            PredefinedOp::BitwiseNot => Self::BitwiseNot { size: size(0)? },
            PredefinedOp::Register => Self::Register(invocation.interfaces[0].clone()),
            PredefinedOp::Literal => Self::Literal {
                size: size(0)?,
                value: integer(1)?,
            },
            PredefinedOp::Mux | PredefinedOp::Demux | PredefinedOp::Priority => {
                let element = invocation.interfaces[0].clone();
                let count = size(0)?;
                if InterfaceStructure::vector(element.clone(), count).checked_width().is_none() {
                    return Err(PredefinedArgumentError::InvalidSize {
                        function: op.name(),
                        index: 0,
                        value: i64::from(count),
                    });
                }
                Self::Selection { op, element, count }
            }
            _ => Self::Binary { op, size: size(0)? },
        })
    }

    /// Returns the operator this function applies.
    pub fn op(&self) -> PredefinedOp {
        match self {
            Self::Binary { op, .. } | Self::Logical(op) | Self::Selection { op, .. } => *op,
            Self::Not => PredefinedOp::Not,
            Self::BitwiseNot { .. } => PredefinedOp::BitwiseNot,
            Self::Register(_) => PredefinedOp::Register,
            Self::Literal { .. } => PredefinedOp::Literal,
        }
    }

    /// Returns `true` for `register` nodes, the only stateful primitive.
    pub fn is_register(&self) -> bool {
        matches!(self, Self::Register(_))
    }

    /// Derives the port signature.
    pub fn signature(&self, interner: &Interner) -> Signature {
        let port = |name: &str, structure: InterfaceStructure| {
            PortDescription::signal(interner.get_or_intern(name), structure)
        };
        let (inputs, outputs) = match self {
            Self::Binary { op, size } => {
                let result = if op.is_comparison() {
                    InterfaceStructure::Wire
                } else {
                    InterfaceStructure::bus(*size)
                };
                (
                    vec![
                        port("lhs", InterfaceStructure::bus(*size)),
                        port("rhs", InterfaceStructure::bus(*size)),
                    ],
                    vec![port("result", result)],
                )
            }
            Self::Logical(_) => (
                vec![
                    port("lhs", InterfaceStructure::Wire),
                    port("rhs", InterfaceStructure::Wire),
                ],
                vec![port("result", InterfaceStructure::Wire)],
            ),
            Self::Not => (
                vec![port("input", InterfaceStructure::Wire)],
                vec![port("result", InterfaceStructure::Wire)],
            ),
            Self::BitwiseNot { size } => (
                vec![port("input", InterfaceStructure::bus(*size))],
                vec![port("result", InterfaceStructure::bus(*size))],
            ),
            Self::Register(structure) => (
                vec![port("next", structure.clone())],
                vec![port("current", structure.clone())],
            ),
            Self::Literal { size, .. } => (vec![], vec![port("value", InterfaceStructure::bus(*size))]),
            Self::Selection { op, element, count } => {
                let selector = port("selector", InterfaceStructure::bus(selector_width(*count)));
                match op {
                    PredefinedOp::Mux => (
                        vec![
                            selector,
                            port("inputs", InterfaceStructure::vector(element.clone(), *count)),
                        ],
                        vec![port("output", element.clone())],
                    ),
                    PredefinedOp::Demux => (
                        vec![selector, port("input", element.clone())],
                        vec![port("outputs", InterfaceStructure::vector(element.clone(), *count))],
                    ),
                    _ => {
                        let entry = InterfaceStructure::Record(vec![
                            (interner.get_or_intern("condition"), InterfaceStructure::Wire),
                            (interner.get_or_intern("value"), element.clone()),
                        ]);
                        (
                            vec![
                                port("conditions", InterfaceStructure::vector(entry, *count)),
                                port("default", element.clone()),
                            ],
                            vec![port("output", element.clone())],
                        )
                    }
                }
            }
        };
        Signature { inputs, outputs }
    }
}

/// Number of selector bits needed to address `count` alternatives (at least one).
pub fn selector_width(count: u32) -> u32 {
    if count <= 1 {
        1
    } else {
        u32::BITS - (count - 1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(interner: &Interner, name: &str, interfaces: Vec<InterfaceStructure>, parameters: Vec<i64>) -> ModuleInvocation {
        ModuleInvocation {
            function: interner.get_or_intern(name),
            interfaces,
            parameters: parameters.into_iter().map(ParameterValue::Integer).collect(),
        }
    }

    #[test]
    fn names_roundtrip() {
        for op in PredefinedOp::ALL {
            assert_eq!(PredefinedOp::from_name(op.name()), Some(op));
        }
        assert_eq!(PredefinedOp::from_name("vector_map"), None);
    }

    #[test]
    fn add_signature() {
        let interner = Interner::new();
        let inv = invocation(&interner, "add", vec![], vec![32]);
        let f = PredefinedFunction::from_invocation(PredefinedOp::Add, &inv).unwrap();
        let sig = f.signature(&interner);
        let names: Vec<&str> = sig.inputs.iter().map(|p| interner.resolve(p.name)).collect();
        assert_eq!(names, vec!["lhs", "rhs"]);
        assert!(sig.inputs.iter().all(|p| p.structure == InterfaceStructure::bus(32)));
        assert_eq!(sig.outputs.len(), 1);
        assert_eq!(interner.resolve(sig.outputs[0].name), "result");
        assert_eq!(sig.outputs[0].structure, InterfaceStructure::bus(32));
    }

    #[test]
    fn comparison_produces_single_wire() {
        let interner = Interner::new();
        let inv = invocation(&interner, "less_than", vec![], vec![8]);
        let f = PredefinedFunction::from_invocation(PredefinedOp::LessThan, &inv).unwrap();
        assert_eq!(f.signature(&interner).outputs[0].structure, InterfaceStructure::Wire);
    }

    #[test]
    fn register_keeps_interface() {
        let interner = Interner::new();
        let inv = invocation(&interner, "register", vec![InterfaceStructure::bus(4)], vec![]);
        let f = PredefinedFunction::from_invocation(PredefinedOp::Register, &inv).unwrap();
        assert!(f.is_register());
        let sig = f.signature(&interner);
        assert_eq!(sig.inputs[0].structure, sig.outputs[0].structure);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let interner = Interner::new();
        let inv = invocation(&interner, "add", vec![], vec![]);
        let err = PredefinedFunction::from_invocation(PredefinedOp::Add, &inv).unwrap_err();
        assert!(matches!(err, PredefinedArgumentError::Arity { found_parameters: 0, .. }));
    }

    #[test]
    fn negative_size_is_rejected() {
        let interner = Interner::new();
        let inv = invocation(&interner, "add", vec![], vec![-1]);
        let err = PredefinedFunction::from_invocation(PredefinedOp::Add, &inv).unwrap_err();
        assert!(matches!(err, PredefinedArgumentError::InvalidSize { value: -1, .. }));
    }

    #[test]
    fn mux_selector_width() {
        assert_eq!(selector_width(1), 1);
        assert_eq!(selector_width(2), 1);
        assert_eq!(selector_width(4), 2);
        assert_eq!(selector_width(5), 3);
        let interner = Interner::new();
        let inv = invocation(&interner, "mux", vec![InterfaceStructure::bus(8)], vec![4]);
        let f = PredefinedFunction::from_invocation(PredefinedOp::Mux, &inv).unwrap();
        let sig = f.signature(&interner);
        assert_eq!(sig.inputs[0].structure, InterfaceStructure::bus(2));
        assert_eq!(sig.inputs[1].structure.width(), 32);
    }

    #[test]
    fn selection_wider_than_32_bits_is_rejected() {
        let interner = Interner::new();
        let inv = invocation(&interner, "mux", vec![InterfaceStructure::bus(65536)], vec![65536]);
        let err = PredefinedFunction::from_invocation(PredefinedOp::Mux, &inv).unwrap_err();
        assert!(matches!(
            err,
            PredefinedArgumentError::InvalidSize { function: "mux", index: 0, value: 65536 }
        ));
    }
}
