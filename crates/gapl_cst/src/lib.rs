//! Concrete syntax tree of GAPL programs.
//!
//! The parser lives outside this workspace; it hands the compiler a
//! [`CstProgram`], either in memory or serialized as JSON. Names are plain
//! strings here and nothing has been resolved yet.
//!
//! The helper constructors on [`CstExpression`] and friends keep hand-written
//! trees in tests short.

#![warn(missing_docs)]

mod helpers;

use serde::{Deserialize, Serialize};

/// A whole source program.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CstProgram {
    /// `interface` definitions.
    #[serde(default)]
    pub interface_definitions: Vec<CstInterfaceDefinition>,
    /// `function` definitions.
    #[serde(default)]
    pub function_definitions: Vec<CstFunctionDefinition>,
}

/// An `interface` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstInterfaceDefinition {
    /// `interface name(params) = expr;`
    Alias {
        /// Declared name.
        declared_identifier: String,
        /// Generic parameters.
        #[serde(default)]
        parameter_definitions: Vec<CstParameterDefinition>,
        /// The aliased interface expression.
        aliased_interface: CstExpression,
    },
    /// `interface name(params) { port: type, ... }`
    Record {
        /// Declared name.
        declared_identifier: String,
        /// Generic parameters.
        #[serde(default)]
        parameter_definitions: Vec<CstParameterDefinition>,
        /// Member ports.
        ports: Vec<CstPortDefinition>,
    },
}

impl CstInterfaceDefinition {
    /// Returns the declared name.
    pub fn declared_identifier(&self) -> &str {
        match self {
            Self::Alias {
                declared_identifier,
                ..
            }
            | Self::Record {
                declared_identifier,
                ..
            } => declared_identifier,
        }
    }

    /// Returns the generic parameters.
    pub fn parameter_definitions(&self) -> &[CstParameterDefinition] {
        match self {
            Self::Alias {
                parameter_definitions,
                ..
            }
            | Self::Record {
                parameter_definitions,
                ..
            } => parameter_definitions,
        }
    }
}

/// A record member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstPortDefinition {
    /// Member name.
    pub declared_identifier: String,
    /// Member interface.
    pub interface_type: CstExpression,
}

/// A generic parameter of a function or interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstParameterDefinition {
    /// Parameter name.
    pub declared_identifier: String,
    /// Parameter kind.
    #[serde(rename = "type")]
    pub ty: CstParameterType,
}

/// Kind of a generic parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstParameterType {
    /// `name: integer`
    Integer,
    /// `name: interface`
    Interface,
    /// `name: inputs => outputs`
    Function {
        /// Input interfaces.
        inputs: Vec<CstExpression>,
        /// Output interfaces.
        outputs: Vec<CstExpression>,
    },
}

/// A `function` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstFunctionDefinition {
    /// Declared name.
    pub declared_identifier: String,
    /// Generic parameters.
    #[serde(default)]
    pub parameter_definitions: Vec<CstParameterDefinition>,
    /// Input ports.
    #[serde(default)]
    pub inputs: Vec<CstFunctionIo>,
    /// Output ports.
    #[serde(default)]
    pub outputs: Vec<CstFunctionIo>,
    /// Body.
    #[serde(default)]
    pub statements: Vec<CstCircuitStatement>,
}

/// A function input or output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstFunctionIo {
    /// Port name.
    pub declared_identifier: String,
    /// Port interface.
    pub interface_type: CstExpression,
    /// Signal or stream.
    #[serde(default)]
    pub kind: CstIoKind,
}

/// Whether a function port is a plain signal or a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstIoKind {
    /// Plain signal.
    #[default]
    Signal,
    /// Valid/ready stream.
    Stream,
}

/// A statement in a function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstCircuitStatement {
    /// `if (predicate) { ... } else { ... }`
    Conditional {
        /// Static predicate.
        predicate: CstExpression,
        /// Statements when the predicate holds.
        if_body: Vec<CstCircuitStatement>,
        /// Statements otherwise.
        #[serde(default)]
        else_body: Vec<CstCircuitStatement>,
    },
    /// A connection chain `a => b => c;`.
    NonConditional(CstCircuitExpression),
}

/// A connection chain: groups joined by `=>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstCircuitExpression {
    /// Stages in order.
    pub connected_groups: Vec<CstCircuitGroupExpression>,
}

/// One stage of a chain: comma-separated nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstCircuitGroupExpression {
    /// Nodes in order.
    pub grouped_nodes: Vec<CstCircuitNodeExpression>,
}

/// One node of a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstCircuitNodeExpression {
    /// A bare expression: a reference or an anonymous node.
    Lone(CstExpression),
    /// `declare name: type`
    Declared {
        /// Declared node name.
        declared_identifier: String,
        /// Node type.
        #[serde(rename = "type")]
        ty: CstExpression,
    },
    /// A parenthesized sub-chain.
    Parentheses(CstCircuitExpression),
}

/// Any expression: static, interface or circuit, decided during resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstExpression {
    /// A name, optionally with generic values: `name` or `name(a, b)`.
    Atom {
        /// The name.
        identifier: String,
        /// Generic values.
        #[serde(default)]
        parameter_values: Vec<CstExpression>,
    },
    /// `wire`
    Wire,
    /// `true`
    True,
    /// `false`
    False,
    /// An integer literal.
    IntLiteral(i64),
    /// `accessed[index]`, `accessed[start:end]` or `accessed.member`.
    Accessor {
        /// The expression being accessed.
        accessed: Box<CstExpression>,
        /// The access.
        accessor: CstAccessor,
    },
    /// `(expr)`
    Parenthesized(Box<CstExpression>),
    /// A binary operation.
    Binary {
        /// Operator.
        op: CstBinaryOp,
        /// Left operand.
        lhs: Box<CstExpression>,
        /// Right operand.
        rhs: Box<CstExpression>,
    },
}

/// An access applied to an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstAccessor {
    /// `[index]`; on an interface this declares a vector.
    VectorItem {
        /// Index or size.
        index: Box<CstExpression>,
    },
    /// `[start:end]`, inclusive.
    VectorSlice {
        /// First element.
        start: Box<CstExpression>,
        /// Last element.
        end: Box<CstExpression>,
    },
    /// `.member`
    Member {
        /// Member name.
        port_identifier: String,
    },
}

/// Binary operators of static expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CstBinaryOp {
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&&`
    And,
    /// `||`
    Or,
}
