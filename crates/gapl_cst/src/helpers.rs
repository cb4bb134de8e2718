use crate::{
    CstAccessor, CstBinaryOp, CstCircuitExpression, CstCircuitGroupExpression,
    CstCircuitNodeExpression, CstCircuitStatement, CstExpression, CstFunctionDefinition,
    CstFunctionIo, CstIoKind, CstParameterDefinition, CstParameterType,
};

impl CstExpression {
    /// `name`
    pub fn atom(identifier: &str) -> Self {
        Self::call(identifier, Vec::new())
    }

    /// `name(values...)`
    pub fn call(identifier: &str, parameter_values: Vec<CstExpression>) -> Self {
        Self::Atom {
            identifier: identifier.to_string(),
            parameter_values,
        }
    }

    /// An integer literal.
    pub fn int(value: i64) -> Self {
        Self::IntLiteral(value)
    }

    /// `element[size]` in interface position.
    pub fn vector(element: CstExpression, size: CstExpression) -> Self {
        element.index(size)
    }

    /// `wire[size]`
    pub fn wire_vector(size: CstExpression) -> Self {
        Self::vector(Self::Wire, size)
    }

    /// `self[index]`
    pub fn index(self, index: CstExpression) -> Self {
        self.access(CstAccessor::VectorItem {
            index: Box::new(index),
        })
    }

    /// `self[start:end]`
    pub fn slice(self, start: CstExpression, end: CstExpression) -> Self {
        self.access(CstAccessor::VectorSlice {
            start: Box::new(start),
            end: Box::new(end),
        })
    }

    /// `self.member`
    pub fn member(self, port_identifier: &str) -> Self {
        self.access(CstAccessor::Member {
            port_identifier: port_identifier.to_string(),
        })
    }

    fn access(self, accessor: CstAccessor) -> Self {
        Self::Accessor {
            accessed: Box::new(self),
            accessor,
        }
    }

    /// `lhs op rhs`
    pub fn binary(op: CstBinaryOp, lhs: CstExpression, rhs: CstExpression) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

impl CstCircuitNodeExpression {
    /// A bare expression.
    pub fn lone(expression: CstExpression) -> Self {
        Self::Lone(expression)
    }

    /// `declare name: ty`
    pub fn declared(name: &str, ty: CstExpression) -> Self {
        Self::Declared {
            declared_identifier: name.to_string(),
            ty,
        }
    }
}

impl CstCircuitExpression {
    /// A chain whose stages are the given node groups.
    pub fn chain(groups: Vec<Vec<CstCircuitNodeExpression>>) -> Self {
        Self {
            connected_groups: groups
                .into_iter()
                .map(|grouped_nodes| CstCircuitGroupExpression { grouped_nodes })
                .collect(),
        }
    }
}

impl CstCircuitStatement {
    /// `a => b => c;` with one node per stage.
    pub fn connect(nodes: Vec<CstCircuitNodeExpression>) -> Self {
        Self::chain(nodes.into_iter().map(|n| vec![n]).collect())
    }

    /// A chain with explicit groups.
    pub fn chain(groups: Vec<Vec<CstCircuitNodeExpression>>) -> Self {
        Self::NonConditional(CstCircuitExpression::chain(groups))
    }

    /// `if (predicate) { if_body } else { else_body }`
    pub fn conditional(
        predicate: CstExpression,
        if_body: Vec<CstCircuitStatement>,
        else_body: Vec<CstCircuitStatement>,
    ) -> Self {
        Self::Conditional {
            predicate,
            if_body,
            else_body,
        }
    }
}

impl CstFunctionIo {
    /// A plain signal port.
    pub fn signal(name: &str, interface_type: CstExpression) -> Self {
        Self {
            declared_identifier: name.to_string(),
            interface_type,
            kind: CstIoKind::Signal,
        }
    }

    /// A stream port.
    pub fn stream(name: &str, interface_type: CstExpression) -> Self {
        Self {
            kind: CstIoKind::Stream,
            ..Self::signal(name, interface_type)
        }
    }
}

impl CstParameterDefinition {
    fn new(name: &str, ty: CstParameterType) -> Self {
        Self {
            declared_identifier: name.to_string(),
            ty,
        }
    }

    /// `name: integer`
    pub fn integer(name: &str) -> Self {
        Self::new(name, CstParameterType::Integer)
    }

    /// `name: interface`
    pub fn interface(name: &str) -> Self {
        Self::new(name, CstParameterType::Interface)
    }

    /// `name: inputs => outputs`
    pub fn function(name: &str, inputs: Vec<CstExpression>, outputs: Vec<CstExpression>) -> Self {
        Self::new(name, CstParameterType::Function { inputs, outputs })
    }
}

impl CstFunctionDefinition {
    /// An empty function definition.
    pub fn new(name: &str) -> Self {
        Self {
            declared_identifier: name.to_string(),
            parameter_definitions: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Appends a generic parameter.
    pub fn parameter(mut self, parameter: CstParameterDefinition) -> Self {
        self.parameter_definitions.push(parameter);
        self
    }

    /// Appends an input.
    pub fn input(mut self, io: CstFunctionIo) -> Self {
        self.inputs.push(io);
        self
    }

    /// Appends an output.
    pub fn output(mut self, io: CstFunctionIo) -> Self {
        self.outputs.push(io);
        self
    }

    /// Appends a statement.
    pub fn statement(mut self, statement: CstCircuitStatement) -> Self {
        self.statements.push(statement);
        self
    }
}
