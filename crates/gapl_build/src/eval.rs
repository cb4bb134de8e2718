//! Static expression evaluation.
//!
//! Static expressions evaluate to `i64`. Booleans and comparisons produce `1`
//! or `0`; logical operators treat any non-zero value as true. Arithmetic
//! wraps on overflow.

use crate::bindings::Bindings;
use crate::error::BuildError;
use gapl_ast::{BinaryOp, StaticExpr};
use gapl_common::Interner;

/// Evaluates a static expression under the given bindings.
pub fn eval_static(
    expr: &StaticExpr,
    bindings: &Bindings,
    interner: &Interner,
) -> Result<i64, BuildError> {
    match expr {
        StaticExpr::Int(v) => Ok(*v),
        StaticExpr::Bool(b) => Ok(i64::from(*b)),
        StaticExpr::Param(name) => {
            bindings
                .integer(*name)
                .ok_or_else(|| BuildError::UnboundGeneric {
                    name: interner.resolve(*name).to_string(),
                })
        }
        StaticExpr::Binary { op, lhs, rhs } => {
            let l = eval_static(lhs, bindings, interner)?;
            let r = eval_static(rhs, bindings, interner)?;
            apply(*op, l, r)
        }
    }
}

fn apply(op: BinaryOp, l: i64, r: i64) -> Result<i64, BuildError> {
    Ok(match op {
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div => {
            if r == 0 {
                return Err(BuildError::DivisionByZero);
            }
            l.wrapping_div(r)
        }
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Lt => i64::from(l < r),
        BinaryOp::Gt => i64::from(l > r),
        BinaryOp::Le => i64::from(l <= r),
        BinaryOp::Ge => i64::from(l >= r),
        BinaryOp::Eq => i64::from(l == r),
        BinaryOp::Ne => i64::from(l != r),
        BinaryOp::And => i64::from(l != 0 && r != 0),
        BinaryOp::Or => i64::from(l != 0 || r != 0),
    })
}

/// Converts an evaluated size to `u32`.
pub fn to_size(value: i64) -> Result<u32, BuildError> {
    if value < 0 {
        return Err(BuildError::NegativeSize { value });
    }
    u32::try_from(value).map_err(|_| BuildError::SizeTooLarge { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(op: BinaryOp, lhs: StaticExpr, rhs: StaticExpr) -> StaticExpr {
        StaticExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    #[test]
    fn arithmetic_and_parameters() {
        let interner = Interner::new();
        let n = interner.get_or_intern("n");
        let mut bindings = Bindings::new();
        bindings.bind_integer(n, 8);
        let expr = bin(
            BinaryOp::Sub,
            bin(BinaryOp::Mul, StaticExpr::Param(n), StaticExpr::Int(2)),
            bin(BinaryOp::Div, StaticExpr::Int(7), StaticExpr::Int(2)),
        );
        assert_eq!(eval_static(&expr, &bindings, &interner).unwrap(), 13);
    }

    #[test]
    fn comparisons_and_logic() {
        let interner = Interner::new();
        let bindings = Bindings::new();
        let lt = bin(BinaryOp::Lt, StaticExpr::Int(1), StaticExpr::Int(2));
        let ge = bin(BinaryOp::Ge, StaticExpr::Int(1), StaticExpr::Int(2));
        assert_eq!(eval_static(&lt, &bindings, &interner).unwrap(), 1);
        assert_eq!(eval_static(&ge, &bindings, &interner).unwrap(), 0);
        let and = bin(BinaryOp::And, lt.clone(), StaticExpr::Int(5));
        let or = bin(BinaryOp::Or, ge, StaticExpr::Bool(false));
        assert_eq!(eval_static(&and, &bindings, &interner).unwrap(), 1);
        assert_eq!(eval_static(&or, &bindings, &interner).unwrap(), 0);
    }

    #[test]
    fn division_by_zero() {
        let interner = Interner::new();
        let expr = bin(BinaryOp::Div, StaticExpr::Int(1), StaticExpr::Int(0));
        let err = eval_static(&expr, &Bindings::new(), &interner).unwrap_err();
        assert!(matches!(err, BuildError::DivisionByZero));
    }

    #[test]
    fn unbound_parameter() {
        let interner = Interner::new();
        let expr = StaticExpr::Param(interner.get_or_intern("width"));
        let err = eval_static(&expr, &Bindings::new(), &interner).unwrap_err();
        assert!(matches!(err, BuildError::UnboundGeneric { name } if name == "width"));
    }

    #[test]
    fn sizes() {
        assert_eq!(to_size(4).unwrap(), 4);
        assert!(matches!(to_size(-1), Err(BuildError::NegativeSize { value: -1 })));
        assert!(matches!(
            to_size(i64::from(u32::MAX) + 1),
            Err(BuildError::SizeTooLarge { .. })
        ));
    }
}
