//! Compile-time evaluation of operators over literal operands.
//!
//! Folding is best effort: whenever an operand comes from a pin, the result is
//! not finite, integer arithmetic overflows or folding is switched off, the
//! helpers return `None` and the caller emits the regular data node.

use crate::{
    config::CompilerConfig,
    value::{Literal, ScalarType, Value, ValueType},
};
use std::cmp::Ordering;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub fn node_type(self) -> &'static str {
        match self {
            BinaryOp::Add => "addition",
            BinaryOp::Sub => "subtraction",
            BinaryOp::Mul => "multiplication",
            BinaryOp::Div => "division",
            BinaryOp::Mod => "modulo",
            BinaryOp::Eq => "equal",
            BinaryOp::Ne => "not_equal",
            BinaryOp::Lt => "less_than",
            BinaryOp::Le => "less_than_or_equal",
            BinaryOp::Gt => "greater_than",
            BinaryOp::Ge => "greater_than_or_equal",
            BinaryOp::And => "logical_and",
            BinaryOp::Or => "logical_or",
            BinaryOp::Xor => "logical_xor",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
    Not,
}

impl UnaryOp {
    pub fn node_type(self) -> &'static str {
        match self {
            UnaryOp::Neg => "negation",
            UnaryOp::Abs => "absolute_value",
            UnaryOp::Not => "logical_not",
        }
    }
}

fn literals<'a>(config: &CompilerConfig, values: &[&'a Value]) -> Option<Vec<&'a Literal>> {
    if !config.precompute {
        return None;
    }
    values.iter().map(|v| (*v).as_literal()).collect()
}

fn finite(x: f64) -> Option<Value> {
    x.is_finite().then(|| Value::float(x))
}

pub fn fold_binary(config: &CompilerConfig, op: BinaryOp, a: &Value, b: &Value) -> Option<Value> {
    if a.ty() != b.ty() {
        return None;
    }
    let operands = literals(config, &[a, b])?;
    let (lhs, rhs) = (operands[0], operands[1]);

    match (lhs, rhs) {
        (Literal::Int(x), Literal::Int(y)) => fold_int(op, *x, *y),
        (Literal::Float(x), Literal::Float(y)) => fold_float(op, *x, *y),
        (Literal::Bool(x), Literal::Bool(y)) => match op {
            BinaryOp::And => Some(Value::bool(*x && *y)),
            BinaryOp::Or => Some(Value::bool(*x || *y)),
            BinaryOp::Xor | BinaryOp::Ne => Some(Value::bool(x != y)),
            BinaryOp::Eq => Some(Value::bool(x == y)),
            _ => None,
        },
        (Literal::Str(x), Literal::Str(y)) => match op {
            BinaryOp::Eq => Some(Value::bool(x == y)),
            BinaryOp::Ne => Some(Value::bool(x != y)),
            _ => None,
        },
        _ => None,
    }
}

fn fold_int(op: BinaryOp, x: i64, y: i64) -> Option<Value> {
    let int = |r: Option<i64>| r.map(Value::int);
    match op {
        BinaryOp::Add => int(x.checked_add(y)),
        BinaryOp::Sub => int(x.checked_sub(y)),
        BinaryOp::Mul => int(x.checked_mul(y)),
        BinaryOp::Div => int(x.checked_div(y)),
        BinaryOp::Mod => int(x.checked_rem(y)),
        _ => compare(op, x.cmp(&y)),
    }
}

fn fold_float(op: BinaryOp, x: f64, y: f64) -> Option<Value> {
    match op {
        BinaryOp::Add => finite(x + y),
        BinaryOp::Sub => finite(x - y),
        BinaryOp::Mul => finite(x * y),
        BinaryOp::Div => finite(x / y),
        BinaryOp::Mod => finite(x % y),
        _ => compare(op, x.partial_cmp(&y)?),
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> Option<Value> {
    let result = match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => return None,
    };
    Some(Value::bool(result))
}

pub fn fold_unary(config: &CompilerConfig, op: UnaryOp, a: &Value) -> Option<Value> {
    let operand = literals(config, &[a])?[0];
    match (op, operand) {
        (UnaryOp::Neg, Literal::Int(x)) => x.checked_neg().map(Value::int),
        (UnaryOp::Neg, Literal::Float(x)) => finite(-x),
        (UnaryOp::Abs, Literal::Int(x)) => x.checked_abs().map(Value::int),
        (UnaryOp::Abs, Literal::Float(x)) => finite(x.abs()),
        (UnaryOp::Not, Literal::Bool(x)) => Some(Value::bool(!x)),
        _ => None,
    }
}

/// Result type of `op` applied to operands of type `operand`.
pub fn binary_result_type(op: BinaryOp, operand: ValueType) -> ValueType {
    if op.is_arithmetic() {
        operand
    } else {
        ValueType::Scalar(ScalarType::Bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::NodeId, value::PinRef};

    fn on() -> CompilerConfig {
        CompilerConfig::default()
    }

    fn pin_int() -> Value {
        Value::pin(
            ValueType::INT,
            PinRef {
                node: NodeId(1),
                slot: "result".to_string(),
                source_index: 0,
            },
        )
    }

    #[test]
    fn folds_integer_arithmetic() {
        let cases = [
            (BinaryOp::Add, 7, 3, 10),
            (BinaryOp::Sub, 7, 3, 4),
            (BinaryOp::Mul, 7, 3, 21),
            (BinaryOp::Div, 7, 3, 2),
            (BinaryOp::Mod, -7, 3, -1),
        ];
        for (op, x, y, expected) in cases {
            assert_eq!(
                fold_binary(&on(), op, &Value::int(x), &Value::int(y)),
                Some(Value::int(expected)),
                "{op:?}"
            );
        }
    }

    #[test]
    fn folds_float_arithmetic_and_comparisons() {
        assert_eq!(
            fold_binary(&on(), BinaryOp::Mul, &Value::float(1.5), &Value::float(2.0)),
            Some(Value::float(3.0))
        );
        assert_eq!(
            fold_binary(&on(), BinaryOp::Le, &Value::float(1.5), &Value::float(1.5)),
            Some(Value::bool(true))
        );
        assert_eq!(
            fold_binary(&on(), BinaryOp::Gt, &Value::int(1), &Value::int(2)),
            Some(Value::bool(false))
        );
    }

    #[test]
    fn non_finite_results_are_not_folded() {
        let zero = Value::float(0.0);
        assert_eq!(fold_binary(&on(), BinaryOp::Div, &Value::float(1.0), &zero), None);
        assert_eq!(fold_binary(&on(), BinaryOp::Mod, &Value::float(1.0), &zero), None);
        assert_eq!(
            fold_binary(&on(), BinaryOp::Mul, &Value::float(f64::MAX), &Value::float(2.0)),
            None
        );
        assert_eq!(fold_binary(&on(), BinaryOp::Div, &Value::int(1), &Value::int(0)), None);
        assert_eq!(
            fold_binary(&on(), BinaryOp::Add, &Value::int(i64::MAX), &Value::int(1)),
            None
        );
    }

    #[test]
    fn pins_are_never_folded() {
        assert_eq!(fold_binary(&on(), BinaryOp::Add, &pin_int(), &Value::int(1)), None);
        assert_eq!(fold_unary(&on(), UnaryOp::Neg, &pin_int()), None);
    }

    #[test]
    fn disabled_config_never_folds() {
        let off = CompilerConfig::default().without_precompute();
        assert_eq!(fold_binary(&off, BinaryOp::Add, &Value::int(1), &Value::int(1)), None);
        assert_eq!(fold_unary(&off, UnaryOp::Not, &Value::bool(true)), None);
    }

    #[test]
    fn mixed_types_are_left_alone() {
        assert_eq!(fold_binary(&on(), BinaryOp::Add, &Value::int(1), &Value::float(1.0)), None);
    }

    #[test]
    fn folds_logic_and_unary() {
        assert_eq!(
            fold_binary(&on(), BinaryOp::Xor, &Value::bool(true), &Value::bool(false)),
            Some(Value::bool(true))
        );
        assert_eq!(
            fold_binary(&on(), BinaryOp::Eq, &Value::str("a"), &Value::str("a")),
            Some(Value::bool(true))
        );
        assert_eq!(fold_unary(&on(), UnaryOp::Abs, &Value::int(-4)), Some(Value::int(4)));
        assert_eq!(fold_unary(&on(), UnaryOp::Neg, &Value::int(i64::MIN)), None);
    }
}
