//! Operator nodes.

use super::{NodeCategory, NodeDefinition, PinDef};
use crate::{
    fold::{BinaryOp, UnaryOp},
    model::NodeClass,
};

pub struct BinaryOperatorNode(pub BinaryOp);

impl NodeDefinition for BinaryOperatorNode {
    fn kind_name(&self) -> &'static str {
        self.0.node_type()
    }

    fn category(&self) -> NodeCategory {
        if self.0.is_arithmetic() {
            NodeCategory::Math
        } else {
            NodeCategory::Logic
        }
    }

    fn class(&self) -> NodeClass {
        NodeClass::Data
    }

    fn outputs(&self) -> Vec<PinDef> {
        vec![PinDef::dynamic("result")]
    }
}

pub struct UnaryOperatorNode(pub UnaryOp);

impl NodeDefinition for UnaryOperatorNode {
    fn kind_name(&self) -> &'static str {
        self.0.node_type()
    }

    fn category(&self) -> NodeCategory {
        match self.0 {
            UnaryOp::Not => NodeCategory::Logic,
            UnaryOp::Neg | UnaryOp::Abs => NodeCategory::Math,
        }
    }

    fn class(&self) -> NodeClass {
        NodeClass::Data
    }

    fn outputs(&self) -> Vec<PinDef> {
        vec![PinDef::dynamic("result")]
    }
}

pub static BINARY_OPERATORS: [BinaryOperatorNode; 14] = [
    BinaryOperatorNode(BinaryOp::Add),
    BinaryOperatorNode(BinaryOp::Sub),
    BinaryOperatorNode(BinaryOp::Mul),
    BinaryOperatorNode(BinaryOp::Div),
    BinaryOperatorNode(BinaryOp::Mod),
    BinaryOperatorNode(BinaryOp::Eq),
    BinaryOperatorNode(BinaryOp::Ne),
    BinaryOperatorNode(BinaryOp::Lt),
    BinaryOperatorNode(BinaryOp::Le),
    BinaryOperatorNode(BinaryOp::Gt),
    BinaryOperatorNode(BinaryOp::Ge),
    BinaryOperatorNode(BinaryOp::And),
    BinaryOperatorNode(BinaryOp::Or),
    BinaryOperatorNode(BinaryOp::Xor),
];

pub static UNARY_OPERATORS: [UnaryOperatorNode; 3] = [
    UnaryOperatorNode(UnaryOp::Neg),
    UnaryOperatorNode(UnaryOp::Abs),
    UnaryOperatorNode(UnaryOp::Not),
];
