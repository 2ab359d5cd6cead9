//! Local variable nodes (Get/Set).

use super::{NodeCategory, NodeDefinition, PinDef};
use crate::{model::NodeClass, value::ValueType};

/// Declares a local variable from its initial value and reads it back.
pub struct GetLocalVariableNode;

impl NodeDefinition for GetLocalVariableNode {
    fn kind_name(&self) -> &'static str {
        "get_local_variable"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Variable
    }

    fn description(&self) -> &'static str {
        "Declares a local variable and reads its current value."
    }

    fn class(&self) -> NodeClass {
        NodeClass::Data
    }

    fn outputs(&self) -> Vec<PinDef> {
        // The value pin takes the type of the initial value.
        vec![
            PinDef::output("variable", ValueType::LocalVariable),
            PinDef::dynamic("value"),
        ]
    }
}

pub struct SetLocalVariableNode;

impl NodeDefinition for SetLocalVariableNode {
    fn kind_name(&self) -> &'static str {
        "set_local_variable"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Variable
    }

    fn description(&self) -> &'static str {
        "Writes a new value into a local variable."
    }
}
