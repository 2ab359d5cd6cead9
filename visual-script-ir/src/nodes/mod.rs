//! Node type catalog.
//!
//! Every node type the compiler emits on its own is described here: how many
//! exec outputs it exposes and which data outputs it carries. Domain
//! operations outside this catalog are emitted through the generic call sites
//! of the builder. To add a node type:
//! 1. Implement `NodeDefinition` for it in one of the files of this folder
//! 2. Register it in `all_node_definitions`

mod base;

mod events;
mod flow_control;
mod math;
mod utilities;
mod variables;

pub use base::*;

pub use events::*;
pub use flow_control::*;
pub use math::*;
pub use utilities::*;
pub use variables::*;

/// Registry of all built-in node definitions.
pub fn all_node_definitions() -> Vec<&'static dyn NodeDefinition> {
    let mut defs: Vec<&'static dyn NodeDefinition> = vec![
        // Events
        &GraphEntryNode,
        // Flow Control
        &DoubleBranchNode,
        &MultipleBranchesNode,
        &FiniteLoopNode,
        &ListIterationLoopNode,
        &BreakLoopNode,
        // Variables
        &GetLocalVariableNode,
        &SetLocalVariableNode,
        // Utilities
        &PrintStringNode,
        &AssemblyListNode,
        &AssemblyDictionaryNode,
    ];
    defs.extend(BINARY_OPERATORS.iter().map(|n| n as &'static dyn NodeDefinition));
    defs.extend(UNARY_OPERATORS.iter().map(|n| n as &'static dyn NodeDefinition));
    defs
}

/// Get a node definition by its wire tag.
pub fn get_node_definition(kind: &str) -> Option<&'static dyn NodeDefinition> {
    all_node_definitions()
        .into_iter()
        .find(|def| def.kind_name() == kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Event,
    FlowControl,
    Variable,
    Math,
    Logic,
    Collection,
    Utility,
}

impl NodeCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeCategory::Event => "Events",
            NodeCategory::FlowControl => "Flow Control",
            NodeCategory::Variable => "Variables",
            NodeCategory::Math => "Math",
            NodeCategory::Logic => "Logic",
            NodeCategory::Collection => "Collections",
            NodeCategory::Utility => "Utilities",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::NodeClass, value::Value};
    use std::collections::BTreeSet;

    #[test]
    fn kind_names_are_unique() {
        let defs = all_node_definitions();
        let names: BTreeSet<_> = defs.iter().map(|d| d.kind_name()).collect();
        assert_eq!(names.len(), defs.len());
    }

    #[test]
    fn control_nodes_expose_expected_outputs() {
        let branch = get_node_definition("double_branch").unwrap();
        assert_eq!(branch.exec_output_count(&[Value::bool(true)]), 2);

        let switch = get_node_definition("multiple_branches").unwrap();
        let args = [Value::int(0), Value::int(1), Value::int(2)];
        assert_eq!(switch.exec_output_count(&args), 3);

        let brk = get_node_definition("break_loop").unwrap();
        assert_eq!(brk.exec_output_count(&[Value::int(1)]), 0);

        let add = get_node_definition("addition").unwrap();
        assert_eq!(add.class(), NodeClass::Data);
        assert_eq!(add.exec_output_count(&[]), 0);
    }

    #[test]
    fn entry_node_is_flagged() {
        let entries: Vec<_> = all_node_definitions()
            .into_iter()
            .filter(|d| d.is_entry())
            .map(|d| d.kind_name())
            .collect();
        assert_eq!(entries, vec!["graph_entry"]);
    }
}
