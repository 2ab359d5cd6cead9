//! Event nodes (entry points).

use super::{NodeCategory, NodeDefinition};

/// Entry of a function or event handler body.
pub struct GraphEntryNode;

impl NodeDefinition for GraphEntryNode {
    fn kind_name(&self) -> &'static str {
        "graph_entry"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Event
    }

    fn description(&self) -> &'static str {
        "Fires when the named event or function is invoked."
    }

    fn is_entry(&self) -> bool {
        true
    }
}
