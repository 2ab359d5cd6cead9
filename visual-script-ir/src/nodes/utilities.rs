//! Utility nodes (printing, collection assembly).

use super::{NodeCategory, NodeDefinition, PinDef};
use crate::{
    model::NodeClass,
    value::{ScalarType, ValueType},
};

/// Largest list `assembly_list` can build.
pub const MAX_LIST_ELEMENTS: usize = 100;
/// Largest dictionary `assembly_dictionary` can build.
pub const MAX_DICTIONARY_PAIRS: usize = 50;

pub struct PrintStringNode;

impl NodeDefinition for PrintStringNode {
    fn kind_name(&self) -> &'static str {
        "print_string"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Utility
    }

    fn description(&self) -> &'static str {
        "Prints a string to the output log."
    }
}

pub struct AssemblyListNode;

impl NodeDefinition for AssemblyListNode {
    fn kind_name(&self) -> &'static str {
        "assembly_list"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Collection
    }

    fn description(&self) -> &'static str {
        "Builds a list from up to 100 elements of one type."
    }

    fn class(&self) -> NodeClass {
        NodeClass::Data
    }

    fn outputs(&self) -> Vec<PinDef> {
        vec![PinDef::dynamic("list")]
    }
}

pub struct AssemblyDictionaryNode;

impl NodeDefinition for AssemblyDictionaryNode {
    fn kind_name(&self) -> &'static str {
        "assembly_dictionary"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Collection
    }

    fn description(&self) -> &'static str {
        "Builds a dictionary from up to 50 key/value pairs."
    }

    fn class(&self) -> NodeClass {
        NodeClass::Data
    }

    fn outputs(&self) -> Vec<PinDef> {
        vec![PinDef::output("dictionary", ValueType::Scalar(ScalarType::Dict))]
    }
}
