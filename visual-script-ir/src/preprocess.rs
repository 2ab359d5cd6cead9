//! Graph rewrites run before finalization.

use crate::{
    builder::check_cardinality,
    error::Result,
    model::{Graph, NodeId},
    nodes::{AssemblyListNode, NodeDefinition, MAX_LIST_ELEMENTS},
    value::{Literal, Value, ValueType},
};
use tracing::debug;

/// Replaces every inline list literal argument with a pin to a new
/// `assembly_list` node holding its elements. Returns the number of literals
/// replaced.
pub fn expand_list_literals(graph: &mut Graph) -> Result<usize> {
    let mut pending = Vec::new();
    for (id, node) in graph.nodes.iter() {
        for (index, arg) in node.args.iter().enumerate() {
            if let (ValueType::List(elem), Some(Literal::List(items))) = (arg.ty(), arg.as_literal())
            {
                pending.push((*id, index, elem, items.clone()));
            }
        }
    }

    let expanded = pending.len();
    for (id, index, elem, items) in pending {
        check_cardinality("assembly_list", MAX_LIST_ELEMENTS, items.len())
            .map_err(|e| e.with_node(id))?;
        let args = items
            .into_iter()
            .map(|item| Value::literal(ValueType::Scalar(elem), item))
            .collect::<Result<Vec<_>>>()?;

        let list = graph.register_node(AssemblyListNode.draft(args, Some(ValueType::List(elem))));
        let pin = graph.mark_pin(list, "list", 0)?;
        debug!(node = id.0, arg = index, list = list.0, "expanded list literal");
        replace_arg(graph, id, index, pin);
    }
    Ok(expanded)
}

fn replace_arg(graph: &mut Graph, id: NodeId, index: usize, value: Value) {
    if let Some(arg) = graph.nodes.get_mut(&id).and_then(|n| n.args.get_mut(index)) {
        *arg = value;
    }
}
