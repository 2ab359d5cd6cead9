use crate::{
    error::{CompileError, ErrorKind, Result},
    model::{ExecEndpoint, Graph, Node, NodeClass, NodeId, OutputPin},
    nodes::get_node_definition,
    value::Value,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Finalized graph in its wire format.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledGraph {
    pub name: String,
    pub nodes: Vec<CompiledNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompiledNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub class: NodeClass,
    pub node_type: String,
    pub args: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<OutputPin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exec_connections: Vec<ExecConnection>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ExecConnection {
    pub source_index: u32,
    pub target: NodeId,
}

impl CompiledGraph {
    pub fn node(&self, id: NodeId) -> Option<&CompiledNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Entry nodes of the compiled function bodies.
    pub fn entries(&self) -> impl Iterator<Item = &CompiledNode> + '_ {
        self.nodes.iter().filter(|n| {
            get_node_definition(&n.node_type).is_some_and(|def| def.is_entry())
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl CompiledNode {
    pub fn exec_target(&self, source_index: u32) -> Option<NodeId> {
        self.exec_connections
            .iter()
            .find(|c| c.source_index == source_index)
            .map(|c| c.target)
    }
}

pub fn compile(graph: &Graph) -> Result<CompiledGraph> {
    validate(graph)?;

    let mut connections: BTreeMap<NodeId, Vec<ExecConnection>> = BTreeMap::new();
    for (from, to) in graph.exec_links.iter() {
        connections.entry(from.node).or_default().push(ExecConnection {
            source_index: from.source_index,
            target: *to,
        });
    }

    let nodes: Vec<CompiledNode> = graph
        .nodes
        .values()
        .map(|node| CompiledNode {
            id: node.id,
            class: node.class,
            node_type: node.node_type.clone(),
            args: node.args.clone(),
            outputs: node.outputs.clone(),
            exec_connections: connections.remove(&node.id).unwrap_or_default(),
        })
        .collect();

    info!(
        graph = %graph.name,
        nodes = nodes.len(),
        exec_links = graph.exec_links.len(),
        "graph compiled"
    );
    Ok(CompiledGraph {
        name: graph.name.clone(),
        nodes,
    })
}

fn validate(graph: &Graph) -> Result<()> {
    // Exec links: both ends are exec nodes, output index in range.
    for (from, to) in graph.exec_links.iter() {
        validate_exec_link(graph, *from, *to)?;
    }

    // Pin arguments point at existing outputs of the declared type.
    for node in graph.nodes.values() {
        validate_pin_args(graph, node)?;
    }

    detect_exec_cycles(graph)
}

fn validate_exec_link(graph: &Graph, from: ExecEndpoint, to: NodeId) -> Result<()> {
    let source = graph.node(from.node)?;
    if source.class != NodeClass::Exec {
        return Err(CompileError::new(ErrorKind::NotAnExecNode).with_node(from.node));
    }
    if from.source_index >= source.exec_outputs {
        return Err(
            CompileError::new(ErrorKind::ExecOutputOutOfRange(from.source_index))
                .with_node(from.node),
        );
    }
    if graph.node(to)?.class != NodeClass::Exec {
        return Err(CompileError::new(ErrorKind::NotAnExecNode).with_node(to));
    }
    Ok(())
}

fn validate_pin_args(graph: &Graph, node: &Node) -> Result<()> {
    for arg in node.args.iter() {
        let Some(pin) = arg.as_pin() else { continue };
        let output = graph
            .node(pin.node)
            .map_err(|e| e.with_node(node.id))?
            .output(&pin.slot, pin.source_index)
            .ok_or_else(|| {
                CompileError::new(ErrorKind::UnknownPin {
                    slot: pin.slot.clone(),
                    index: pin.source_index,
                })
                .with_node(node.id)
            })?;
        if output.ty != arg.ty() {
            return Err(
                CompileError::type_mismatch(arg.ty(), output.ty, None).with_node(node.id),
            );
        }
    }
    Ok(())
}

fn detect_exec_cycles(graph: &Graph) -> Result<()> {
    let mut adjacency: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for (from, to) in graph.exec_links.iter() {
        adjacency.entry(from.node).or_default().push(*to);
    }

    let mut visited = BTreeSet::new();
    let mut stack = BTreeSet::new();

    for node_id in graph.nodes.keys().copied() {
        if !visited.contains(&node_id) && dfs_cycle(node_id, &adjacency, &mut visited, &mut stack)
        {
            return Err(CompileError::new(ErrorKind::ExecCycle).with_node(node_id));
        }
    }

    Ok(())
}

/// Depth-first search from `root` with an explicit work stack; each entry is
/// a node and the index of the next neighbor to visit.
fn dfs_cycle(
    root: NodeId,
    adjacency: &BTreeMap<NodeId, Vec<NodeId>>,
    visited: &mut BTreeSet<NodeId>,
    stack: &mut BTreeSet<NodeId>,
) -> bool {
    let mut work: Vec<(NodeId, usize)> = vec![(root, 0)];
    visited.insert(root);
    stack.insert(root);

    while let Some((node, next_index)) = work.last_mut() {
        let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or_default();
        let Some(&next) = neighbors.get(*next_index) else {
            stack.remove(node);
            work.pop();
            continue;
        };
        *next_index += 1;

        if stack.contains(&next) {
            return true;
        }
        if visited.insert(next) {
            stack.insert(next);
            work.push((next, 0));
        }
    }
    false
}
