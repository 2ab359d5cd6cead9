use crate::{
    error::{CompileError, ErrorKind, Result},
    value::{PinRef, Value, ValueType},
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// Has side effects and takes part in the exec flow.
    Exec,
    /// Pure computation, only referenced through its output pins.
    Data,
}

/// An exec output of a node, identified by its source index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ExecEndpoint {
    pub node: NodeId,
    pub source_index: u32,
}

impl ExecEndpoint {
    pub fn new(node: NodeId, source_index: u32) -> Self {
        Self { node, source_index }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPin {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
}

impl OutputPin {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Node description handed to [`Graph::register_node`]; the graph assigns the id.
#[derive(Debug, Clone)]
pub struct NodeDraft {
    pub class: NodeClass,
    pub node_type: String,
    pub args: Vec<Value>,
    pub exec_outputs: u32,
    pub outputs: Vec<OutputPin>,
}

impl NodeDraft {
    pub fn exec(node_type: impl Into<String>, args: Vec<Value>, exec_outputs: u32) -> Self {
        Self {
            class: NodeClass::Exec,
            node_type: node_type.into(),
            args,
            exec_outputs,
            outputs: Vec::new(),
        }
    }

    pub fn data(node_type: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            class: NodeClass::Data,
            node_type: node_type.into(),
            args,
            exec_outputs: 0,
            outputs: Vec::new(),
        }
    }

    pub fn with_outputs(mut self, outputs: Vec<OutputPin>) -> Self {
        self.outputs = outputs;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub class: NodeClass,
    pub node_type: String,
    pub args: Vec<Value>,
    pub exec_outputs: u32,
    pub outputs: Vec<OutputPin>,
}

impl Node {
    pub fn output(&self, slot: &str, index: u32) -> Option<&OutputPin> {
        self.outputs
            .get(index as usize)
            .filter(|pin| pin.name == slot)
    }
}

/// Node registry of a single graph under construction.
#[derive(Debug, Clone)]
pub struct Graph {
    pub name: String,
    pub nodes: BTreeMap<NodeId, Node>,
    /// Each exec output has at most one destination.
    pub exec_links: BTreeMap<ExecEndpoint, NodeId>,

    next_node_id: u32,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: BTreeMap::new(),
            exec_links: BTreeMap::new(),
            next_node_id: 1,
        }
    }

    pub fn register_node(&mut self, draft: NodeDraft) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        debug!(
            node = id.0,
            node_type = %draft.node_type,
            args = draft.args.len(),
            "registered node"
        );

        let NodeDraft {
            class,
            node_type,
            args,
            exec_outputs,
            outputs,
        } = draft;
        self.nodes.insert(
            id,
            Node {
                id,
                class,
                node_type,
                args,
                exec_outputs,
                outputs,
            },
        );
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| CompileError::new(ErrorKind::UnknownNode).with_node(id))
    }

    /// Returns a value referring to output `slot` at `source_index` of `node`.
    pub fn mark_pin(&self, node: NodeId, slot: &str, source_index: u32) -> Result<Value> {
        let pin = self.node(node)?.output(slot, source_index).ok_or_else(|| {
            CompileError::new(ErrorKind::UnknownPin {
                slot: slot.to_string(),
                index: source_index,
            })
            .with_node(node)
        })?;
        Ok(Value::pin(
            pin.ty,
            PinRef {
                node,
                slot: slot.to_string(),
                source_index,
            },
        ))
    }

    pub fn connect_exec(&mut self, from: ExecEndpoint, to: NodeId) -> Result<()> {
        let source = self.node(from.node)?;
        if source.class != NodeClass::Exec {
            return Err(CompileError::new(ErrorKind::NotAnExecNode).with_node(from.node));
        }
        if from.source_index >= source.exec_outputs {
            return Err(
                CompileError::new(ErrorKind::ExecOutputOutOfRange(from.source_index))
                    .with_node(from.node),
            );
        }
        if self.node(to)?.class != NodeClass::Exec {
            return Err(CompileError::new(ErrorKind::NotAnExecNode).with_node(to));
        }
        if self.exec_links.contains_key(&from) {
            return Err(
                CompileError::new(ErrorKind::ExecOutputAlreadyConnected(from.source_index))
                    .with_node(from.node),
            );
        }

        debug!(
            from = from.node.0,
            source_index = from.source_index,
            to = to.0,
            "connected exec output"
        );
        self.exec_links.insert(from, to);
        Ok(())
    }

    /// Wires exec output `source_index` of `node` straight to `target`.
    pub fn connect_exec_branch_output(
        &mut self,
        node: NodeId,
        source_index: u32,
        target: NodeId,
    ) -> Result<()> {
        self.connect_exec(ExecEndpoint::new(node, source_index), target)
    }

    pub fn exec_target(&self, from: ExecEndpoint) -> Option<NodeId> {
        self.exec_links.get(&from).copied()
    }

    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| n.node_type == node_type)
    }
}
