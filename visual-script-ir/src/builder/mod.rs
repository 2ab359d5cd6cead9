//! Graph construction.
//!
//! [`GraphBuilder`] is driven by a front-end that has already evaluated the
//! source program into a sequence of calls. Every exec node is spliced in at
//! the current exec tail endpoints; control flow synthesizers (branches,
//! loops, returns) live in the submodules and manage the tail set themselves.

mod branch;
mod loops;
mod ops;
mod returns;

pub use branch::*;
pub use loops::*;
pub(crate) use ops::check_cardinality;

use crate::{
    compile::{compile, CompiledGraph},
    config::CompilerConfig,
    context::CompilationContext,
    error::Result,
    model::{ExecEndpoint, Graph, NodeClass, NodeDraft, NodeId, OutputPin},
    nodes::{get_node_definition, GraphEntryNode, NodeDefinition},
    preprocess::expand_list_literals,
    value::{Value, ValueType},
};
use tracing::{debug, warn};

/// Result of compiling one nested exec body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOutcome {
    /// The body (or something nested in it) called `return`.
    pub contains_return: bool,
    /// Every path through the body ended in a `return`.
    pub terminated_by_return: bool,
    /// Open exec outputs left when the body finished.
    pub tail_endpoints: Vec<ExecEndpoint>,
    /// First node the body wired to its entry output, if any.
    pub head_node_id: Option<NodeId>,
}

pub struct GraphBuilder {
    graph: Graph,
    ctx: CompilationContext,
    config: CompilerConfig,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>, config: CompilerConfig) -> Self {
        Self {
            graph: Graph::new(name),
            ctx: CompilationContext::default(),
            config,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn context(&self) -> &CompilationContext {
        &self.ctx
    }

    pub fn current_exec_tail_endpoints(&self) -> &[ExecEndpoint] {
        self.ctx.current_exec_tail_endpoints()
    }

    pub fn set_current_exec_tail_endpoints(&mut self, endpoints: Vec<ExecEndpoint>) {
        self.ctx.set_current_exec_tail_endpoints(endpoints);
    }

    pub fn mark_link_next_exec_from(&mut self, node: NodeId, source_index: u32) {
        self.ctx.mark_link_next_exec_from(node, source_index);
    }

    pub fn mark_pin(&self, node: NodeId, slot: &str, source_index: u32) -> Result<Value> {
        self.graph.mark_pin(node, slot, source_index)
    }

    /// Starts a new function body, discarding the current compilation context.
    pub fn begin_function(&mut self, event: &str) -> NodeId {
        let entry = self.register_entry(event);
        self.ctx = CompilationContext::rooted_at(ExecEndpoint::new(entry, 0));
        entry
    }

    /// Compiles `body` as a separate function with its own cursor, loop stack
    /// and return gate; the current context is restored afterwards.
    pub fn with_function<F>(&mut self, event: &str, body: F) -> Result<NodeId>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let entry = self.register_entry(event);
        let outer = std::mem::replace(
            &mut self.ctx,
            CompilationContext::rooted_at(ExecEndpoint::new(entry, 0)),
        );
        let result = body(self);
        self.ctx = outer;
        result.map(|()| entry)
    }

    fn register_entry(&mut self, event: &str) -> NodeId {
        debug!(event, "function body");
        self.graph
            .register_node(GraphEntryNode.draft(vec![Value::str(event)], None))
    }

    /// Registers an exec node and wires every open tail endpoint into it. The
    /// node's first exec output becomes the new tail; nodes without exec
    /// outputs leave the path sealed.
    pub fn emit_exec_node(&mut self, draft: NodeDraft) -> Result<NodeId> {
        let exec_outputs = draft.exec_outputs;
        let tails = self.ctx.take_exec_tail_endpoints();
        let id = self.graph.register_node(draft);

        if tails.is_empty() {
            warn!(node = id.0, "node emitted on an unreachable path");
        }
        for tail in tails {
            self.graph.connect_exec(tail, id)?;
        }

        if exec_outputs > 0 {
            self.ctx.mark_link_next_exec_from(id, 0);
        }
        Ok(id)
    }

    pub fn emit_exec(
        &mut self,
        def: &dyn NodeDefinition,
        args: Vec<Value>,
        dynamic: Option<ValueType>,
    ) -> Result<NodeId> {
        self.emit_exec_node(def.draft(args, dynamic))
    }

    pub fn emit_data(
        &mut self,
        def: &dyn NodeDefinition,
        args: Vec<Value>,
        dynamic: Option<ValueType>,
    ) -> NodeId {
        self.graph.register_node(def.draft(args, dynamic))
    }

    /// Exec call site for any node type. Catalog types get their declared
    /// outputs; others get a single exec output.
    pub fn call_exec(&mut self, node_type: &str, args: Vec<Value>) -> Result<NodeId> {
        let draft = match get_node_definition(node_type) {
            Some(def) if def.class() == NodeClass::Exec => def.draft(args, None),
            _ => NodeDraft::exec(node_type, args, 1),
        };
        self.emit_exec_node(draft)
    }

    /// Data call site for any node type; returns the node so callers can mark
    /// its output pins.
    pub fn call_data(
        &mut self,
        node_type: &str,
        args: Vec<Value>,
        outputs: Vec<OutputPin>,
    ) -> NodeId {
        self.graph
            .register_node(NodeDraft::data(node_type, args).with_outputs(outputs))
    }

    /// Runs `body` with the cursor rooted at exec output `source_index` of
    /// `node`. The outer cursor is restored whether or not the body fails.
    pub fn with_exec_branch<F>(
        &mut self,
        node: NodeId,
        source_index: u32,
        body: F,
    ) -> Result<BranchOutcome>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let start = ExecEndpoint::new(node, source_index);
        let returns_before = self.ctx.return_call_counter();
        let saved = self.ctx.enter_branch(start);

        let result = body(self);
        let tail_endpoints = self.ctx.leave_branch(saved);
        result?;

        let contains_return = self.ctx.return_call_counter() > returns_before;
        Ok(BranchOutcome {
            contains_return,
            terminated_by_return: contains_return && tail_endpoints.is_empty(),
            head_node_id: self.graph.exec_target(start),
            tail_endpoints,
        })
    }

    /// Runs `body` with `node` pushed as the innermost active loop.
    pub fn with_loop<F, R>(&mut self, node: NodeId, body: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        self.ctx.push_loop(node);
        let result = body(self);
        self.ctx.pop_loop();
        result
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Runs the configured preprocessing and validates the graph.
    pub fn finish(mut self) -> Result<CompiledGraph> {
        if self.config.expand_list_literals {
            expand_list_literals(&mut self.graph)?;
        }
        compile(&self.graph)
    }
}
