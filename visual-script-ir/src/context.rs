//! Per-function compilation state: the exec cursor, the active loops and the
//! return bookkeeping.
//!
//! The builder forks this state for every nested branch or loop body and
//! restores it afterwards, so a context always mirrors the lexical nesting of
//! the code being compiled.

use crate::{
    model::{ExecEndpoint, NodeId},
    value::Value,
};
use tracing::trace;

/// A local variable declared by a `get_local_variable` node.
///
/// The return gate is one of these: a hidden `bool` raised by `return`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub node: NodeId,
    /// Handle accepted by `set_local_variable`.
    pub variable: Value,
    /// Current value of the variable.
    pub value: Value,
}

#[derive(Debug, Clone, Default)]
pub struct CompilationContext {
    tail: Vec<ExecEndpoint>,
    loops: Vec<NodeId>,
    return_calls: u64,
    return_gate: Option<LocalVariable>,
}

impl CompilationContext {
    /// Context whose cursor starts at `entry`.
    pub fn rooted_at(entry: ExecEndpoint) -> Self {
        Self {
            tail: vec![entry],
            ..Self::default()
        }
    }

    pub fn current_exec_tail_endpoints(&self) -> &[ExecEndpoint] {
        &self.tail
    }

    pub fn set_current_exec_tail_endpoints(&mut self, endpoints: Vec<ExecEndpoint>) {
        trace!(?endpoints, "exec tail replaced");
        self.tail = endpoints;
    }

    pub fn mark_link_next_exec_from(&mut self, node: NodeId, source_index: u32) {
        self.set_current_exec_tail_endpoints(vec![ExecEndpoint::new(node, source_index)]);
    }

    pub fn take_exec_tail_endpoints(&mut self) -> Vec<ExecEndpoint> {
        std::mem::take(&mut self.tail)
    }

    /// Points the cursor at `start`, returning the endpoints it replaced.
    pub fn enter_branch(&mut self, start: ExecEndpoint) -> Vec<ExecEndpoint> {
        trace!(node = start.node.0, source_index = start.source_index, "enter branch");
        std::mem::replace(&mut self.tail, vec![start])
    }

    /// Restores `saved` and hands back the endpoints the branch ended with.
    pub fn leave_branch(&mut self, saved: Vec<ExecEndpoint>) -> Vec<ExecEndpoint> {
        let tail = std::mem::replace(&mut self.tail, saved);
        trace!(?tail, "leave branch");
        tail
    }

    pub fn push_loop(&mut self, node: NodeId) {
        self.loops.push(node);
    }

    pub fn pop_loop(&mut self) -> Option<NodeId> {
        self.loops.pop()
    }

    pub fn in_loop(&self) -> bool {
        !self.loops.is_empty()
    }

    pub fn is_active_loop(&self, node: NodeId) -> bool {
        self.loops.contains(&node)
    }

    /// Active loops, innermost first.
    pub fn active_loop_node_ids(&self) -> Vec<NodeId> {
        self.loops.iter().rev().copied().collect()
    }

    pub fn return_call_counter(&self) -> u64 {
        self.return_calls
    }

    /// Seals the current lexical path: nothing emitted afterwards is reachable
    /// from it.
    pub fn return_from_current_exec_path(&mut self, count_return: bool) {
        self.tail.clear();
        if count_return {
            self.return_calls += 1;
        }
    }

    pub fn return_gate(&self) -> Option<&LocalVariable> {
        self.return_gate.as_ref()
    }

    pub fn set_return_gate(&mut self, gate: LocalVariable) {
        self.return_gate = Some(gate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(node: u32, index: u32) -> ExecEndpoint {
        ExecEndpoint::new(NodeId(node), index)
    }

    #[test]
    fn branch_fork_restores_outer_tail() {
        let mut ctx = CompilationContext::rooted_at(ep(1, 0));
        let saved = ctx.enter_branch(ep(2, 1));
        assert_eq!(ctx.current_exec_tail_endpoints(), &[ep(2, 1)]);
        ctx.mark_link_next_exec_from(NodeId(3), 0);
        let tail = ctx.leave_branch(saved);
        assert_eq!(tail, vec![ep(3, 0)]);
        assert_eq!(ctx.current_exec_tail_endpoints(), &[ep(1, 0)]);
    }

    #[test]
    fn loops_are_listed_innermost_first() {
        let mut ctx = CompilationContext::default();
        ctx.push_loop(NodeId(1));
        ctx.push_loop(NodeId(5));
        ctx.push_loop(NodeId(9));
        assert_eq!(
            ctx.active_loop_node_ids(),
            vec![NodeId(9), NodeId(5), NodeId(1)]
        );
        assert_eq!(ctx.pop_loop(), Some(NodeId(9)));
        assert!(ctx.is_active_loop(NodeId(5)));
        assert!(!ctx.is_active_loop(NodeId(9)));
    }

    #[test]
    fn sealing_only_counts_returns() {
        let mut ctx = CompilationContext::rooted_at(ep(1, 0));
        ctx.return_from_current_exec_path(false);
        assert!(ctx.current_exec_tail_endpoints().is_empty());
        assert_eq!(ctx.return_call_counter(), 0);

        ctx.mark_link_next_exec_from(NodeId(2), 0);
        ctx.return_from_current_exec_path(true);
        assert_eq!(ctx.return_call_counter(), 1);
    }
}
