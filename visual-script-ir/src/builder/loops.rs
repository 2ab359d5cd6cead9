use super::GraphBuilder;
use crate::{
    error::{CompileError, ErrorKind, Result},
    model::NodeId,
    nodes::{BreakLoopNode, DoubleBranchNode, FiniteLoopNode, ListIterationLoopNode},
    value::{parse_value, Value, ValueInput, ValueType},
};
use tracing::debug;

/// Handed to loop bodies: the loop node and its per-iteration value.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopHandle {
    pub node: NodeId,
    pub value: Value,
}

impl GraphBuilder {
    /// Counting loop from `start` to `end`. The body runs from exec output 0;
    /// code emitted afterwards continues from output 1 ("loop complete").
    pub fn finite_loop<F>(
        &mut self,
        start: impl Into<ValueInput>,
        end: impl Into<ValueInput>,
        body: F,
    ) -> Result<NodeId>
    where
        F: FnOnce(&mut Self, &LoopHandle) -> Result<()>,
    {
        let start = parse_value(start, ValueType::INT)?;
        let end = parse_value(end, ValueType::INT)?;
        let node = self.emit_exec(&FiniteLoopNode, vec![start, end], None)?;
        let handle = LoopHandle {
            node,
            value: self.mark_pin(node, "current_loop_value", 0)?,
        };
        self.compile_loop_body(node, |b| body(b, &handle))?;
        Ok(node)
    }

    /// Loop over the elements of `list`; the iteration value has the list's
    /// element type.
    pub fn list_iteration_loop<F>(&mut self, list: Value, body: F) -> Result<NodeId>
    where
        F: FnOnce(&mut Self, &LoopHandle) -> Result<()>,
    {
        let element = list.ty().element_type().ok_or_else(|| {
            let hint = list.ty().list_of().map(|l| format!("did you mean `{l}`?"));
            CompileError::type_mismatch("a list", &list, hint)
        })?;
        let node = self.emit_exec(&ListIterationLoopNode, vec![list], Some(element))?;
        let handle = LoopHandle {
            node,
            value: self.mark_pin(node, "iteration_value", 0)?,
        };
        self.compile_loop_body(node, |b| body(b, &handle))?;
        Ok(node)
    }

    fn compile_loop_body<F>(&mut self, node: NodeId, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        // Whatever the body leaves open simply ends the iteration.
        let outcome = self.with_loop(node, |b| b.with_exec_branch(node, 0, body))?;

        self.ctx.mark_link_next_exec_from(node, 1);
        if outcome.contains_return {
            self.insert_return_guard()?;
        }
        Ok(())
    }

    /// Lets execution continue only while the return gate is down. "Loop
    /// complete" also fires after a `return` broke the loop.
    fn insert_return_guard(&mut self) -> Result<NodeId> {
        let gate = self.return_gate()?;
        let guard = self.emit_exec(&DoubleBranchNode, vec![gate.value], None)?;
        debug!(guard = guard.0, "return guard");
        self.ctx.mark_link_next_exec_from(guard, 1);
        Ok(guard)
    }

    /// Breaks out of every loop in `loops` at once (the innermost active loop
    /// when empty) and seals the current path.
    pub fn break_loop(&mut self, loops: &[NodeId]) -> Result<NodeId> {
        let targets = if loops.is_empty() {
            let innermost = self
                .ctx
                .active_loop_node_ids()
                .first()
                .copied()
                .ok_or_else(|| CompileError::new(ErrorKind::BreakOutsideLoop))?;
            vec![innermost]
        } else {
            loops.to_vec()
        };

        if let Some(&inactive) = targets.iter().find(|&&id| !self.ctx.is_active_loop(id)) {
            return Err(CompileError::new(ErrorKind::NotAnActiveLoop(inactive)).with_node(inactive));
        }

        let args = targets.iter().map(|id| Value::int(i64::from(id.0))).collect();
        let node = self.emit_exec(&BreakLoopNode, args, None)?;
        self.ctx.return_from_current_exec_path(false);
        Ok(node)
    }
}
