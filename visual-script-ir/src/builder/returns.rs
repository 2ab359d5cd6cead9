//! Early exit emulation.
//!
//! The emitted graph has no call stack, so `return` raises a hidden boolean
//! (the return gate), breaks every enclosing loop in one `break_loop` and
//! seals the current path. Loops whose body returned check the gate after
//! completing (see `loops`).

use super::GraphBuilder;
use crate::{
    context::LocalVariable,
    error::{CompileError, ErrorKind, Result},
    value::Value,
};
use tracing::debug;

impl GraphBuilder {
    /// The return gate of the current function, declared on first use.
    pub fn return_gate(&mut self) -> Result<LocalVariable> {
        if let Some(gate) = self.ctx.return_gate() {
            return Ok(gate.clone());
        }
        let gate = self.declare_local_variable(Value::bool(false))?;
        debug!(node = gate.node.0, "return gate declared");
        self.ctx.set_return_gate(gate.clone());
        Ok(gate)
    }

    pub fn return_(&mut self) -> Result<()> {
        let gate = self.return_gate()?;
        self.set_local_variable(&gate, true)?;

        let loops = self.ctx.active_loop_node_ids();
        if !loops.is_empty() {
            self.break_loop(&loops)?;
        }
        self.return_from_current_exec_path(true);
        Ok(())
    }

    /// Ends the current iteration; the loop node itself starts the next one.
    pub fn continue_(&mut self) -> Result<()> {
        if !self.ctx.in_loop() {
            return Err(CompileError::new(ErrorKind::ContinueOutsideLoop));
        }
        self.return_from_current_exec_path(false);
        Ok(())
    }

    /// Seals the current path. With `count_return` the enclosing branch or
    /// loop body reports that it returned.
    pub fn return_from_current_exec_path(&mut self, count_return: bool) {
        self.ctx.return_from_current_exec_path(count_return);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        builder::GraphBuilder,
        config::CompilerConfig,
        error::ErrorKind,
        model::{ExecEndpoint, NodeId},
        value::{Value, ValueType},
    };

    fn builder() -> (GraphBuilder, NodeId) {
        let mut b = GraphBuilder::new("test", CompilerConfig::default());
        let entry = b.begin_function("main");
        (b, entry)
    }

    #[test]
    fn gate_is_declared_once_per_function() {
        let (mut b, _) = builder();
        let first = b.return_gate().unwrap();
        let second = b.return_gate().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.value.ty(), ValueType::BOOL);
        assert_eq!(first.variable.ty(), ValueType::LocalVariable);

        let gates: Vec<_> = b.graph().nodes_of_type("get_local_variable").collect();
        assert_eq!(gates.len(), 1);
        assert_eq!(gates[0].args, vec![Value::bool(false)]);
    }

    #[test]
    fn top_level_return_raises_gate_and_seals() {
        let (mut b, entry) = builder();
        b.return_().unwrap();

        let set = b.graph().exec_target(ExecEndpoint::new(entry, 0)).unwrap();
        let set = &b.graph().nodes[&set];
        let gate = b.context().return_gate().unwrap();
        assert_eq!(set.node_type, "set_local_variable");
        assert_eq!(set.args, vec![gate.variable.clone(), Value::bool(true)]);

        assert!(b.current_exec_tail_endpoints().is_empty());
        assert_eq!(b.context().return_call_counter(), 1);
        assert_eq!(b.graph().nodes_of_type("break_loop").count(), 0);
    }

    #[test]
    fn return_breaks_all_enclosing_loops_innermost_first() {
        let (mut b, _) = builder();
        let mut loops = Vec::new();
        let outer = b
            .finite_loop(0, 3, |b, outer| {
                loops.push(outer.node);
                b.finite_loop(0, 3, |b, middle| {
                    loops.push(middle.node);
                    b.finite_loop(0, 3, |b, inner| {
                        loops.push(inner.node);
                        b.return_()
                    })
                    .map(drop)
                })
                .map(drop)
            })
            .unwrap();
        assert_eq!(loops[0], outer);

        let breaks: Vec<_> = b.graph().nodes_of_type("break_loop").collect();
        assert_eq!(breaks.len(), 1);
        let expected: Vec<_> = loops
            .iter()
            .rev()
            .map(|id| Value::int(i64::from(id.0)))
            .collect();
        assert_eq!(breaks[0].args, expected);
    }

    #[test]
    fn continue_seals_without_counting() {
        let (mut b, _) = builder();
        assert_eq!(b.continue_().unwrap_err().kind, ErrorKind::ContinueOutsideLoop);

        let node = b
            .finite_loop(0, 4, |b, _| {
                b.continue_()?;
                assert!(b.current_exec_tail_endpoints().is_empty());
                Ok(())
            })
            .unwrap();
        assert_eq!(b.context().return_call_counter(), 0);
        assert!(b.context().return_gate().is_none());
        assert_eq!(b.current_exec_tail_endpoints(), &[ExecEndpoint::new(node, 1)]);
    }
}
