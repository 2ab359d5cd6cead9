//! Flow control nodes (branches and loops).

use super::{ExecOutputs, NodeCategory, NodeDefinition, PinDef};
use crate::value::ValueType;

/// if/else on a boolean condition. Output 0 is `true`, output 1 is `false`.
pub struct DoubleBranchNode;

impl NodeDefinition for DoubleBranchNode {
    fn kind_name(&self) -> &'static str {
        "double_branch"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::FlowControl
    }

    fn description(&self) -> &'static str {
        "Executes one of two paths based on a boolean condition."
    }

    fn exec_outputs(&self) -> ExecOutputs {
        ExecOutputs::Fixed(2)
    }
}

/// Switch on an int or string control value.
pub struct MultipleBranchesNode;

impl NodeDefinition for MultipleBranchesNode {
    fn kind_name(&self) -> &'static str {
        "multiple_branches"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::FlowControl
    }

    fn description(&self) -> &'static str {
        "Executes the path matching the control value, or the default path."
    }

    fn exec_outputs(&self) -> ExecOutputs {
        ExecOutputs::PerCase
    }
}

/// Counting loop. Output 0 runs the body, output 1 fires once the loop completes.
pub struct FiniteLoopNode;

impl NodeDefinition for FiniteLoopNode {
    fn kind_name(&self) -> &'static str {
        "finite_loop"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::FlowControl
    }

    fn description(&self) -> &'static str {
        "Runs the loop body once for every value from start to end."
    }

    fn exec_outputs(&self) -> ExecOutputs {
        ExecOutputs::Fixed(2)
    }

    fn outputs(&self) -> Vec<PinDef> {
        vec![PinDef::output("current_loop_value", ValueType::INT)]
    }
}

pub struct ListIterationLoopNode;

impl NodeDefinition for ListIterationLoopNode {
    fn kind_name(&self) -> &'static str {
        "list_iteration_loop"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::FlowControl
    }

    fn description(&self) -> &'static str {
        "Runs the loop body once for every element of a list."
    }

    fn exec_outputs(&self) -> ExecOutputs {
        ExecOutputs::Fixed(2)
    }

    fn outputs(&self) -> Vec<PinDef> {
        vec![PinDef::dynamic("iteration_value")]
    }
}

/// Breaks every loop listed in its arguments. Has no exec output.
pub struct BreakLoopNode;

impl NodeDefinition for BreakLoopNode {
    fn kind_name(&self) -> &'static str {
        "break_loop"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::FlowControl
    }

    fn description(&self) -> &'static str {
        "Stops the listed loops; each of them fires its completion output."
    }

    fn exec_outputs(&self) -> ExecOutputs {
        ExecOutputs::Fixed(0)
    }
}
