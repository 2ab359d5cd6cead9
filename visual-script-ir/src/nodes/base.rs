//! Base node trait and common utilities.

use crate::{
    model::{NodeClass, NodeDraft, OutputPin},
    value::{ScalarType, Value, ValueType},
};

use super::NodeCategory;

/// Type of a data output as declared by a node type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinType {
    Fixed(ValueType),
    /// Decided at the call site (list element, variable type, operand type).
    Dynamic,
}

/// Data output definition for node templates.
#[derive(Debug, Clone)]
pub struct PinDef {
    pub name: &'static str,
    pub ty: PinType,
}

impl PinDef {
    pub fn output(name: &'static str, ty: ValueType) -> Self {
        Self {
            name,
            ty: PinType::Fixed(ty),
        }
    }

    pub fn dynamic(name: &'static str) -> Self {
        Self {
            name,
            ty: PinType::Dynamic,
        }
    }

    fn to_pin(&self, dynamic: Option<ValueType>) -> OutputPin {
        let ty = match self.ty {
            PinType::Fixed(ty) => ty,
            PinType::Dynamic => dynamic.unwrap_or(ValueType::Scalar(ScalarType::Generic)),
        };
        OutputPin::new(self.name, ty)
    }
}

/// How many exec outputs a node type exposes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExecOutputs {
    Fixed(u32),
    /// Output 0 is the default branch, one more per case literal argument.
    PerCase,
}

/// Trait that all node types must implement.
pub trait NodeDefinition: Send + Sync {
    /// Wire tag of this node type (e.g. "double_branch").
    fn kind_name(&self) -> &'static str;

    fn category(&self) -> NodeCategory;

    /// Description shown in diagnostics and tooling.
    fn description(&self) -> &'static str {
        ""
    }

    fn class(&self) -> NodeClass {
        NodeClass::Exec
    }

    fn exec_outputs(&self) -> ExecOutputs {
        match self.class() {
            NodeClass::Exec => ExecOutputs::Fixed(1),
            NodeClass::Data => ExecOutputs::Fixed(0),
        }
    }

    /// Data outputs in source index order.
    fn outputs(&self) -> Vec<PinDef> {
        vec![]
    }

    /// Whether this node starts a function body.
    fn is_entry(&self) -> bool {
        false
    }

    fn exec_output_count(&self, args: &[Value]) -> u32 {
        match self.exec_outputs() {
            ExecOutputs::Fixed(n) => n,
            ExecOutputs::PerCase => args.len() as u32,
        }
    }

    /// Create output pins, substituting `dynamic` for call-site typed pins.
    fn create_outputs(&self, dynamic: Option<ValueType>) -> Vec<OutputPin> {
        self.outputs()
            .iter()
            .map(|def| def.to_pin(dynamic))
            .collect()
    }

    fn draft(&self, args: Vec<Value>, dynamic: Option<ValueType>) -> NodeDraft {
        NodeDraft {
            class: self.class(),
            node_type: self.kind_name().to_string(),
            exec_outputs: self.exec_output_count(&args),
            outputs: self.create_outputs(dynamic),
            args,
        }
    }
}
