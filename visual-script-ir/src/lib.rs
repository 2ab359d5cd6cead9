#![forbid(unsafe_code)]

//! Compiles structured control flow (branches, switches, loops, early returns)
//! into a node graph whose only control primitive is an exec output wired to at
//! most one downstream node.

pub mod builder;
pub mod compile;
pub mod config;
pub mod context;
pub mod error;
pub mod fold;
pub mod model;
pub mod nodes;
pub mod preprocess;
pub mod value;

pub use crate::{
    builder::{BranchOutcome, CaseLabel, GraphBuilder, LoopHandle, SwitchCases},
    compile::{compile, CompiledGraph, CompiledNode, ExecConnection},
    config::CompilerConfig,
    context::{CompilationContext, LocalVariable},
    error::{CompileError, ErrorKind},
    fold::{BinaryOp, UnaryOp},
    model::{ExecEndpoint, Graph, Node, NodeClass, NodeId, OutputPin},
    value::{Literal, ScalarType, Value, ValueInput, ValueType},
};
