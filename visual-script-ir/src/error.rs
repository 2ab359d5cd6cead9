use crate::model::NodeId;
use std::fmt;
use thiserror::Error;

/// Optional suggestion appended to a type mismatch message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hint(pub Option<String>);

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(hint) => write!(f, " ({hint})"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("type mismatch: expected {expected}, found {found}{hint}")]
    TypeMismatch {
        expected: String,
        found: String,
        hint: Hint,
    },

    #[error("{ty} values cannot be literals, they must come from a pin")]
    LiteralNotAllowed { ty: String },

    #[error("continue used outside of a loop")]
    ContinueOutsideLoop,

    #[error("break used outside of a loop")]
    BreakOutsideLoop,

    #[error("node {0:?} is not an active loop")]
    NotAnActiveLoop(NodeId),

    #[error("alias refers to undeclared case `{0}`")]
    UnknownCase(String),

    #[error("circular case alias: {0}")]
    AliasCycle(String),

    #[error("case `{0}` declared more than once")]
    DuplicateCase(String),

    #[error("{what} accepts at most {limit} entries, got {found}")]
    TooManyElements {
        what: &'static str,
        limit: usize,
        found: usize,
    },

    #[error("{0} requires at least one entry")]
    EmptyCollection(&'static str),

    #[error("unknown node")]
    UnknownNode,

    #[error("node is not an exec node")]
    NotAnExecNode,

    #[error("exec output {0} does not exist")]
    ExecOutputOutOfRange(u32),

    #[error("exec output {0} is already connected")]
    ExecOutputAlreadyConnected(u32),

    #[error("pin `{slot}` at index {index} does not exist")]
    UnknownPin { slot: String, index: u32 },

    #[error("exec flow cycle detected")]
    ExecCycle,

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("compile failed: {kind} (node={node:?})")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub node: Option<NodeId>,
}

impl CompileError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, node: None }
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn type_mismatch(
        expected: impl fmt::Display,
        found: impl fmt::Display,
        hint: Option<String>,
    ) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
            hint: Hint(hint),
        })
    }
}

impl From<ErrorKind> for CompileError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_message_includes_hint() {
        let err = CompileError::type_mismatch(
            "int_list",
            "float_list pin",
            Some("did you mean `float_list`?".to_string()),
        );
        let text = err.to_string();
        assert!(text.contains("expected int_list"));
        assert!(text.contains("did you mean `float_list`?"));
    }

    #[test]
    fn node_is_attached() {
        let err = CompileError::new(ErrorKind::ContinueOutsideLoop).with_node(NodeId(3));
        assert_eq!(err.node, Some(NodeId(3)));
        assert!(err.to_string().contains("NodeId(3)"));
    }
}
