//! Pipeline-specific error types.

use crate::id::NodeId;
use thiserror::Error;

/// Errors that can occur while building or evaluating a pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Node {node_id:?} error: {message}")]
    Node { node_id: NodeId, message: String },

    #[error("Invalid node id: {0:?}")]
    BadNode(NodeId),

    #[error("Port index {port} out of range on node {node_id:?}")]
    BadPort { node_id: NodeId, port: usize },

    #[error("Connection type mismatch: output '{output}' not accepted by input port '{input}'")]
    InvalidType { output: String, input: String },

    #[error("Connection would create a cycle in the pipeline graph")]
    Cycle,

    #[error("Required input missing on port {port} of node {node_id:?}")]
    MissingInput { node_id: NodeId, port: usize },

    #[error("Recursive evaluation of node {0:?}")]
    CyclicEvaluation(NodeId),

    #[error("Information key '{key}' holds {expected:?} values, got {got:?}")]
    KeyTypeMismatch {
        key: &'static str,
        expected: crate::info::ValueKind,
        got: crate::info::ValueKind,
    },

    #[error("Execution aborted")]
    Aborted,

    #[error("Data append mismatch: cannot append {src} onto {dst}")]
    AppendMismatch { dst: &'static str, src: &'static str },

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

impl PipelineError {
    /// Shorthand for algorithm callbacks reporting a failure.
    pub fn algorithm(message: impl Into<String>) -> Self {
        PipelineError::Algorithm(message.into())
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
