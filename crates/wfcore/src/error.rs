use crate::ComponentExecutionId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while building or querying a workflow graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(ComponentExecutionId),

    #[error("Duplicate node: {0}")]
    DuplicateNode(ComponentExecutionId),

    #[error("Edge from '{source_node}' to '{target_node}' references unknown node '{missing}'")]
    UnknownEdgeNode {
        source_node: ComponentExecutionId,
        target_node: ComponentExecutionId,
        missing: ComponentExecutionId,
    },

    #[error("Unknown endpoint '{endpoint}' on node '{node}'")]
    UnknownEndpoint {
        node: ComponentExecutionId,
        endpoint: String,
    },

    /// Two different loop drivers were found for the same start node. The
    /// graph itself is inconsistent; this is never retried.
    #[error(
        "Newly determined loop driver '{second}' for '{start}' differs from driver '{first}' determined earlier"
    )]
    ConflictingLoopDriver {
        start: ComponentExecutionId,
        first: ComponentExecutionId,
        second: ComponentExecutionId,
    },
}

impl GraphError {
    /// Whether the error signals a malformed graph rather than a bad query.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GraphError::ConflictingLoopDriver { .. })
    }
}
