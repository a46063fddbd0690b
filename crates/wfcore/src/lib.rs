//! Core data model for the workflow graph engine
//!
//! This crate provides the value types shared by the engine and its callers:
//! nodes, edges, hops, paths, the workflow description the graph is built from,
//! and the error taxonomy.

mod edge;
mod endpoint;
mod error;
mod node;
mod path;
mod workflow;

pub use edge::WorkflowGraphEdge;
pub use endpoint::EndpointCharacter;
pub use error::{FlowError, GraphError};
pub use node::{ComponentExecutionId, WorkflowGraphNode, WorkflowGraphNodeBuilder};
pub use path::{WorkflowGraphHop, WorkflowGraphPath};
pub use workflow::{
    ComponentDescriptor, ConnectionDescriptor, EndpointDescriptor, FailureEdgePolicy,
    GraphConfig, WorkflowDescription,
};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
