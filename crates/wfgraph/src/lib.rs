//! Workflow graph engine
//!
//! This crate answers the graph questions an executing workflow asks: which
//! hops carry a reset signal through a nested loop, and which hops lead from a
//! failed component to the driver of its fault-tolerant loop.

mod description;
mod dot;
mod failure;
mod graph;
mod index;
mod reset;
mod validation;

pub use failure::FailurePaths;
pub use graph::WorkflowGraph;
pub use index::EdgeIndex;
pub use validation::{validate_nested_loop_configuration, LoopConfigurationWarning};
