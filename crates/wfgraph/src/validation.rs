//! Consistency check between configured nested loops and the loop structure
//! the graph actually has.

use crate::WorkflowGraph;
use serde::Serialize;
use thiserror::Error;
use wfcore::{ComponentExecutionId, GraphError, WorkflowDescription};

/// Likely configuration error of a loop driver component
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopConfigurationWarning {
    #[error(
        "Potential configuration error: '{name}' is configured as a nested loop driver component but doesn't seem to be part of a loop driven by an outer loop driver component"
    )]
    NestedWithoutOuterLoop {
        component: ComponentExecutionId,
        name: String,
    },

    #[error(
        "Potential configuration error: '{name}' is part of a loop driven by an outer loop driver component but is not configured as a nested loop driver component"
    )]
    InsideOuterLoopButNotNested {
        component: ComponentExecutionId,
        name: String,
        outer_driver: ComponentExecutionId,
    },
}

/// Compare every driver's nested-loop flag with the loop driver the graph
/// finds for it.
pub fn validate_nested_loop_configuration(
    description: &WorkflowDescription,
    graph: &WorkflowGraph,
) -> Result<Vec<LoopConfigurationWarning>, GraphError> {
    let mut warnings = Vec::new();

    for component in description.components.iter().filter(|c| c.is_driver) {
        let outer_driver = graph.loop_driver(component.id.as_str())?;

        let warning = match (component.nested_loop, outer_driver) {
            (true, None) => Some(LoopConfigurationWarning::NestedWithoutOuterLoop {
                component: component.id.clone(),
                name: component.name.clone(),
            }),
            (false, Some(outer)) => Some(LoopConfigurationWarning::InsideOuterLoopButNotNested {
                component: component.id.clone(),
                name: component.name.clone(),
                outer_driver: outer.execution_id().clone(),
            }),
            _ => None,
        };

        if let Some(warning) = warning {
            tracing::warn!("{}", warning);
            warnings.push(warning);
        }
    }

    Ok(warnings)
}
