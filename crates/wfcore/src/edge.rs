use crate::{ComponentExecutionId, EndpointCharacter};
use serde::{Deserialize, Serialize};

/// Directed connection from one node's output to another node's input.
///
/// Equality and hashing cover all six fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowGraphEdge {
    pub source: ComponentExecutionId,
    pub output_id: String,
    pub output_character: EndpointCharacter,
    pub target: ComponentExecutionId,
    pub input_id: String,
    pub input_character: EndpointCharacter,
}

impl WorkflowGraphEdge {
    pub fn new(
        source: impl Into<ComponentExecutionId>,
        output_id: impl Into<String>,
        output_character: EndpointCharacter,
        target: impl Into<ComponentExecutionId>,
        input_id: impl Into<String>,
        input_character: EndpointCharacter,
    ) -> Self {
        Self {
            source: source.into(),
            output_id: output_id.into(),
            output_character,
            target: target.into(),
            input_id: input_id.into(),
            input_character,
        }
    }
}
