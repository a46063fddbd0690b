use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Identifies one instantiated component within one workflow run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentExecutionId(String);

impl ComponentExecutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ComponentExecutionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentExecutionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ComponentExecutionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Execution identity of one workflow component as seen by the graph.
///
/// Nodes are created once when the graph is built and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowGraphNode {
    execution_id: ComponentExecutionId,
    name: String,
    inputs: BTreeSet<String>,
    outputs: BTreeSet<String>,
    endpoint_names: HashMap<String, String>,
    is_driver: bool,
    drives_fault_tolerant_loop: bool,
}

impl WorkflowGraphNode {
    pub fn builder(
        execution_id: impl Into<ComponentExecutionId>,
        name: impl Into<String>,
    ) -> WorkflowGraphNodeBuilder {
        WorkflowGraphNodeBuilder {
            node: WorkflowGraphNode {
                execution_id: execution_id.into(),
                name: name.into(),
                inputs: BTreeSet::new(),
                outputs: BTreeSet::new(),
                endpoint_names: HashMap::new(),
                is_driver: false,
                drives_fault_tolerant_loop: false,
            },
        }
    }

    pub fn execution_id(&self) -> &ComponentExecutionId {
        &self.execution_id
    }

    /// Display name of the component
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input endpoint identifiers, in identifier order
    pub fn input_ids(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(String::as_str)
    }

    /// Output endpoint identifiers, in identifier order
    pub fn output_ids(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(String::as_str)
    }

    pub fn has_input(&self, input_id: &str) -> bool {
        self.inputs.contains(input_id)
    }

    pub fn has_output(&self, output_id: &str) -> bool {
        self.outputs.contains(output_id)
    }

    /// Human readable name of an input or output endpoint
    pub fn endpoint_name(&self, endpoint_id: &str) -> Option<&str> {
        self.endpoint_names.get(endpoint_id).map(String::as_str)
    }

    pub fn is_driver(&self) -> bool {
        self.is_driver
    }

    pub fn is_driving_fault_tolerant_loop(&self) -> bool {
        self.drives_fault_tolerant_loop
    }
}

/// Builder for [`WorkflowGraphNode`]; every endpoint is registered together with its name.
#[derive(Debug, Clone)]
pub struct WorkflowGraphNodeBuilder {
    node: WorkflowGraphNode,
}

impl WorkflowGraphNodeBuilder {
    pub fn input(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        self.node.endpoint_names.insert(id.clone(), name.into());
        self.node.inputs.insert(id);
        self
    }

    pub fn output(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        self.node.endpoint_names.insert(id.clone(), name.into());
        self.node.outputs.insert(id);
        self
    }

    pub fn driver(mut self, is_driver: bool) -> Self {
        self.node.is_driver = is_driver;
        self
    }

    pub fn fault_tolerant(mut self, drives_fault_tolerant_loop: bool) -> Self {
        self.node.drives_fault_tolerant_loop = drives_fault_tolerant_loop;
        self
    }

    pub fn build(self) -> WorkflowGraphNode {
        self.node
    }
}
