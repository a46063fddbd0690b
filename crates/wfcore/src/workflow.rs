use crate::{ComponentExecutionId, EndpointCharacter, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Static description of a workflow, as far as the graph engine needs it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDescription {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
    #[serde(default)]
    pub connections: Vec<ConnectionDescriptor>,
    #[serde(default)]
    pub settings: GraphConfig,
}

impl WorkflowDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            connections: Vec::new(),
            settings: GraphConfig::default(),
        }
    }

    /// Parse a description from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a description JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn add_component(&mut self, component: ComponentDescriptor) -> ComponentExecutionId {
        let id = component.id.clone();
        self.components.push(component);
        id
    }

    pub fn connect(
        &mut self,
        source: &ComponentExecutionId,
        output: impl Into<String>,
        target: &ComponentExecutionId,
        input: impl Into<String>,
    ) {
        self.connections.push(ConnectionDescriptor {
            source: source.clone(),
            output: output.into(),
            target: target.clone(),
            input: input.into(),
        });
    }

    pub fn find_component(&self, id: &ComponentExecutionId) -> Option<&ComponentDescriptor> {
        self.components.iter().find(|c| &c.id == id)
    }
}

/// Component in a workflow description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub id: ComponentExecutionId,
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<EndpointDescriptor>,
    #[serde(default)]
    pub outputs: Vec<EndpointDescriptor>,
    #[serde(default)]
    pub is_driver: bool,
    #[serde(default)]
    pub drives_fault_tolerant_loop: bool,
    /// Configured as the driver of a loop nested in another loop
    #[serde(default)]
    pub nested_loop: bool,
}

impl ComponentDescriptor {
    pub fn new(id: impl Into<ComponentExecutionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            is_driver: false,
            drives_fault_tolerant_loop: false,
            nested_loop: false,
        }
    }

    pub fn with_input(mut self, id: impl Into<String>, character: EndpointCharacter) -> Self {
        self.inputs.push(EndpointDescriptor::named_after_id(id, character));
        self
    }

    pub fn with_output(mut self, id: impl Into<String>, character: EndpointCharacter) -> Self {
        self.outputs.push(EndpointDescriptor::named_after_id(id, character));
        self
    }

    pub fn as_driver(mut self) -> Self {
        self.is_driver = true;
        self
    }

    pub fn fault_tolerant(mut self) -> Self {
        self.drives_fault_tolerant_loop = true;
        self
    }

    pub fn nested(mut self) -> Self {
        self.nested_loop = true;
        self
    }

    pub fn find_input(&self, id: &str) -> Option<&EndpointDescriptor> {
        self.inputs.iter().find(|ep| ep.id == id)
    }

    pub fn find_output(&self, id: &str) -> Option<&EndpointDescriptor> {
        self.outputs.iter().find(|ep| ep.id == id)
    }
}

/// Input or output endpoint and the loop level it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub character: EndpointCharacter,
}

impl EndpointDescriptor {
    fn named_after_id(id: impl Into<String>, character: EndpointCharacter) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            character,
        }
    }
}

/// Connection between an output and an input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub source: ComponentExecutionId,
    pub output: String,
    pub target: ComponentExecutionId,
    pub input: String,
}

/// Tunables of the graph engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub failure_edge_policy: FailureEdgePolicy,
    /// Prefix of the placeholder names generated for dummy hops
    pub dummy_prefix: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            failure_edge_policy: FailureEdgePolicy::Union,
            dummy_prefix: "dummy-".to_string(),
        }
    }
}

/// How paths are collected when one output of a failed node has several connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureEdgePolicy {
    /// Paths found via every qualifying connection are kept
    #[default]
    Union,
    /// Only the paths found via the last qualifying connection are kept
    LastEdgeWins,
}
