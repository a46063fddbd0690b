use crate::WorkflowGraph;
use std::collections::HashMap;
use wfcore::{
    ComponentDescriptor, ComponentExecutionId, GraphError, WorkflowDescription, WorkflowGraphEdge,
    WorkflowGraphNode,
};

impl WorkflowGraph {
    /// Build the graph of a workflow description. The loop characters of each
    /// edge are taken from the endpoints it connects.
    pub fn from_description(description: &WorkflowDescription) -> Result<Self, GraphError> {
        let mut components: HashMap<&ComponentExecutionId, &ComponentDescriptor> = HashMap::new();
        for component in &description.components {
            if components.insert(&component.id, component).is_some() {
                return Err(GraphError::DuplicateNode(component.id.clone()));
            }
        }

        let mut edges = Vec::with_capacity(description.connections.len());
        for connection in &description.connections {
            let unknown = |missing: &ComponentExecutionId| GraphError::UnknownEdgeNode {
                source_node: connection.source.clone(),
                target_node: connection.target.clone(),
                missing: missing.clone(),
            };
            let source = components
                .get(&connection.source)
                .ok_or_else(|| unknown(&connection.source))?;
            let target = components
                .get(&connection.target)
                .ok_or_else(|| unknown(&connection.target))?;

            let output = source.find_output(&connection.output).ok_or_else(|| {
                GraphError::UnknownEndpoint {
                    node: connection.source.clone(),
                    endpoint: connection.output.clone(),
                }
            })?;
            let input = target.find_input(&connection.input).ok_or_else(|| {
                GraphError::UnknownEndpoint {
                    node: connection.target.clone(),
                    endpoint: connection.input.clone(),
                }
            })?;

            edges.push(WorkflowGraphEdge::new(
                connection.source.clone(),
                output.id.clone(),
                output.character,
                connection.target.clone(),
                input.id.clone(),
                input.character,
            ));
        }

        let nodes = description.components.iter().map(graph_node);
        Self::with_config(nodes, edges, description.settings.clone())
    }
}

fn graph_node(component: &ComponentDescriptor) -> WorkflowGraphNode {
    let mut builder = WorkflowGraphNode::builder(component.id.clone(), component.name.clone())
        .driver(component.is_driver)
        .fault_tolerant(component.drives_fault_tolerant_loop);
    for input in &component.inputs {
        builder = builder.input(input.id.clone(), input.name.clone());
    }
    for output in &component.outputs {
        builder = builder.output(output.id.clone(), output.name.clone());
    }
    builder.build()
}
