use crate::failure::FailurePaths;
use crate::index::EdgeIndex;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use wfcore::{
    ComponentExecutionId, EndpointCharacter, GraphConfig, GraphError, WorkflowGraphEdge,
    WorkflowGraphHop, WorkflowGraphNode,
};

/// Workflow graph of one workflow execution.
///
/// Built once from the static node and edge description and queried
/// concurrently by executing components afterwards. Nodes and edges never
/// change; only the failure-path and loop-driver caches are written, and both
/// sit behind a single lock.
#[derive(Debug)]
pub struct WorkflowGraph {
    nodes: BTreeMap<ComponentExecutionId, WorkflowGraphNode>,
    edges: EdgeIndex,
    config: GraphConfig,
    pub(crate) caches: Mutex<LoopDriverCaches>,
}

/// Results of failure-path searches, keyed by start node
#[derive(Debug, Default)]
pub(crate) struct LoopDriverCaches {
    pub(crate) failure_paths: HashMap<ComponentExecutionId, FailurePaths>,
    pub(crate) drivers: HashMap<ComponentExecutionId, ComponentExecutionId>,
}

impl LoopDriverCaches {
    /// Store the outcome of one completed search. Each start node is searched
    /// at most once.
    pub(crate) fn store(
        &mut self,
        start: &ComponentExecutionId,
        paths: FailurePaths,
        driver: Option<ComponentExecutionId>,
    ) {
        if let Some(driver) = driver {
            self.drivers.insert(start.clone(), driver);
        }
        self.failure_paths.insert(start.clone(), paths);
    }
}

impl WorkflowGraph {
    /// Build a graph with the default configuration
    pub fn new(
        nodes: impl IntoIterator<Item = WorkflowGraphNode>,
        edges: impl IntoIterator<Item = WorkflowGraphEdge>,
    ) -> Result<Self, GraphError> {
        Self::with_config(nodes, edges, GraphConfig::default())
    }

    /// Build a graph, rejecting duplicate nodes and edges that reference
    /// unknown nodes or endpoints
    pub fn with_config(
        nodes: impl IntoIterator<Item = WorkflowGraphNode>,
        edges: impl IntoIterator<Item = WorkflowGraphEdge>,
        config: GraphConfig,
    ) -> Result<Self, GraphError> {
        let mut node_map = BTreeMap::new();
        for node in nodes {
            let id = node.execution_id().clone();
            if node_map.insert(id.clone(), node).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
        }

        let edges: Vec<WorkflowGraphEdge> = edges.into_iter().collect();
        for edge in &edges {
            Self::check_edge(&node_map, edge)?;
        }
        let edges = EdgeIndex::new(edges);

        tracing::info!(
            "Built workflow graph with {} nodes and {} edges",
            node_map.len(),
            edges.len()
        );

        Ok(Self {
            nodes: node_map,
            edges,
            config,
            caches: Mutex::new(LoopDriverCaches::default()),
        })
    }

    fn check_edge(
        nodes: &BTreeMap<ComponentExecutionId, WorkflowGraphNode>,
        edge: &WorkflowGraphEdge,
    ) -> Result<(), GraphError> {
        let unknown = |missing: &ComponentExecutionId| GraphError::UnknownEdgeNode {
            source_node: edge.source.clone(),
            target_node: edge.target.clone(),
            missing: missing.clone(),
        };
        let source = nodes.get(&edge.source).ok_or_else(|| unknown(&edge.source))?;
        let target = nodes.get(&edge.target).ok_or_else(|| unknown(&edge.target))?;

        if !source.has_output(&edge.output_id) {
            return Err(GraphError::UnknownEndpoint {
                node: edge.source.clone(),
                endpoint: edge.output_id.clone(),
            });
        }
        if !target.has_input(&edge.input_id) {
            return Err(GraphError::UnknownEndpoint {
                node: edge.target.clone(),
                endpoint: edge.input_id.clone(),
            });
        }
        Ok(())
    }

    /// Look up a node, failing with [`GraphError::NodeNotFound`] for unknown ids
    pub fn node(&self, id: &str) -> Result<&WorkflowGraphNode, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NodeNotFound(ComponentExecutionId::new(id)))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes, in execution id order
    pub fn nodes(&self) -> impl Iterator<Item = &WorkflowGraphNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &EdgeIndex {
        &self.edges
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub(crate) fn endpoint_name<'g>(
        &self,
        node: &'g WorkflowGraphNode,
        endpoint_id: &str,
    ) -> Result<&'g str, GraphError> {
        node.endpoint_name(endpoint_id)
            .ok_or_else(|| GraphError::UnknownEndpoint {
                node: node.execution_id().clone(),
                endpoint: endpoint_id.to_string(),
            })
    }

    /// Translate an edge into the hop the execution controller delivers along
    pub(crate) fn hop_for(
        &self,
        edge: &WorkflowGraphEdge,
    ) -> Result<WorkflowGraphHop, GraphError> {
        let source = self.node(edge.source.as_str())?;
        let target = self.node(edge.target.as_str())?;

        Ok(WorkflowGraphHop::new(
            edge.source.clone(),
            self.endpoint_name(source, &edge.output_id)?,
            edge.target.clone(),
            self.endpoint_name(target, &edge.input_id)?,
            edge.output_id.clone(),
        ))
    }

    /// Whether the node has connected outputs of both endpoint characters,
    /// i.e. it sits on the border between a loop and its enclosing loop
    /// without driving either.
    pub fn has_opposite_output_characters(&self, node: &WorkflowGraphNode) -> bool {
        let mut same_loop = false;
        let mut outer_loop = false;
        for output_id in node.output_ids() {
            for edge in self.edges.outgoing_edges(node.execution_id().as_str(), output_id) {
                match edge.output_character {
                    EndpointCharacter::SameLoop => same_loop = true,
                    EndpointCharacter::OuterLoop => outer_loop = true,
                }
            }
        }
        same_loop && outer_loop
    }
}
