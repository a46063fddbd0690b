use std::collections::{BTreeSet, HashMap};
use wfcore::{ComponentExecutionId, WorkflowGraphEdge};

static NO_EDGES: BTreeSet<WorkflowGraphEdge> = BTreeSet::new();

type EdgesByOutput = HashMap<String, BTreeSet<WorkflowGraphEdge>>;

/// Outgoing edges grouped by source node and output endpoint
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    by_source: HashMap<ComponentExecutionId, EdgesByOutput>,
    len: usize,
}

impl EdgeIndex {
    /// Build the index from a set of edges. Duplicate edges are stored once.
    pub fn new(edges: impl IntoIterator<Item = WorkflowGraphEdge>) -> Self {
        let mut by_source: HashMap<ComponentExecutionId, EdgesByOutput> = HashMap::new();
        let mut len = 0;

        for edge in edges {
            let inserted = by_source
                .entry(edge.source.clone())
                .or_default()
                .entry(edge.output_id.clone())
                .or_default()
                .insert(edge);
            if inserted {
                len += 1;
            }
        }

        Self { by_source, len }
    }

    /// Edges leaving `output_id` of `node`; empty if the output is not connected
    pub fn outgoing_edges(&self, node: &str, output_id: &str) -> &BTreeSet<WorkflowGraphEdge> {
        self.by_source
            .get(node)
            .and_then(|outputs| outputs.get(output_id))
            .unwrap_or(&NO_EDGES)
    }

    pub fn has_outgoing_edge(&self, node: &str, output_id: &str) -> bool {
        !self.outgoing_edges(node, output_id).is_empty()
    }

    /// Every edge group, keyed by source node and output id. Can be called
    /// repeatedly; group order is unspecified.
    pub fn all_edges(
        &self,
    ) -> impl Iterator<Item = (&ComponentExecutionId, &str, &BTreeSet<WorkflowGraphEdge>)> {
        self.by_source.iter().flat_map(|(node, outputs)| {
            outputs
                .iter()
                .map(move |(output_id, edges)| (node, output_id.as_str(), edges))
        })
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
