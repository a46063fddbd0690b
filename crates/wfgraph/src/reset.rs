use crate::WorkflowGraph;
use std::collections::HashSet;
use wfcore::{
    ComponentExecutionId, EndpointCharacter, GraphError, WorkflowGraphEdge, WorkflowGraphHop,
    WorkflowGraphNode, WorkflowGraphPath,
};

type EdgeChain<'g> = Vec<&'g WorkflowGraphEdge>;

impl WorkflowGraph {
    /// Paths to traverse when the node with the given execution id resets its
    /// nested loop.
    ///
    /// A node claimed by one branch of the search is not entered by any other
    /// branch of the same call. Paths that do not lead back to the resetting
    /// node end with a dummy hop to a generated placeholder target. Results
    /// are recomputed on every call.
    pub fn hops_to_traverse_when_resetting(
        &self,
        start: &str,
    ) -> Result<Vec<WorkflowGraphPath>, GraphError> {
        let start_node = self.node(start)?;

        let mut visited = HashSet::new();
        let mut chains = Vec::new();
        self.collect_reset_chains(
            start_node,
            EndpointCharacter::SameLoop,
            Vec::new(),
            &mut visited,
            &mut chains,
        )?;

        let mut paths = Vec::with_capacity(chains.len());
        for chain in chains {
            let (Some(first), Some(last)) = (chain.first(), chain.last()) else {
                continue;
            };
            let closes_loop = first.source == last.target;
            let dummy_source = last.target.clone();

            let mut path = WorkflowGraphPath::new();
            for edge in chain {
                path.push(self.hop_for(edge)?);
            }
            if !closes_loop {
                path.push(WorkflowGraphHop::dummy(
                    dummy_source,
                    &self.config().dummy_prefix,
                ));
            }
            paths.push(path);
        }

        tracing::debug!(
            "Determined {} reset path(s) for {}",
            paths.len(),
            start_node.execution_id()
        );
        Ok(paths)
    }

    fn collect_reset_chains<'g>(
        &'g self,
        node: &'g WorkflowGraphNode,
        character: EndpointCharacter,
        chain: EdgeChain<'g>,
        visited: &mut HashSet<&'g ComponentExecutionId>,
        completed: &mut Vec<EdgeChain<'g>>,
    ) -> Result<(), GraphError> {
        let next_edges = self.next_reset_edges(node, character, visited);

        if next_edges.is_empty() {
            if !chain.is_empty() {
                completed.push(chain);
            }
            return Ok(());
        }

        for edge in next_edges {
            let target = self.node(edge.target.as_str())?;
            let mut branch = chain.clone();
            branch.push(edge);
            self.collect_reset_chains(target, edge.input_character, branch, visited, completed)?;
        }
        Ok(())
    }

    /// Edges to follow from `node`. Targets are claimed immediately, so
    /// sibling edges and later branches skip them. A driver only follows
    /// edges that stay on the loop level it was entered on.
    fn next_reset_edges<'g>(
        &'g self,
        node: &'g WorkflowGraphNode,
        character: EndpointCharacter,
        visited: &mut HashSet<&'g ComponentExecutionId>,
    ) -> EdgeChain<'g> {
        let mut next_edges = Vec::new();
        for output_id in node.output_ids() {
            for edge in self.edges().outgoing_edges(node.execution_id().as_str(), output_id) {
                if visited.contains(&edge.target) {
                    continue;
                }
                if node.is_driver() && edge.output_character != character {
                    continue;
                }
                visited.insert(&edge.target);
                next_edges.push(edge);
            }
        }
        next_edges
    }
}
