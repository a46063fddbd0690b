use crate::WorkflowGraph;
use std::collections::{BTreeMap, HashSet};
use wfcore::{
    ComponentExecutionId, EndpointCharacter, FailureEdgePolicy, GraphError, WorkflowGraphEdge,
    WorkflowGraphNode, WorkflowGraphPath,
};

/// Paths to the loop driver, per output name of the failed node
pub type FailurePaths = BTreeMap<String, Vec<WorkflowGraphPath>>;

impl WorkflowGraph {
    /// Paths to traverse when the node with the given execution id failed
    /// within a fault-tolerant loop, grouped by the name of the output they
    /// leave through. Every path ends at an input of the responsible loop driver.
    ///
    /// Computed at most once per node; callers receive their own copy and may
    /// consume it.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] for unknown ids and
    /// [`GraphError::ConflictingLoopDriver`] if the node appears to be
    /// controlled by two different drivers.
    pub fn hops_to_traverse_on_failure(&self, start: &str) -> Result<FailurePaths, GraphError> {
        let start_node = self.node(start)?;

        let mut caches = self.caches.lock();
        if let Some(paths) = caches.failure_paths.get(start_node.execution_id()) {
            tracing::debug!("Using cached failure paths for {}", start_node.execution_id());
            return Ok(paths.clone());
        }

        let (paths, driver) = LoopDriverSearch::new(self, start_node).run()?;
        let paths = keep_first_path_per_driver_input(paths);
        tracing::debug!(
            "Determined failure paths for {} on {} output(s), driver: {:?}",
            start_node.execution_id(),
            paths.len(),
            driver
        );

        caches.store(start_node.execution_id(), paths.clone(), driver);
        Ok(paths)
    }

    /// Driver of the loop the node with the given execution id belongs to, or
    /// `None` if it is not part of a loop. Runs the failure-path search if it
    /// has not run for this node yet.
    pub fn loop_driver(&self, id: &str) -> Result<Option<&WorkflowGraphNode>, GraphError> {
        let node = self.node(id)?;

        let known = {
            let caches = self.caches.lock();
            caches.failure_paths.contains_key(node.execution_id())
        };
        if !known {
            self.hops_to_traverse_on_failure(id)?;
        }

        let driver = self.caches.lock().drivers.get(node.execution_id()).cloned();
        match driver {
            Some(driver) => self.node(driver.as_str()).map(Some),
            None => Ok(None),
        }
    }

    /// Whether `node` was already left earlier on `path` in a way that makes
    /// entering it again via `edge` a cycle.
    ///
    /// Nodes with opposite output characters may be entered once more, but
    /// only through the character they were left with last time.
    fn visited_that_way(
        &self,
        path: &WorkflowGraphPath,
        node: &WorkflowGraphNode,
        edge: &WorkflowGraphEdge,
    ) -> bool {
        path.iter()
            .filter(|hop| &hop.source == node.execution_id())
            .any(|hop| {
                if !self.has_opposite_output_characters(node) {
                    return true;
                }
                let left_with = hop.output_id.as_deref().and_then(|output_id| {
                    self.edges()
                        .outgoing_edges(hop.source.as_str(), output_id)
                        .iter()
                        .next()
                        .map(|e| e.output_character)
                });
                left_with != Some(edge.input_character)
            })
    }
}

/// Depth-first search from a failed node towards its loop driver
struct LoopDriverSearch<'g> {
    graph: &'g WorkflowGraph,
    start: &'g WorkflowGraphNode,
    driver: Option<&'g WorkflowGraphNode>,
}

impl<'g> LoopDriverSearch<'g> {
    fn new(graph: &'g WorkflowGraph, start: &'g WorkflowGraphNode) -> Self {
        Self {
            graph,
            start,
            driver: None,
        }
    }

    fn run(mut self) -> Result<(FailurePaths, Option<ComponentExecutionId>), GraphError> {
        let start_character = if self.start.is_driver() {
            EndpointCharacter::OuterLoop
        } else {
            EndpointCharacter::SameLoop
        };
        let (graph, start) = (self.graph, self.start);
        let policy = graph.config().failure_edge_policy;

        let mut per_output = FailurePaths::new();
        for output_id in start.output_ids() {
            let output_name = graph.endpoint_name(start, output_id)?;

            let mut found = Vec::new();
            for edge in graph
                .edges()
                .outgoing_edges(start.execution_id().as_str(), output_id)
            {
                if start.is_driver() && edge.output_character != start_character {
                    continue;
                }
                let paths = self.search_from(edge)?;
                match policy {
                    FailureEdgePolicy::Union => found.extend(paths),
                    FailureEdgePolicy::LastEdgeWins => found = paths,
                }
            }
            per_output
                .entry(output_name.to_string())
                .or_default()
                .extend(found);
        }

        let driver = self.driver.map(|d| d.execution_id().clone());
        Ok((per_output, driver))
    }

    fn search_from(
        &mut self,
        edge: &'g WorkflowGraphEdge,
    ) -> Result<Vec<WorkflowGraphPath>, GraphError> {
        let target = self.graph.node(edge.target.as_str())?;

        let mut path = WorkflowGraphPath::new();
        path.push(self.graph.hop_for(edge)?);

        let mut found = Vec::new();
        self.descend(edge, target, path, &mut found)?;
        Ok(found)
    }

    /// `path` already ends with the hop via `edge` into `target`
    fn descend(
        &mut self,
        edge: &'g WorkflowGraphEdge,
        target: &'g WorkflowGraphNode,
        path: WorkflowGraphPath,
        found: &mut Vec<WorkflowGraphPath>,
    ) -> Result<(), GraphError> {
        if target.execution_id() == self.start.execution_id() {
            return Ok(());
        }
        if self.graph.visited_that_way(&path, target, edge) {
            return Ok(());
        }

        if target.is_driver() {
            match edge.input_character {
                // a nested driver: its loop is passed through towards the outer one
                EndpointCharacter::OuterLoop => {
                    self.continue_from(target, &path, EndpointCharacter::OuterLoop, found)
                }
                EndpointCharacter::SameLoop => {
                    found.push(path);
                    self.record_driver(target)
                }
            }
        } else {
            let character = if self.graph.has_opposite_output_characters(target) {
                edge.input_character.opposite()
            } else {
                EndpointCharacter::SameLoop
            };
            self.continue_from(target, &path, character, found)
        }
    }

    fn continue_from(
        &mut self,
        node: &'g WorkflowGraphNode,
        path: &WorkflowGraphPath,
        character: EndpointCharacter,
        found: &mut Vec<WorkflowGraphPath>,
    ) -> Result<(), GraphError> {
        let graph = self.graph;
        for output_id in node.output_ids() {
            for next in graph
                .edges()
                .outgoing_edges(node.execution_id().as_str(), output_id)
            {
                if next.output_character != character {
                    continue;
                }
                let mut branch = path.clone();
                branch.push(graph.hop_for(next)?);
                let next_target = graph.node(next.target.as_str())?;
                self.descend(next, next_target, branch, found)?;
            }
        }
        Ok(())
    }

    fn record_driver(&mut self, driver: &'g WorkflowGraphNode) -> Result<(), GraphError> {
        match self.driver {
            None => self.driver = Some(driver),
            Some(existing) if existing.execution_id() != driver.execution_id() => {
                tracing::error!(
                    "Found two loop drivers for {}: {} and {}",
                    self.start.execution_id(),
                    existing.execution_id(),
                    driver.execution_id()
                );
                return Err(GraphError::ConflictingLoopDriver {
                    start: self.start.execution_id().clone(),
                    first: existing.execution_id().clone(),
                    second: driver.execution_id().clone(),
                });
            }
            Some(_) => {}
        }
        Ok(())
    }
}

/// Each driver input is notified through one path only: the first one found,
/// in output name order. Outputs left without paths are dropped.
fn keep_first_path_per_driver_input(paths: FailurePaths) -> FailurePaths {
    let mut seen_inputs = HashSet::new();
    let mut sanitized = FailurePaths::new();

    for (output_name, paths) in paths {
        let mut kept = Vec::new();
        for path in paths {
            let Some(last) = path.last() else {
                continue;
            };
            if seen_inputs.insert((last.target.clone(), last.input_name.clone())) {
                kept.push(path);
            }
        }
        if !kept.is_empty() {
            sanitized.insert(output_name, kept);
        }
    }
    sanitized
}
