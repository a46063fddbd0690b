use crate::ComponentExecutionId;
use serde::{Deserialize, Serialize};
use std::collections::{vec_deque, VecDeque};
use uuid::Uuid;

/// One directed step of a path, from a component's output to another component's input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowGraphHop {
    pub source: ComponentExecutionId,
    pub output_name: String,
    pub target: ComponentExecutionId,
    pub input_name: String,
    /// Identifier of the output the hop leaves through. `None` for dummy hops,
    /// which do not correspond to a real connection.
    pub output_id: Option<String>,
}

impl WorkflowGraphHop {
    pub fn new(
        source: ComponentExecutionId,
        output_name: impl Into<String>,
        target: ComponentExecutionId,
        input_name: impl Into<String>,
        output_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            output_name: output_name.into(),
            target,
            input_name: input_name.into(),
            output_id: Some(output_id.into()),
        }
    }

    /// Hop from `source` to a freshly generated placeholder that no component
    /// will ever receive. Every generated name is unique.
    pub fn dummy(source: ComponentExecutionId, prefix: &str) -> Self {
        Self {
            source,
            output_name: format!("{}{}", prefix, Uuid::new_v4()),
            target: ComponentExecutionId::new(format!("{}{}", prefix, Uuid::new_v4())),
            input_name: format!("{}{}", prefix, Uuid::new_v4()),
            output_id: None,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.output_id.is_none()
    }
}

/// Ordered sequence of hops describing one traversal through the graph.
///
/// Cloning copies the hop sequence, so a branch of a search can keep
/// appending without its siblings observing the new hops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowGraphPath {
    hops: VecDeque<WorkflowGraphHop>,
}

impl WorkflowGraphPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hop: WorkflowGraphHop) {
        self.hops.push_back(hop);
    }

    pub fn first(&self) -> Option<&WorkflowGraphHop> {
        self.hops.front()
    }

    pub fn last(&self) -> Option<&WorkflowGraphHop> {
        self.hops.back()
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, WorkflowGraphHop> {
        self.hops.iter()
    }

    /// Removes and returns the first hop; callers consume paths front to back
    pub fn pop_front(&mut self) -> Option<WorkflowGraphHop> {
        self.hops.pop_front()
    }
}

impl From<Vec<WorkflowGraphHop>> for WorkflowGraphPath {
    fn from(hops: Vec<WorkflowGraphHop>) -> Self {
        Self { hops: hops.into() }
    }
}

impl IntoIterator for WorkflowGraphPath {
    type Item = WorkflowGraphHop;
    type IntoIter = vec_deque::IntoIter<WorkflowGraphHop>;

    fn into_iter(self) -> Self::IntoIter {
        self.hops.into_iter()
    }
}

impl<'a> IntoIterator for &'a WorkflowGraphPath {
    type Item = &'a WorkflowGraphHop;
    type IntoIter = vec_deque::Iter<'a, WorkflowGraphHop>;

    fn into_iter(self) -> Self::IntoIter {
        self.hops.iter()
    }
}
