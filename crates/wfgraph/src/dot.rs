use crate::WorkflowGraph;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use std::collections::HashMap;
use std::fmt;
use wfcore::EndpointCharacter;

const DRIVER_COLOR: &str = "#AA3939";
const OPPOSITE_CHARACTERS_COLOR: &str = "#D4AA6A";
const OUTER_LOOP_INPUT_COLOR: &str = "#55AA55";
const OUTER_LOOP_OUTPUT_COLOR: &str = "#4B698B";

const FONT_ATTRIBUTES: &str = "fontsize = 10 fontname = \"Consolas\"";

struct DotVertex {
    label: String,
    color: Option<&'static str>,
}

impl fmt::Display for DotVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

struct DotEdge {
    label: String,
    color: Option<&'static str>,
}

impl fmt::Display for DotEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

type DotGraph = DiGraph<DotVertex, DotEdge>;

fn vertex_attributes(_: &DotGraph, (_, vertex): (NodeIndex, &DotVertex)) -> String {
    let mut attributes = format!("shape = rectangle {}", FONT_ATTRIBUTES);
    if let Some(color) = vertex.color {
        attributes.push_str(&format!(" color = \"{}\"", color));
    }
    attributes.push(' ');
    attributes
}

fn edge_attributes(_: &DotGraph, edge: EdgeReference<'_, DotEdge>) -> String {
    let mut attributes = FONT_ATTRIBUTES.to_string();
    if let Some(color) = edge.weight().color {
        attributes.push_str(&format!(" color = \"{}\"", color));
    }
    attributes.push(' ');
    attributes
}

impl WorkflowGraph {
    /// Render the graph in Graphviz DOT format, e.g. for `dot -Tpng wf.dot -o wf.png`.
    ///
    /// Drivers are red, nodes with opposite output characters ochre. Edges
    /// entering an outer loop input are green, other edges leaving an outer
    /// loop output blue.
    pub fn to_dot(&self) -> String {
        let mut graph = DotGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for node in self.nodes() {
            let color = if node.is_driver() {
                Some(DRIVER_COLOR)
            } else if self.has_opposite_output_characters(node) {
                Some(OPPOSITE_CHARACTERS_COLOR)
            } else {
                None
            };
            let index = graph.add_node(DotVertex {
                label: node.name().to_string(),
                color,
            });
            indices.insert(node.execution_id().as_str(), index);
        }

        for node in self.nodes() {
            for output_id in node.output_ids() {
                for edge in self.edges().outgoing_edges(node.execution_id().as_str(), output_id) {
                    let (Some(&from), Some(&to)) = (
                        indices.get(edge.source.as_str()),
                        indices.get(edge.target.as_str()),
                    ) else {
                        continue;
                    };
                    let output_name = node.endpoint_name(&edge.output_id).unwrap_or(&edge.output_id);
                    let input_name = self
                        .node(edge.target.as_str())
                        .ok()
                        .and_then(|target| target.endpoint_name(&edge.input_id))
                        .unwrap_or(&edge.input_id);

                    let color = if edge.input_character == EndpointCharacter::OuterLoop {
                        Some(OUTER_LOOP_INPUT_COLOR)
                    } else if edge.output_character == EndpointCharacter::OuterLoop {
                        Some(OUTER_LOOP_OUTPUT_COLOR)
                    } else {
                        None
                    };
                    graph.add_edge(
                        from,
                        to,
                        DotEdge {
                            label: format!("{} > {}", output_name, input_name),
                            color,
                        },
                    );
                }
            }
        }

        format!(
            "{}",
            Dot::with_attr_getters(&graph, &[], &edge_attributes, &vertex_attributes)
        )
    }
}
