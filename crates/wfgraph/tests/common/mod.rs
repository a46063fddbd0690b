#![allow(dead_code)]

use wfcore::{EndpointCharacter, WorkflowGraphEdge, WorkflowGraphNode};

/// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn input_id(node: &str, number: usize) -> String {
    format!("{}:in{}", node, number)
}

pub fn output_id(node: &str, number: usize) -> String {
    format!("{}:out{}", node, number)
}

/// Node whose endpoints are named `inp_<n>` and `out_<n>`
pub fn node(id: &str, inputs: usize, outputs: usize, is_driver: bool) -> WorkflowGraphNode {
    let mut builder = WorkflowGraphNode::builder(id, id).driver(is_driver);
    for i in 0..inputs {
        builder = builder.input(input_id(id, i), format!("inp_{}", i));
    }
    for i in 0..outputs {
        builder = builder.output(output_id(id, i), format!("out_{}", i));
    }
    builder.build()
}

pub fn edge(
    source: &str,
    output: usize,
    output_character: EndpointCharacter,
    target: &str,
    input: usize,
    input_character: EndpointCharacter,
) -> WorkflowGraphEdge {
    WorkflowGraphEdge::new(
        source,
        output_id(source, output),
        output_character,
        target,
        input_id(target, input),
        input_character,
    )
}
