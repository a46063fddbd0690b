mod common;

use common::{edge, init_tracing, node};
use wfcore::EndpointCharacter::{OuterLoop, SameLoop};
use wfcore::{FailureEdgePolicy, GraphConfig, GraphError, WorkflowGraphPath};
use wfgraph::WorkflowGraph;

/// Asserts hops as (source, output name, target, input name)
fn assert_hops(path: &WorkflowGraphPath, expected: &[(&str, &str, &str, &str)]) {
    let actual: Vec<(&str, &str, &str, &str)> = path
        .iter()
        .map(|hop| {
            (
                hop.source.as_str(),
                hop.output_name.as_str(),
                hop.target.as_str(),
                hop.input_name.as_str(),
            )
        })
        .collect();
    assert_eq!(actual, expected);
}

fn driver_id(graph: &WorkflowGraph, id: &str) -> Option<String> {
    graph
        .loop_driver(id)
        .unwrap()
        .map(|driver| driver.execution_id().to_string())
}

/// sink0 -> node0 -> node1 -> node2 -> sink0
fn circle() -> WorkflowGraph {
    let nodes = vec![
        node("sink0", 1, 1, true),
        node("node0", 1, 1, false),
        node("node1", 1, 1, false),
        node("node2", 1, 1, false),
    ];
    let edges = vec![
        edge("sink0", 0, SameLoop, "node0", 0, SameLoop),
        edge("node0", 0, SameLoop, "node1", 0, SameLoop),
        edge("node1", 0, SameLoop, "node2", 0, SameLoop),
        edge("node2", 0, SameLoop, "sink0", 0, SameLoop),
    ];
    WorkflowGraph::new(nodes, edges).unwrap()
}

/// Like [`circle`], but node2 also feeds back into node0
fn circle_with_inner_loop_back() -> WorkflowGraph {
    let nodes = vec![
        node("sink0", 1, 1, true),
        node("node0", 2, 1, false),
        node("node1", 1, 1, false),
        node("node2", 1, 2, false),
    ];
    let edges = vec![
        edge("sink0", 0, SameLoop, "node0", 0, SameLoop),
        edge("node0", 0, SameLoop, "node1", 0, SameLoop),
        edge("node1", 0, SameLoop, "node2", 0, SameLoop),
        edge("node2", 0, SameLoop, "sink0", 0, SameLoop),
        edge("node2", 0, SameLoop, "node0", 1, SameLoop),
    ];
    WorkflowGraph::new(nodes, edges).unwrap()
}

/// Two drivers in a row without a nested loop
fn two_sinks() -> WorkflowGraph {
    let nodes = vec![
        node("outer", 1, 1, true),
        node("sink0", 1, 1, true),
        node("sink1", 1, 1, true),
        node("node0", 1, 1, false),
    ];
    let edges = vec![
        edge("outer", 0, SameLoop, "sink0", 0, SameLoop),
        edge("sink0", 0, OuterLoop, "sink1", 0, OuterLoop),
        edge("sink1", 0, OuterLoop, "node0", 0, SameLoop),
        edge("node0", 0, SameLoop, "outer", 0, SameLoop),
    ];
    WorkflowGraph::new(nodes, edges).unwrap()
}

/// Two nested drivers in a row, each with its own inner loop
fn two_sinks_with_inner_loops() -> WorkflowGraph {
    let nodes = vec![
        node("outer", 1, 2, true),
        node("sink0", 3, 2, true),
        node("sink1", 3, 2, true),
        node("node0", 1, 1, false),
        node("node1", 1, 1, false),
        node("node2", 1, 1, false),
        node("node3", 1, 1, false),
    ];
    let edges = vec![
        edge("outer", 0, SameLoop, "node0", 0, SameLoop),
        edge("node0", 0, SameLoop, "sink0", 0, OuterLoop),
        edge("sink0", 0, SameLoop, "node1", 0, SameLoop),
        edge("node1", 0, SameLoop, "sink0", 1, SameLoop),
        edge("sink0", 1, OuterLoop, "sink1", 0, OuterLoop),
        edge("sink1", 0, SameLoop, "node2", 0, SameLoop),
        edge("node2", 0, SameLoop, "sink1", 1, SameLoop),
        edge("sink1", 1, OuterLoop, "node3", 0, SameLoop),
        edge("node3", 0, SameLoop, "outer", 0, SameLoop),
    ];
    WorkflowGraph::new(nodes, edges).unwrap()
}

/// Both outputs of node0 reach the same driver input via node1
fn reduced_inputs() -> WorkflowGraph {
    let nodes = vec![
        node("outer", 1, 1, true),
        node("node0", 1, 2, false),
        node("node1", 2, 1, false),
    ];
    let edges = vec![
        edge("outer", 0, SameLoop, "node0", 0, SameLoop),
        edge("node0", 0, OuterLoop, "node1", 0, OuterLoop),
        edge("node0", 1, OuterLoop, "node1", 1, SameLoop),
        edge("node1", 0, SameLoop, "outer", 0, SameLoop),
    ];
    WorkflowGraph::new(nodes, edges).unwrap()
}

/// A nested loop containing a sub-loop formed by a component with outer and
/// same loop outputs that does not drive the loop itself
fn nested_loop_with_sub_loop() -> WorkflowGraph {
    let nodes = vec![
        node("outer", 1, 1, true),
        node("nested", 2, 2, true),
        node("memory", 2, 2, false),
        node("node", 1, 1, false),
    ];
    let edges = vec![
        edge("outer", 0, SameLoop, "nested", 0, OuterLoop),
        edge("nested", 0, SameLoop, "memory", 0, OuterLoop),
        edge("memory", 1, SameLoop, "node", 0, SameLoop),
        edge("node", 0, SameLoop, "memory", 1, SameLoop),
        edge("memory", 0, OuterLoop, "nested", 1, SameLoop),
        edge("nested", 1, OuterLoop, "outer", 0, SameLoop),
    ];
    WorkflowGraph::new(nodes, edges).unwrap()
}

/// start -> a -> b -> c, no drivers
fn linear_chain() -> WorkflowGraph {
    let nodes = vec![
        node("start", 0, 1, false),
        node("a", 1, 1, false),
        node("b", 1, 1, false),
        node("c", 1, 0, false),
    ];
    let edges = vec![
        edge("start", 0, SameLoop, "a", 0, SameLoop),
        edge("a", 0, SameLoop, "b", 0, SameLoop),
        edge("b", 0, SameLoop, "c", 0, SameLoop),
    ];
    WorkflowGraph::new(nodes, edges).unwrap()
}

#[test]
fn test_loop_driver_in_circle() {
    init_tracing();
    let graph = circle();

    for id in ["node0", "node1", "node2"] {
        assert_eq!(driver_id(&graph, id).as_deref(), Some("sink0"));
    }
}

#[test]
fn test_loop_driver_in_circle_with_inner_loop_back() {
    let graph = circle_with_inner_loop_back();

    for id in ["node0", "node1", "node2"] {
        assert_eq!(driver_id(&graph, id).as_deref(), Some("sink0"));
    }
}

#[test]
fn test_loop_driver_behind_two_sinks() {
    let graph = two_sinks();
    assert_eq!(driver_id(&graph, "node0").as_deref(), Some("outer"));
}

#[test]
fn test_loop_driver_with_nested_loops() {
    let graph = two_sinks_with_inner_loops();

    assert_eq!(driver_id(&graph, "node3").as_deref(), Some("outer"));
    assert_eq!(driver_id(&graph, "node0").as_deref(), Some("outer"));
    assert_eq!(driver_id(&graph, "node1").as_deref(), Some("sink0"));
    assert_eq!(driver_id(&graph, "node2").as_deref(), Some("sink1"));
}

#[test]
fn test_nested_driver_reports_to_outer_driver() {
    let graph = two_sinks_with_inner_loops();

    assert_eq!(driver_id(&graph, "sink0").as_deref(), Some("outer"));
    assert_eq!(driver_id(&graph, "outer"), None);
}

#[test]
fn test_failure_paths_keep_one_path_per_driver_input() {
    let graph = reduced_inputs();
    assert_eq!(driver_id(&graph, "node0").as_deref(), Some("outer"));

    let paths = graph.hops_to_traverse_on_failure("node0").unwrap();
    assert_eq!(paths.len(), 1);

    let (output, paths) = paths.iter().next().unwrap();
    assert_eq!(output, "out_0");
    assert_eq!(paths.len(), 1);
    assert_hops(
        &paths[0],
        &[
            ("node0", "out_0", "node1", "inp_0"),
            ("node1", "out_0", "outer", "inp_0"),
        ],
    );
}

#[test]
fn test_failure_paths_through_nested_driver() {
    let graph = two_sinks_with_inner_loops();

    let paths = graph.hops_to_traverse_on_failure("node0").unwrap();
    assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["out_0"]);
    assert_hops(
        &paths["out_0"][0],
        &[
            ("node0", "out_0", "sink0", "inp_0"),
            ("sink0", "out_1", "sink1", "inp_0"),
            ("sink1", "out_1", "node3", "inp_0"),
            ("node3", "out_0", "outer", "inp_0"),
        ],
    );
}

#[test]
fn test_failure_paths_through_sub_loop() {
    let graph = nested_loop_with_sub_loop();

    let paths = graph.hops_to_traverse_on_failure("node").unwrap();
    assert_hops(
        &paths["out_0"][0],
        &[
            ("node", "out_0", "memory", "inp_1"),
            ("memory", "out_0", "nested", "inp_1"),
        ],
    );
    assert_eq!(driver_id(&graph, "node").as_deref(), Some("nested"));
}

#[test]
fn test_failure_search_does_not_return_to_start() {
    let graph = nested_loop_with_sub_loop();

    // out_1 of memory only leads back to memory itself
    let paths = graph.hops_to_traverse_on_failure("memory").unwrap();
    assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["out_0"]);
    assert_hops(
        &paths["out_0"][0],
        &[("memory", "out_0", "nested", "inp_1")],
    );
}

#[test]
fn test_plain_self_loop_terminates_without_paths() {
    let nodes = vec![node("solo", 1, 1, false)];
    let edges = vec![edge("solo", 0, SameLoop, "solo", 0, SameLoop)];
    let graph = WorkflowGraph::new(nodes, edges).unwrap();

    assert!(graph.hops_to_traverse_on_failure("solo").unwrap().is_empty());
    assert!(graph.loop_driver("solo").unwrap().is_none());
}

#[test]
fn test_failure_results_are_deterministic() {
    let graph = two_sinks_with_inner_loops();

    let first = graph.hops_to_traverse_on_failure("node0").unwrap();
    let second = graph.hops_to_traverse_on_failure("node0").unwrap();
    assert_eq!(first, second);

    let fresh = two_sinks_with_inner_loops();
    assert_eq!(first, fresh.hops_to_traverse_on_failure("node0").unwrap());
}

#[test]
fn test_consuming_failure_paths_leaves_cache_intact() {
    let graph = reduced_inputs();

    let mut paths = graph.hops_to_traverse_on_failure("node0").unwrap();
    for path in paths.values_mut().flatten() {
        while path.pop_front().is_some() {}
    }

    let again = graph.hops_to_traverse_on_failure("node0").unwrap();
    assert_eq!(again["out_0"][0].len(), 2);
}

#[test]
fn test_loop_driver_returns_same_node() {
    let graph = circle();

    let first = graph.loop_driver("node1").unwrap().unwrap();
    let second = graph.loop_driver("node1").unwrap().unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.execution_id().as_str(), "sink0");
}

#[test]
fn test_conflicting_drivers_are_fatal() {
    init_tracing();
    let nodes = vec![
        node("failed", 1, 2, false),
        node("driver1", 1, 1, true),
        node("driver2", 1, 1, true),
    ];
    let edges = vec![
        edge("failed", 0, SameLoop, "driver1", 0, SameLoop),
        edge("failed", 1, SameLoop, "driver2", 0, SameLoop),
        edge("driver1", 0, SameLoop, "failed", 0, SameLoop),
    ];
    let graph = WorkflowGraph::new(nodes, edges).unwrap();

    let err = graph.hops_to_traverse_on_failure("failed").unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        &err,
        GraphError::ConflictingLoopDriver { start, first, second }
            if start.as_str() == "failed" && first.as_str() == "driver1" && second.as_str() == "driver2"
    ));

    // nothing was memoized, so every query fails the same way
    assert_eq!(graph.loop_driver("failed").unwrap_err(), err);
    assert_eq!(graph.hops_to_traverse_on_failure("failed").unwrap_err(), err);

    // other nodes are unaffected
    assert_eq!(driver_id(&graph, "driver1"), None);
}

#[test]
fn test_failure_edge_policy_for_fan_out() {
    // out_0 of `failed` is connected twice; each branch reaches another driver input
    let nodes = vec![
        node("driver", 2, 1, true),
        node("failed", 1, 1, false),
        node("x", 1, 1, false),
        node("y", 1, 1, false),
    ];
    let edges = vec![
        edge("driver", 0, SameLoop, "failed", 0, SameLoop),
        edge("failed", 0, SameLoop, "x", 0, SameLoop),
        edge("failed", 0, SameLoop, "y", 0, SameLoop),
        edge("x", 0, SameLoop, "driver", 0, SameLoop),
        edge("y", 0, SameLoop, "driver", 1, SameLoop),
    ];

    let union = WorkflowGraph::new(nodes.clone(), edges.clone()).unwrap();
    let paths = union.hops_to_traverse_on_failure("failed").unwrap();
    assert_eq!(paths["out_0"].len(), 2);

    let config = GraphConfig {
        failure_edge_policy: FailureEdgePolicy::LastEdgeWins,
        ..GraphConfig::default()
    };
    let last_edge_wins = WorkflowGraph::with_config(nodes, edges, config).unwrap();
    let paths = last_edge_wins.hops_to_traverse_on_failure("failed").unwrap();
    assert_eq!(paths["out_0"].len(), 1);
    assert_hops(
        &paths["out_0"][0],
        &[
            ("failed", "out_0", "y", "inp_0"),
            ("y", "out_0", "driver", "inp_1"),
        ],
    );
}

#[test]
fn test_reset_circle() {
    let graph = circle();

    let paths = graph.hops_to_traverse_when_resetting("sink0").unwrap();
    assert_eq!(paths.len(), 1);
    assert_hops(
        &paths[0],
        &[
            ("sink0", "out_0", "node0", "inp_0"),
            ("node0", "out_0", "node1", "inp_0"),
            ("node1", "out_0", "node2", "inp_0"),
            ("node2", "out_0", "sink0", "inp_0"),
        ],
    );
}

#[test]
fn test_reset_circle_with_inner_loop_back() {
    let graph = circle_with_inner_loop_back();

    let paths = graph.hops_to_traverse_when_resetting("sink0").unwrap();
    assert_eq!(paths.len(), 1);
    assert_hops(
        &paths[0],
        &[
            ("sink0", "out_0", "node0", "inp_0"),
            ("node0", "out_0", "node1", "inp_0"),
            ("node1", "out_0", "node2", "inp_0"),
            ("node2", "out_0", "sink0", "inp_0"),
        ],
    );
}

#[test]
fn test_reset_without_nested_loop_is_empty() {
    let graph = two_sinks();
    assert!(graph.hops_to_traverse_when_resetting("sink0").unwrap().is_empty());
}

#[test]
fn test_reset_stays_in_inner_loop() {
    let graph = two_sinks_with_inner_loops();

    let paths = graph.hops_to_traverse_when_resetting("sink0").unwrap();
    assert_eq!(paths.len(), 1);
    assert_hops(
        &paths[0],
        &[
            ("sink0", "out_0", "node1", "inp_0"),
            ("node1", "out_0", "sink0", "inp_1"),
        ],
    );
}

#[test]
fn test_reset_in_loop_with_sub_loop() {
    let graph = nested_loop_with_sub_loop();

    let paths = graph.hops_to_traverse_when_resetting("nested").unwrap();
    assert_eq!(paths.len(), 2);

    let closed = paths.iter().find(|p| p.len() == 2).unwrap();
    assert_hops(
        closed,
        &[
            ("nested", "out_0", "memory", "inp_0"),
            ("memory", "out_0", "nested", "inp_1"),
        ],
    );

    let open = paths.iter().find(|p| p.len() == 3).unwrap();
    let hops: Vec<_> = open.iter().collect();
    assert_eq!(hops[0].target.as_str(), "memory");
    assert_eq!(hops[1].output_name, "out_1");
    assert_eq!(hops[1].target.as_str(), "node");
    assert!(hops[2].is_dummy());
    assert_eq!(hops[2].source.as_str(), "node");
    assert!(hops[2].output_name.starts_with("dummy-"));
    assert!(hops[2].input_name.starts_with("dummy-"));
    assert!(hops[2].target.as_str().starts_with("dummy-"));
}

#[test]
fn test_reset_linear_chain() {
    let graph = linear_chain();

    let paths = graph.hops_to_traverse_when_resetting("start").unwrap();
    assert_eq!(paths.len(), 1);

    let traversed: Vec<_> = paths[0].iter().filter(|hop| !hop.is_dummy()).collect();
    assert_eq!(traversed.len(), 3);
    let pairs: Vec<_> = traversed
        .iter()
        .map(|hop| (hop.source.as_str(), hop.target.as_str()))
        .collect();
    assert_eq!(pairs, vec![("start", "a"), ("a", "b"), ("b", "c")]);
}

#[test]
fn test_reset_dummy_targets_are_fresh() {
    let graph = linear_chain();

    let first = graph.hops_to_traverse_when_resetting("start").unwrap();
    let second = graph.hops_to_traverse_when_resetting("start").unwrap();

    let first_dummy = first[0].last().unwrap();
    let second_dummy = second[0].last().unwrap();
    assert!(first_dummy.is_dummy());
    assert_eq!(first_dummy.source.as_str(), "c");
    assert!(!graph.contains_node(first_dummy.target.as_str()));
    assert!(!graph.contains_node(second_dummy.target.as_str()));
    assert_ne!(first_dummy.target, second_dummy.target);
}

#[test]
fn test_reset_single_hop_chain() {
    let nodes = vec![node("driver", 0, 1, true), node("sink", 1, 0, false)];
    let edges = vec![edge("driver", 0, SameLoop, "sink", 0, SameLoop)];
    let graph = WorkflowGraph::new(nodes, edges).unwrap();

    let paths = graph.hops_to_traverse_when_resetting("driver").unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].iter().filter(|hop| !hop.is_dummy()).count(), 1);
}

#[test]
fn test_reset_driver_follows_same_loop_edges_only() {
    let nodes = vec![
        node("driver", 0, 2, true),
        node("inner", 1, 0, false),
        node("outside", 1, 0, false),
    ];
    let edges = vec![
        edge("driver", 0, SameLoop, "inner", 0, SameLoop),
        edge("driver", 1, OuterLoop, "outside", 0, SameLoop),
    ];
    let graph = WorkflowGraph::new(nodes, edges).unwrap();

    let paths = graph.hops_to_traverse_when_resetting("driver").unwrap();
    assert_eq!(paths.len(), 1);

    let first = paths[0].first().unwrap();
    assert_eq!(first.target.as_str(), "inner");
    assert!(paths[0].iter().all(|hop| hop.target.as_str() != "outside"));
}

#[test]
fn test_node_without_edges() {
    let graph = WorkflowGraph::new(vec![node("lonely", 1, 1, false)], vec![]).unwrap();

    assert!(graph.hops_to_traverse_when_resetting("lonely").unwrap().is_empty());
    assert!(graph.hops_to_traverse_on_failure("lonely").unwrap().is_empty());
    assert!(graph.loop_driver("lonely").unwrap().is_none());
}

#[test]
fn test_unknown_node_is_reported() {
    let graph = circle();
    let expected = GraphError::NodeNotFound("ghost".into());

    assert_eq!(graph.hops_to_traverse_when_resetting("ghost").unwrap_err(), expected);
    assert_eq!(graph.hops_to_traverse_on_failure("ghost").unwrap_err(), expected);
    assert_eq!(graph.loop_driver("ghost").unwrap_err(), expected);
}

/// d -> f -> m; m leaves the loop via x and comes back through an outer loop
/// input before returning to d. With `detour`, m also feeds y, which leads
/// back into m through the same outer loop input.
fn border_node_reentered(detour: bool) -> WorkflowGraph {
    let mut nodes = vec![
        node("d", 1, 1, true),
        node("f", 1, 1, false),
        node("m", 2, 2, false),
        node("x", 1, 1, false),
    ];
    let mut edges = vec![
        edge("d", 0, SameLoop, "f", 0, SameLoop),
        edge("f", 0, SameLoop, "m", 0, SameLoop),
        edge("m", 0, OuterLoop, "x", 0, OuterLoop),
        edge("x", 0, SameLoop, "m", 1, OuterLoop),
        edge("m", 1, SameLoop, "d", 0, SameLoop),
    ];
    if detour {
        nodes.push(node("y", 1, 1, false));
        edges.push(edge("m", 1, SameLoop, "y", 0, SameLoop));
        edges.push(edge("y", 0, SameLoop, "m", 1, OuterLoop));
    }
    WorkflowGraph::new(nodes, edges).unwrap()
}

#[test]
fn test_failure_search_reenters_node_through_other_character() {
    let graph = border_node_reentered(false);

    let paths = graph.hops_to_traverse_on_failure("f").unwrap();
    assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["out_0"]);
    assert_eq!(paths["out_0"].len(), 1);
    assert_hops(
        &paths["out_0"][0],
        &[
            ("f", "out_0", "m", "inp_0"),
            ("m", "out_0", "x", "inp_0"),
            ("x", "out_0", "m", "inp_1"),
            ("m", "out_1", "d", "inp_0"),
        ],
    );
    assert_eq!(driver_id(&graph, "f").as_deref(), Some("d"));
}

#[test]
fn test_failure_search_blocks_third_entry() {
    let graph = border_node_reentered(true);

    // y -> m would enter m a third time, again through its outer loop input
    let paths = graph.hops_to_traverse_on_failure("f").unwrap();
    assert_eq!(paths["out_0"].len(), 1);
    assert_hops(
        &paths["out_0"][0],
        &[
            ("f", "out_0", "m", "inp_0"),
            ("m", "out_0", "x", "inp_0"),
            ("x", "out_0", "m", "inp_1"),
            ("m", "out_1", "d", "inp_0"),
        ],
    );
    assert!(paths["out_0"][0]
        .iter()
        .all(|hop| hop.source.as_str() != "y"));
    assert_eq!(driver_id(&graph, "f").as_deref(), Some("d"));
}
