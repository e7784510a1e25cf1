//! End-to-end runs through the JSON problem contract

use flowscope_core::io::{ConnectionDef, FlowEdgeDef, VertexDef};
use flowscope_core::validation::{check_flow, check_matching};
use flowscope_core::{
    min_cut, solve_flow, solve_matching, EngineConfig, FlowProblem, FlowStrategy, FrameHistory,
    MatchingProblem, StepEmitter, StepKind,
};

const EPSILON: f64 = 1e-9;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn connection(left: &str, right: &str) -> ConnectionDef {
    ConnectionDef {
        left_id: left.to_string(),
        right_id: right.to_string(),
    }
}

fn flow_problem(vertices: &[&str], edges: &[(&str, &str, f64)]) -> FlowProblem {
    FlowProblem {
        vertices: vertices.iter().map(|v| VertexDef::new(*v, *v)).collect(),
        edges: edges
            .iter()
            .enumerate()
            .map(|(i, (s, t, c))| FlowEdgeDef {
                id: format!("e{i}"),
                source_id: s.to_string(),
                target_id: t.to_string(),
                capacity: *c,
            })
            .collect(),
        source_id: vertices[0].to_string(),
        sink_id: vertices[vertices.len() - 1].to_string(),
    }
}

fn diamond() -> FlowProblem {
    flow_problem(
        &["s", "A", "B", "t"],
        &[("s", "A", 10.0), ("s", "B", 5.0), ("A", "t", 7.0), ("B", "t", 10.0)],
    )
}

/// Classic textbook network with maximum flow 23
fn textbook() -> FlowProblem {
    flow_problem(
        &["s", "v1", "v2", "v3", "v4", "t"],
        &[
            ("s", "v1", 16.0),
            ("s", "v2", 13.0),
            ("v1", "v3", 12.0),
            ("v2", "v1", 4.0),
            ("v2", "v4", 14.0),
            ("v3", "v2", 9.0),
            ("v3", "t", 20.0),
            ("v4", "v3", 7.0),
            ("v4", "t", 4.0),
        ],
    )
}

#[test]
fn test_scenario_a_reassignment() {
    init_logger();
    let problem = MatchingProblem {
        left_vertices: vec![VertexDef::new("T1", "Ada"), VertexDef::new("T2", "Grace")],
        right_vertices: vec![
            VertexDef::new("C1", "Math"),
            VertexDef::new("C2", "Physics"),
            VertexDef::new("C3", "Art"),
        ],
        edges: vec![
            connection("T1", "C1"),
            connection("T1", "C2"),
            connection("T2", "C1"),
        ],
    };

    let outcome = solve_matching(&problem).unwrap();
    assert_eq!(outcome.size, 2);
    assert_eq!(outcome.partner_of("T1"), Some("C2"));
    assert_eq!(outcome.partner_of("T2"), Some("C1"));
}

#[test]
fn test_scenario_b_no_edges() {
    let json = r#"{
        "leftVertices": [{"id": "L1"}, {"id": "L2"}, {"id": "L3"}],
        "rightVertices": [{"id": "R1"}, {"id": "R2"}, {"id": "R3"}],
        "edges": []
    }"#;
    let problem = MatchingProblem::from_json(json).unwrap();
    let mut graph = problem.build_graph().unwrap();

    let frames: Vec<_> = StepEmitter::matching(&mut graph).unwrap().collect();
    assert_eq!(
        frames.iter().filter(|f| f.kind == StepKind::SearchExhausted).count(),
        3
    );
    assert_eq!(frames.last().and_then(|f| f.result), Some(0.0));
    assert_eq!(graph.matching_size(), 0);
}

#[test]
fn test_scenario_c_chain_all_strategies() {
    let problem = flow_problem(
        &["source", "A", "sink"],
        &[("source", "A", 10.0), ("A", "sink", 4.0)],
    );
    for strategy in FlowStrategy::ALL {
        let config = EngineConfig::default().with_strategy(strategy);
        let outcome = solve_flow(&problem, &config).unwrap();
        assert_eq!(outcome.total_flow, 4.0, "{strategy}");
        assert_eq!(outcome.flow_on("e0"), Some(4.0), "{strategy}");
        assert_eq!(outcome.flow_on("e1"), Some(4.0), "{strategy}");
    }
}

#[test]
fn test_scenario_d_diamond_all_strategies() {
    for strategy in FlowStrategy::ALL {
        let config = EngineConfig::default().with_strategy(strategy);
        let outcome = solve_flow(&diamond(), &config).unwrap();
        assert_eq!(outcome.total_flow, 12.0, "{strategy}");
        assert_eq!(outcome.flow_on("e2"), Some(7.0), "{strategy}");
        assert_eq!(outcome.flow_on("e1"), Some(5.0), "{strategy}");
    }
}

#[test]
fn test_textbook_network_with_global_relabel() {
    init_logger();
    for frequency in [0, 1, 3] {
        let mut config = EngineConfig::default().with_strategy(FlowStrategy::PushRelabel);
        config.global_relabel_frequency = frequency;
        let outcome = solve_flow(&textbook(), &config).unwrap();
        assert_eq!(outcome.total_flow, 23.0, "frequency {frequency}");
    }
    for strategy in [FlowStrategy::FordFulkerson, FlowStrategy::EdmondsKarp] {
        let config = EngineConfig::default().with_strategy(strategy);
        assert_eq!(solve_flow(&textbook(), &config).unwrap().total_flow, 23.0);
    }
}

#[test]
fn test_min_cut_after_each_strategy() {
    init_logger();
    for strategy in FlowStrategy::ALL {
        let mut graph = textbook().build_graph().unwrap();
        let config = EngineConfig::default().with_strategy(strategy);
        let flow = StepEmitter::flow(&mut graph, &config).unwrap().run_to_completion();

        let cut = min_cut(&graph, EPSILON).unwrap();
        assert_eq!(cut.capacity, flow, "{strategy}");
        assert!(cut.source_side.contains(&graph.source().unwrap()));
        assert!(!cut.source_side.contains(&graph.sink().unwrap()));
        assert_eq!(check_flow(&graph, EPSILON), Ok(()), "{strategy}");
    }
}

#[test]
fn test_structure_unchanged_by_runs() {
    let mut graph = textbook().build_graph().unwrap();
    let before: Vec<_> = graph
        .edges()
        .map(|(id, e)| (id, e.source(), e.target(), e.capacity()))
        .collect();
    let vertex_count = graph.vertex_count();

    for strategy in FlowStrategy::ALL {
        graph.reset();
        let config = EngineConfig::default().with_strategy(strategy);
        StepEmitter::flow(&mut graph, &config).unwrap().run_to_completion();
    }

    let after: Vec<_> = graph
        .edges()
        .map(|(id, e)| (id, e.source(), e.target(), e.capacity()))
        .collect();
    assert_eq!(before, after);
    assert_eq!(graph.vertex_count(), vertex_count);
}

#[test]
fn test_matching_equals_unit_flow() {
    let lefts = ["a", "b", "c", "d"];
    let rights = ["w", "x", "y", "z"];
    let pairs = [("a", "w"), ("a", "x"), ("b", "w"), ("c", "w"), ("c", "y"), ("d", "y")];

    let matching = MatchingProblem {
        left_vertices: lefts.iter().map(|v| VertexDef::new(*v, "")).collect(),
        right_vertices: rights.iter().map(|v| VertexDef::new(*v, "")).collect(),
        edges: pairs.iter().map(|(l, r)| connection(l, r)).collect(),
    };
    let mut graph = matching.build_graph().unwrap();
    StepEmitter::matching(&mut graph).unwrap().run_to_completion();
    assert_eq!(check_matching(&graph), Ok(()));

    let mut vertices = vec!["src"];
    vertices.extend(lefts);
    vertices.extend(rights);
    vertices.push("snk");
    let mut edges: Vec<(&str, &str, f64)> = lefts.iter().map(|l| ("src", *l, 1.0)).collect();
    edges.extend(pairs.iter().map(|(l, r)| (*l, *r, 1.0)));
    edges.extend(rights.iter().map(|r| (*r, "snk", 1.0)));
    let flow = solve_flow(&flow_problem(&vertices, &edges), &EngineConfig::default()).unwrap();

    assert_eq!(graph.matching_size(), 3);
    assert_eq!(flow.total_flow, 3.0);
}

#[test]
fn test_history_of_matching_run() {
    let problem = MatchingProblem {
        left_vertices: vec![VertexDef::new("T1", ""), VertexDef::new("T2", "")],
        right_vertices: vec![VertexDef::new("C1", ""), VertexDef::new("C2", "")],
        edges: vec![connection("T1", "C1"), connection("T1", "C2"), connection("T2", "C1")],
    };
    let mut graph = problem.build_graph().unwrap();
    let mut emitter = StepEmitter::matching(&mut graph).unwrap();
    let history = FrameHistory::record_run(&mut emitter).unwrap();

    assert!(history.is_complete());
    assert_eq!(history.final_result(), Some(2.0));
    assert_eq!(history.count(StepKind::SearchStarted), 2);
    assert_eq!(history.count(StepKind::Augmented), 2);

    let views: Vec<_> = history.frames().iter().map(|f| f.view(&graph)).collect();
    let flips: usize = views.iter().map(|v| v.match_deltas.len()).sum();
    // T1-C1, then T2-C1 with T1 moving to C2
    assert_eq!(flips, 4);
}

#[test]
fn test_zero_capacity_edges_carry_nothing() {
    let problem = flow_problem(&["s", "a", "t"], &[("s", "a", 0.0), ("a", "t", 5.0)]);
    for strategy in FlowStrategy::ALL {
        let config = EngineConfig::default().with_strategy(strategy);
        assert_eq!(solve_flow(&problem, &config).unwrap().total_flow, 0.0);
    }
}
