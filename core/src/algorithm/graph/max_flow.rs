//! Maximum flow by augmenting paths over the residual graph
//!
//! Two of the three flow strategies share this module: Ford-Fulkerson
//! explores the residual graph depth-first with a stack frontier, and
//! Edmonds-Karp breadth-first with a queue frontier, which always augments
//! along a shortest path and bounds the run by O(V·E²). Both alternate
//! between a search phase, one frontier expansion per step, and an
//! augmentation phase that pushes the path's bottleneck capacity and mirrors
//! it on the reverse edges. The third strategy lives in
//! [`crate::algorithm::graph::push_relabel`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::push_relabel::PushRelabel;
use crate::algorithm::traits::{
    AlgorithmComplexity, EngineError, FrontierKind, StepAlgorithm,
};
use crate::config::EngineConfig;
use crate::data_structures::graph::{Capacity, EdgeId, EdgeKind, Graph, VertexId};
use crate::execution::frame::{Frame, StepKind};

/// Maximum flow algorithm variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowStrategy {
    /// Ford-Fulkerson with DFS path finding
    #[serde(rename = "dfs", alias = "ford-fulkerson")]
    FordFulkerson,
    /// Edmonds-Karp with BFS shortest augmenting paths
    #[serde(rename = "bfs", alias = "edmonds-karp")]
    EdmondsKarp,
    /// Goldberg-Tarjan push-relabel with FIFO vertex selection
    #[serde(rename = "push-relabel")]
    PushRelabel,
}

impl FlowStrategy {
    pub const ALL: [FlowStrategy; 3] = [
        FlowStrategy::FordFulkerson,
        FlowStrategy::EdmondsKarp,
        FlowStrategy::PushRelabel,
    ];

    pub fn long_name(self) -> &'static str {
        match self {
            FlowStrategy::FordFulkerson => "Ford-Fulkerson",
            FlowStrategy::EdmondsKarp => "Edmonds-Karp",
            FlowStrategy::PushRelabel => "Push-Relabel",
        }
    }

    pub fn frontier(self) -> FrontierKind {
        match self {
            FlowStrategy::FordFulkerson => FrontierKind::Stack,
            FlowStrategy::EdmondsKarp => FrontierKind::Queue,
            FlowStrategy::PushRelabel => FrontierKind::None,
        }
    }

    /// Builds the engine for this strategy on `graph`
    pub fn engine(
        self,
        graph: &Graph,
        config: &EngineConfig,
    ) -> Result<Box<dyn StepAlgorithm>, EngineError> {
        Ok(match self {
            FlowStrategy::FordFulkerson | FlowStrategy::EdmondsKarp => {
                Box::new(AugmentingPathFlow::new(graph, self, config)?)
            }
            FlowStrategy::PushRelabel => Box::new(PushRelabel::new(graph, config)?),
        })
    }
}

impl fmt::Display for FlowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStrategy::FordFulkerson => "dfs",
            FlowStrategy::EdmondsKarp => "bfs",
            FlowStrategy::PushRelabel => "push-relabel",
        };
        f.pad(name)
    }
}

impl FromStr for FlowStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" | "ford-fulkerson" => Ok(FlowStrategy::FordFulkerson),
            "bfs" | "edmonds-karp" => Ok(FlowStrategy::EdmondsKarp),
            "push-relabel" | "preflow-push" => Ok(FlowStrategy::PushRelabel),
            other => Err(format!("unknown flow strategy: {other}")),
        }
    }
}

/// Checks that source and sink are set, present and distinct
pub fn terminals(graph: &Graph) -> Result<(VertexId, VertexId), EngineError> {
    let source = graph.source().ok_or(EngineError::MissingTerminal("source"))?;
    let sink = graph.sink().ok_or(EngineError::MissingTerminal("sink"))?;
    if source == sink {
        return Err(EngineError::SourceIsSink);
    }
    Ok((source, sink))
}

/// Search frontier: a stack for depth-first, a queue for breadth-first
#[derive(Debug, Clone)]
enum Frontier {
    Stack(Vec<VertexId>),
    Queue(VecDeque<VertexId>),
}

impl Frontier {
    fn for_strategy(strategy: FlowStrategy) -> Self {
        match strategy {
            FlowStrategy::FordFulkerson => Frontier::Stack(Vec::new()),
            _ => Frontier::Queue(VecDeque::new()),
        }
    }

    fn push(&mut self, vertex: VertexId) {
        match self {
            Frontier::Stack(stack) => stack.push(vertex),
            Frontier::Queue(queue) => queue.push_back(vertex),
        }
    }

    fn pop(&mut self) -> Option<VertexId> {
        match self {
            Frontier::Stack(stack) => stack.pop(),
            Frontier::Queue(queue) => queue.pop_front(),
        }
    }

    fn clear(&mut self) {
        match self {
            Frontier::Stack(stack) => stack.clear(),
            Frontier::Queue(queue) => queue.clear(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeginSearch,
    Expand,
    Augment,
    Finished,
}

/// Steppable Ford-Fulkerson / Edmonds-Karp engine
#[derive(Debug, Clone)]
pub struct AugmentingPathFlow {
    strategy: FlowStrategy,
    source: VertexId,
    sink: VertexId,
    epsilon: Capacity,
    frontier: Frontier,
    phase: Phase,
    augmented: Capacity,
    augmentations: usize,
}

impl AugmentingPathFlow {
    pub fn new(
        graph: &Graph,
        strategy: FlowStrategy,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let (source, sink) = terminals(graph)?;
        if strategy == FlowStrategy::PushRelabel {
            warn!("Push-relabel requested from the path engine, using breadth-first search");
        }

        Ok(Self {
            strategy,
            source,
            sink,
            epsilon: config.epsilon,
            frontier: Frontier::for_strategy(strategy),
            phase: Phase::BeginSearch,
            augmented: 0.0,
            augmentations: 0,
        })
    }

    /// Flow added by this run's augmentations
    pub fn augmented(&self) -> Capacity {
        self.augmented
    }

    pub fn augmentations(&self) -> usize {
        self.augmentations
    }

    fn begin_search(&mut self, graph: &mut Graph) -> Frame {
        graph.clear_search_state();
        graph.visit(self.source, None);
        self.frontier.clear();
        self.frontier.push(self.source);
        self.phase = Phase::Expand;
        Frame::new(0, StepKind::SearchStarted).with_vertices([self.source])
    }

    fn expand(&mut self, graph: &mut Graph) -> Frame {
        let Some(current) = self.frontier.pop() else {
            return self.finish(graph);
        };

        let mut frame = Frame::new(0, StepKind::FrontierExpanded).with_vertices([current]);
        let adjacency = graph
            .vertex(current)
            .map(|v| v.adjacency().to_vec())
            .unwrap_or_default();

        for edge_id in adjacency {
            let Some(edge) = graph.edge(edge_id) else { continue };
            if edge.residual_capacity() <= self.epsilon {
                continue;
            }
            let next = edge.target();
            if graph.vertex(next).map_or(true, |v| v.is_visited()) {
                continue;
            }

            graph.visit(next, Some(edge_id));
            self.frontier.push(next);
            frame.highlighted_vertices.push(next);
            frame.highlighted_edges.push(edge_id);

            if next == self.sink {
                self.phase = Phase::Augment;
                break;
            }
        }

        frame
    }

    /// Edges of the discovered path, listed from source to sink
    fn path_to_sink(&self, graph: &Graph) -> Vec<EdgeId> {
        let mut path = Vec::new();
        let mut vertex = self.sink;
        while vertex != self.source {
            let Some(edge_id) = graph.vertex(vertex).and_then(|v| v.predecessor()) else {
                warn!("Predecessor chain broken at {}", vertex);
                return Vec::new();
            };
            path.push(edge_id);
            vertex = match graph.edge(edge_id) {
                Some(edge) => edge.source(),
                None => return Vec::new(),
            };
            if path.len() > graph.vertex_count() {
                warn!("Predecessor chain contains a cycle");
                return Vec::new();
            }
        }
        path.reverse();
        path
    }

    fn augment(&mut self, graph: &mut Graph) -> Frame {
        let path = self.path_to_sink(graph);
        let bottleneck = path
            .iter()
            .filter_map(|&e| graph.edge(e).map(|edge| edge.residual_capacity()))
            .fold(Capacity::INFINITY, Capacity::min);

        let mut frame = Frame::new(0, StepKind::Augmented).with_vertices([self.source]);
        self.phase = Phase::BeginSearch;

        if path.is_empty() || !bottleneck.is_finite() || bottleneck <= self.epsilon {
            return frame;
        }

        for &edge_id in &path {
            for (edge, old, new) in graph.push_flow(edge_id, bottleneck) {
                frame.record_flow(edge, old, new);
            }
            frame.highlighted_edges.push(edge_id);
            if let Some(edge) = graph.edge(edge_id) {
                frame.highlighted_vertices.push(edge.target());
            }
        }

        self.augmented += bottleneck;
        self.augmentations += 1;
        debug_assert!(
            crate::validation::invariants::capacity_violations(graph, self.epsilon).is_empty()
        );
        debug!(
            "{}: augmented {} along {} edges (total {})",
            self.strategy.long_name(),
            bottleneck,
            path.len(),
            self.augmented
        );
        frame
    }

    fn finish(&mut self, graph: &mut Graph) -> Frame {
        self.phase = Phase::Finished;
        let total = graph.total_flow();
        debug!(
            "{}: no augmenting path left, flow {} after {} augmentations",
            self.strategy.long_name(),
            total,
            self.augmentations
        );

        // the vertices still marked visited form the source side of a minimum cut
        let reachable = graph
            .vertices()
            .filter(|(_, v)| v.is_visited())
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        Frame::completed(0, total).with_vertices(reachable)
    }
}

impl StepAlgorithm for AugmentingPathFlow {
    fn name(&self) -> &'static str {
        self.strategy.long_name()
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> &'static str {
        match self.strategy {
            FlowStrategy::FordFulkerson => {
                "Ford-Fulkerson maximum flow: augments along any residual source-sink path found by depth-first search."
            }
            _ => {
                "Edmonds-Karp maximum flow: augments along shortest residual source-sink paths found by breadth-first search."
            }
        }
    }

    fn complexity(&self) -> AlgorithmComplexity {
        match self.strategy {
            FlowStrategy::FordFulkerson => AlgorithmComplexity {
                time: "O(E·f)",
                space: "O(V + E)",
            },
            _ => AlgorithmComplexity {
                time: "O(V·E²)",
                space: "O(V + E)",
            },
        }
    }

    fn frontier(&self) -> FrontierKind {
        self.strategy.frontier()
    }

    fn step(&mut self, graph: &mut Graph) -> Frame {
        match self.phase {
            Phase::BeginSearch => self.begin_search(graph),
            Phase::Expand => self.expand(graph),
            Phase::Augment => self.augment(graph),
            Phase::Finished => Frame::completed(0, graph.total_flow()),
        }
    }
}

/// Source side and crossing edges of a minimum s-t cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinCut {
    pub source_side: Vec<VertexId>,
    pub cut_edges: Vec<EdgeId>,
    pub capacity: Capacity,
}

/// Minimum cut of a graph holding a maximum flow
///
/// The source side is every vertex reachable from the source through edges
/// with residual capacity above `epsilon`. Its crossing capacity equals the
/// flow value only once no augmenting path remains.
pub fn min_cut(graph: &Graph, epsilon: Capacity) -> Result<MinCut, EngineError> {
    let (source, _) = terminals(graph)?;

    let mut reachable = vec![false; graph.vertex_count()];
    let mut queue = VecDeque::from([source]);
    reachable[source.as_usize()] = true;

    while let Some(vertex) = queue.pop_front() {
        let Some(record) = graph.vertex(vertex) else { continue };
        for &edge_id in record.adjacency() {
            let Some(edge) = graph.edge(edge_id) else { continue };
            let next = edge.target().as_usize();
            if edge.residual_capacity() > epsilon && !reachable[next] {
                reachable[next] = true;
                queue.push_back(edge.target());
            }
        }
    }

    let cut_edges: Vec<EdgeId> = graph
        .edges()
        .filter(|(_, edge)| edge.kind() != EdgeKind::Residual)
        .filter(|(_, edge)| {
            reachable[edge.source().as_usize()] && !reachable[edge.target().as_usize()]
        })
        .map(|(id, _)| id)
        .collect();
    let capacity = cut_edges
        .iter()
        .filter_map(|&e| graph.edge(e))
        .map(|edge| edge.capacity())
        .sum();

    Ok(MinCut {
        source_side: graph.vertex_ids().filter(|v| reachable[v.as_usize()]).collect(),
        cut_edges,
        capacity,
    })
}
