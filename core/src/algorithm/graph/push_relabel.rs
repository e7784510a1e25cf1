//! Goldberg-Tarjan push-relabel maximum flow
//!
//! Instead of searching for whole paths, the algorithm keeps a height label
//! and an excess value per vertex. The source edges are saturated up front
//! (the preflow); afterwards each step either pushes excess across one
//! admissible residual edge (`height(u) == height(v) + 1`) or, when none
//! exists, relabels the vertex to one above its lowest residual neighbour.
//! Active vertices are processed in FIFO order. The run ends once no vertex
//! other than source and sink carries positive excess, at which point the
//! preflow is a maximum flow.
//!
//! # Algorithmic Complexity
//! - **Time Complexity**: O(V³) with FIFO selection
//! - **Space Complexity**: O(V) for heights, excess and the active queue
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::algorithm::graph::max_flow::terminals;
use crate::algorithm::traits::{AlgorithmComplexity, EngineError, FrontierKind, StepAlgorithm};
use crate::config::EngineConfig;
use crate::data_structures::graph::{Capacity, EdgeId, Graph, VertexId};
use crate::execution::frame::{Frame, StepKind};

/// Distance label type for push-relabel algorithm
pub type DistanceLabel = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initialize,
    Discharge,
    GlobalRelabel,
    Finished,
}

/// Steppable FIFO push-relabel engine
#[derive(Debug, Clone)]
pub struct PushRelabel {
    source: VertexId,
    sink: VertexId,
    epsilon: Capacity,
    heights: Vec<DistanceLabel>,
    excess: Vec<Capacity>,
    active: VecDeque<VertexId>,
    queued: Vec<bool>,
    phase: Phase,
    global_relabel_frequency: usize,
    push_count: usize,
    relabel_count: usize,
}

impl PushRelabel {
    pub fn new(graph: &Graph, config: &EngineConfig) -> Result<Self, EngineError> {
        let (source, sink) = terminals(graph)?;
        let n = graph.vertex_count();

        Ok(Self {
            source,
            sink,
            epsilon: config.epsilon,
            heights: vec![0; n],
            excess: vec![0.0; n],
            active: VecDeque::new(),
            queued: vec![false; n],
            phase: Phase::Initialize,
            global_relabel_frequency: config.global_relabel_frequency,
            push_count: 0,
            relabel_count: 0,
        })
    }

    pub fn height(&self, vertex: VertexId) -> Option<DistanceLabel> {
        self.heights.get(vertex.as_usize()).copied()
    }

    pub fn excess(&self, vertex: VertexId) -> Option<Capacity> {
        self.excess.get(vertex.as_usize()).copied()
    }

    pub fn push_count(&self) -> usize {
        self.push_count
    }

    pub fn relabel_count(&self) -> usize {
        self.relabel_count
    }

    fn activate(&mut self, vertex: VertexId) {
        let i = vertex.as_usize();
        if vertex != self.source
            && vertex != self.sink
            && !self.queued[i]
            && self.excess[i] > self.epsilon
        {
            self.queued[i] = true;
            self.active.push_back(vertex);
        }
    }

    /// Moves `amount` across `edge` and books it as excess
    fn transfer(
        &mut self,
        graph: &mut Graph,
        edge_id: EdgeId,
        amount: Capacity,
        frame: &mut Frame,
    ) {
        let Some(edge) = graph.edge(edge_id) else { return };
        let (from, to) = (edge.source(), edge.target());

        for (edge, old, new) in graph.push_flow(edge_id, amount) {
            frame.record_flow(edge, old, new);
        }
        self.excess[from.as_usize()] -= amount;
        self.excess[to.as_usize()] += amount;
    }

    /// Saturates every residual edge leaving the source
    fn initialize(&mut self, graph: &mut Graph) -> Frame {
        let n = graph.vertex_count();
        self.heights.iter_mut().for_each(|h| *h = 0);
        self.heights[self.source.as_usize()] = n;

        // flow already present (no reset between runs) shows up as excess
        for vertex in graph.vertex_ids() {
            self.excess[vertex.as_usize()] = -graph.net_outflow(vertex);
        }

        let mut frame = Frame::new(0, StepKind::PreflowInitialized).with_vertices([self.source]);
        let adjacency = graph
            .vertex(self.source)
            .map(|v| v.adjacency().to_vec())
            .unwrap_or_default();

        for edge_id in adjacency {
            let Some(edge) = graph.edge(edge_id) else { continue };
            let residual = edge.residual_capacity();
            if residual <= self.epsilon {
                continue;
            }
            let target = edge.target();
            self.transfer(graph, edge_id, residual, &mut frame);
            frame.highlighted_edges.push(edge_id);
            frame.highlighted_vertices.push(target);
        }

        for vertex in graph.vertex_ids() {
            self.activate(vertex);
        }

        debug!(
            "Preflow initialized: {} active vertices, source height {}",
            self.active.len(),
            n
        );
        self.phase = Phase::Discharge;
        frame
    }

    fn discharge(&mut self, graph: &mut Graph) -> Frame {
        let vertex = loop {
            let Some(candidate) = self.active.pop_front() else {
                return self.finish(graph);
            };
            self.queued[candidate.as_usize()] = false;
            if self.excess[candidate.as_usize()] > self.epsilon {
                break candidate;
            }
        };

        let u = vertex.as_usize();
        let adjacency = graph
            .vertex(vertex)
            .map(|v| v.adjacency().to_vec())
            .unwrap_or_default();

        let admissible = adjacency.iter().copied().find(|&e| {
            graph.edge(e).is_some_and(|edge| {
                edge.residual_capacity() > self.epsilon
                    && self.heights[u] == self.heights[edge.target().as_usize()] + 1
            })
        });

        match admissible {
            Some(edge_id) => self.push(graph, vertex, edge_id),
            None => self.relabel(graph, vertex, &adjacency),
        }
    }

    fn push(&mut self, graph: &mut Graph, vertex: VertexId, edge_id: EdgeId) -> Frame {
        let u = vertex.as_usize();
        let Some(edge) = graph.edge(edge_id) else {
            return Frame::new(0, StepKind::Pushed);
        };
        let target = edge.target();
        let amount = self.excess[u].min(edge.residual_capacity());

        let mut frame = Frame::new(0, StepKind::Pushed)
            .with_vertices([vertex, target])
            .with_edges([edge_id]);
        self.transfer(graph, edge_id, amount, &mut frame);
        self.push_count += 1;
        trace!("Pushed {} from {} to {}", amount, vertex, target);

        // keep discharging the same vertex until it is empty or needs a relabel
        if self.excess[u] > self.epsilon {
            self.queued[u] = true;
            self.active.push_front(vertex);
        }
        self.activate(target);

        debug_assert!(
            crate::validation::invariants::capacity_violations(graph, self.epsilon).is_empty()
        );
        frame
    }

    fn relabel(&mut self, graph: &Graph, vertex: VertexId, adjacency: &[EdgeId]) -> Frame {
        let u = vertex.as_usize();
        let lowest = adjacency
            .iter()
            .filter_map(|&e| graph.edge(e))
            .filter(|edge| edge.target() != vertex && edge.residual_capacity() > self.epsilon)
            .map(|edge| self.heights[edge.target().as_usize()])
            .min();

        let Some(lowest) = lowest else {
            // unreachable while the preflow is valid: incoming flow leaves a residual way back
            warn!(
                "Vertex {} holds excess {} but has no residual edge",
                vertex, self.excess[u]
            );
            return Frame::new(0, StepKind::Relabeled).with_vertices([vertex]);
        };

        let old = self.heights[u];
        self.heights[u] = lowest + 1;
        self.relabel_count += 1;
        trace!("Relabeled {} from {} to {}", vertex, old, self.heights[u]);

        self.queued[u] = true;
        self.active.push_front(vertex);

        if self.global_relabel_frequency > 0
            && self.relabel_count % self.global_relabel_frequency == 0
        {
            self.phase = Phase::GlobalRelabel;
        }

        Frame::new(0, StepKind::Relabeled).with_vertices([vertex])
    }

    /// Recomputes heights as residual distances to the sink
    ///
    /// Vertices that can no longer reach the sink are lifted to at least the
    /// vertex count, so labels never decrease.
    fn global_relabel(&mut self, graph: &Graph) -> Frame {
        let n = graph.vertex_count();
        let mut distance: Vec<Option<DistanceLabel>> = vec![None; n];
        distance[self.sink.as_usize()] = Some(0);
        let mut queue = VecDeque::from([self.sink]);

        while let Some(vertex) = queue.pop_front() {
            let current = distance[vertex.as_usize()].unwrap_or_default();
            let Some(record) = graph.vertex(vertex) else { continue };
            for &edge_id in record.adjacency() {
                // walk residual edges backwards: x -> vertex is the reverse of vertex -> x
                let Some(inbound) = graph.edge(edge_id.reverse()) else { continue };
                let from = inbound.source();
                if from == self.source || distance[from.as_usize()].is_some() {
                    continue;
                }
                if inbound.residual_capacity() > self.epsilon {
                    distance[from.as_usize()] = Some(current + 1);
                    queue.push_back(from);
                }
            }
        }

        let mut frame = Frame::new(0, StepKind::GlobalRelabeled);
        for vertex in graph.vertex_ids() {
            let i = vertex.as_usize();
            if vertex == self.source || vertex == self.sink {
                continue;
            }
            let relabeled = match distance[i] {
                Some(d) => d.max(self.heights[i]),
                None => self.heights[i].max(n),
            };
            if relabeled != self.heights[i] {
                self.heights[i] = relabeled;
                frame.highlighted_vertices.push(vertex);
            }
        }

        debug!("Global relabel changed {} heights", frame.highlighted_vertices.len());
        self.phase = Phase::Discharge;
        frame
    }

    fn finish(&mut self, graph: &Graph) -> Frame {
        self.phase = Phase::Finished;
        let total = graph.total_flow();
        debug!(
            "Push-relabel finished: flow {} after {} pushes and {} relabels",
            total, self.push_count, self.relabel_count
        );
        Frame::completed(0, total)
    }
}

impl StepAlgorithm for PushRelabel {
    fn name(&self) -> &'static str {
        "Push-Relabel"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> &'static str {
        "Goldberg-Tarjan push-relabel maximum flow with FIFO active-vertex selection and optional global relabeling."
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time: "O(V³)",
            space: "O(V + E)",
        }
    }

    fn frontier(&self) -> FrontierKind {
        FrontierKind::None
    }

    fn step(&mut self, graph: &mut Graph) -> Frame {
        match self.phase {
            Phase::Initialize => self.initialize(graph),
            Phase::Discharge => self.discharge(graph),
            Phase::GlobalRelabel => self.global_relabel(graph),
            Phase::Finished => Frame::completed(0, graph.total_flow()),
        }
    }
}
