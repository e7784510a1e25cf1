//! Step frames emitted during algorithm execution
//!
//! A frame is an immutable description of what one algorithmic step touched:
//! the vertices and edges it highlighted, the flow values it changed and the
//! matches it created or dissolved. Frames are produced on demand and are
//! never stored by the engine itself.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::data_structures::graph::{Capacity, EdgeId, Graph, VertexId};

/// Kind of progress a frame reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// A new augmenting-path search started from the highlighted vertex
    SearchStarted,
    /// One vertex was taken off the frontier and its neighbours examined
    FrontierExpanded,
    /// Flow or matching was increased along the highlighted path
    Augmented,
    /// The search ended without reaching a free vertex or the sink
    SearchExhausted,
    /// Source edges were saturated to form the initial preflow
    PreflowInitialized,
    /// Excess moved across one admissible edge
    Pushed,
    /// A vertex height was raised
    Relabeled,
    /// All heights were recomputed from the sink
    GlobalRelabeled,
    /// Terminal frame of the run
    Completed,
}

/// Flow change on one edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDelta {
    pub edge: EdgeId,
    pub old_flow: Capacity,
    pub new_flow: Capacity,
}

/// Match created (`matched == true`) or dissolved between two vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDelta {
    pub left: VertexId,
    pub right: VertexId,
    pub matched: bool,
}

/// Snapshot of a single algorithm step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Zero-based position of the frame in its run
    pub step: usize,
    pub kind: StepKind,
    pub highlighted_vertices: Vec<VertexId>,
    pub highlighted_edges: Vec<EdgeId>,
    pub flow_deltas: Vec<FlowDelta>,
    pub match_deltas: Vec<MatchDelta>,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Capacity>,
}

impl Frame {
    pub fn new(step: usize, kind: StepKind) -> Self {
        Self {
            step,
            kind,
            highlighted_vertices: Vec::new(),
            highlighted_edges: Vec::new(),
            flow_deltas: Vec::new(),
            match_deltas: Vec::new(),
            done: false,
            result: None,
        }
    }

    /// Terminal frame carrying the final value
    pub fn completed(step: usize, result: Capacity) -> Self {
        Self {
            done: true,
            result: Some(result),
            ..Self::new(step, StepKind::Completed)
        }
    }

    pub fn with_vertices(mut self, vertices: impl IntoIterator<Item = VertexId>) -> Self {
        self.highlighted_vertices.extend(vertices);
        self
    }

    pub fn with_edges(mut self, edges: impl IntoIterator<Item = EdgeId>) -> Self {
        self.highlighted_edges.extend(edges);
        self
    }

    pub fn record_flow(&mut self, edge: EdgeId, old_flow: Capacity, new_flow: Capacity) {
        self.flow_deltas.push(FlowDelta {
            edge,
            old_flow,
            new_flow,
        });
    }

    pub fn record_match(&mut self, left: VertexId, right: VertexId, matched: bool) {
        self.match_deltas.push(MatchDelta {
            left,
            right,
            matched,
        });
    }

    /// Resolves arena indices into the caller's string ids
    pub fn view(&self, graph: &Graph) -> FrameView {
        let vertex_key = |v: VertexId| graph.key_of(v).unwrap_or_default().to_owned();
        let edge_key = |e: EdgeId| {
            graph
                .edge(e)
                .map(|edge| match edge.key() {
                    Some(key) => key.to_owned(),
                    None => format!("{}->{}", vertex_key(edge.source()), vertex_key(edge.target())),
                })
                .unwrap_or_default()
        };

        FrameView {
            step: self.step,
            kind: self.kind,
            highlighted_vertex_ids: self
                .highlighted_vertices
                .iter()
                .copied()
                .map(vertex_key)
                .collect(),
            highlighted_edge_ids: self.highlighted_edges.iter().copied().map(edge_key).collect(),
            flow_deltas: self
                .flow_deltas
                .iter()
                .map(|d| FlowDeltaView {
                    edge_id: edge_key(d.edge),
                    old_flow: d.old_flow,
                    new_flow: d.new_flow,
                })
                .collect(),
            match_deltas: self
                .match_deltas
                .iter()
                .map(|d| MatchDeltaView {
                    left_id: vertex_key(d.left),
                    right_id: vertex_key(d.right),
                    matched: d.matched,
                })
                .collect(),
            done: self.done,
            result: self.result,
        }
    }
}

/// Frame with string ids, as handed to a visualizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameView {
    pub step: usize,
    pub kind: StepKind,
    pub highlighted_vertex_ids: Vec<String>,
    pub highlighted_edge_ids: Vec<String>,
    pub flow_deltas: Vec<FlowDeltaView>,
    pub match_deltas: Vec<MatchDeltaView>,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Capacity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDeltaView {
    pub edge_id: String,
    pub old_flow: Capacity,
    pub new_flow: Capacity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDeltaView {
    pub left_id: String,
    pub right_id: String,
    pub matched: bool,
}
