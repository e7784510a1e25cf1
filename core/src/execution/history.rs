//! Execution history management for algorithm tracing
//!
//! The engine never stores frames. A front-end that wants to scrub back and
//! forth through a run records them here instead: the history keeps every
//! frame in order, indexes which frames touched which vertex, counts frames
//! per step kind and tracks how the running flow value evolved.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_structures::graph::{Capacity, EdgeId, VertexId};
use crate::execution::emitter::StepEmitter;
use crate::execution::frame::{Frame, StepKind};

/// Error types for execution history operations
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Invalid frame index: {0}")]
    InvalidIndex(usize),

    #[error("Frame {found} recorded where step {expected} was expected")]
    OutOfOrder { expected: usize, found: usize },

    #[error("Run already completed at step {0}")]
    AlreadyCompleted(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Recorded run of one algorithm
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameHistory {
    algorithm_name: String,
    frames: Vec<Frame>,
    /// Frame indices in which each vertex was highlighted
    vertex_visits: HashMap<VertexId, Vec<usize>>,
    kind_counts: HashMap<StepKind, usize>,
    /// Latest flow value of every edge touched so far
    edge_flows: HashMap<EdgeId, Capacity>,
}

impl FrameHistory {
    pub fn new(algorithm_name: &str) -> Self {
        Self {
            algorithm_name: algorithm_name.to_owned(),
            ..Self::default()
        }
    }

    /// Drains an emitter, recording every frame it produces
    pub fn record_run(emitter: &mut StepEmitter<'_>) -> Result<Self, HistoryError> {
        let mut history = Self::new(emitter.algorithm_name());
        for frame in emitter.by_ref() {
            history.record(frame)?;
        }
        Ok(history)
    }

    /// Appends the next frame of the run
    pub fn record(&mut self, frame: Frame) -> Result<(), HistoryError> {
        if let Some(last) = self.frames.last() {
            if last.done {
                return Err(HistoryError::AlreadyCompleted(last.step));
            }
        }
        if frame.step != self.frames.len() {
            return Err(HistoryError::OutOfOrder {
                expected: self.frames.len(),
                found: frame.step,
            });
        }

        let index = self.frames.len();
        for &vertex in &frame.highlighted_vertices {
            let visits = self.vertex_visits.entry(vertex).or_default();
            if visits.last() != Some(&index) {
                visits.push(index);
            }
        }
        for delta in &frame.flow_deltas {
            self.edge_flows.insert(delta.edge, delta.new_flow);
        }
        *self.kind_counts.entry(frame.kind).or_default() += 1;

        self.frames.push(frame);
        Ok(())
    }

    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Result<&Frame, HistoryError> {
        self.frames.get(index).ok_or(HistoryError::InvalidIndex(index))
    }

    /// Frames that highlighted `vertex`, in run order
    pub fn frames_touching(&self, vertex: VertexId) -> Vec<&Frame> {
        self.vertex_visits
            .get(&vertex)
            .map(|indices| indices.iter().filter_map(|&i| self.frames.get(i)).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: StepKind) -> usize {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.frames.last().is_some_and(|f| f.done)
    }

    pub fn final_result(&self) -> Option<Capacity> {
        self.frames.last().filter(|f| f.done).and_then(|f| f.result)
    }

    /// Latest recorded flow on `edge`, if any frame changed it
    pub fn last_flow(&self, edge: EdgeId) -> Option<Capacity> {
        self.edge_flows.get(&edge).copied()
    }

    /// Indices of frames that changed flow or matching state
    pub fn progress_steps(&self) -> Vec<usize> {
        self.frames
            .iter()
            .filter(|f| !f.flow_deltas.is_empty() || !f.match_deltas.is_empty())
            .map(|f| f.step)
            .collect()
    }

    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::data_structures::graph::{Graph, Side};

    fn diamond() -> Graph {
        let mut graph = Graph::new();
        for key in ["s", "a", "b", "t"] {
            graph.add_vertex(key, key, Side::Generic).unwrap();
        }
        for (s, t, c) in [("s", "a", 10.0), ("s", "b", 5.0), ("a", "t", 7.0), ("b", "t", 10.0)] {
            graph.add_edge_by_key(s, t, c).unwrap();
        }
        graph.set_source(graph.find_vertex("s").unwrap()).unwrap();
        graph.set_sink(graph.find_vertex("t").unwrap()).unwrap();
        graph
    }

    #[test]
    fn test_record_run() {
        let mut graph = diamond();
        let config = EngineConfig::default();
        let mut emitter = StepEmitter::flow(&mut graph, &config).unwrap();
        let history = FrameHistory::record_run(&mut emitter).unwrap();

        assert_eq!(history.algorithm_name(), "Edmonds-Karp");
        assert!(history.is_complete());
        assert_eq!(history.final_result(), Some(12.0));
        assert_eq!(history.count(StepKind::Completed), 1);
        assert_eq!(history.count(StepKind::Augmented), 2);
        assert_eq!(history.progress_steps().len(), 2);
    }

    #[test]
    fn test_vertex_index() {
        let mut graph = diamond();
        let t = graph.find_vertex("t").unwrap();
        let config = EngineConfig::default();
        let mut emitter = StepEmitter::flow(&mut graph, &config).unwrap();
        let history = FrameHistory::record_run(&mut emitter).unwrap();

        let touching = history.frames_touching(t);
        assert!(!touching.is_empty());
        assert!(touching.iter().all(|f| f.highlighted_vertices.contains(&t)));
    }

    #[test]
    fn test_rejects_out_of_order_and_after_completion() {
        let mut history = FrameHistory::new("test_algorithm");
        assert!(matches!(
            history.record(Frame::new(3, StepKind::SearchStarted)),
            Err(HistoryError::OutOfOrder { expected: 0, found: 3 })
        ));
        history.record(Frame::completed(0, 1.0)).unwrap();
        assert!(matches!(
            history.record(Frame::new(1, StepKind::SearchStarted)),
            Err(HistoryError::AlreadyCompleted(0))
        ));
        assert!(history.frame(5).is_err());
    }

    #[test]
    fn test_serialization() {
        let mut history = FrameHistory::new("test_algorithm");
        history.record(Frame::completed(0, 2.0)).unwrap();
        let json = history.to_json().unwrap();
        let restored: FrameHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.final_result(), Some(2.0));
    }
}
