//! Lazy frame emission for algorithm runs
//!
//! [`StepEmitter`] drives a [`StepAlgorithm`] one step per `next()` call and
//! yields the resulting frames. It mutably borrows the graph for the whole
//! run, so a second run against the same graph cannot start while one is in
//! flight. Dropping the emitter cancels the run; the graph keeps whatever
//! consistent, partially executed state the last step left behind.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::iter::FusedIterator;

use log::{info, trace};

use crate::algorithm::graph::matching::BipartiteMatching;
use crate::algorithm::traits::{EngineError, FrontierKind, StepAlgorithm};
use crate::config::EngineConfig;
use crate::data_structures::graph::{Capacity, Graph};
use crate::execution::frame::Frame;

/// Iterator over the frames of a single algorithm run
#[derive(Debug)]
pub struct StepEmitter<'g> {
    graph: &'g mut Graph,
    algorithm: Box<dyn StepAlgorithm>,
    emitted: usize,
    result: Option<Capacity>,
}

impl<'g> StepEmitter<'g> {
    pub fn new(graph: &'g mut Graph, algorithm: Box<dyn StepAlgorithm>) -> Self {
        Self {
            graph,
            algorithm,
            emitted: 0,
            result: None,
        }
    }

    /// Maximum bipartite matching run
    pub fn matching(graph: &'g mut Graph) -> Result<Self, EngineError> {
        let engine = BipartiteMatching::new(graph)?;
        Ok(Self::new(graph, Box::new(engine)))
    }

    /// Maximum flow run with the strategy selected in `config`
    pub fn flow(graph: &'g mut Graph, config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let engine = config.strategy.engine(graph, config)?;
        Ok(Self::new(graph, engine))
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn frontier(&self) -> FrontierKind {
        self.algorithm.frontier()
    }

    pub fn algorithm(&self) -> &dyn StepAlgorithm {
        self.algorithm.as_ref()
    }

    /// Graph state as left by the most recent step
    pub fn graph(&self) -> &Graph {
        self.graph
    }

    pub fn steps_emitted(&self) -> usize {
        self.emitted
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Final value, once the terminal frame has been emitted
    pub fn result(&self) -> Option<Capacity> {
        self.result
    }

    /// Pulls the remaining frames and returns the final value
    pub fn run_to_completion(&mut self) -> Capacity {
        for _ in self.by_ref() {}
        self.result.unwrap_or_default()
    }
}

impl Iterator for StepEmitter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.result.is_some() {
            return None;
        }

        let mut frame = self.algorithm.step(self.graph);
        frame.step = self.emitted;
        self.emitted += 1;
        trace!("{} step {}: {:?}", self.algorithm.name(), frame.step, frame.kind);

        if frame.done {
            let result = frame.result.unwrap_or_default();
            self.result = Some(result);
            info!(
                "{} completed in {} steps with result {}",
                self.algorithm.name(),
                self.emitted,
                result
            );
        }

        Some(frame)
    }
}

impl FusedIterator for StepEmitter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::max_flow::FlowStrategy;
    use crate::data_structures::graph::Side;
    use crate::execution::frame::StepKind;

    fn chain() -> Graph {
        let mut graph = Graph::new();
        let s = graph.add_vertex("s", "source", Side::Generic).unwrap();
        let a = graph.add_vertex("a", "A", Side::Generic).unwrap();
        let t = graph.add_vertex("t", "sink", Side::Generic).unwrap();
        graph.add_edge(s, a, 10.0).unwrap();
        graph.add_edge(a, t, 4.0).unwrap();
        graph.set_source(s).unwrap();
        graph.set_sink(t).unwrap();
        graph
    }

    #[test]
    fn test_frames_are_numbered_and_terminate() {
        let mut graph = chain();
        let config = EngineConfig::default();
        let frames: Vec<Frame> = StepEmitter::flow(&mut graph, &config).unwrap().collect();

        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.step, i);
        }
        let last = frames.last().unwrap();
        assert!(last.done);
        assert_eq!(last.kind, StepKind::Completed);
        assert_eq!(frames.iter().filter(|f| f.done).count(), 1);
    }

    #[test]
    fn test_fused_after_completion() {
        let mut graph = chain();
        let config = EngineConfig::default().with_strategy(FlowStrategy::PushRelabel);
        let mut emitter = StepEmitter::flow(&mut graph, &config).unwrap();
        assert_eq!(emitter.algorithm_name(), "Push-Relabel");
        assert_eq!(emitter.run_to_completion(), 4.0);
        assert!(emitter.is_finished());
        assert!(emitter.next().is_none());
    }

    #[test]
    fn test_algorithm_descriptors() {
        let mut graph = chain();
        let config = EngineConfig::default().with_strategy(FlowStrategy::FordFulkerson);
        let emitter = StepEmitter::flow(&mut graph, &config).unwrap();
        let algorithm = emitter.algorithm();

        assert_eq!(algorithm.id().as_str(), "Ford-Fulkerson");
        assert_eq!(algorithm.category(), "max_flow");
        assert_eq!(algorithm.complexity().time, "O(E·f)");
        assert!(algorithm.description().contains("depth-first"));
        assert_eq!(emitter.frontier(), FrontierKind::Stack);
        drop(emitter);

        let mut bipartite = Graph::new();
        bipartite.add_vertex("l", "l", Side::Left).unwrap();
        let emitter = StepEmitter::matching(&mut bipartite).unwrap();
        assert_eq!(emitter.algorithm().category(), "matching");
        assert_eq!(emitter.frontier(), FrontierKind::Queue);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut graph = chain();
        let mut config = EngineConfig::default();
        config.epsilon = f64::NAN;
        assert!(matches!(
            StepEmitter::flow(&mut graph, &config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_cancel_leaves_partial_state() {
        let mut graph = chain();
        let config = EngineConfig::default().with_strategy(FlowStrategy::FordFulkerson);
        {
            let mut emitter = StepEmitter::flow(&mut graph, &config).unwrap();
            // start, expand s, expand a (reaches sink), augment
            for _ in 0..4 {
                emitter.next();
            }
            assert!(!emitter.is_finished());
        }
        assert_eq!(graph.total_flow(), 4.0);

        // resuming needs a fresh run; without reset it finds the flow already maximal
        let mut emitter = StepEmitter::flow(&mut graph, &config).unwrap();
        assert_eq!(emitter.run_to_completion(), 4.0);
    }

    #[test]
    fn test_reset_allows_rerun() {
        let mut graph = chain();
        let config = EngineConfig::default();
        StepEmitter::flow(&mut graph, &config).unwrap().run_to_completion();
        graph.reset();
        assert_eq!(graph.total_flow(), 0.0);

        let mut emitter = StepEmitter::flow(&mut graph, &config).unwrap();
        assert_eq!(emitter.run_to_completion(), 4.0);
        assert!(emitter.steps_emitted() > 1);
    }
}
