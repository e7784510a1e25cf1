//! Maximum bipartite matching by breadth-first augmenting paths
//!
//! Kuhn's method: left vertices are tried once each in input order. From an
//! exposed left vertex a single BFS follows unmatched left→right edges
//! forwards and matched right→left edges backwards through the right
//! vertex's mate. Reaching an exposed right vertex yields an augmenting path,
//! whose edges flip between matched and unmatched, growing the matching by
//! exactly one. A left vertex whose search exhausts its frontier stays
//! exposed for the rest of the run.
//!
//! # Algorithmic Complexity
//! - **Time Complexity**: O(|L|·(|L| + |R| + |E|)), one BFS per left vertex
//! - **Space Complexity**: O(|L| + |R|) for the queue and search flags
//!
//! Among equally large matchings the one returned is fixed by adjacency
//! (insertion) order; searches are not batched into Hopcroft-Karp phases.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::{debug, warn};

use crate::algorithm::traits::{AlgorithmComplexity, EngineError, FrontierKind, StepAlgorithm};
use crate::data_structures::graph::{Capacity, EdgeId, Graph, Side, VertexId};
use crate::execution::frame::{Frame, StepKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Pick the next exposed left vertex
    SelectStart,
    /// Expand one vertex of the current BFS
    Expand,
    /// Flip the path ending at the exposed right vertex
    Augment(VertexId),
    Finished,
}

/// Steppable Kuhn-style matching engine
#[derive(Debug, Clone)]
pub struct BipartiteMatching {
    /// Left vertices in input order
    left: Vec<VertexId>,
    /// Position of the next left vertex to try
    cursor: usize,
    start: Option<VertexId>,
    queue: VecDeque<VertexId>,
    phase: Phase,
    augmentations: usize,
}

impl BipartiteMatching {
    /// Prepares a run over `graph`, which must only contain left→right edges
    pub fn new(graph: &Graph) -> Result<Self, EngineError> {
        for (id, edge) in graph.forward_edges() {
            let source_side = graph.vertex(edge.source()).map(|v| v.side());
            let target_side = graph.vertex(edge.target()).map(|v| v.side());
            if source_side != Some(Side::Left) || target_side != Some(Side::Right) {
                return Err(EngineError::NotBipartite(id));
            }
        }

        let left = graph.side_vertices(Side::Left);
        debug!(
            "Bipartite matching prepared over {} left and {} right vertices",
            left.len(),
            graph.side_vertices(Side::Right).len()
        );

        Ok(Self {
            left,
            cursor: 0,
            start: None,
            queue: VecDeque::new(),
            phase: Phase::SelectStart,
            augmentations: 0,
        })
    }

    /// Augmenting paths applied so far in this run
    pub fn augmentations(&self) -> usize {
        self.augmentations
    }

    fn select_start(&mut self, graph: &mut Graph) -> Frame {
        while let Some(&candidate) = self.left.get(self.cursor) {
            self.cursor += 1;
            if graph.vertex(candidate).is_some_and(|v| v.is_exposed()) {
                graph.clear_search_state();
                graph.visit(candidate, None);
                self.queue.clear();
                self.queue.push_back(candidate);
                self.start = Some(candidate);
                self.phase = Phase::Expand;

                debug!("Searching augmenting path from {}", candidate);
                return Frame::new(0, StepKind::SearchStarted).with_vertices([candidate]);
            }
        }

        self.phase = Phase::Finished;
        self.start = None;
        let size = graph.matching_size();
        debug!(
            "Matching complete: size {} after {} augmentations",
            size, self.augmentations
        );
        Frame::completed(0, size as Capacity)
    }

    fn expand(&mut self, graph: &mut Graph) -> Frame {
        let Some(current) = self.queue.pop_front() else {
            self.phase = Phase::SelectStart;
            let start = self.start.take();
            debug!("No augmenting path from {:?}", start);
            return Frame::new(0, StepKind::SearchExhausted).with_vertices(start);
        };

        let mut frame = Frame::new(0, StepKind::FrontierExpanded).with_vertices([current]);
        let adjacency = graph
            .vertex(current)
            .map(|v| v.adjacency().to_vec())
            .unwrap_or_default();

        for edge_id in adjacency {
            let Some(edge) = graph.edge(edge_id) else { continue };
            if !edge.is_forward() {
                continue;
            }
            let right = edge.target();
            let Some(right_vertex) = graph.vertex(right) else { continue };
            if right_vertex.is_visited() {
                continue;
            }
            let mate = right_vertex.mate();

            graph.visit(right, Some(edge_id));
            frame.highlighted_vertices.push(right);
            frame.highlighted_edges.push(edge_id);

            match mate {
                None => {
                    debug!("Exposed vertex {} reached", right);
                    self.phase = Phase::Augment(right);
                    break;
                }
                Some(left) => {
                    // Matched right vertices lead back along their matched edge
                    let back = graph.find_edge(left, right).map(EdgeId::reverse);
                    graph.visit(left, back);
                    self.queue.push_back(left);
                    frame.highlighted_vertices.push(left);
                    frame.highlighted_edges.extend(back);
                }
            }
        }

        frame
    }

    /// Flips the alternating path ending at the exposed vertex `end`
    fn augment(&mut self, graph: &mut Graph, end: VertexId) -> Frame {
        let mut frame = Frame::new(0, StepKind::Augmented).with_vertices([end]);
        let mut right = end;

        loop {
            let Some(via) = graph.vertex(right).and_then(|v| v.predecessor()) else {
                warn!("Augmenting path broken at {}", right);
                break;
            };
            let Some(left) = graph.edge(via).map(|e| e.source()) else { break };
            let previous = graph.vertex(left).and_then(|v| v.mate());

            graph.pair(left, right);
            frame.record_match(left, right, true);
            frame.highlighted_edges.push(via);
            frame.highlighted_vertices.push(left);

            if Some(left) == self.start {
                break;
            }

            let Some(previous) = previous else {
                warn!("Interior path vertex {} was exposed", left);
                break;
            };
            // `previous` is re-paired with its own predecessor on the next pass
            frame.record_match(left, previous, false);
            frame.highlighted_edges.extend(graph.vertex(left).and_then(|v| v.predecessor()));
            frame.highlighted_vertices.push(previous);
            right = previous;
        }

        self.augmentations += 1;
        self.queue.clear();
        self.start = None;
        self.phase = Phase::SelectStart;

        debug_assert!(crate::validation::invariants::check_matching(graph).is_ok());
        debug!("Augmented matching to size {}", graph.matching_size());
        frame
    }
}

impl StepAlgorithm for BipartiteMatching {
    fn name(&self) -> &'static str {
        "Bipartite Matching"
    }

    fn category(&self) -> &'static str {
        "matching"
    }

    fn description(&self) -> &'static str {
        "Maximum cardinality bipartite matching by repeated breadth-first augmenting-path search from exposed left vertices."
    }

    fn complexity(&self) -> AlgorithmComplexity {
        AlgorithmComplexity {
            time: "O(V·E)",
            space: "O(V)",
        }
    }

    fn frontier(&self) -> FrontierKind {
        FrontierKind::Queue
    }

    fn step(&mut self, graph: &mut Graph) -> Frame {
        match self.phase {
            Phase::SelectStart => self.select_start(graph),
            Phase::Expand => self.expand(graph),
            Phase::Augment(end) => self.augment(graph, end),
            Phase::Finished => Frame::completed(0, graph.matching_size() as Capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bipartite(left: &[&str], right: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new();
        for key in left {
            graph.add_vertex(*key, *key, Side::Left).unwrap();
        }
        for key in right {
            graph.add_vertex(*key, *key, Side::Right).unwrap();
        }
        for (l, r) in edges {
            graph.add_edge_by_key(l, r, 1.0).unwrap();
        }
        graph
    }

    fn run(graph: &mut Graph) -> Vec<Frame> {
        let mut engine = BipartiteMatching::new(graph).unwrap();
        let mut frames = Vec::new();
        loop {
            let frame = engine.step(graph);
            let done = frame.done;
            frames.push(frame);
            if done {
                break;
            }
        }
        frames
    }

    fn pairs(graph: &Graph) -> Vec<(String, String)> {
        graph
            .matching()
            .into_iter()
            .map(|(l, r)| {
                let left = graph.key_of(l).unwrap().to_string();
                let right = graph.key_of(r).unwrap().to_string();
                (left, right)
            })
            .collect()
    }

    #[test]
    fn test_reassigns_through_augmenting_path() {
        let mut graph = bipartite(
            &["T1", "T2"],
            &["C1", "C2", "C3"],
            &[("T1", "C1"), ("T1", "C2"), ("T2", "C1")],
        );
        let frames = run(&mut graph);

        assert_eq!(frames.last().unwrap().result, Some(2.0));
        assert_eq!(
            pairs(&graph),
            vec![("T1".to_string(), "C2".to_string()), ("T2".to_string(), "C1".to_string())]
        );

        // second augmentation dissolves T1-C1
        let last_augment = frames
            .iter()
            .rev()
            .find(|f| f.kind == StepKind::Augmented)
            .unwrap();
        assert_eq!(last_augment.match_deltas.len(), 3);
        assert!(last_augment.match_deltas.iter().any(|d| !d.matched));
    }

    #[test]
    fn test_no_edges_gives_empty_matching() {
        let mut graph = bipartite(&["L1", "L2", "L3"], &["R1", "R2", "R3"], &[]);
        let frames = run(&mut graph);

        assert_eq!(frames.last().unwrap().result, Some(0.0));
        let exhausted = frames.iter().filter(|f| f.kind == StepKind::SearchExhausted).count();
        assert_eq!(exhausted, 3);
    }

    #[test]
    fn test_complete_bipartite_is_perfect() {
        let left = ["a", "b", "c"];
        let right = ["x", "y", "z"];
        let edges: Vec<(&str, &str)> = left
            .iter()
            .flat_map(|l| right.iter().map(move |r| (*l, *r)))
            .collect();
        let mut graph = bipartite(&left, &right, &edges);
        run(&mut graph);
        assert_eq!(graph.matching_size(), 3);
    }

    #[test]
    fn test_rejects_right_to_left_edge() {
        let mut graph = bipartite(&["L"], &["R"], &[]);
        graph.add_edge_by_key("R", "L", 1.0).unwrap();
        assert!(matches!(
            BipartiteMatching::new(&graph),
            Err(EngineError::NotBipartite(_))
        ));
    }

    #[test]
    fn test_existing_matches_are_kept_without_reset() {
        let mut graph = bipartite(&["L1", "L2"], &["R1", "R2"], &[("L1", "R1"), ("L2", "R2")]);
        run(&mut graph);
        assert_eq!(graph.matching_size(), 2);

        // second run finds nothing new to do
        let frames = run(&mut graph);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].result, Some(2.0));
    }

    #[test]
    fn test_failed_vertex_stays_exposed() {
        let mut graph = bipartite(&["L1", "L2"], &["R1"], &[("L1", "R1"), ("L2", "R1")]);
        run(&mut graph);
        let l2 = graph.find_vertex("L2").unwrap();
        assert!(graph.vertex(l2).unwrap().is_exposed());
        assert_eq!(graph.matching_size(), 1);
    }

    #[test]
    fn test_every_visited_vertex_is_reported() {
        let mut graph = bipartite(&["A", "B"], &["X", "Y"], &[("A", "X"), ("B", "X"), ("B", "Y")]);
        let mut engine = BipartiteMatching::new(&graph).unwrap();
        let mut search = Vec::new();

        loop {
            let frame = engine.step(&mut graph);
            if frame.kind == StepKind::SearchStarted {
                search.clear();
            }
            let done = frame.done;
            let kind = frame.kind;
            search.push(frame);

            if kind == StepKind::Augmented || kind == StepKind::SearchExhausted {
                for (id, vertex) in graph.vertices() {
                    if vertex.is_visited() {
                        assert!(
                            search.iter().any(|f| f.highlighted_vertices.contains(&id)),
                            "{} visited but never reported",
                            vertex.key()
                        );
                    }
                }
            }
            if done {
                break;
            }
        }
        assert_eq!(graph.matching_size(), 2);
    }

    #[test]
    fn test_expansion_frame_precedes_augmentation() {
        let mut graph = bipartite(&["A", "B"], &["X", "Y"], &[("A", "X"), ("B", "X"), ("B", "Y")]);
        let kinds: Vec<StepKind> = run(&mut graph).iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::SearchStarted,
                StepKind::FrontierExpanded,
                StepKind::Augmented,
                StepKind::SearchStarted,
                StepKind::FrontierExpanded,
                StepKind::Augmented,
                StepKind::Completed,
            ]
        );
    }
}
