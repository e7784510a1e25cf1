//! Output contract: final matching and flow state in the caller's ids
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::data_structures::graph::{Capacity, Graph};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPair {
    pub left_id: String,
    pub right_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingOutcome {
    pub matched_pairs: Vec<MatchedPair>,
    pub size: usize,
}

impl MatchingOutcome {
    /// Reads the mate pointers, listing pairs in left-vertex input order
    pub fn from_graph(graph: &Graph) -> Self {
        let matched_pairs: Vec<MatchedPair> = graph
            .matching()
            .into_iter()
            .filter_map(|(left, right)| {
                Some(MatchedPair {
                    left_id: graph.key_of(left)?.to_owned(),
                    right_id: graph.key_of(right)?.to_owned(),
                })
            })
            .collect();

        Self {
            size: matched_pairs.len(),
            matched_pairs,
        }
    }

    /// Right vertex assigned to `left_id`, if any
    pub fn partner_of(&self, left_id: &str) -> Option<&str> {
        self.matched_pairs
            .iter()
            .find(|pair| pair.left_id == left_id)
            .map(|pair| pair.right_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeFlow {
    pub edge_id: String,
    pub flow: Capacity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOutcome {
    pub total_flow: Capacity,
    pub edge_flows: Vec<EdgeFlow>,
}

impl FlowOutcome {
    /// Total flow out of the source plus the flow on every input edge, in input order
    pub fn from_graph(graph: &Graph) -> Self {
        let edge_flows = graph
            .forward_edges()
            .map(|(_, edge)| EdgeFlow {
                edge_id: match edge.key() {
                    Some(key) => key.to_owned(),
                    None => format!(
                        "{}->{}",
                        graph.key_of(edge.source()).unwrap_or_default(),
                        graph.key_of(edge.target()).unwrap_or_default()
                    ),
                },
                flow: edge.flow(),
            })
            .collect();

        Self {
            total_flow: graph.total_flow(),
            edge_flows,
        }
    }

    pub fn flow_on(&self, edge_id: &str) -> Option<Capacity> {
        self.edge_flows
            .iter()
            .find(|e| e.edge_id == edge_id)
            .map(|e| e.flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::graph::Side;

    #[test]
    fn test_matching_outcome_shape() {
        let mut graph = Graph::new();
        let l = graph.add_vertex("T1", "Ada", Side::Left).unwrap();
        let r = graph.add_vertex("C1", "Math", Side::Right).unwrap();
        graph.add_vertex("C2", "Art", Side::Right).unwrap();
        graph.add_edge(l, r, 1.0).unwrap();
        graph.pair(l, r);

        let outcome = MatchingOutcome::from_graph(&graph);
        assert_eq!(outcome.size, 1);
        assert_eq!(outcome.partner_of("T1"), Some("C1"));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["matchedPairs"][0]["leftId"], "T1");
        assert_eq!(json["matchedPairs"][0]["rightId"], "C1");
        assert_eq!(json["size"], 1);
    }

    #[test]
    fn test_flow_outcome_uses_edge_keys() {
        let mut graph = Graph::new();
        let s = graph.add_vertex("s", "s", Side::Generic).unwrap();
        let t = graph.add_vertex("t", "t", Side::Generic).unwrap();
        let keyed = graph.add_edge(s, t, 5.0).unwrap();
        graph.set_edge_key(keyed, "e1").unwrap();
        let plain = graph.add_edge(s, t, 2.0).unwrap();
        graph.set_source(s).unwrap();
        graph.set_sink(t).unwrap();
        graph.push_flow(keyed, 5.0);
        graph.push_flow(plain, 1.0);

        let outcome = FlowOutcome::from_graph(&graph);
        assert_eq!(outcome.total_flow, 6.0);
        assert_eq!(outcome.flow_on("e1"), Some(5.0));
        assert_eq!(outcome.flow_on("s->t"), Some(1.0));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["totalFlow"], 6.0);
        assert_eq!(json["edgeFlows"][0]["edgeId"], "e1");
    }
}
