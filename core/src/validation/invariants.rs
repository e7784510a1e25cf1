//! Structural invariant checks for flow and matching state
//!
//! These checks back the engine's debug assertions and the test suites.
//! Each `*_violations` function returns the offending elements, so callers
//! can report exactly what went wrong; the `check_*` functions fold them
//! into a single [`InvariantViolation`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use thiserror::Error;

use crate::data_structures::graph::{Capacity, EdgeId, EdgeKind, Graph, Side, VertexId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("Flow outside capacity bounds on edges {0:?}")]
    CapacityBounds(Vec<EdgeId>),

    #[error("Reverse edge flow is not the negation of forward flow on edges {0:?}")]
    ReverseAsymmetry(Vec<EdgeId>),

    #[error("Flow is not conserved at vertices {0:?}")]
    Conservation(Vec<VertexId>),

    #[error("Inconsistent matching at vertices {0:?}")]
    Matching(Vec<VertexId>),
}

/// Forward edges whose flow left its admissible range
///
/// A directed pair admits `[0, capacity]`; a bidirectional pair admits
/// `[-reverse capacity, capacity]` on its forward edge.
pub fn capacity_violations(graph: &Graph, epsilon: Capacity) -> Vec<EdgeId> {
    graph
        .forward_edges()
        .filter(|(id, edge)| {
            let lower = match graph.edge(id.reverse()) {
                Some(reverse) if reverse.kind() == EdgeKind::Bidirectional => -reverse.capacity(),
                _ => 0.0,
            };
            edge.flow() < lower - epsilon || edge.flow() > edge.capacity() + epsilon
        })
        .map(|(id, _)| id)
        .collect()
}

/// Forward edges whose reverse does not carry the negated flow
pub fn reverse_asymmetries(graph: &Graph, epsilon: Capacity) -> Vec<EdgeId> {
    graph
        .forward_edges()
        .filter(|(_, edge)| {
            graph
                .edge(edge.reverse())
                .map_or(true, |reverse| (reverse.flow() + edge.flow()).abs() > epsilon)
        })
        .map(|(id, _)| id)
        .collect()
}

/// Non-terminal vertices whose inflow differs from their outflow
pub fn conservation_violations(graph: &Graph, epsilon: Capacity) -> Vec<VertexId> {
    graph
        .vertex_ids()
        .filter(|&v| Some(v) != graph.source() && Some(v) != graph.sink())
        .filter(|&v| graph.net_outflow(v).abs() > epsilon)
        .collect()
}

/// Vertices whose mate pointer is asymmetric, crosses the wrong sides or has no edge
pub fn matching_violations(graph: &Graph) -> Vec<VertexId> {
    graph
        .vertices()
        .filter_map(|(id, vertex)| {
            let mate = vertex.mate()?;
            let partner = graph.vertex(mate);
            let symmetric = partner.and_then(|p| p.mate()) == Some(id);
            let connected = match vertex.side() {
                Side::Left => graph.find_edge(id, mate).is_some(),
                Side::Right => graph.find_edge(mate, id).is_some(),
                Side::Generic => false,
            };
            let crosses = partner.is_some_and(|p| p.side() != vertex.side());
            (!(symmetric && connected && crosses)).then_some(id)
        })
        .collect()
}

pub fn check_flow(graph: &Graph, epsilon: Capacity) -> Result<(), InvariantViolation> {
    let bounds = capacity_violations(graph, epsilon);
    if !bounds.is_empty() {
        return Err(InvariantViolation::CapacityBounds(bounds));
    }
    let asymmetric = reverse_asymmetries(graph, epsilon);
    if !asymmetric.is_empty() {
        return Err(InvariantViolation::ReverseAsymmetry(asymmetric));
    }
    let unbalanced = conservation_violations(graph, epsilon);
    if !unbalanced.is_empty() {
        return Err(InvariantViolation::Conservation(unbalanced));
    }
    Ok(())
}

pub fn check_matching(graph: &Graph) -> Result<(), InvariantViolation> {
    let broken = matching_violations(graph);
    if broken.is_empty() {
        Ok(())
    } else {
        Err(InvariantViolation::Matching(broken))
    }
}
