//! Input contract for matching and flow problems
//!
//! Problems arrive as camelCase JSON documents that name vertices by string
//! id. Building a [`Graph`] from a problem validates every reference up
//! front, so the engines only ever see well-formed graphs.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashSet;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::traits::EngineError;
use crate::data_structures::graph::{Capacity, Graph, GraphError, Side, VertexId};

pub type ProblemResult<T> = Result<T, ProblemError>;

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Duplicate edge id: {0}")]
    DuplicateEdgeId(String),

    #[error("Vertex {id} is not on the {expected:?} side")]
    WrongSide { id: String, expected: Side },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Vertex as named by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexDef {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl VertexDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// Admissible pairing between a left and a right vertex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDef {
    pub left_id: String,
    pub right_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingProblem {
    #[serde(default)]
    pub left_vertices: Vec<VertexDef>,
    #[serde(default)]
    pub right_vertices: Vec<VertexDef>,
    #[serde(default)]
    pub edges: Vec<ConnectionDef>,
}

impl MatchingProblem {
    pub fn from_json(json: &str) -> ProblemResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> ProblemResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Builds the bipartite graph, left vertices first and both sides in input order
    ///
    /// Every connection becomes a unit-capacity Left→Right edge. A connection
    /// listed twice is added once.
    pub fn build_graph(&self) -> ProblemResult<Graph> {
        let mut graph = Graph::new();
        for vertex in &self.left_vertices {
            graph.add_vertex(vertex.id.as_str(), vertex.display_label(), Side::Left)?;
        }
        for vertex in &self.right_vertices {
            graph.add_vertex(vertex.id.as_str(), vertex.display_label(), Side::Right)?;
        }

        let mut seen = HashSet::new();
        for connection in &self.edges {
            if !seen.insert(connection) {
                warn!(
                    "Ignoring duplicate connection {} -> {}",
                    connection.left_id, connection.right_id
                );
                continue;
            }
            let left = side_vertex(&graph, &connection.left_id, Side::Left)?;
            let right = side_vertex(&graph, &connection.right_id, Side::Right)?;
            graph.add_edge(left, right, 1.0)?;
        }

        debug!(
            "Built matching graph: {} left, {} right, {} connections",
            self.left_vertices.len(),
            self.right_vertices.len(),
            seen.len()
        );
        Ok(graph)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdgeDef {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub capacity: Capacity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowProblem {
    #[serde(default)]
    pub vertices: Vec<VertexDef>,
    #[serde(default)]
    pub edges: Vec<FlowEdgeDef>,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub sink_id: String,
}

impl FlowProblem {
    pub fn from_json(json: &str) -> ProblemResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> ProblemResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Builds the flow network with source and sink designated
    ///
    /// Each forward edge carries the caller's edge id, so frames and outcomes
    /// report flows under the same names.
    pub fn build_graph(&self) -> ProblemResult<Graph> {
        let mut graph = Graph::new();
        for vertex in &self.vertices {
            graph.add_vertex(vertex.id.as_str(), vertex.display_label(), Side::Generic)?;
        }

        let mut ids = HashSet::new();
        for def in &self.edges {
            if !ids.insert(def.id.as_str()) {
                return Err(ProblemError::DuplicateEdgeId(def.id.clone()));
            }
            let edge = graph.add_edge_by_key(&def.source_id, &def.target_id, def.capacity)?;
            graph.set_edge_key(edge, def.id.as_str())?;
        }

        let source = terminal(&graph, &self.source_id, "source")?;
        let sink = terminal(&graph, &self.sink_id, "sink")?;
        graph.set_source(source)?;
        graph.set_sink(sink)?;

        debug!(
            "Built flow network: {} vertices, {} edges, {} -> {}",
            self.vertices.len(),
            self.edges.len(),
            self.source_id,
            self.sink_id
        );
        Ok(graph)
    }
}

fn side_vertex(graph: &Graph, id: &str, expected: Side) -> ProblemResult<VertexId> {
    let vertex = graph
        .find_vertex(id)
        .ok_or_else(|| GraphError::MissingReference(id.to_owned()))?;
    match graph.vertex(vertex) {
        Some(v) if v.side() == expected => Ok(vertex),
        _ => Err(ProblemError::WrongSide {
            id: id.to_owned(),
            expected,
        }),
    }
}

fn terminal(graph: &Graph, id: &str, role: &'static str) -> ProblemResult<VertexId> {
    if id.is_empty() {
        return Err(EngineError::MissingTerminal(role).into());
    }
    graph
        .find_vertex(id)
        .ok_or_else(|| GraphError::MissingReference(id.to_owned()).into())
}
