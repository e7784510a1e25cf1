//! Capacitated residual graph shared by the matching and flow engines
//!
//! Vertices and edges live in two arenas and refer to each other by index.
//! Every edge is created together with its reverse counterpart, so the
//! residual graph is well-formed from the first insertion onwards: there is
//! no reachable state in which a forward edge lacks its reverse edge.
//!
//! # Invariants
//! - Vertex keys are unique and vertices keep their insertion order
//! - Edge `2k` is a forward edge, edge `2k + 1` its reverse
//! - `flow(reverse(e)) == -flow(e)` for every flow change made by an engine
//! - A forward edge of a directed pair carries `0 <= flow <= capacity`
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flow and capacity values
pub type Capacity = f64;

/// Arena index of a vertex
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl VertexId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Arena index of an edge
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Index of the paired edge. Pairs occupy adjacent slots.
    #[inline]
    pub fn reverse(self) -> EdgeId {
        EdgeId(self.0 ^ 1)
    }

    #[inline]
    pub fn is_forward_slot(self) -> bool {
        self.0 % 2 == 0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Which part of the graph a vertex belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Generic,
}

/// How an edge came into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Edge requested by the caller
    Forward,
    /// Zero-capacity residual counterpart created automatically
    Residual,
    /// Counterpart of a bidirectional pair with its own capacity
    Bidirectional,
}

/// Graph construction and mutation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Duplicate vertex id: {0}")]
    DuplicateId(String),

    #[error("Missing vertex reference: {0}")]
    MissingReference(String),

    #[error("Invalid flow {value} on edge {edge} with capacity {capacity}")]
    InvalidFlow {
        edge: EdgeId,
        value: Capacity,
        capacity: Capacity,
    },

    #[error("Invalid capacity {capacity} for edge {source_key} -> {target_key}")]
    InvalidCapacity {
        source_key: String,
        target_key: String,
        capacity: Capacity,
    },

    #[error("Unknown edge: {0}")]
    UnknownEdge(EdgeId),
}

/// Vertex record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    key: String,
    label: String,
    side: Side,
    mate: Option<VertexId>,
    visited: bool,
    /// Edge through which the current search reached this vertex
    predecessor: Option<EdgeId>,
    adjacency: Vec<EdgeId>,
}

impl Vertex {
    fn new(key: String, label: String, side: Side) -> Self {
        Self {
            key,
            label,
            side,
            mate: None,
            visited: false,
            predecessor: None,
            adjacency: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn mate(&self) -> Option<VertexId> {
        self.mate
    }

    pub fn is_exposed(&self) -> bool {
        self.mate.is_none()
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn predecessor(&self) -> Option<EdgeId> {
        self.predecessor
    }

    /// Outgoing edges in insertion order, residual edges included
    pub fn adjacency(&self) -> &[EdgeId] {
        &self.adjacency
    }
}

/// Edge record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    source: VertexId,
    target: VertexId,
    capacity: Capacity,
    flow: Capacity,
    reverse: EdgeId,
    kind: EdgeKind,
    /// Caller-facing id, if one was assigned
    #[serde(default)]
    key: Option<String>,
}

impl Edge {
    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn flow(&self) -> Capacity {
        self.flow
    }

    pub fn reverse(&self) -> EdgeId {
        self.reverse
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether the caller asked for this edge, as opposed to a residual twin
    pub fn is_forward(&self) -> bool {
        self.kind == EdgeKind::Forward
    }

    pub fn residual_capacity(&self) -> Capacity {
        self.capacity - self.flow
    }
}

/// Arena-backed residual graph
///
/// Deserialization rebuilds the key index and rejects duplicate keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord")]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<String, VertexId>,
    source: Option<VertexId>,
    sink: Option<VertexId>,
}

/// Serialized form of [`Graph`], without the derived key index
#[derive(Deserialize)]
struct GraphRecord {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    source: Option<VertexId>,
    sink: Option<VertexId>,
}

impl TryFrom<GraphRecord> for Graph {
    type Error = GraphError;

    fn try_from(record: GraphRecord) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(record.vertices.len());
        for (i, vertex) in record.vertices.iter().enumerate() {
            if index.insert(vertex.key.clone(), VertexId(i)).is_some() {
                return Err(GraphError::DuplicateId(vertex.key.clone()));
            }
        }
        Ok(Self {
            vertices: record.vertices,
            edges: record.edges,
            index,
            source: record.source,
            sink: record.sink,
        })
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex, rejecting keys that are already present
    pub fn add_vertex(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        side: Side,
    ) -> Result<VertexId, GraphError> {
        let key = key.into();
        if self.index.contains_key(&key) {
            return Err(GraphError::DuplicateId(key));
        }

        let id = VertexId(self.vertices.len());
        self.index.insert(key.clone(), id);
        self.vertices.push(Vertex::new(key, label.into(), side));
        Ok(id)
    }

    /// Adds a directed edge and its zero-capacity reverse, returning the forward edge
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        capacity: Capacity,
    ) -> Result<EdgeId, GraphError> {
        self.insert_pair(source, target, capacity, 0.0, EdgeKind::Residual)
    }

    /// Adds an edge whose reverse carries its own capacity, for undirected use
    pub fn add_bidirectional_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        capacity: Capacity,
        reverse_capacity: Capacity,
    ) -> Result<EdgeId, GraphError> {
        self.insert_pair(source, target, capacity, reverse_capacity, EdgeKind::Bidirectional)
    }

    /// Key-based variant of [`Graph::add_edge`]
    pub fn add_edge_by_key(
        &mut self,
        source: &str,
        target: &str,
        capacity: Capacity,
    ) -> Result<EdgeId, GraphError> {
        let source = self.require(source)?;
        let target = self.require(target)?;
        self.add_edge(source, target, capacity)
    }

    fn insert_pair(
        &mut self,
        source: VertexId,
        target: VertexId,
        capacity: Capacity,
        reverse_capacity: Capacity,
        reverse_kind: EdgeKind,
    ) -> Result<EdgeId, GraphError> {
        let source_key = self.key_or_missing(source)?.to_owned();
        let target_key = self.key_or_missing(target)?.to_owned();

        for value in [capacity, reverse_capacity] {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::InvalidCapacity {
                    source_key,
                    target_key,
                    capacity: value,
                });
            }
        }

        let forward = EdgeId(self.edges.len());
        let reverse = forward.reverse();
        debug_assert!(forward.is_forward_slot());

        self.edges.push(Edge {
            source,
            target,
            capacity,
            flow: 0.0,
            reverse,
            kind: EdgeKind::Forward,
            key: None,
        });
        self.edges.push(Edge {
            source: target,
            target: source,
            capacity: reverse_capacity,
            flow: 0.0,
            reverse: forward,
            kind: reverse_kind,
            key: None,
        });

        self.vertices[source.0].adjacency.push(forward);
        self.vertices[target.0].adjacency.push(reverse);

        debug!("Added edge {source_key} -> {target_key} (capacity {capacity})");
        Ok(forward)
    }

    /// Assigns a flow value to a single edge. The reverse edge is left untouched.
    pub fn set_flow(&mut self, edge: EdgeId, value: Capacity) -> Result<(), GraphError> {
        let record = self
            .edges
            .get_mut(edge.0)
            .ok_or(GraphError::UnknownEdge(edge))?;

        if value.is_nan() || value < 0.0 || value > record.capacity {
            return Err(GraphError::InvalidFlow {
                edge,
                value,
                capacity: record.capacity,
            });
        }

        record.flow = value;
        Ok(())
    }

    /// Attaches a caller-facing id to an edge
    pub fn set_edge_key(
        &mut self,
        edge: EdgeId,
        key: impl Into<String>,
    ) -> Result<(), GraphError> {
        let record = self
            .edges
            .get_mut(edge.0)
            .ok_or(GraphError::UnknownEdge(edge))?;
        record.key = Some(key.into());
        Ok(())
    }

    /// Clears flow and search state. Matches survive; see [`Graph::reset_matching`].
    pub fn reset(&mut self) {
        for edge in &mut self.edges {
            edge.flow = 0.0;
        }
        self.clear_search_state();
    }

    /// Dissolves every match produced by a previous matching run
    pub fn reset_matching(&mut self) {
        for vertex in &mut self.vertices {
            vertex.mate = None;
        }
    }

    pub fn set_source(&mut self, vertex: VertexId) -> Result<(), GraphError> {
        self.key_or_missing(vertex)?;
        self.source = Some(vertex);
        Ok(())
    }

    pub fn set_sink(&mut self, vertex: VertexId) -> Result<(), GraphError> {
        self.key_or_missing(vertex)?;
        self.sink = Some(vertex);
        Ok(())
    }

    pub fn source(&self) -> Option<VertexId> {
        self.source
    }

    pub fn sink(&self) -> Option<VertexId> {
        self.sink
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn find_vertex(&self, key: &str) -> Option<VertexId> {
        self.index.get(key).copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of stored edges, residual twins included
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter().enumerate().map(|(i, v)| (VertexId(i), v))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    /// Edges created through `add_edge`/`add_bidirectional_edge`, in insertion order
    pub fn forward_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges().filter(|(_, edge)| edge.is_forward())
    }

    pub fn side_vertices(&self, side: Side) -> Vec<VertexId> {
        self.vertices()
            .filter(|(_, v)| v.side == side)
            .map(|(id, _)| id)
            .collect()
    }

    /// First forward edge `source -> target` in adjacency order
    pub fn find_edge(&self, source: VertexId, target: VertexId) -> Option<EdgeId> {
        self.vertices.get(source.0)?.adjacency.iter().copied().find(|&e| {
            let edge = &self.edges[e.0];
            edge.target == target && edge.is_forward()
        })
    }

    /// Current matching as `(left, right)` pairs in left-vertex order
    pub fn matching(&self) -> Vec<(VertexId, VertexId)> {
        self.vertices()
            .filter(|(_, v)| v.side == Side::Left)
            .filter_map(|(id, v)| v.mate.map(|mate| (id, mate)))
            .collect()
    }

    pub fn matching_size(&self) -> usize {
        self.matching().len()
    }

    /// Flow leaving `vertex` minus flow entering it, over forward edges
    pub fn net_outflow(&self, vertex: VertexId) -> Capacity {
        self.forward_edges()
            .map(|(_, edge)| {
                if edge.source == vertex && edge.target != vertex {
                    edge.flow
                } else if edge.target == vertex && edge.source != vertex {
                    -edge.flow
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// Value of the flow currently leaving the source
    pub fn total_flow(&self) -> Capacity {
        self.source.map_or(0.0, |s| self.net_outflow(s))
    }

    pub fn key_of(&self, id: VertexId) -> Option<&str> {
        self.vertex(id).map(Vertex::key)
    }

    fn require(&self, key: &str) -> Result<VertexId, GraphError> {
        self.find_vertex(key)
            .ok_or_else(|| GraphError::MissingReference(key.to_owned()))
    }

    fn key_or_missing(&self, id: VertexId) -> Result<&str, GraphError> {
        self.key_of(id)
            .ok_or_else(|| GraphError::MissingReference(id.to_string()))
    }

    // ─── Engine-side mutation ──────────────────────────────────────────────

    pub(crate) fn clear_search_state(&mut self) {
        for vertex in &mut self.vertices {
            vertex.visited = false;
            vertex.predecessor = None;
        }
    }

    pub(crate) fn visit(&mut self, vertex: VertexId, via: Option<EdgeId>) {
        let record = &mut self.vertices[vertex.0];
        record.visited = true;
        record.predecessor = via;
    }

    pub(crate) fn pair(&mut self, left: VertexId, right: VertexId) {
        self.vertices[left.0].mate = Some(right);
        self.vertices[right.0].mate = Some(left);
    }

    /// Moves `delta` units along `edge`, mirrored on its reverse edge.
    /// Returns `(edge, old, new)` for both edges of the pair.
    pub(crate) fn push_flow(
        &mut self,
        edge: EdgeId,
        delta: Capacity,
    ) -> [(EdgeId, Capacity, Capacity); 2] {
        let reverse = self.edges[edge.0].reverse;

        let old = self.edges[edge.0].flow;
        self.edges[edge.0].flow = old + delta;
        let old_reverse = self.edges[reverse.0].flow;
        self.edges[reverse.0].flow = old_reverse - delta;

        [
            (edge, old, old + delta),
            (reverse, old_reverse, old_reverse - delta),
        ]
    }
}
