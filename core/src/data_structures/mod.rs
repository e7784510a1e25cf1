//! Core data structures
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;

pub use self::graph::{Capacity, Edge, EdgeId, EdgeKind, Graph, GraphError, Side, Vertex, VertexId};
