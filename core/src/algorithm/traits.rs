//! Core algorithm trait definitions for the steppable engines
//!
//! Every engine is an explicit resumable state machine: the caller asks for
//! one step at a time and receives a [`Frame`] describing the progress made.
//! Engines own their search-scoped bookkeeping (frontiers, cursors, heights)
//! and borrow the [`Graph`] for the duration of a single step only, so there
//! is no ambient state shared between runs.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::data_structures::graph::{EdgeId, Graph, GraphError};
use crate::execution::frame::Frame;

/// Universal algorithm identifier
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Asymptotic cost of an algorithm in Big-O notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmComplexity {
    pub time: &'static str,
    pub space: &'static str,
}

/// Data structure holding the search frontier, as shown to visualizers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontierKind {
    Stack,
    Queue,
    None,
}

impl fmt::Display for FrontierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrontierKind::Stack => "stack",
            FrontierKind::Queue => "queue",
            FrontierKind::None => "none",
        };
        f.write_str(name)
    }
}

/// Errors raised when an engine is set up on an unsuitable graph
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Edge {0} does not connect a left vertex to a right vertex")]
    NotBipartite(EdgeId),

    #[error("Flow network has no {0} vertex")]
    MissingTerminal(&'static str),

    #[error("Source and sink must be distinct vertices")]
    SourceIsSink,
}

/// A resumable algorithm run
///
/// # Contract
/// - `step` performs exactly one unit of progress and describes it
/// - The last frame of a run has `done == true`; `step` is not called again
///   after that
/// - A step leaves the graph consistent, so a caller may stop at any frame
pub trait StepAlgorithm: Debug {
    /// Returns the algorithm's unique identifier
    fn id(&self) -> AlgorithmId {
        AlgorithmId::new(self.name())
    }

    /// Returns the algorithm's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the algorithm's category (matching or max_flow)
    fn category(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn complexity(&self) -> AlgorithmComplexity;

    fn frontier(&self) -> FrontierKind;

    /// Advances the run by one step. The frame's `step` field is assigned by the caller.
    fn step(&mut self, graph: &mut Graph) -> Frame;
}
