//! FLOWSCOPE core: steppable augmenting-path algorithms
//!
//! Maximum bipartite matching and maximum flow over an arena-backed residual
//! graph, executed one observable step at a time. Each step yields a
//! [`Frame`] describing what it touched, so a visualizer can animate the run
//! while the [`Graph`] always holds consistent intermediate state.
//!
//! ```no_run
//! use flowscope_core::{EngineConfig, FlowProblem, StepEmitter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let problem = FlowProblem::from_json(&std::fs::read_to_string("network.json")?)?;
//! let mut graph = problem.build_graph()?;
//! let mut emitter = StepEmitter::flow(&mut graph, &EngineConfig::default())?;
//! for frame in emitter.by_ref() {
//!     println!("{:?}", frame.kind);
//! }
//! println!("max flow = {:?}", emitter.result());
//! # Ok(())
//! # }
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod config;
pub mod data_structures;
pub mod execution;
pub mod io;
pub mod validation;

pub use algorithm::graph::{min_cut, BipartiteMatching, FlowStrategy, MinCut};
pub use algorithm::traits::{EngineError, FrontierKind, StepAlgorithm};
pub use config::{ConfigError, EngineConfig};
pub use data_structures::graph::{
    Capacity, Edge, EdgeId, EdgeKind, Graph, GraphError, Side, Vertex, VertexId,
};
pub use execution::{Frame, FrameHistory, FrameView, StepEmitter, StepKind};
pub use io::{
    solve_flow, solve_matching, FlowOutcome, FlowProblem, MatchingOutcome, MatchingProblem,
    ProblemError,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
