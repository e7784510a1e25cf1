//! Problem input and outcome output in the caller's string ids
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod problem;
pub mod solution;

pub use self::problem::{
    ConnectionDef, FlowEdgeDef, FlowProblem, MatchingProblem, ProblemError, ProblemResult,
    VertexDef,
};
pub use self::solution::{EdgeFlow, FlowOutcome, MatchedPair, MatchingOutcome};

use crate::config::EngineConfig;
use crate::execution::emitter::StepEmitter;

/// Builds the bipartite graph and runs matching to completion
pub fn solve_matching(problem: &MatchingProblem) -> ProblemResult<MatchingOutcome> {
    let mut graph = problem.build_graph()?;
    StepEmitter::matching(&mut graph)?.run_to_completion();
    Ok(MatchingOutcome::from_graph(&graph))
}

/// Builds the flow network and runs the configured strategy to completion
pub fn solve_flow(problem: &FlowProblem, config: &EngineConfig) -> ProblemResult<FlowOutcome> {
    let mut graph = problem.build_graph()?;
    StepEmitter::flow(&mut graph, config)?.run_to_completion();
    Ok(FlowOutcome::from_graph(&graph))
}
