//! FLOWSCOPE command line driver
//!
//! Reads a matching or flow problem from JSON, runs the engine and prints
//! the outcome (and optionally every frame) as pretty JSON.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use flowscope_core::algorithm::AlgorithmComplexity;
use flowscope_core::{
    min_cut, EngineConfig, FlowOutcome, FlowProblem, FlowStrategy, FrameHistory, FrameView, Graph,
    MatchingOutcome, MatchingProblem, StepEmitter,
};

#[derive(Parser)]
#[command(name = "flowscope")]
#[command(version, about = "Steppable maximum matching and maximum flow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Maximum bipartite matching
    Match {
        /// Path to the matching problem JSON file
        problem_path: PathBuf,
        /// Print every frame of the run
        #[arg(long)]
        trace: bool,
    },
    /// Maximum flow between the problem's source and sink
    Flow {
        /// Path to the flow problem JSON file
        problem_path: PathBuf,
        /// Augmentation strategy: dfs, bfs or push-relabel
        #[arg(short, long)]
        strategy: Option<FlowStrategy>,
        /// Engine configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print every frame of the run
        #[arg(long)]
        trace: bool,
        /// Also report a minimum cut
        #[arg(long)]
        min_cut: bool,
    },
    /// List the available flow strategies
    Strategies,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<T: Serialize> {
    algorithm: Descriptor,
    steps: usize,
    outcome: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_cut: Option<CutReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<Vec<FrameView>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Descriptor {
    id: String,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    frontier: String,
    complexity: AlgorithmComplexity,
}

impl Descriptor {
    fn of(emitter: &StepEmitter<'_>) -> Self {
        let algorithm = emitter.algorithm();
        Self {
            id: algorithm.id().as_str().to_owned(),
            name: algorithm.name(),
            category: algorithm.category(),
            description: algorithm.description(),
            frontier: algorithm.frontier().to_string(),
            complexity: algorithm.complexity(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CutReport {
    source_side: Vec<String>,
    cut_edges: Vec<String>,
    capacity: f64,
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            problem_path,
            trace,
        } => cmd_match(&problem_path, trace),
        Commands::Flow {
            problem_path,
            strategy,
            config,
            trace,
            min_cut,
        } => cmd_flow(&problem_path, strategy, config.as_deref(), trace, min_cut),
        Commands::Strategies => {
            for strategy in FlowStrategy::ALL {
                println!("{:<14} {} ({})", strategy, strategy.long_name(), strategy.frontier());
            }
            Ok(())
        }
    }
}

fn cmd_match(problem_path: &Path, trace: bool) -> Result<()> {
    let problem = MatchingProblem::load(problem_path)
        .with_context(|| format!("Failed to load matching problem {}", problem_path.display()))?;
    let mut graph = problem
        .build_graph()
        .context("Invalid matching problem")?;

    let mut emitter = StepEmitter::matching(&mut graph).context("Cannot start matching")?;
    let algorithm = Descriptor::of(&emitter);
    let (steps, frames) = drive(&mut emitter, trace)?;
    drop(emitter);

    let outcome = MatchingOutcome::from_graph(&graph);
    info!(
        "Matched {} of {} left vertices",
        outcome.size,
        problem.left_vertices.len()
    );

    print_report(&Report {
        algorithm,
        steps,
        outcome,
        min_cut: None,
        frames: frames.map(|f| views(&f, &graph)),
    })
}

fn cmd_flow(
    problem_path: &Path,
    strategy: Option<FlowStrategy>,
    config_path: Option<&Path>,
    trace: bool,
    report_cut: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    let trace = trace || config.record_history;

    let problem = FlowProblem::load(problem_path)
        .with_context(|| format!("Failed to load flow problem {}", problem_path.display()))?;
    let mut graph = problem.build_graph().context("Invalid flow problem")?;

    let mut emitter = StepEmitter::flow(&mut graph, &config).context("Cannot start flow run")?;
    let algorithm = Descriptor::of(&emitter);
    let (steps, frames) = drive(&mut emitter, trace)?;
    drop(emitter);

    let outcome = FlowOutcome::from_graph(&graph);
    info!("Maximum flow {} using {}", outcome.total_flow, config.strategy.long_name());

    let cut = if report_cut {
        let cut = min_cut(&graph, config.epsilon).context("Cannot compute minimum cut")?;
        if (cut.capacity - outcome.total_flow).abs() > config.epsilon {
            warn!(
                "Cut capacity {} differs from flow value {}",
                cut.capacity, outcome.total_flow
            );
        }
        Some(CutReport {
            source_side: cut
                .source_side
                .iter()
                .filter_map(|&v| graph.key_of(v).map(str::to_owned))
                .collect(),
            cut_edges: cut
                .cut_edges
                .iter()
                .filter_map(|&e| graph.edge(e).and_then(|edge| edge.key()).map(str::to_owned))
                .collect(),
            capacity: cut.capacity,
        })
    } else {
        None
    };

    print_report(&Report {
        algorithm,
        steps,
        outcome,
        min_cut: cut,
        frames: frames.map(|f| views(&f, &graph)),
    })
}

/// Runs the emitter to completion, keeping the frames when tracing
fn drive(
    emitter: &mut StepEmitter<'_>,
    trace: bool,
) -> Result<(usize, Option<FrameHistory>)> {
    if trace {
        let history = FrameHistory::record_run(emitter).context("Failed to record frames")?;
        Ok((history.len(), Some(history)))
    } else {
        emitter.run_to_completion();
        Ok((emitter.steps_emitted(), None))
    }
}

fn views(history: &FrameHistory, graph: &Graph) -> Vec<FrameView> {
    history.frames().iter().map(|frame| frame.view(graph)).collect()
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

fn print_report<T: Serialize>(report: &Report<T>) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}
