//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use std::path::PathBuf;

use astrahl_sim::AllocationStrategy;
use clap::{Args, Parser, Subcommand};

/// Backend name that evaluates probabilities in-process.
pub(crate) const REFERENCE_SOLVER: &str = "reference";

#[derive(Parser)]
#[command(name = "astrahl")]
#[command(about = "Fault-tree testing budget allocation and fault-fixing experiments")]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Ask the solver how to split a testing budget across wires
    Splits {
        /// Fault tree JSON file
        tree: PathBuf,

        /// JSON object mapping wire names to their current position
        #[arg(long)]
        point: PathBuf,

        /// Testing budget to spend
        #[arg(long)]
        budget: f64,

        #[command(flatten)]
        confidence: ConfidenceArgs,

        #[command(flatten)]
        sa: SaArgs,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Top-event probability for given per-wire fault probabilities
    Propagate {
        /// Fault tree JSON file
        tree: PathBuf,

        /// JSON object mapping wire names to fault probabilities
        #[arg(long)]
        point: PathBuf,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Split a budget with a reference strategy
    Baseline {
        /// Fault tree JSON file
        tree: PathBuf,

        /// JSON object mapping wire names to their current position
        #[arg(long)]
        point: PathBuf,

        #[arg(long)]
        budget: f64,

        /// uniform | proportional | random | solver
        #[arg(long, default_value = "uniform")]
        strategy: AllocationStrategy,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[command(flatten)]
        confidence: ConfidenceArgs,

        #[command(flatten)]
        sa: SaArgs,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Scatter faults over the wires, optionally test them, and report the
    /// system failure probability
    Faults {
        /// Fault tree JSON file
        tree: PathBuf,

        /// JSON object mapping wire names to their current position
        #[arg(long)]
        point: PathBuf,

        /// Number of faults to scatter
        #[arg(long, default_value_t = 20)]
        faults: usize,

        /// Times a fault may pick "no wire" before it is dropped
        #[arg(long, default_value_t = 1)]
        drop_limit: u32,

        /// JSON object mapping wire names to testing allowances
        #[arg(long)]
        allocation: Option<PathBuf>,

        #[arg(long, default_value_t = 10.0)]
        test_cost: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[command(flatten)]
        confidence: ConfidenceArgs,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Draw rows of initial per-wire fault counts
    FaultCounts {
        /// JSON object mapping wire names to their current position
        #[arg(long)]
        point: PathBuf,

        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Base of the confidence function `1 - base^(x + 1)`
        #[arg(long, default_value_t = 0.99)]
        confidence_base: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Monte Carlo failure probability after testing each row of fault counts
    Empirical {
        /// Fault tree JSON file
        tree: PathBuf,

        /// JSON object mapping wire names to testing allowances
        #[arg(long)]
        allocation: PathBuf,

        /// JSON array of objects mapping wire names to fault counts
        #[arg(long)]
        counts: PathBuf,

        #[arg(long, default_value_t = 100)]
        samples: usize,

        #[arg(long, default_value_t = 10.0)]
        test_cost: f64,

        /// Detection chance shared by every fault
        #[arg(long, default_value_t = 0.1)]
        fault_observability: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Failure probability at the end point of each start point's split
    Theoretical {
        /// Fault tree JSON file
        tree: PathBuf,

        /// JSON array of objects mapping wire names to start positions
        #[arg(long)]
        start: PathBuf,

        #[arg(long)]
        budget: f64,

        /// uniform | proportional | random | solver
        #[arg(long, default_value = "uniform")]
        strategy: AllocationStrategy,

        /// Base of the confidence function `1 - base^(x + 1)`
        #[arg(long, default_value_t = 0.99)]
        confidence_base: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[command(flatten)]
        sa: SaArgs,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Generate a random And/Or tree
    RandomTree {
        /// Number of wires
        #[arg(long)]
        size: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Render a fault tree as Graphviz
    Dot {
        /// Fault tree JSON file
        tree: PathBuf,

        /// JSON object mapping wire names to values shown on the leaves
        #[arg(long)]
        values: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SolverArgs {
    /// Solver executable, or `reference` for the in-process propagator
    #[arg(long = "solver", env = "ASTRAHL_SOLVER", default_value = REFERENCE_SOLVER)]
    pub(crate) executable: String,

    /// Directory for request files
    #[arg(long)]
    pub(crate) scratch_dir: Option<PathBuf>,

    /// Leave request files behind after each call
    #[arg(long)]
    pub(crate) keep_files: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConfidenceArgs {
    /// JSON object mapping wire names to confidence expressions
    #[arg(long = "confidence")]
    pub(crate) file: Option<PathBuf>,

    /// Base of the confidence function `1 - base^(x + 1)` used for every wire
    /// without a confidence file
    #[arg(long, default_value_t = 0.99)]
    pub(crate) confidence_base: f64,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SaArgs {
    #[arg(long, default_value_t = 10_000)]
    pub(crate) max_step: u64,

    #[arg(long, default_value_t = 0.999)]
    pub(crate) p_init: f64,

    #[arg(long, default_value_t = 1.0)]
    pub(crate) lambda: f64,

    #[arg(long)]
    pub(crate) function_constant: Option<f64>,
}
