#![doc = include_str!("../README.md")]

mod cli;
mod commands;

use astrahl_sim::MonteCarlo;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::helpers::print_json;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Splits {
            tree,
            point,
            budget,
            confidence,
            sa,
            solver,
        } => {
            let split = commands::splits::run_splits_command(
                &tree,
                &point,
                budget,
                &confidence,
                &sa,
                &solver,
            )?;
            print_json(&split)?;
        }
        Commands::Propagate {
            tree,
            point,
            solver,
        } => {
            let report = commands::propagate::run_propagate_command(&tree, &point, &solver)?;
            print_json(&report)?;
        }
        Commands::Baseline {
            tree,
            point,
            budget,
            strategy,
            seed,
            confidence,
            sa,
            solver,
        } => {
            let report = commands::baseline::run_baseline_command(
                &tree,
                &point,
                budget,
                strategy,
                seed,
                &confidence,
                &sa,
                &solver,
            )?;
            print_json(&report)?;
        }
        Commands::Faults {
            tree,
            point,
            faults,
            drop_limit,
            allocation,
            test_cost,
            seed,
            confidence,
            solver,
        } => {
            let report = commands::faults::run_faults_command(
                &tree,
                &point,
                faults,
                drop_limit,
                allocation.as_deref(),
                test_cost,
                seed,
                &confidence,
                &solver,
            )?;
            print_json(&report)?;
        }
        Commands::FaultCounts {
            point,
            rows,
            confidence_base,
            seed,
        } => {
            let counts = commands::fault_counts::run_fault_counts_command(
                &point,
                rows,
                confidence_base,
                seed,
            )?;
            print_json(&counts)?;
        }
        Commands::Empirical {
            tree,
            allocation,
            counts,
            samples,
            test_cost,
            fault_observability,
            seed,
            solver,
        } => {
            let monte_carlo = MonteCarlo {
                samples,
                test_cost,
                fault_observability,
                seed,
            };
            let report = commands::empirical::run_empirical_command(
                &tree,
                &allocation,
                &counts,
                &monte_carlo,
                &solver,
            )?;
            print_json(&report)?;
        }
        Commands::Theoretical {
            tree,
            start,
            budget,
            strategy,
            confidence_base,
            seed,
            sa,
            solver,
        } => {
            let report = commands::theoretical::run_theoretical_command(
                &tree,
                &start,
                budget,
                strategy,
                confidence_base,
                seed,
                &sa,
                &solver,
            )?;
            print_json(&report)?;
        }
        Commands::RandomTree { size, seed } => {
            let tree = commands::random_tree::run_random_tree_command(size, seed)?;
            print_json(&tree)?;
        }
        Commands::Dot { tree, values } => {
            println!(
                "{}",
                commands::dot::run_dot_command(&tree, values.as_deref())?
            );
        }
    }
    Ok(())
}
