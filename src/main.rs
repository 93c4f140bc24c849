//! # Disease Propagation Simulator
//!
//! Agent-based SIRV simulation of a disease spreading through populations,
//! with a herd immunity sweep over vaccination rates and SVG charts of the
//! results. An egui viewer shows the same charts interactively.
//!
//! ## Modules
//!
//! - `common`: scenario configuration loading and validation
//! - `simulation`: people, populations, the daily simulation loop and CSV output
//! - `data`: numeric CSV tables read back for plotting
//! - `plot`: chart model and SVG rendering
//! - `ui`: chart viewer
//! - `cli`: command line parsing and dispatch

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

mod cli;
mod common;
mod data;
mod plot;
mod simulation;
mod ui;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Logging setup
    let crate_level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("disease_propagation_simulator"), crate_level)
        .parse_default_env()
        .init();

    cli::execute(cli.command)
}
