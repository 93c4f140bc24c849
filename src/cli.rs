//! Command line interface.
//!
//! - `simulate`: run the configured populations and the herd immunity sweep
//! - `plot`: turn simulation CSVs into SVG charts
//! - `run`: `simulate` followed by `plot`
//! - `view`: open the chart viewer

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use crate::common::{ScenarioConfig, load_config};
use crate::plot;
use crate::plot::figures::{DEFAULT_HERD_IMMUNITY_FILE, DEFAULT_PROGRESSION_FILE, DEFAULT_VACCINATION_RATE};
use crate::simulation::output::{progression_file_name, write_population_reports, write_sweep};
use crate::simulation::sweep::{matching_sweep_rate, nearest_sweep_rate};
use crate::simulation::{run_herd_immunity_test, run_populations};
use crate::ui::{ViewerOptions, run_viewer};

#[derive(Parser, Debug)]
#[command(name = "disease-propagation-simulator", version, about = "SIRV disease propagation simulator and chart tool")]
pub struct Cli {
    /// Enable debug logging for this crate
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the configured populations and the herd immunity sweep
    Simulate(SimulateArgs),
    /// Plot simulation CSVs as SVG charts
    Plot(PlotArgs),
    /// Simulate, then plot the results
    Run(RunArgs),
    /// Open the chart viewer
    View(ViewArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Scenario file (TOML); built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory, overrides `[output] directory`
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ChartInputArgs {
    /// Progression CSV [default: <out-dir>/disease_progression_50.csv]
    #[arg(long)]
    pub progression: Option<PathBuf>,

    /// Vaccination rate of the progression CSV, inferred from its name when omitted
    #[arg(long)]
    pub rate: Option<f64>,

    /// Herd immunity results CSV [default: <out-dir>/herd_immunity_results.csv]
    #[arg(long)]
    pub herd: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// RNG seed, overrides `seed` in the scenario file
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub inputs: ChartInputArgs,

    /// Open the viewer after saving the charts
    #[arg(long)]
    pub show: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// RNG seed, overrides `seed` in the scenario file
    #[arg(long)]
    pub seed: Option<u64>,

    /// Vaccination rate whose progression is plotted
    #[arg(long)]
    pub rate: Option<f64>,

    /// Open the viewer after saving the charts
    #[arg(long)]
    pub show: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub inputs: ChartInputArgs,
}

/// Load the scenario file if given and apply command line overrides.
fn resolve_config(args: &ConfigArgs, seed: Option<u64>) -> anyhow::Result<ScenarioConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("Cannot load scenario {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if let Some(dir) = &args.out_dir {
        config.output.directory = dir.clone();
    }
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

/// Chart inputs with defaults filled in relative to the output directory.
fn resolve_inputs(inputs: &ChartInputArgs, config: &ScenarioConfig) -> ViewerOptions {
    let dir = &config.output.directory;
    let progression_path = inputs.progression.clone().unwrap_or_else(|| dir.join(DEFAULT_PROGRESSION_FILE));
    let vaccination_rate = inputs
        .rate
        .or_else(|| plot::rate_from_file_name(&progression_path))
        .unwrap_or(DEFAULT_VACCINATION_RATE);

    ViewerOptions {
        progression_path,
        herd_path: inputs.herd.clone().unwrap_or_else(|| dir.join(DEFAULT_HERD_IMMUNITY_FILE)),
        vaccination_rate,
        params: config.disease.params(),
        output_dir: dir.clone(),
    }
}

fn simulate(config: &ScenarioConfig) -> anyhow::Result<()> {
    let disease = config.disease.to_disease()?;
    let dir = &config.output.directory;
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let reports = run_populations(&disease, &config.populations, config.seed)?;
    write_population_reports(dir, &reports)?;

    let points = run_herd_immunity_test(&disease, &config.herd_immunity, config.seed)?;
    let written = write_sweep(dir, &points)?;
    info!("Wrote {} files to {}", written.len() + reports.len(), dir.display());
    Ok(())
}

fn plot_charts(options: &ViewerOptions) -> anyhow::Result<()> {
    let outcomes = [
        plot::plot_disease_progression(&options.progression_path, options.vaccination_rate, &options.params, &options.output_dir)?,
        plot::plot_recovered_vs_vaccination_rate(&options.herd_path, &options.output_dir)?,
    ];
    for outcome in outcomes {
        println!("{}", outcome.message());
    }
    Ok(())
}

fn validate_rate(rate: Option<f64>) -> anyhow::Result<()> {
    match rate {
        Some(r) if !(0.0..=1.0).contains(&r) => anyhow::bail!("Vaccination rate must be between 0 and 1, got {}", r),
        _ => Ok(()),
    }
}

/// Sweep rate whose progression `run` plots.
///
/// An explicit `--rate` must name a rate the sweep writes a file for; without
/// one the default rate is snapped to the closest sweep rate.
fn run_rate(rate: Option<f64>, steps: u32) -> anyhow::Result<f64> {
    match rate {
        Some(rate) => matching_sweep_rate(rate, steps).with_context(|| {
            format!(
                "Vaccination rate {} is not simulated by a sweep of {} steps; use a multiple of 1/{}",
                rate, steps, steps
            )
        }),
        None => Ok(nearest_sweep_rate(DEFAULT_VACCINATION_RATE, steps)),
    }
}

/// Progression file written by `simulate` for `rate` in `dir`.
fn progression_path_for(dir: &Path, rate: f64) -> PathBuf {
    dir.join(progression_file_name(rate))
}

/// Execute a parsed command.
pub fn execute(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Simulate(args) => {
            let config = resolve_config(&args.config, args.seed)?;
            simulate(&config)
        }
        Command::Plot(args) => {
            validate_rate(args.inputs.rate)?;
            let config = resolve_config(&args.config, None)?;
            let options = resolve_inputs(&args.inputs, &config);
            plot_charts(&options)?;
            if args.show {
                run_viewer(options)?;
            }
            Ok(())
        }
        Command::Run(args) => {
            validate_rate(args.rate)?;
            let config = resolve_config(&args.config, args.seed)?;
            let rate = run_rate(args.rate, config.herd_immunity.rate_steps)?;
            simulate(&config)?;

            let inputs = ChartInputArgs {
                progression: Some(progression_path_for(&config.output.directory, rate)),
                rate: Some(rate),
                herd: None,
            };
            let options = resolve_inputs(&inputs, &config);
            plot_charts(&options)?;
            if args.show {
                run_viewer(options)?;
            }
            Ok(())
        }
        Command::View(args) => {
            validate_rate(args.inputs.rate)?;
            let config = resolve_config(&args.config, None)?;
            run_viewer(resolve_inputs(&args.inputs, &config))
        }
    }
}
