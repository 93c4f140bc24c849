//! The two charts produced from simulation output.
//!
//! - Disease progression: compartment sizes per day for one vaccination rate
//! - Recovered vs. vaccination rate: final recovered count across the sweep
//!
//! Both `plot_*` functions skip their chart with a message when the input
//! file does not exist, so a partial set of outputs can still be plotted.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use super::chart::{ChartSpec, LegendPosition, Marker, Rgb, Series};
use super::render::render_svg;
use crate::data::{DataError, NumericTable};

pub const DEFAULT_PROGRESSION_FILE: &str = "disease_progression_50.csv";
pub const DEFAULT_HERD_IMMUNITY_FILE: &str = "herd_immunity_results.csv";
pub const DEFAULT_VACCINATION_RATE: f64 = 0.5;
pub const RECOVERED_CHART_FILE: &str = "recovered_vs_vaccination_rate_clean.svg";

/// Compartment columns of a progression file with their line colors.
pub const COMPARTMENTS: [(&str, Rgb); 4] = [
    ("Susceptible", Rgb::BLUE),
    ("Infectious", Rgb::ORANGE),
    ("Recovered", Rgb::GREEN),
    ("Vaccinated", Rgb::RED),
];

/// Headroom above the tallest compartment on the progression chart.
const Y_HEADROOM: f64 = 1.1;

/// Disease parameters shown in the progression chart title.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseaseParams {
    /// D
    pub duration: u32,
    /// C
    pub contacts_per_day: u32,
    /// β
    pub transmissibility: f64,
}

impl Default for DiseaseParams {
    fn default() -> Self {
        Self {
            duration: 3,
            contacts_per_day: 6,
            transmissibility: 0.4,
        }
    }
}

/// Result of a `plot_*` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotOutcome {
    /// Chart written to this path.
    Saved(PathBuf),
    /// Input file did not exist; nothing was written.
    Skipped(PathBuf),
}

impl PlotOutcome {
    /// One-line report shown to the user: `Saved {path}` or `File not found: {input}`.
    pub fn message(&self) -> String {
        match self {
            PlotOutcome::Saved(path) => format!("Saved {}", path.display()),
            PlotOutcome::Skipped(input) => format!("File not found: {}", input.display()),
        }
    }
}

fn skip_missing(input: &Path) -> PlotOutcome {
    let outcome = PlotOutcome::Skipped(input.to_path_buf());
    log::warn!("{}", outcome.message());
    outcome
}

/// Build the progression chart from a `Day,Susceptible,Infectious,Recovered,Vaccinated` table.
pub fn disease_progression_chart(table: &NumericTable, vaccination_rate: f64, params: &DiseaseParams) -> Result<ChartSpec, DataError> {
    let days = table.column("Day")?;
    let mut chart = ChartSpec::new(
        format!(
            "Disease Progression over Time for D = {}, C = {}, β = {}, V = {}",
            params.duration, params.contacts_per_day, params.transmissibility, vaccination_rate
        ),
        "Steps",
        "Number of Individuals",
    );

    for (name, color) in COMPARTMENTS {
        chart.series.push(Series::from_columns(Some(name), color, days, table.column(name)?));
    }

    let names: Vec<&str> = COMPARTMENTS.iter().map(|(name, _)| *name).collect();
    chart.y_range = Some((0.0, table.max_over(&names)? * Y_HEADROOM));
    chart.legend = Some(LegendPosition::UpperRight);
    Ok(chart)
}

/// Build the recovered vs. vaccination rate chart from a sweep results table.
pub fn recovered_vs_vaccination_chart(table: &NumericTable) -> Result<ChartSpec, DataError> {
    let mut chart = ChartSpec::new(
        "Number of Recovered Individuals vs. Vaccination Rate",
        "Vaccination Rate (%)",
        "Number of Recovered Individuals",
    );
    chart.series.push(
        Series::from_columns(None, Rgb::BLUE, table.column("VaccinationRate")?, table.column("Recovered")?).with_marker(Marker { size: 8 }),
    );
    Ok(chart)
}

/// Output file name of the progression chart, e.g. `disease_progression_50_clean.svg`.
pub fn progression_chart_file_name(vaccination_rate: f64) -> String {
    format!("disease_progression_{}_clean.svg", (vaccination_rate * 100.0).round() as i64)
}

/// Infer the vaccination rate from a `disease_progression_{percent}...` file name.
///
/// Percentages above 100 are not a valid rate and yield `None`.
pub fn rate_from_file_name(path: &Path) -> Option<f64> {
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix("disease_progression_")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let percent: u32 = digits.parse().ok()?;
    (percent <= 100).then_some(percent as f64 / 100.0)
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Plot a progression file and save it in `out_dir`.
///
/// # Parameters
///
/// * `input` - Progression CSV
/// * `vaccination_rate` - Rate of the run, used in the title and file name
/// * `params` - Disease parameters for the title
/// * `out_dir` - Directory receiving the SVG
///
/// # Returns
///
/// `Saved(path)` on success, `Skipped(input)` if the input file does not exist.
pub fn plot_disease_progression(input: &Path, vaccination_rate: f64, params: &DiseaseParams, out_dir: &Path) -> anyhow::Result<PlotOutcome> {
    if !input.exists() {
        return Ok(skip_missing(input));
    }

    let table = NumericTable::from_path(input)?;
    let chart = disease_progression_chart(&table, vaccination_rate, params).with_context(|| format!("Cannot plot {}", input.display()))?;

    ensure_dir(out_dir)?;
    let output = out_dir.join(progression_chart_file_name(vaccination_rate));
    render_svg(&chart, &output)?;
    log::info!("Saved disease progression chart to {}", output.display());
    Ok(PlotOutcome::Saved(output))
}

/// Plot a herd immunity results file and save it in `out_dir`.
///
/// # Returns
///
/// `Saved(path)` on success, `Skipped(input)` if the input file does not exist.
pub fn plot_recovered_vs_vaccination_rate(input: &Path, out_dir: &Path) -> anyhow::Result<PlotOutcome> {
    if !input.exists() {
        return Ok(skip_missing(input));
    }

    let table = NumericTable::from_path(input)?;
    let chart = recovered_vs_vaccination_chart(&table).with_context(|| format!("Cannot plot {}", input.display()))?;

    ensure_dir(out_dir)?;
    let output = out_dir.join(RECOVERED_CHART_FILE);
    render_svg(&chart, &output)?;
    log::info!("Saved recovered vs. vaccination rate chart to {}", output.display());
    Ok(PlotOutcome::Saved(output))
}
