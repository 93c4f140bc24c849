//! Charts of simulation output.
//!
//! - `chart`: backend-neutral chart model, axis bounds and tick placement
//! - `render`: SVG output through `plotters`
//! - `figures`: the disease progression and recovered vs. vaccination rate charts

pub mod chart;
pub mod figures;
pub mod render;

pub use chart::{ChartSpec, LegendPosition, Rgb};
pub use figures::{
    DiseaseParams, PlotOutcome, disease_progression_chart, plot_disease_progression, plot_recovered_vs_vaccination_rate,
    rate_from_file_name, recovered_vs_vaccination_chart,
};
