// Chart viewer for simulation output
//
// This module organizes the viewer into separate components:
// - `top_panel`: File actions, file info and vaccination rate
// - `data_panel`: Table of the CSV behind the active chart
// - `chart_view`: Central chart painted with the egui painter
// - `app_state`: Application state management and main update loop

pub mod app_state;
pub mod chart_view;
pub mod data_panel;
pub mod top_panel;

use eframe::egui;
use std::path::PathBuf;

use crate::plot::DiseaseParams;

pub use app_state::AppState;

/// Chart shown in the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    Progression,
    RecoveredVsVaccination,
}

impl ChartTab {
    pub fn label(self) -> &'static str {
        match self {
            ChartTab::Progression => "Disease progression",
            ChartTab::RecoveredVsVaccination => "Recovered vs. vaccination rate",
        }
    }
}

/// Files and parameters the viewer starts with.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub progression_path: PathBuf,
    pub herd_path: PathBuf,
    pub vaccination_rate: f64,
    pub params: DiseaseParams,
    /// Directory receiving charts saved from the viewer.
    pub output_dir: PathBuf,
}

/// Open the viewer window and block until it is closed.
pub fn run_viewer(options: ViewerOptions) -> anyhow::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 900.0]).with_title("Disease Propagation Viewer"),
        ..Default::default()
    };
    eframe::run_native(
        "Disease Propagation Viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(AppState::new(options, cc.storage)))),
    )
    .map_err(|e| anyhow::anyhow!("Viewer failed: {}", e))
}
