//! # Application State Management
//!
//! This module implements the central `AppState` struct which owns the loaded
//! CSV files, their charts and all viewer settings. It implements the
//! `eframe::App` trait to integrate with the egui application framework.
//!
//! ## Responsibilities
//!
//! - Loads the progression and herd immunity CSV files and builds their charts
//! - Reports missing files as notices and unreadable files as alerts
//! - Opens native file pickers and remembers the last directory used
//! - Saves the currently loaded charts as SVG files
//! - Coordinates rendering of the top panel, data panel and chart view

use chrono::{DateTime, Local};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{ChartTab, ViewerOptions, chart_view, data_panel, top_panel};
use crate::data::NumericTable;
use crate::plot::{self, ChartSpec, DiseaseParams, PlotOutcome};

const SETTINGS_KEY: &str = "viewer_settings";

/// A CSV file loaded into the viewer together with its chart.
pub struct LoadedFile {
    pub path: PathBuf,
    pub table: NumericTable,
    pub chart: ChartSpec,
    /// File modification time, shown in the top panel.
    pub modified: Option<DateTime<Local>>,
}

/// Settings persisted across application sessions.
#[derive(Default, Serialize, Deserialize)]
struct PersistedSettings {
    last_open_dir: Option<String>,
    right_panel_width: Option<f32>,
    show_data_panel: Option<bool>,
}

/// Central application state for the chart viewer.
pub struct AppState {
    /// Optional alert message to display in a modal dialog.
    pub alert: Option<String>,
    /// One-line status shown under the controls (missing files, saved charts).
    pub notice: Option<String>,

    pub progression_path: PathBuf,
    pub herd_path: PathBuf,
    /// Vaccination rate of the loaded progression run (V in the title).
    pub vaccination_rate: f64,
    pub params: DiseaseParams,
    /// Directory receiving saved SVG files.
    pub output_dir: PathBuf,

    pub progression: Option<LoadedFile>,
    pub herd: Option<LoadedFile>,
    pub tab: ChartTab,

    /// Whether the right-hand data table is visible.
    pub show_data_panel: bool,
    pub right_panel_width: f32,
    /// Last directory used by the file pickers.
    pub last_open_dir: Option<String>,
}

fn modified_time(path: &Path) -> Option<DateTime<Local>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}

/// Load a CSV file and build its chart.
///
/// # Returns
///
/// `Ok(None)` if the file does not exist, `Err` with a readable message if it
/// cannot be parsed or lacks the required columns.
fn load_file(path: &Path, build: impl FnOnce(&NumericTable) -> Result<ChartSpec, crate::data::DataError>) -> Result<Option<LoadedFile>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let table = NumericTable::from_path(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let chart = build(&table).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(Some(LoadedFile {
        path: path.to_path_buf(),
        table,
        chart,
        modified: modified_time(path),
    }))
}

impl AppState {
    /// Create a new AppState, loading persisted settings and the initial files.
    ///
    /// # Parameters
    ///
    /// * `options` - Files and parameters passed on the command line
    /// * `storage` - Optional persistent storage for loading saved settings
    pub fn new(options: ViewerOptions, storage: Option<&dyn eframe::Storage>) -> Self {
        let persisted: PersistedSettings = storage.and_then(|s| eframe::get_value(s, SETTINGS_KEY)).unwrap_or_default();

        let mut state = Self {
            alert: None,
            notice: None,
            progression_path: options.progression_path,
            herd_path: options.herd_path,
            vaccination_rate: options.vaccination_rate,
            params: options.params,
            output_dir: options.output_dir,
            progression: None,
            herd: None,
            tab: ChartTab::default(),
            show_data_panel: persisted.show_data_panel.unwrap_or(true),
            right_panel_width: persisted.right_panel_width.unwrap_or(360.0),
            last_open_dir: persisted.last_open_dir,
        };
        state.reload();
        state
    }

    /// Reload both files from disk.
    pub fn reload(&mut self) {
        let mut missing = Vec::new();
        self.load_progression();
        if self.progression.is_none() {
            missing.push(PlotOutcome::Skipped(self.progression_path.clone()).message());
        }
        self.load_herd();
        if self.herd.is_none() {
            missing.push(PlotOutcome::Skipped(self.herd_path.clone()).message());
        }

        self.notice = if missing.is_empty() { None } else { Some(missing.join("; ")) };
    }

    /// (Re)load the progression file at `progression_path`.
    pub fn load_progression(&mut self) {
        let rate = self.vaccination_rate;
        let params = self.params;
        match load_file(&self.progression_path, |table| plot::disease_progression_chart(table, rate, &params)) {
            Ok(loaded) => {
                if loaded.is_none() {
                    log::warn!("File not found: {}", self.progression_path.display());
                }
                self.progression = loaded;
            }
            Err(msg) => {
                log::error!("Failed to load progression file: {}", msg);
                self.progression = None;
                self.alert = Some(msg);
            }
        }
    }

    /// (Re)load the herd immunity results file at `herd_path`.
    pub fn load_herd(&mut self) {
        match load_file(&self.herd_path, plot::recovered_vs_vaccination_chart) {
            Ok(loaded) => {
                if loaded.is_none() {
                    log::warn!("File not found: {}", self.herd_path.display());
                }
                self.herd = loaded;
            }
            Err(msg) => {
                log::error!("Failed to load herd immunity file: {}", msg);
                self.herd = None;
                self.alert = Some(msg);
            }
        }
    }

    /// Rebuild the progression chart title after the vaccination rate changed.
    pub fn refresh_progression_chart(&mut self) {
        if let Some(loaded) = &mut self.progression {
            match plot::disease_progression_chart(&loaded.table, self.vaccination_rate, &self.params) {
                Ok(chart) => loaded.chart = chart,
                Err(e) => self.alert = Some(e.to_string()),
            }
        }
    }

    /// The file shown on the active tab, if loaded.
    pub fn active_file(&self) -> Option<&LoadedFile> {
        match self.tab {
            ChartTab::Progression => self.progression.as_ref(),
            ChartTab::RecoveredVsVaccination => self.herd.as_ref(),
        }
    }

    fn pick_csv(&mut self) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().add_filter("CSV files", &["csv"]);
        if let Some(dir) = &self.last_open_dir {
            dialog = dialog.set_directory(dir);
        }
        let file = dialog.pick_file()?;
        // Remember directory for next time
        if let Some(parent) = file.parent() {
            self.last_open_dir = Some(parent.to_string_lossy().to_string());
        }
        Some(file)
    }

    /// Open a file picker for a progression CSV and load it.
    ///
    /// The vaccination rate is taken from the file name when it follows the
    /// `disease_progression_{percent}.csv` pattern.
    pub fn open_progression_picker(&mut self) {
        if let Some(path) = self.pick_csv() {
            if let Some(rate) = plot::rate_from_file_name(&path) {
                self.vaccination_rate = rate;
            }
            self.progression_path = path;
            self.load_progression();
            self.tab = ChartTab::Progression;
        }
    }

    /// Open a file picker for a herd immunity results CSV and load it.
    pub fn open_herd_picker(&mut self) {
        if let Some(path) = self.pick_csv() {
            self.herd_path = path;
            self.load_herd();
            self.tab = ChartTab::RecoveredVsVaccination;
        }
    }

    /// Save both charts as SVG files into `output_dir`.
    ///
    /// Goes through the same `plot_*` functions as the command line, so a
    /// missing input is skipped rather than reported as an error.
    pub fn save_charts(&mut self) {
        let results = [
            plot::plot_disease_progression(&self.progression_path, self.vaccination_rate, &self.params, &self.output_dir),
            plot::plot_recovered_vs_vaccination_rate(&self.herd_path, &self.output_dir),
        ];

        let mut messages = Vec::new();
        for result in results {
            match result {
                Ok(outcome) => messages.push(outcome.message()),
                Err(e) => {
                    self.alert = Some(format!("Failed to save chart: {:#}", e));
                    return;
                }
            }
        }
        self.notice = Some(messages.join("; "));
    }
}

impl eframe::App for AppState {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            last_open_dir: self.last_open_dir.clone(),
            right_panel_width: Some(self.right_panel_width),
            show_data_panel: Some(self.show_data_panel),
        };
        eframe::set_value(storage, SETTINGS_KEY, &settings);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        top_panel::render(ctx, self);
        if self.show_data_panel {
            data_panel::render(ctx, self);
        }
        chart_view::render(ctx, self);

        if let Some(alert) = self.alert.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(alert);
                    if ui.button("OK").clicked() {
                        self.alert = None;
                    }
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PROGRESSION: &str = "Day,Susceptible,Infectious,Recovered,Vaccinated\n0,9,1,0,0\n1,9,0,1,0\n";
    const HERD: &str = "VaccinationRate,Infected,Recovered,Susceptible\n0%,0,9,1\n100%,0,0,0\n";

    fn options(dir: &Path) -> ViewerOptions {
        ViewerOptions {
            progression_path: dir.join("disease_progression_50.csv"),
            herd_path: dir.join("herd_immunity_results.csv"),
            vaccination_rate: 0.5,
            params: DiseaseParams::default(),
            output_dir: dir.join("charts"),
        }
    }

    #[test]
    fn loads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("disease_progression_50.csv"), PROGRESSION).unwrap();
        fs::write(dir.path().join("herd_immunity_results.csv"), HERD).unwrap();

        let state = AppState::new(options(dir.path()), None);
        assert!(state.alert.is_none());
        assert!(state.notice.is_none());
        assert_eq!(state.progression.as_ref().unwrap().table.len(), 2);
        assert_eq!(state.herd.as_ref().unwrap().chart.series[0].points.len(), 2);
        assert!(state.active_file().is_some());
    }

    #[test]
    fn missing_files_become_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(options(dir.path()), None);
        assert!(state.alert.is_none());
        assert!(state.progression.is_none());
        assert!(state.herd.is_none());
        let expected = format!(
            "File not found: {}; File not found: {}",
            dir.path().join("disease_progression_50.csv").display(),
            dir.path().join("herd_immunity_results.csv").display()
        );
        assert_eq!(state.notice.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn malformed_file_raises_alert() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("herd_immunity_results.csv"), "Recovered\n1\n").unwrap();
        let state = AppState::new(options(dir.path()), None);
        assert!(state.herd.is_none());
        assert!(state.alert.as_ref().unwrap().contains("Missing column"));
    }

    #[test]
    fn rate_change_updates_title() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("disease_progression_50.csv"), PROGRESSION).unwrap();
        let mut state = AppState::new(options(dir.path()), None);
        state.vaccination_rate = 0.3;
        state.refresh_progression_chart();
        assert!(state.progression.as_ref().unwrap().chart.title.ends_with("V = 0.3"));
    }

    #[test]
    fn save_charts_writes_available_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("herd_immunity_results.csv"), HERD).unwrap();
        let mut state = AppState::new(options(dir.path()), None);
        state.save_charts();
        assert!(state.alert.is_none());
        assert!(dir.path().join("charts").join(plot::figures::RECOVERED_CHART_FILE).exists());
        assert!(!dir.path().join("charts").join("disease_progression_50_clean.svg").exists());
        let expected = format!(
            "File not found: {}; Saved {}",
            dir.path().join("disease_progression_50.csv").display(),
            dir.path().join("charts").join(plot::figures::RECOVERED_CHART_FILE).display()
        );
        assert_eq!(state.notice.as_deref(), Some(expected.as_str()));
    }
}
