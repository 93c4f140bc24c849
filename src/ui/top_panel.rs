//! # Top Panel - Files and Controls
//!
//! Renders the top panel with two rows:
//! - File actions: open progression/results CSV, reload, save SVG, data panel toggle
//! - File info: loaded paths with their modification time and the vaccination rate
//!
//! A status line below shows missing-file notices and save results.

use chrono::{DateTime, Local};
use eframe::egui;

use super::AppState;
use super::app_state::LoadedFile;

fn format_modified(modified: Option<DateTime<Local>>) -> String {
    match modified {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "--".to_string(),
    }
}

fn file_row(ui: &mut egui::Ui, caption: &str, loaded: Option<&LoadedFile>) {
    ui.horizontal(|ui| {
        ui.label(caption);
        match loaded {
            Some(file) => {
                ui.label(egui::RichText::new(file.path.display().to_string()).monospace().strong());
                ui.label(format!("({} rows, modified {})", file.table.len(), format_modified(file.modified)));
            }
            None => {
                ui.label(egui::RichText::new("not loaded").italics());
            }
        }
    });
}

/// Render the top panel with file actions and info.
///
/// # Parameters
///
/// * `ctx` - egui context
/// * `state` - Mutable application state for triggering loads and saves
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_controls").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Open progression CSV…").clicked() {
                state.open_progression_picker();
            }
            if ui.button("Open results CSV…").clicked() {
                state.open_herd_picker();
            }
            if ui.button("Reload").clicked() {
                state.reload();
            }
            if ui.button("Save SVG").on_hover_text(format!("Save charts into {}", state.output_dir.display())).clicked() {
                state.save_charts();
            }
            ui.separator();
            ui.checkbox(&mut state.show_data_panel, "Data table");
        });
        ui.separator();

        file_row(ui, "Progression:", state.progression.as_ref());
        file_row(ui, "Results:", state.herd.as_ref());

        ui.horizontal(|ui| {
            ui.label("Vaccination rate:");
            let changed = ui
                .add(egui::DragValue::new(&mut state.vaccination_rate).range(0.0..=1.0).speed(0.01).max_decimals(2))
                .changed();
            if changed {
                state.refresh_progression_chart();
            }
            ui.label(format!(
                "D = {}, C = {}, β = {}",
                state.params.duration, state.params.contacts_per_day, state.params.transmissibility
            ));
        });

        if let Some(notice) = &state.notice {
            ui.label(egui::RichText::new(notice).color(ui.visuals().warn_fg_color));
        }
        ui.add_space(4.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn modified_time_formatting() {
        let dt = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).single();
        assert_eq!(format_modified(dt), "2024-03-05 14:07:09");
        assert_eq!(format_modified(None), "--");
    }
}
