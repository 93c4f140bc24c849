//! # Data Panel
//!
//! Right-hand side panel listing the rows of the CSV file behind the active
//! chart. The table uses `egui_extras::TableBuilder` so only visible rows are
//! laid out, which keeps long progression files responsive.

use eframe::egui;

use super::AppState;
use crate::data::NumericTable;
use crate::plot::chart::format_tick;

/// Render the right-hand data panel and remember its width.
///
/// # Parameters
///
/// * `ctx` - egui context
/// * `state` - Application state; `right_panel_width` is updated after resizing
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    let response = egui::SidePanel::right("data_panel")
        .resizable(true)
        .default_width(state.right_panel_width)
        .width_range(200.0..=900.0)
        .show(ctx, |ui| {
            ui.heading("Data");
            ui.separator();

            match state.active_file() {
                Some(loaded) => {
                    ui.label(egui::RichText::new(loaded.path.display().to_string()).small());
                    ui.label(format!("{} rows", loaded.table.len()));
                    ui.separator();
                    render_table(ui, &loaded.table);
                }
                None => {
                    ui.label("No file loaded");
                }
            }
        });
    state.right_panel_width = response.response.rect.width();
}

fn render_table(ui: &mut egui::Ui, table: &NumericTable) {
    use egui_extras::{Column, TableBuilder};

    let row_height = ui.text_style_height(&egui::TextStyle::Body) * 1.3;
    let headers = table.headers();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .cell_layout(egui::Layout::right_to_left(egui::Align::Center))
        .columns(Column::initial(80.0).at_least(40.0), headers.len())
        .header(row_height, |mut header| {
            for name in headers {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            // Virtualized rows
            body.rows(row_height, table.len(), |mut row| {
                let values = table.row(row.index()).unwrap_or_default();
                for value in values {
                    row.col(|ui| {
                        ui.monospace(format_tick(value));
                    });
                }
            });
        });
}
