//! # Central Chart View
//!
//! Paints the active `ChartSpec` with the egui painter:
//! - Title, axis labels (the y label rotated) and tick labels
//! - Grid lines at `nice_ticks` positions
//! - One polyline per series with optional circle markers
//! - Legend box in the requested corner
//! - Hover readout of the nearest data point
//!
//! ## Coordinate Mapping
//!
//! Data coordinates are mapped linearly into the plot rectangle with
//! `egui::lerp`. The y axis is inverted so larger values are drawn higher.

use eframe::egui;
use egui::{Color32, FontId, Pos2, Rect};

use super::{AppState, ChartTab};
use crate::plot::chart::{format_tick, nice_ticks};
use crate::plot::{ChartSpec, LegendPosition, Rgb};

/// Space reserved around the plot area for title, ticks and labels.
const TITLE_HEIGHT: f32 = 36.0;
const BOTTOM_MARGIN: f32 = 48.0;
const LEFT_MARGIN: f32 = 80.0;
const RIGHT_MARGIN: f32 = 20.0;
/// Maximum screen distance for the hover readout to pick a point.
const HOVER_DISTANCE: f32 = 12.0;

impl From<Rgb> for Color32 {
    fn from(color: Rgb) -> Self {
        Color32::from_rgb(color.0, color.1, color.2)
    }
}

/// Linear mapping between data coordinates and a screen rectangle.
#[derive(Debug, Clone, Copy)]
pub struct PlotTransform {
    pub rect: Rect,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl PlotTransform {
    pub fn new(rect: Rect, spec: &ChartSpec) -> Self {
        Self {
            rect,
            x_range: spec.x_bounds(),
            y_range: spec.y_bounds(),
        }
    }

    pub fn to_screen(&self, x: f64, y: f64) -> Pos2 {
        let tx = ((x - self.x_range.0) / (self.x_range.1 - self.x_range.0)) as f32;
        let ty = ((y - self.y_range.0) / (self.y_range.1 - self.y_range.0)) as f32;
        egui::pos2(
            egui::lerp(self.rect.left()..=self.rect.right(), tx),
            egui::lerp(self.rect.bottom()..=self.rect.top(), ty),
        )
    }
}

/// Render the central panel with tab selector and the active chart.
///
/// # Parameters
///
/// * `ctx` - egui context for rendering
/// * `state` - Application state holding the loaded charts
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut state.tab, ChartTab::Progression, ChartTab::Progression.label());
            ui.selectable_value(&mut state.tab, ChartTab::RecoveredVsVaccination, ChartTab::RecoveredVsVaccination.label());
        });
        ui.separator();

        let Some(loaded) = state.active_file() else {
            let path = match state.tab {
                ChartTab::Progression => &state.progression_path,
                ChartTab::RecoveredVsVaccination => &state.herd_path,
            };
            ui.centered_and_justified(|ui| {
                ui.label(format!("File not found: {}", path.display()));
            });
            return;
        };
        if !loaded.chart.has_data() {
            ui.centered_and_justified(|ui| {
                ui.label(format!("No data rows in {}", loaded.path.display()));
            });
            return;
        }

        let rect = ui.available_rect_before_wrap();
        let response = ui.interact(rect, egui::Id::new("chart_canvas"), egui::Sense::hover());
        paint_chart(ui, rect, &loaded.chart);

        if let Some(pointer) = response.hover_pos() {
            draw_hover_readout(ui, rect, &loaded.chart, pointer);
        }
    });
}

/// The plot area inside `rect` once margins for labels are removed.
pub fn plot_rect(rect: Rect) -> Rect {
    Rect::from_min_max(
        egui::pos2(rect.left() + LEFT_MARGIN, rect.top() + TITLE_HEIGHT),
        egui::pos2(rect.right() - RIGHT_MARGIN, rect.bottom() - BOTTOM_MARGIN),
    )
}

/// Paint a complete chart into `rect`.
pub fn paint_chart(ui: &egui::Ui, rect: Rect, spec: &ChartSpec) {
    let painter = ui.painter_at(rect);
    let visuals = ui.visuals();
    let text_color = visuals.text_color();

    painter.rect_filled(rect, 4.0, visuals.extreme_bg_color);

    let area = plot_rect(rect);
    if area.width() <= 0.0 || area.height() <= 0.0 {
        return;
    }
    let transform = PlotTransform::new(area, spec);

    painter.text(
        egui::pos2(rect.center().x, rect.top() + TITLE_HEIGHT / 2.0),
        egui::Align2::CENTER_CENTER,
        &spec.title,
        FontId::proportional(16.0),
        text_color,
    );

    draw_axes(&painter, &transform, spec, text_color, visuals.weak_text_color());

    // Data is clipped to the plot area
    let data_painter = ui.painter_at(area);
    for series in &spec.series {
        let color: Color32 = series.color.into();
        let points: Vec<Pos2> = series.points.iter().map(|&(x, y)| transform.to_screen(x, y)).collect();
        if points.len() > 1 {
            data_painter.add(egui::Shape::line(points.clone(), egui::Stroke::new(series.line_width as f32, color)));
        }
        if let Some(marker) = series.marker {
            for point in &points {
                data_painter.circle_filled(*point, marker.size as f32 / 2.0, color);
            }
        }
    }

    if let Some(position) = spec.legend {
        draw_legend(&painter, area, spec, position, visuals);
    }
}

fn draw_axes(painter: &egui::Painter, transform: &PlotTransform, spec: &ChartSpec, text_color: Color32, grid_color: Color32) {
    let area = transform.rect;
    let font = FontId::proportional(12.0);
    let grid_stroke = egui::Stroke::new(0.5, grid_color.gamma_multiply(0.5));

    for tick in nice_ticks(transform.x_range.0, transform.x_range.1, 10) {
        let x = transform.to_screen(tick, transform.y_range.0).x;
        if spec.grid {
            painter.line_segment([egui::pos2(x, area.top()), egui::pos2(x, area.bottom())], grid_stroke);
        }
        painter.text(egui::pos2(x, area.bottom() + 4.0), egui::Align2::CENTER_TOP, format_tick(tick), font.clone(), text_color);
    }

    for tick in nice_ticks(transform.y_range.0, transform.y_range.1, 8) {
        let y = transform.to_screen(transform.x_range.0, tick).y;
        if spec.grid {
            painter.line_segment([egui::pos2(area.left(), y), egui::pos2(area.right(), y)], grid_stroke);
        }
        painter.text(egui::pos2(area.left() - 6.0, y), egui::Align2::RIGHT_CENTER, format_tick(tick), font.clone(), text_color);
    }

    let axis_stroke = egui::Stroke::new(1.0, text_color);
    painter.line_segment([area.left_bottom(), area.right_bottom()], axis_stroke);
    painter.line_segment([area.left_bottom(), area.left_top()], axis_stroke);

    painter.text(
        egui::pos2(area.center().x, area.bottom() + 26.0),
        egui::Align2::CENTER_TOP,
        &spec.x_label,
        FontId::proportional(14.0),
        text_color,
    );

    // Rotated y label, centered on the axis
    let galley = painter.layout_no_wrap(spec.y_label.clone(), FontId::proportional(14.0), text_color);
    let label_pos = egui::pos2(area.left() - LEFT_MARGIN + 4.0, area.center().y + galley.size().x / 2.0);
    painter.add(egui::epaint::TextShape::new(label_pos, galley, text_color).with_angle(-std::f32::consts::FRAC_PI_2));
}

fn draw_legend(painter: &egui::Painter, area: Rect, spec: &ChartSpec, position: LegendPosition, visuals: &egui::Visuals) {
    let entries: Vec<(&str, Rgb)> = spec.legend_entries().collect();
    if entries.is_empty() {
        return;
    }

    let font = FontId::proportional(13.0);
    let row_height = 18.0;
    let sample_width = 24.0;
    let text_width = entries
        .iter()
        .map(|(label, _)| painter.layout_no_wrap(label.to_string(), font.clone(), Color32::WHITE).size().x)
        .fold(0.0, f32::max);
    let size = egui::vec2(sample_width + text_width + 24.0, row_height * entries.len() as f32 + 8.0);

    let min = match position {
        LegendPosition::UpperRight => egui::pos2(area.right() - size.x - 8.0, area.top() + 8.0),
    };
    let legend_rect = Rect::from_min_size(min, size);
    painter.rect_filled(legend_rect, 4.0, visuals.window_fill.gamma_multiply(0.9));
    painter.rect_stroke(legend_rect, 4.0, visuals.window_stroke, egui::StrokeKind::Inside);

    for (i, (label, color)) in entries.into_iter().enumerate() {
        let y = legend_rect.top() + 4.0 + row_height * (i as f32 + 0.5);
        let x = legend_rect.left() + 8.0;
        painter.line_segment([egui::pos2(x, y), egui::pos2(x + sample_width, y)], egui::Stroke::new(2.0, color));
        painter.text(egui::pos2(x + sample_width + 8.0, y), egui::Align2::LEFT_CENTER, label, font.clone(), visuals.text_color());
    }
}

/// Index of the series and point closest to `pointer`, within `max_distance`.
pub fn nearest_point(transform: &PlotTransform, spec: &ChartSpec, pointer: Pos2, max_distance: f32) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f32)> = None;
    for (s, series) in spec.series.iter().enumerate() {
        for (p, &(x, y)) in series.points.iter().enumerate() {
            let dist_sq = transform.to_screen(x, y).distance_sq(pointer);
            if dist_sq <= max_distance * max_distance && best.is_none_or(|(_, d)| dist_sq < d) {
                best = Some(((s, p), dist_sq));
            }
        }
    }
    best.map(|(index, _)| index)
}

fn draw_hover_readout(ui: &egui::Ui, rect: Rect, spec: &ChartSpec, pointer: Pos2) {
    let area = plot_rect(rect);
    if !area.contains(pointer) {
        return;
    }
    let transform = PlotTransform::new(area, spec);
    let Some((s, p)) = nearest_point(&transform, spec, pointer, HOVER_DISTANCE) else {
        return;
    };

    let series = &spec.series[s];
    let (x, y) = series.points[p];
    let screen = transform.to_screen(x, y);
    let painter = ui.painter_at(area);
    painter.circle_stroke(screen, 5.0, egui::Stroke::new(1.5, ui.visuals().strong_text_color()));

    let text = match &series.label {
        Some(label) => format!("{}: {}, {}", label, format_tick(x), format_tick(y)),
        None => format!("{}, {}", format_tick(x), format_tick(y)),
    };
    painter.text(
        screen + egui::vec2(8.0, -8.0),
        egui::Align2::LEFT_BOTTOM,
        text,
        FontId::proportional(12.0),
        ui.visuals().strong_text_color(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::chart::Series;

    fn spec() -> ChartSpec {
        let mut chart = ChartSpec::new("t", "x", "y");
        chart.series.push(Series::from_columns(Some("a"), Rgb::BLUE, &[0.0, 10.0], &[0.0, 100.0]));
        chart.y_range = Some((0.0, 100.0));
        chart
    }

    #[test]
    fn transform_maps_corners() {
        let rect = Rect::from_min_max(egui::pos2(100.0, 50.0), egui::pos2(300.0, 250.0));
        let transform = PlotTransform::new(rect, &spec());
        assert_eq!(transform.to_screen(0.0, 0.0), egui::pos2(100.0, 250.0));
        assert_eq!(transform.to_screen(10.0, 100.0), egui::pos2(300.0, 50.0));
        assert_eq!(transform.to_screen(5.0, 50.0), egui::pos2(200.0, 150.0));
    }

    #[test]
    fn plot_rect_leaves_margins() {
        let rect = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(800.0, 600.0));
        let area = plot_rect(rect);
        assert!(rect.contains_rect(area));
        assert_eq!(area.left(), LEFT_MARGIN);
        assert_eq!(area.bottom(), 600.0 - BOTTOM_MARGIN);
    }

    #[test]
    fn nearest_point_respects_distance() {
        let rect = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(100.0, 100.0));
        let chart = spec();
        let transform = PlotTransform::new(rect, &chart);
        assert_eq!(nearest_point(&transform, &chart, egui::pos2(98.0, 3.0), 12.0), Some((0, 1)));
        assert_eq!(nearest_point(&transform, &chart, egui::pos2(50.0, 50.0), 12.0), None);
    }

    #[test]
    fn rgb_converts_to_color32() {
        assert_eq!(Color32::from(Rgb::ORANGE), Color32::from_rgb(255, 165, 0));
    }
}
