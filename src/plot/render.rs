//! SVG rendering of chart specifications with `plotters`.

use anyhow::Context;
use plotters::prelude::*;
use std::path::Path;

use super::chart::{ChartSpec, LegendPosition, Rgb};

const FONT: &str = "sans-serif";
const TITLE_FONT_SIZE: u32 = 32;
const AXIS_FONT_SIZE: u32 = 28;
const LEGEND_FONT_SIZE: u32 = 24;

impl From<Rgb> for RGBColor {
    fn from(color: Rgb) -> Self {
        RGBColor(color.0, color.1, color.2)
    }
}

/// Render `spec` as an SVG file at `path`.
///
/// Lines are drawn first, then markers, then the legend, so markers sit on
/// top of the lines they belong to.
pub fn render_svg(spec: &ChartSpec, path: &Path) -> anyhow::Result<()> {
    let root = SVGBackend::new(path, spec.size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = spec.x_bounds();
    let (y_min, y_max) = spec.y_bounds();

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title.as_str(), (FONT, TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let mut mesh = chart.configure_mesh();
    if !spec.grid {
        mesh.disable_mesh();
    }
    mesh.x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .axis_desc_style((FONT, AXIS_FONT_SIZE))
        .draw()?;

    for series in &spec.series {
        let color: RGBColor = series.color.into();
        let drawn = chart.draw_series(LineSeries::new(series.points.iter().copied(), color.stroke_width(series.line_width)))?;
        if let Some(label) = &series.label {
            drawn
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(2)));
        }

        if let Some(marker) = series.marker {
            let radius = (marker.size / 2).max(1);
            chart.draw_series(series.points.iter().map(|&point| Circle::new(point, radius, color.filled())))?;
        }
    }

    if let Some(position) = spec.legend {
        let position = match position {
            LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        };
        chart
            .configure_series_labels()
            .position(position)
            .label_font((FONT, LEGEND_FONT_SIZE))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present().with_context(|| format!("Failed to write chart to {}", path.display()))?;
    log::debug!("Rendered '{}' to {}", spec.title, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::chart::{Marker, Series};
    use std::fs;

    fn sample_chart() -> ChartSpec {
        let mut chart = ChartSpec::new("Sample Title", "Steps", "Number of Individuals");
        chart.series.push(Series::from_columns(Some("Recovered"), Rgb::GREEN, &[0.0, 1.0, 2.0], &[0.0, 5.0, 9.0]));
        chart
            .series
            .push(Series::from_columns(None, Rgb::BLUE, &[0.0, 1.0, 2.0], &[3.0, 2.0, 1.0]).with_marker(Marker { size: 8 }));
        chart.legend = Some(LegendPosition::UpperRight);
        chart
    }

    #[test]
    fn writes_svg_with_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        render_svg(&sample_chart(), &path).unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Sample Title"));
        assert!(svg.contains("Steps"));
        assert!(svg.contains("Recovered"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn renders_chart_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        let mut chart = ChartSpec::new("Empty", "x", "y");
        chart.grid = false;
        render_svg(&chart, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.svg");
        assert!(render_svg(&sample_chart(), &path).is_err());
    }
}
