//! Backend-neutral chart description.
//!
//! A `ChartSpec` carries everything needed to draw a chart: labels, series,
//! styling and axis limits. It is rendered to SVG by `render` and painted
//! on screen by the viewer, so both outputs always agree.

/// Plain RGB color shared by all chart backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
}

/// Filled circle drawn at every data point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Marker diameter in pixels.
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    UpperRight,
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend entry; unlabeled series are left out of the legend.
    pub label: Option<String>,
    pub color: Rgb,
    pub line_width: u32,
    pub marker: Option<Marker>,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    /// Pair up x and y values, truncating to the shorter of the two.
    pub fn from_columns(label: Option<&str>, color: Rgb, xs: &[f64], ys: &[f64]) -> Self {
        Self {
            label: label.map(str::to_string),
            color,
            line_width: 2,
            marker: None,
            points: xs.iter().copied().zip(ys.iter().copied()).collect(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// Fixed y axis limits; derived from the data when `None`.
    pub y_range: Option<(f64, f64)>,
    pub legend: Option<LegendPosition>,
    pub grid: bool,
    /// Output size in pixels (width, height).
    pub size: (u32, u32),
}

/// Default figure size: 14 x 8 inches at 100 dpi.
pub const DEFAULT_SIZE: (u32, u32) = (1400, 800);

/// Widen an empty or inverted range so it can be used as an axis.
fn widen(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max > min {
        (min, max)
    } else {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        (min - pad, min + pad)
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
            y_range: None,
            legend: None,
            grid: true,
            size: DEFAULT_SIZE,
        }
    }

    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.points.is_empty())
    }

    /// X axis limits covering every point.
    pub fn x_bounds(&self) -> (f64, f64) {
        let (lo, hi) = extent(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
        widen(lo, hi)
    }

    /// Y axis limits: `y_range` if set, otherwise the data extent.
    pub fn y_bounds(&self) -> (f64, f64) {
        if let Some((lo, hi)) = self.y_range {
            return widen(lo, hi);
        }
        let (lo, hi) = extent(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
        widen(lo, hi)
    }

    /// Labeled series in legend order.
    pub fn legend_entries(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.series.iter().filter_map(|s| s.label.as_deref().map(|l| (l, s.color)))
    }
}

/// Evenly spaced tick positions inside `[min, max]`.
///
/// The step is 1, 2 or 5 times a power of ten, chosen so that roughly
/// `target` ticks fit.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(max > min) || target == 0 || !min.is_finite() || !max.is_finite() {
        return vec![min];
    }

    let raw_step = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut i = 0;
    loop {
        let tick = first + step * i as f64;
        // Small tolerance so the upper bound survives rounding
        if tick > max + step * 1e-9 {
            break;
        }
        // Avoid printing -0
        ticks.push(if tick.abs() < step * 1e-9 { 0.0 } else { tick });
        i += 1;
    }
    ticks
}

/// Format a tick value without trailing zeros.
pub fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.3}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_with(points: Vec<(f64, f64)>) -> ChartSpec {
        let mut chart = ChartSpec::new("t", "x", "y");
        chart.series.push(Series {
            label: Some("s".to_string()),
            color: Rgb::BLUE,
            line_width: 2,
            marker: None,
            points,
        });
        chart
    }

    #[test]
    fn bounds_follow_data() {
        let chart = chart_with(vec![(0.0, 5.0), (10.0, 50.0), (3.0, -2.0)]);
        assert_eq!(chart.x_bounds(), (0.0, 10.0));
        assert_eq!(chart.y_bounds(), (-2.0, 50.0));
    }

    #[test]
    fn explicit_y_range_wins() {
        let mut chart = chart_with(vec![(0.0, 5.0), (1.0, 6.0)]);
        chart.y_range = Some((0.0, 110.0));
        assert_eq!(chart.y_bounds(), (0.0, 110.0));
    }

    #[test]
    fn degenerate_ranges_are_widened() {
        let empty = ChartSpec::new("t", "x", "y");
        assert_eq!(empty.x_bounds(), (0.0, 1.0));
        assert!(!empty.has_data());

        let single = chart_with(vec![(0.0, 0.0)]);
        assert_eq!(single.x_bounds(), (-1.0, 1.0));
        let (lo, hi) = chart_with(vec![(100.0, 5.0)]).x_bounds();
        assert!(lo < 100.0 && hi > 100.0);
    }

    #[test]
    fn zero_y_range_is_widened() {
        let mut chart = chart_with(vec![(0.0, 0.0), (1.0, 0.0)]);
        chart.y_range = Some((0.0, 0.0));
        let (lo, hi) = chart.y_bounds();
        assert!(hi > lo);
    }

    #[test]
    fn nice_ticks_use_round_steps() {
        assert_eq!(nice_ticks(0.0, 100.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(nice_ticks(0.0, 10.0, 10), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let ticks = nice_ticks(0.0, 16500.0, 8);
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks[1], 5000.0);
        assert!(*ticks.last().unwrap() <= 16500.0);
    }

    #[test]
    fn nice_ticks_handle_degenerate_input() {
        assert_eq!(nice_ticks(3.0, 3.0, 5), vec![3.0]);
        assert_eq!(nice_ticks(0.0, 1.0, 0), vec![0.0]);
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(format_tick(20.0), "20");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(0.125), "0.125");
        assert_eq!(format_tick(-2.0), "-2");
    }

    #[test]
    fn legend_skips_unlabeled_series() {
        let mut chart = chart_with(vec![(0.0, 1.0)]);
        chart.series.push(Series::from_columns(None, Rgb::RED, &[0.0], &[1.0]));
        let entries: Vec<_> = chart.legend_entries().collect();
        assert_eq!(entries, vec![("s", Rgb::BLUE)]);
    }
}
