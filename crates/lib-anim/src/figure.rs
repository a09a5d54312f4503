//! Retained-mode figure model.
//!
//! A [`Figure`] is a grid of [`Axes`]; each axes holds its limits, decorations
//! and an ordered list of [`Artist`]s. Scenes clear and refill axes for every
//! frame, and the driver snapshots the whole figure afterwards, so a figure is
//! plain data that can be cloned, compared and serialized.

use crate::error::{AnimError, AnimResult};
use serde::{Deserialize, Serialize};

/// An sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    pub const RED: Self = Self::rgb(0xff, 0x00, 0x00);
    pub const BLUE: Self = Self::rgb(0x00, 0x00, 0xff);
    pub const GREEN: Self = Self::rgb(0x00, 0x80, 0x00);
    pub const GRAY: Self = Self::rgb(0x80, 0x80, 0x80);

    // Categorical palette
    pub const TAB_BLUE: Self = Self::rgb(0x1f, 0x77, 0xb4);
    pub const TAB_ORANGE: Self = Self::rgb(0xff, 0x7f, 0x0e);
    pub const TAB_GREEN: Self = Self::rgb(0x2c, 0xa0, 0x2c);
    pub const TAB_RED: Self = Self::rgb(0xd6, 0x27, 0x28);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` notation.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Dash pattern of a stroke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Stroke parameters for lines.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    /// Width in points.
    pub width: f64,
    pub alpha: f64,
    pub style: LineStyle,
    pub round_cap: bool,
}

impl Stroke {
    /// A solid, opaque 1.5 pt stroke.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            width: 1.5,
            alpha: 1.0,
            style: LineStyle::Solid,
            round_cap: false,
        }
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn dashed(mut self) -> Self {
        self.style = LineStyle::Dashed;
        self
    }

    pub fn round_cap(mut self) -> Self {
        self.round_cap = true;
        self
    }
}

/// Marker glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    Circle,
    Square,
}

/// A point marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub shape: MarkerShape,
    pub color: Color,
    /// Diameter in points.
    pub size: f64,
    /// Hollow markers draw only their outline.
    pub filled: bool,
}

impl Marker {
    pub fn circle(color: Color) -> Self {
        Self {
            shape: MarkerShape::Circle,
            color,
            size: 6.0,
            filled: true,
        }
    }

    pub fn square(color: Color) -> Self {
        Self {
            shape: MarkerShape::Square,
            color,
            size: 6.0,
            filled: true,
        }
    }

    /// A hollow ring used to highlight a single point.
    pub fn ring(color: Color, size: f64) -> Self {
        Self {
            shape: MarkerShape::Circle,
            color,
            size,
            filled: false,
        }
    }
}

/// Stem plot styling: stem color, head marker and optional baseline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StemStyle {
    pub stem: Color,
    pub marker: Marker,
    pub baseline: Option<Color>,
}

impl StemStyle {
    pub fn new(stem: Color, marker: Marker) -> Self {
        Self {
            stem,
            marker,
            baseline: None,
        }
    }

    pub fn with_baseline(mut self, color: Color) -> Self {
        self.baseline = Some(color);
        self
    }
}

/// One drawable element of an axes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Artist {
    /// Vertical stems from y = 0 to each point, capped with a marker.
    Stem {
        xs: Vec<f64>,
        ys: Vec<f64>,
        style: StemStyle,
        label: Option<String>,
    },
    /// A polyline.
    Line {
        xs: Vec<f64>,
        ys: Vec<f64>,
        stroke: Stroke,
        label: Option<String>,
    },
    /// The area between a curve and y = 0.
    Fill {
        xs: Vec<f64>,
        ys: Vec<f64>,
        color: Color,
        alpha: f64,
        label: Option<String>,
    },
    /// A vertical band across the full height.
    Span {
        x0: f64,
        x1: f64,
        color: Color,
        alpha: f64,
        label: Option<String>,
    },
    /// A vertical line across the full height.
    VLine {
        x: f64,
        stroke: Stroke,
        label: Option<String>,
    },
    /// Centered text at a data position.
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Color,
        bold: bool,
    },
    /// A single marker.
    Point { x: f64, y: f64, marker: Marker },
}

impl Artist {
    pub fn stem(xs: Vec<f64>, ys: Vec<f64>, style: StemStyle) -> Self {
        Self::Stem { xs, ys, style, label: None }
    }

    pub fn line(xs: Vec<f64>, ys: Vec<f64>, stroke: Stroke) -> Self {
        Self::Line { xs, ys, stroke, label: None }
    }

    pub fn fill(xs: Vec<f64>, ys: Vec<f64>, color: Color, alpha: f64) -> Self {
        Self::Fill { xs, ys, color, alpha, label: None }
    }

    pub fn span(x0: f64, x1: f64, color: Color, alpha: f64) -> Self {
        Self::Span { x0, x1, color, alpha, label: None }
    }

    pub fn vline(x: f64, stroke: Stroke) -> Self {
        Self::VLine { x, stroke, label: None }
    }

    pub fn text(x: f64, y: f64, text: impl Into<String>, color: Color, bold: bool) -> Self {
        Self::Text {
            x,
            y,
            text: text.into(),
            color,
            bold,
        }
    }

    pub fn point(x: f64, y: f64, marker: Marker) -> Self {
        Self::Point { x, y, marker }
    }

    /// Attach a legend label. Text and point artists never appear in legends.
    pub fn labeled(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Self::Stem { label, .. }
            | Self::Line { label, .. }
            | Self::Fill { label, .. }
            | Self::Span { label, .. }
            | Self::VLine { label, .. } => *label = Some(text.into()),
            Self::Text { .. } | Self::Point { .. } => {}
        }
        self
    }

    /// Legend label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Stem { label, .. }
            | Self::Line { label, .. }
            | Self::Fill { label, .. }
            | Self::Span { label, .. }
            | Self::VLine { label, .. } => label.as_deref(),
            Self::Text { .. } | Self::Point { .. } => None,
        }
    }

    /// Swatch color for the legend.
    pub fn color(&self) -> Color {
        match self {
            Self::Stem { style, .. } => style.marker.color,
            Self::Line { stroke, .. } | Self::VLine { stroke, .. } => stroke.color,
            Self::Fill { color, .. } | Self::Span { color, .. } | Self::Text { color, .. } => *color,
            Self::Point { marker, .. } => marker.color,
        }
    }

    /// Data extent `(x_min, x_max, y_min, y_max)` used for autoscaling.
    fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        fn bounds(xs: &[f64], ys: &[f64], include_zero: bool) -> Option<(f64, f64, f64, f64)> {
            if xs.is_empty() {
                return None;
            }
            let (mut x0, mut x1) = min_max(xs);
            let (mut y0, mut y1) = min_max(ys);
            if include_zero {
                y0 = y0.min(0.0);
                y1 = y1.max(0.0);
            }
            if !x0.is_finite() || !x1.is_finite() {
                (x0, x1) = (0.0, 1.0);
            }
            if !y0.is_finite() || !y1.is_finite() {
                (y0, y1) = (0.0, 1.0);
            }
            Some((x0, x1, y0, y1))
        }

        match self {
            Self::Stem { xs, ys, .. } | Self::Fill { xs, ys, .. } => bounds(xs, ys, true),
            Self::Line { xs, ys, .. } => bounds(xs, ys, false),
            Self::Point { x, y, .. } | Self::Text { x, y, .. } => Some((*x, *x, *y, *y)),
            Self::Span { .. } | Self::VLine { .. } => None,
        }
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Corner a legend is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegendLoc {
    UpperLeft,
    UpperRight,
}

/// Axes title with its styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    pub color: Color,
    pub bold: bool,
    /// Font size in points.
    pub size: f64,
}

/// One subplot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub title: Option<Title>,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub ylabel: Option<String>,
    /// Grid line opacity; `None` hides the grid.
    pub grid: Option<f64>,
    pub legend: Option<LegendLoc>,
    pub equal_aspect: bool,
    pub hide_ticks: bool,
    pub artists: Vec<Artist>,
}

impl Axes {
    /// Reset the axes to a blank state, dropping artists and decorations.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_title(&mut self, text: impl Into<String>) {
        self.title = Some(Title {
            text: text.into(),
            color: Color::BLACK,
            bold: false,
            size: 12.0,
        });
    }

    pub fn set_title_styled(&mut self, text: impl Into<String>, color: Color, bold: bool, size: f64) {
        self.title = Some(Title {
            text: text.into(),
            color,
            bold,
            size,
        });
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.xlim = Some((lo, hi));
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.ylim = Some((lo, hi));
    }

    pub fn set_ylabel(&mut self, text: impl Into<String>) {
        self.ylabel = Some(text.into());
    }

    pub fn grid(&mut self, alpha: f64) {
        self.grid = Some(alpha);
    }

    pub fn legend(&mut self, loc: LegendLoc) {
        self.legend = Some(loc);
    }

    pub fn set_aspect_equal(&mut self) {
        self.equal_aspect = true;
    }

    pub fn hide_ticks(&mut self) {
        self.hide_ticks = true;
    }

    pub fn add(&mut self, artist: Artist) {
        self.artists.push(artist);
    }

    /// Artists that carry a legend label, in drawing order.
    pub fn legend_entries(&self) -> impl Iterator<Item = &Artist> {
        self.artists.iter().filter(|a| a.label().is_some())
    }

    /// Effective `(x_min, x_max, y_min, y_max)`: explicit limits, or the data
    /// extent padded by 5% on each side.
    pub fn view_limits(&self) -> (f64, f64, f64, f64) {
        let extent = self
            .artists
            .iter()
            .filter_map(Artist::extent)
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1), a.2.min(b.2), a.3.max(b.3)));

        let (dx0, dx1, dy0, dy1) = extent.unwrap_or((0.0, 1.0, 0.0, 1.0));
        let (x0, x1) = self.xlim.unwrap_or_else(|| pad(dx0, dx1));
        let (y0, y1) = self.ylim.unwrap_or_else(|| pad(dy0, dy1));
        (x0, x1, y0, y1)
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - 0.05 * span, hi + 0.05 * span)
}

/// Row/column layout with relative sizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub width_ratios: Vec<f64>,
    pub height_ratios: Vec<f64>,
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            width_ratios: vec![1.0; cols],
            height_ratios: vec![1.0; rows],
        }
    }
}

/// A figure: fixed size in inches, a grid layout and one axes per cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub width: f64,
    pub height: f64,
    pub grid: GridSpec,
    pub axes: Vec<Axes>,
}

impl Figure {
    /// A `rows x cols` figure of `width x height` inches with blank axes.
    pub fn new(rows: usize, cols: usize, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            grid: GridSpec::new(rows, cols),
            axes: vec![Axes::default(); rows * cols],
        }
    }

    pub fn with_width_ratios(mut self, ratios: &[f64]) -> Self {
        if ratios.len() == self.grid.cols {
            self.grid.width_ratios = ratios.to_vec();
        }
        self
    }

    pub fn with_height_ratios(mut self, ratios: &[f64]) -> Self {
        if ratios.len() == self.grid.rows {
            self.grid.height_ratios = ratios.to_vec();
        }
        self
    }

    /// Axes in row-major order.
    pub fn axes(&self, index: usize) -> AnimResult<&Axes> {
        let count = self.axes.len();
        self.axes
            .get(index)
            .ok_or(AnimError::AxesOutOfRange { index, count })
    }

    /// Mutable axes in row-major order.
    pub fn axes_mut(&mut self, index: usize) -> AnimResult<&mut Axes> {
        let count = self.axes.len();
        self.axes
            .get_mut(index)
            .ok_or(AnimError::AxesOutOfRange { index, count })
    }

    /// `(row, col)` of an axes index.
    #[inline]
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.grid.cols, index % self.grid.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_drops_everything() {
        let mut ax = Axes::default();
        ax.set_title("t");
        ax.set_xlim(0.0, 1.0);
        ax.add(Artist::point(0.5, 0.5, Marker::circle(Color::RED)));

        ax.clear();
        assert_eq!(ax, Axes::default());
    }

    #[test]
    fn test_labels_feed_legend() {
        let mut ax = Axes::default();
        ax.add(Artist::line(vec![0.0, 1.0], vec![0.0, 1.0], Stroke::new(Color::BLUE)).labeled("a"));
        ax.add(Artist::line(vec![0.0, 1.0], vec![1.0, 0.0], Stroke::new(Color::RED)));
        ax.add(Artist::text(0.0, 0.0, "ignored", Color::BLACK, false).labeled("b"));

        let labels: Vec<_> = ax.legend_entries().filter_map(Artist::label).collect();
        assert_eq!(labels, vec!["a"]);
    }

    #[test]
    fn test_view_limits_autoscale_includes_stem_base() {
        let mut ax = Axes::default();
        ax.add(Artist::stem(
            vec![0.0, 10.0],
            vec![2.0, 4.0],
            StemStyle::new(Color::GREEN, Marker::circle(Color::GREEN)),
        ));

        let (x0, x1, y0, y1) = ax.view_limits();
        assert!((x0 + 0.5).abs() < 1e-12);
        assert!((x1 - 10.5).abs() < 1e-12);
        assert!((y0 + 0.2).abs() < 1e-12);
        assert!((y1 - 4.2).abs() < 1e-12);

        ax.set_ylim(-1.0, 1.0);
        assert_eq!(ax.view_limits().2, -1.0);
    }

    #[test]
    fn test_axes_out_of_range() {
        let mut fig = Figure::new(2, 2, 12.0, 8.0);
        assert!(fig.axes_mut(3).is_ok());
        assert!(matches!(
            fig.axes(4),
            Err(AnimError::AxesOutOfRange { index: 4, count: 4 })
        ));
        assert_eq!(fig.cell(3), (1, 1));
    }

    #[test]
    fn test_ratio_length_must_match() {
        let fig = Figure::new(2, 2, 12.0, 8.0).with_width_ratios(&[2.0, 1.0, 5.0]);
        assert_eq!(fig.grid.width_ratios, vec![1.0, 1.0]);

        let fig = Figure::new(3, 1, 10.0, 10.0).with_height_ratios(&[2.0, 1.5, 1.5]);
        assert_eq!(fig.grid.height_ratios, vec![2.0, 1.5, 1.5]);
    }
}
