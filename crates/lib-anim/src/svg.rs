//! SVG export of a single [`Figure`].
//!
//! Figure sizes are in inches and stroke widths in points, as in print
//! plotting libraries; both are converted to pixels with the display DPI
//! (see [`crate::display`]). Every axes gets its own clip path so artists
//! never spill outside the plot area. Element ids carry a caller-supplied
//! prefix, which keeps several frames embedded in one HTML page distinct.

use crate::display;
use crate::error::AnimResult;
use crate::figure::{Artist, Axes, Figure, LegendLoc, LineStyle, Marker, MarkerShape, Stroke};
use std::fmt::Write;

const FONT: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";
const TICK_FONT_PT: f64 = 9.0;
const TICK_LEN_PX: f64 = 4.0;
const TARGET_TICKS: f64 = 5.0;

/// Pixel rectangle of one plot area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    #[inline]
    fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Maps data coordinates of one axes into its plot area.
#[derive(Clone, Copy, Debug)]
struct Transform {
    area: PlotArea,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl Transform {
    fn new(area: PlotArea, (x0, x1, y0, y1): (f64, f64, f64, f64)) -> Self {
        let (x0, x1) = widen(x0, x1);
        let (y0, y1) = widen(y0, y1);
        Self { area, x0, x1, y0, y1 }
    }

    #[inline]
    fn x(&self, x: f64) -> f64 {
        self.area.left + (x - self.x0) / (self.x1 - self.x0) * self.area.width
    }

    #[inline]
    fn y(&self, y: f64) -> f64 {
        self.area.top + (self.y1 - y) / (self.y1 - self.y0) * self.area.height
    }
}

fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, lo + 0.5)
    }
}

/// Points to pixels at `dpi`.
#[inline]
pub fn pt_to_px(pt: f64, dpi: f64) -> f64 {
    pt * dpi / 72.0
}

/// Render `figure` as a standalone SVG document.
pub fn render_svg(figure: &Figure, id_prefix: &str) -> AnimResult<String> {
    let dpi = display::settings().dpi;
    let width = figure.width * dpi;
    let height = figure.height * dpi;

    let mut out = String::new();
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="{FONT}">"#,
        w = width,
        h = height,
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    let cells = cell_rects(figure, width, height);
    for (i, ax) in figure.axes.iter().enumerate() {
        let area = plot_area(ax, cells[i], dpi);
        let id = format!("{}-ax{}", id_prefix, i);
        render_axes(&mut out, ax, area, &id, dpi)?;
    }

    writeln!(out, "</svg>")?;
    Ok(out)
}

/// Pixel rectangles of every grid cell, in axes order.
fn cell_rects(figure: &Figure, width: f64, height: f64) -> Vec<PlotArea> {
    let grid = &figure.grid;
    let col_total: f64 = grid.width_ratios.iter().sum();
    let row_total: f64 = grid.height_ratios.iter().sum();

    let cols = offsets(&grid.width_ratios, col_total, width);
    let rows = offsets(&grid.height_ratios, row_total, height);

    (0..figure.axes.len())
        .map(|i| {
            let (r, c) = figure.cell(i);
            let (left, w) = cols.get(c).copied().unwrap_or((0.0, width));
            let (top, h) = rows.get(r).copied().unwrap_or((0.0, height));
            PlotArea {
                left,
                top,
                width: w,
                height: h,
            }
        })
        .collect()
}

/// `(start, size)` of each track when `extent` is split by `ratios`.
fn offsets(ratios: &[f64], total: f64, extent: f64) -> Vec<(f64, f64)> {
    let mut start = 0.0;
    ratios
        .iter()
        .map(|r| {
            let size = r / total * extent;
            let track = (start, size);
            start += size;
            track
        })
        .collect()
}

/// Plot area inside a cell, leaving room for title, labels and ticks.
fn plot_area(ax: &Axes, cell: PlotArea, dpi: f64) -> PlotArea {
    let title_lines = ax
        .title
        .as_ref()
        .map(|t| (t.text.lines().count() as f64, pt_to_px(t.size, dpi)))
        .unwrap_or((0.0, 0.0));
    let tick_px = pt_to_px(TICK_FONT_PT, dpi);

    let top = 10.0 + title_lines.0 * title_lines.1 * 1.25;
    let (left, bottom) = if ax.hide_ticks {
        (10.0, 10.0)
    } else {
        (tick_px * 4.5 + if ax.ylabel.is_some() { tick_px * 1.8 } else { 0.0 }, tick_px * 2.5)
    };
    let right = 12.0;

    let mut area = PlotArea {
        left: cell.left + left,
        top: cell.top + top,
        width: (cell.width - left - right).max(1.0),
        height: (cell.height - top - bottom).max(1.0),
    };

    if ax.equal_aspect {
        let (x0, x1, y0, y1) = ax.view_limits();
        let (x0, x1) = widen(x0, x1);
        let (y0, y1) = widen(y0, y1);
        let data_ratio = (y1 - y0) / (x1 - x0);
        if area.height / area.width > data_ratio {
            let h = area.width * data_ratio;
            area.top += (area.height - h) / 2.0;
            area.height = h;
        } else {
            let w = area.height / data_ratio;
            area.left += (area.width - w) / 2.0;
            area.width = w;
        }
    }
    area
}

fn render_axes(out: &mut String, ax: &Axes, area: PlotArea, id: &str, dpi: f64) -> AnimResult<()> {
    let tf = Transform::new(area, ax.view_limits());
    let clip = format!("{}-clip", id);

    writeln!(out, r#"<g id="{}">"#, id)?;
    writeln!(
        out,
        r#"<defs><clipPath id="{}"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath></defs>"#,
        clip, area.left, area.top, area.width, area.height
    )?;

    let xticks = nice_ticks(tf.x0, tf.x1);
    let yticks = nice_ticks(tf.y0, tf.y1);

    if let Some(alpha) = ax.grid {
        for &t in &xticks {
            let x = tf.x(t);
            writeln!(
                out,
                r##"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="#b0b0b0" stroke-opacity="{alpha}" stroke-width="0.8"/>"##,
                area.top,
                area.bottom(),
            )?;
        }
        for &t in &yticks {
            let y = tf.y(t);
            writeln!(
                out,
                r##"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="#b0b0b0" stroke-opacity="{alpha}" stroke-width="0.8"/>"##,
                area.left,
                area.right(),
            )?;
        }
    }

    writeln!(out, r#"<g clip-path="url(#{})">"#, clip)?;
    for artist in &ax.artists {
        render_artist(out, artist, &tf, dpi)?;
    }
    writeln!(out, "</g>")?;

    writeln!(
        out,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black" stroke-width="1"/>"#,
        area.left, area.top, area.width, area.height
    )?;

    if !ax.hide_ticks {
        render_ticks(out, &tf, &xticks, &yticks, dpi)?;
    }
    if let Some(label) = &ax.ylabel {
        let x = area.left - pt_to_px(TICK_FONT_PT, dpi) * 5.0;
        let y = area.top + area.height / 2.0;
        writeln!(
            out,
            r#"<text x="{x:.2}" y="{y:.2}" font-size="{:.1}" text-anchor="middle" transform="rotate(-90 {x:.2} {y:.2})">{}</text>"#,
            pt_to_px(10.0, dpi),
            escape(label)
        )?;
    }
    if let Some(title) = &ax.title {
        let size = pt_to_px(title.size, dpi);
        let lines: Vec<&str> = title.text.lines().collect();
        let cx = area.left + area.width / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let y = area.top - 6.0 - (lines.len() - 1 - i) as f64 * size * 1.25;
            writeln!(
                out,
                r#"<text x="{cx:.2}" y="{y:.2}" font-size="{size:.1}" text-anchor="middle" fill="{}"{}>{}</text>"#,
                title.color.to_hex(),
                if title.bold { r#" font-weight="bold""# } else { "" },
                escape(line)
            )?;
        }
    }
    if let Some(loc) = ax.legend {
        render_legend(out, ax, area, loc, dpi)?;
    }

    writeln!(out, "</g>")?;
    Ok(())
}

fn render_ticks(out: &mut String, tf: &Transform, xticks: &[f64], yticks: &[f64], dpi: f64) -> AnimResult<()> {
    let area = tf.area;
    let size = pt_to_px(TICK_FONT_PT, dpi);
    let xdec = tick_decimals(xticks);
    let ydec = tick_decimals(yticks);

    for &t in xticks {
        let x = tf.x(t);
        writeln!(
            out,
            r#"<line x1="{x:.2}" y1="{b:.2}" x2="{x:.2}" y2="{:.2}" stroke="black"/><text x="{x:.2}" y="{:.2}" font-size="{size:.1}" text-anchor="middle">{}</text>"#,
            area.bottom() + TICK_LEN_PX,
            area.bottom() + TICK_LEN_PX + size,
            format_tick(t, xdec),
            b = area.bottom(),
        )?;
    }
    for &t in yticks {
        let y = tf.y(t);
        writeln!(
            out,
            r#"<line x1="{:.2}" y1="{y:.2}" x2="{l:.2}" y2="{y:.2}" stroke="black"/><text x="{:.2}" y="{:.2}" font-size="{size:.1}" text-anchor="end">{}</text>"#,
            area.left - TICK_LEN_PX,
            area.left - TICK_LEN_PX - 2.0,
            y + size * 0.35,
            format_tick(t, ydec),
            l = area.left,
        )?;
    }
    Ok(())
}

fn render_artist(out: &mut String, artist: &Artist, tf: &Transform, dpi: f64) -> AnimResult<()> {
    match artist {
        Artist::Stem { xs, ys, style, .. } => {
            if let Some(color) = style.baseline {
                let y = tf.y(0.0);
                writeln!(
                    out,
                    r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
                    tf.area.left,
                    tf.area.right(),
                    color.to_hex(),
                    pt_to_px(1.0, dpi),
                )?;
            }
            for (&x, &y) in xs.iter().zip(ys) {
                let px = tf.x(x);
                writeln!(
                    out,
                    r#"<line x1="{px:.2}" y1="{:.2}" x2="{px:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
                    tf.y(0.0),
                    tf.y(y),
                    style.stem.to_hex(),
                    pt_to_px(1.5, dpi),
                )?;
                render_marker(out, tf.x(x), tf.y(y), &style.marker, dpi)?;
            }
        }
        Artist::Line { xs, ys, stroke, .. } => {
            writeln!(
                out,
                r#"<polyline points="{}" fill="none"{}/>"#,
                points(xs, ys, tf),
                stroke_attrs(stroke, dpi)
            )?;
        }
        Artist::Fill { xs, ys, color, alpha, .. } => {
            if let (Some(&first), Some(&last)) = (xs.first(), xs.last()) {
                let base = tf.y(0.0);
                writeln!(
                    out,
                    r#"<polygon points="{:.2},{base:.2} {} {:.2},{base:.2}" fill="{}" fill-opacity="{}"/>"#,
                    tf.x(first),
                    points(xs, ys, tf),
                    tf.x(last),
                    color.to_hex(),
                    alpha
                )?;
            }
        }
        Artist::Span { x0, x1, color, alpha, .. } => {
            let (a, b) = (tf.x(*x0), tf.x(*x1));
            writeln!(
                out,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" fill-opacity="{}"/>"#,
                a.min(b),
                tf.area.top,
                (b - a).abs(),
                tf.area.height,
                color.to_hex(),
                alpha
            )?;
        }
        Artist::VLine { x, stroke, .. } => {
            let px = tf.x(*x);
            writeln!(
                out,
                r#"<line x1="{px:.2}" y1="{:.2}" x2="{px:.2}" y2="{:.2}"{}/>"#,
                tf.area.top,
                tf.area.bottom(),
                stroke_attrs(stroke, dpi)
            )?;
        }
        Artist::Text { x, y, text, color, bold } => {
            writeln!(
                out,
                r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" text-anchor="middle" fill="{}"{}>{}</text>"#,
                tf.x(*x),
                tf.y(*y),
                pt_to_px(10.0, dpi),
                color.to_hex(),
                if *bold { r#" font-weight="bold""# } else { "" },
                escape(text)
            )?;
        }
        Artist::Point { x, y, marker } => render_marker(out, tf.x(*x), tf.y(*y), marker, dpi)?,
    }
    Ok(())
}

fn render_marker(out: &mut String, cx: f64, cy: f64, marker: &Marker, dpi: f64) -> AnimResult<()> {
    let r = pt_to_px(marker.size, dpi) / 2.0;
    let paint = if marker.filled {
        format!(r#"fill="{}""#, marker.color.to_hex())
    } else {
        format!(r#"fill="none" stroke="{}" stroke-width="{:.2}""#, marker.color.to_hex(), pt_to_px(2.0, dpi))
    };
    match marker.shape {
        MarkerShape::Circle => writeln!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" {paint}/>"#)?,
        MarkerShape::Square => writeln!(
            out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {paint}/>"#,
            cx - r,
            cy - r,
            2.0 * r,
            2.0 * r
        )?,
    }
    Ok(())
}

fn render_legend(out: &mut String, ax: &Axes, area: PlotArea, loc: LegendLoc, dpi: f64) -> AnimResult<()> {
    let entries: Vec<(&Artist, &str)> = ax
        .legend_entries()
        .filter_map(|a| a.label().map(|l| (a, l)))
        .collect();
    if entries.is_empty() {
        return Ok(());
    }

    let size = pt_to_px(TICK_FONT_PT, dpi);
    let row = size * 1.4;
    let swatch = size * 2.0;
    let longest = entries.iter().map(|(_, l)| l.chars().count()).max().unwrap_or(0) as f64;
    let width = swatch + 14.0 + longest * size * 0.6;
    let height = entries.len() as f64 * row + 8.0;
    let left = match loc {
        LegendLoc::UpperLeft => area.left + 6.0,
        LegendLoc::UpperRight => area.right() - 6.0 - width,
    };
    let top = area.top + 6.0;

    writeln!(
        out,
        r##"<rect x="{left:.2}" y="{top:.2}" width="{width:.2}" height="{height:.2}" fill="white" fill-opacity="0.8" stroke="#cccccc" rx="3"/>"##
    )?;
    for (i, (artist, label)) in entries.iter().enumerate() {
        let cy = top + 4.0 + row * (i as f64 + 0.5);
        let x0 = left + 5.0;
        legend_swatch(out, artist, x0, cy, swatch, size, dpi)?;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" font-size="{size:.1}">{}</text>"#,
            x0 + swatch + 4.0,
            cy + size * 0.35,
            escape(label)
        )?;
    }
    Ok(())
}

fn legend_swatch(out: &mut String, artist: &Artist, x0: f64, cy: f64, len: f64, size: f64, dpi: f64) -> AnimResult<()> {
    match artist {
        Artist::Line { stroke, .. } | Artist::VLine { stroke, .. } => {
            writeln!(
                out,
                r#"<line x1="{x0:.2}" y1="{cy:.2}" x2="{:.2}" y2="{cy:.2}"{}/>"#,
                x0 + len,
                stroke_attrs(stroke, dpi)
            )?;
        }
        Artist::Fill { color, alpha, .. } | Artist::Span { color, alpha, .. } => {
            writeln!(
                out,
                r#"<rect x="{x0:.2}" y="{:.2}" width="{len:.2}" height="{:.2}" fill="{}" fill-opacity="{}"/>"#,
                cy - size * 0.35,
                size * 0.7,
                color.to_hex(),
                alpha.max(0.2)
            )?;
        }
        Artist::Stem { style, .. } => render_marker(out, x0 + len / 2.0, cy, &style.marker, dpi)?,
        Artist::Text { .. } | Artist::Point { .. } => {}
    }
    Ok(())
}

fn stroke_attrs(stroke: &Stroke, dpi: f64) -> String {
    let width = pt_to_px(stroke.width, dpi);
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{:.2}" stroke-opacity="{}""#,
        stroke.color.to_hex(),
        width,
        stroke.alpha.clamp(0.0, 1.0)
    );
    if stroke.style == LineStyle::Dashed {
        let _ = write!(attrs, r#" stroke-dasharray="{:.1} {:.1}""#, width * 3.7, width * 1.6);
    }
    if stroke.round_cap {
        attrs.push_str(r#" stroke-linecap="round""#);
    }
    attrs
}

fn points(xs: &[f64], ys: &[f64], tf: &Transform) -> String {
    let mut s = String::with_capacity(xs.len() * 16);
    for (&x, &y) in xs.iter().zip(ys) {
        if !s.is_empty() {
            s.push(' ');
        }
        let _ = write!(s, "{:.2},{:.2}", tf.x(x), tf.y(y));
    }
    s
}

/// Round tick positions covering `[lo, hi]`, about five of them.
pub fn nice_ticks(lo: f64, hi: f64) -> Vec<f64> {
    if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let step = nice_step((hi - lo) / TARGET_TICKS);
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        // Snap -0.0 and float dust on zero
        .map(|t| if t.abs() < step * 1e-9 { 0.0 } else { t })
        .collect()
}

/// 1, 2 or 5 times a power of ten, at least `raw`.
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let fraction = raw / magnitude - 1e-9;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn tick_decimals(ticks: &[f64]) -> usize {
    match ticks {
        [a, b, ..] => (-(b - a).log10().floor()).max(0.0) as usize,
        _ => 0,
    }
}

fn format_tick(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Escape text for use in XML content and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
