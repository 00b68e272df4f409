//! Figure facade over plotters.
//!
//! A `GraphMaker` collects panels and their elements, then renders all of
//! them to one SVG file in `write_svg`. Elements keep their data-space
//! values until rendering, where each axis maps them to display space.

pub mod axis;
pub mod palette;
pub mod violin;

use std::error::Error;
use std::fs::create_dir_all;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::Color as _;
use plotters::style::text_anchor::Pos;

pub use plotters::style::text_anchor::{HPos, VPos};

pub use self::axis::{Axis, Scale};
pub use self::palette::Color;

use crate::config::RenderConfig;

type Coord = Cartesian2d<TickedRange, TickedRange>;
type Chart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Coord>;
type Range2 = ((f64, f64), (f64, f64));

const FONT: &str = "sans-serif";
const GRADIENT_BANDS: usize = 32;
const KDE_POINTS: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Dot,
    Circle,
    Cross,
    Square,
    TriangleUp,
    TriangleDown,
    Diamond,
}

impl Marker {
    /// Filled outline and stroked path of the marker, centred on `(cx, cy)`.
    fn shape(self, cx: i32, cy: i32) -> (Vec<(i32, i32)>, Vec<(i32, i32)>) {
        let s = 4;
        let ring = |r: f64, n: usize| -> Vec<(i32, i32)> {
            (0..n)
                .map(|i| {
                    let a = i as f64 / n as f64 * std::f64::consts::TAU;
                    (
                        cx + (r * a.cos()).round() as i32,
                        cy + (r * a.sin()).round() as i32,
                    )
                })
                .collect()
        };
        match self {
            Marker::Dot => (ring(2.0, 8), Vec::new()),
            Marker::Circle => (ring(s as f64, 16), Vec::new()),
            Marker::Square => (
                vec![
                    (cx - s, cy - s),
                    (cx + s, cy - s),
                    (cx + s, cy + s),
                    (cx - s, cy + s),
                ],
                Vec::new(),
            ),
            Marker::TriangleUp => (
                vec![(cx, cy - s - 1), (cx + s, cy + s), (cx - s, cy + s)],
                Vec::new(),
            ),
            Marker::TriangleDown => (
                vec![(cx, cy + s + 1), (cx + s, cy - s), (cx - s, cy - s)],
                Vec::new(),
            ),
            Marker::Diamond => (
                vec![
                    (cx, cy - s - 1),
                    (cx + s, cy),
                    (cx, cy + s + 1),
                    (cx - s, cy),
                ],
                Vec::new(),
            ),
            Marker::Cross => (
                Vec::new(),
                vec![
                    (cx - s, cy - s),
                    (cx + s, cy + s),
                    (cx, cy),
                    (cx - s, cy + s),
                    (cx + s, cy - s),
                ],
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub color: Color,
    pub line: LineStyle,
    pub line_width: u32,
    pub marker: Option<Marker>,
    pub alpha: f64,
    pub label: Option<String>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            color: Color::Index(0),
            line: LineStyle::Solid,
            line_width: 1,
            marker: None,
            alpha: 1.0,
            label: None,
        }
    }
}

impl PlotStyle {
    pub fn new(color: impl Into<Color>) -> Self {
        Self {
            color: color.into(),
            ..Self::default()
        }
    }

    pub fn line(mut self, line: LineStyle) -> Self {
        self.line = line;
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ViolinStyle {
    pub color: Color,
    /// Colour of the median line and the fliers.
    pub accent: Color,
    /// Half width of the violin in x units.
    pub half_width: f64,
    pub show_box: bool,
}

impl Default for ViolinStyle {
    fn default() -> Self {
        Self {
            color: Color::Index(0),
            accent: Color::Index(1),
            half_width: 0.4,
            show_box: true,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Bar {
    pub x: f64,
    pub height: f64,
    pub width: f64,
    pub fill: Color,
    pub edge: Color,
}

#[derive(Clone, Copy)]
pub struct TextSpec {
    pub color: Color,
    pub size: f64,
    pub h_align: HPos,
    pub v_align: VPos,
    /// Pixel offset from the anchor point.
    pub offset: (i32, i32),
    /// Halo drawn behind the text.
    pub border: Option<Color>,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            color: Color::Black,
            size: 12.0,
            h_align: HPos::Center,
            v_align: VPos::Center,
            offset: (0, 0),
            border: None,
        }
    }
}

impl TextSpec {
    pub fn new(color: impl Into<Color>) -> Self {
        Self {
            color: color.into(),
            ..Self::default()
        }
    }

    pub fn align(mut self, h: HPos, v: VPos) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    pub fn offset(mut self, dx: i32, dy: i32) -> Self {
        self.offset = (dx, dy);
        self
    }

    pub fn border(mut self, color: Color) -> Self {
        self.border = Some(color);
        self
    }
}

/// Fill between two y curves, optionally with a vertical gradient from
/// `color` at the first curve to `gradient_to` at the second.
#[derive(Clone, Copy, Debug)]
pub struct Fill {
    pub color: Color,
    pub gradient_to: Option<Color>,
    pub alpha: f64,
}

impl Fill {
    pub fn solid(color: impl Into<Color>) -> Self {
        Self {
            color: color.into(),
            gradient_to: None,
            alpha: 1.0,
        }
    }

    pub fn gradient(from: impl Into<Color>, to: impl Into<Color>) -> Self {
        Self {
            color: from.into(),
            gradient_to: Some(to.into()),
            alpha: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendPos {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl LegendPos {
    fn to_plotters(self) -> SeriesLabelPosition {
        match self {
            LegendPos::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPos::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPos::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendPos::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AxesSpec {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub legend: Option<LegendPos>,
}

impl AxesSpec {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn legend(mut self, pos: LegendPos) -> Self {
        self.legend = Some(pos);
        self
    }
}

/// Handle to a panel created by [`GraphMaker::create_ax`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ax(usize);

#[derive(Clone)]
enum Element {
    Series {
        xs: Vec<f64>,
        ys: Vec<f64>,
        style: PlotStyle,
    },
    Violin {
        data: Vec<f64>,
        position: f64,
        style: ViolinStyle,
    },
    Bars(Vec<Bar>),
    Text {
        x: f64,
        y: f64,
        text: String,
        spec: TextSpec,
    },
    Band {
        xs: Vec<f64>,
        y0s: Vec<f64>,
        y1s: Vec<f64>,
        fill: Fill,
    },
}

#[derive(Clone)]
struct Panel {
    row: usize,
    col: usize,
    spec: AxesSpec,
    elements: Vec<Element>,
}

fn widen(extent: &mut Option<(f64, f64)>, v: f64) {
    *extent = Some(match *extent {
        None => (v, v),
        Some((lo, hi)) => (lo.min(v), hi.max(v)),
    });
}

impl Panel {
    fn has_labels(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, Element::Series { style, .. } if style.label.is_some()))
    }

    /// Display-space ranges of both axes.
    fn ranges(&self) -> Range2 {
        let xs = self.spec.x.scale;
        let ys = self.spec.y.scale;
        let mut ex = None;
        let mut ey = None;
        for element in &self.elements {
            match element {
                Element::Series { xs: x, ys: y, .. } => {
                    for (&a, &b) in x.iter().zip(y) {
                        if let (Some(a), Some(b)) = (xs.forward(a), ys.forward(b)) {
                            widen(&mut ex, a);
                            widen(&mut ey, b);
                        }
                    }
                }
                Element::Violin {
                    data,
                    position,
                    style,
                } => {
                    if let Some(p) = xs.forward(*position) {
                        widen(&mut ex, p - style.half_width);
                        widen(&mut ex, p + style.half_width);
                    }
                    data.iter()
                        .filter_map(|&v| ys.forward(v))
                        .for_each(|v| widen(&mut ey, v));
                }
                Element::Bars(bars) => {
                    for bar in bars {
                        if let Some(p) = xs.forward(bar.x) {
                            widen(&mut ex, p - bar.width / 2.0);
                            widen(&mut ex, p + bar.width / 2.0);
                        }
                        if let Some(h) = ys.forward(bar.height) {
                            widen(&mut ey, h);
                        }
                        if let Some(z) = ys.forward(0.0) {
                            widen(&mut ey, z);
                        }
                    }
                }
                // Text and bands follow the data; they never set the range.
                Element::Text { .. } | Element::Band { .. } => {}
            }
        }
        (
            self.spec.x.resolve_range(ex),
            self.spec.y.resolve_range(ey),
        )
    }
}

pub struct GraphMaker {
    path: PathBuf,
    size: (u32, u32),
    grid: (usize, usize),
    panels: Vec<Panel>,
}

impl GraphMaker {
    /// Figure written to `{out_dir}/{name}.svg`.
    pub fn new(out_dir: &Path, name: &str, render: &RenderConfig) -> Self {
        Self {
            path: out_dir.join(format!("{name}.svg")),
            size: (render.width.max(1), render.height.max(1)),
            grid: (1, 1),
            panels: Vec::new(),
        }
    }

    pub fn height_scale(mut self, scale: f64) -> Self {
        self.size.1 = (self.size.1 as f64 * scale).round().max(1.0) as u32;
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn create_grid(&mut self, rows: usize, cols: usize) {
        self.grid = (rows.max(1), cols.max(1));
    }

    pub fn create_ax(&mut self, row: usize, col: usize, spec: AxesSpec) -> Ax {
        self.panels.push(Panel {
            row,
            col,
            spec,
            elements: Vec::new(),
        });
        Ax(self.panels.len() - 1)
    }

    fn push(&mut self, ax: Ax, element: Element) {
        if let Some(panel) = self.panels.get_mut(ax.0) {
            panel.elements.push(element);
        }
    }

    /// Line and/or markers through `(xs[i], ys[i])`. With empty data and a
    /// label this adds a legend-only entry.
    pub fn plot(&mut self, ax: Ax, xs: &[f64], ys: &[f64], style: PlotStyle) {
        self.push(
            ax,
            Element::Series {
                xs: xs.to_vec(),
                ys: ys.to_vec(),
                style,
            },
        );
    }

    pub fn violin(&mut self, ax: Ax, data: &[f64], position: f64, style: ViolinStyle) {
        self.push(
            ax,
            Element::Violin {
                data: data.to_vec(),
                position,
                style,
            },
        );
    }

    pub fn bars(&mut self, ax: Ax, bars: Vec<Bar>) {
        self.push(ax, Element::Bars(bars));
    }

    pub fn text(&mut self, ax: Ax, x: f64, y: f64, text: impl Into<String>, spec: TextSpec) {
        self.push(
            ax,
            Element::Text {
                x,
                y,
                text: text.into(),
                spec,
            },
        );
    }

    pub fn fill_between_y(&mut self, ax: Ax, xs: &[f64], y0s: &[f64], y1s: &[f64], fill: Fill) {
        self.push(
            ax,
            Element::Band {
                xs: xs.to_vec(),
                y0s: y0s.to_vec(),
                y1s: y1s.to_vec(),
                fill,
            },
        );
    }

    /// Render every panel and write the SVG file.
    pub fn write_svg(&self) -> Result<PathBuf, Box<dyn Error>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let (rows, cols) = self.grid;
        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let areas = root.split_evenly((rows, cols));
        for panel in &self.panels {
            if panel.row >= rows || panel.col >= cols {
                return Err(format!(
                    "panel ({}, {}) outside the {rows}x{cols} grid",
                    panel.row, panel.col
                )
                .into());
            }
            render_panel(&areas[panel.row * cols + panel.col], panel)?;
        }
        root.present()?;
        Ok(self.path.clone())
    }
}

/// Linear display-space axis whose grid lines and labels sit exactly on
/// precomputed tick positions.
#[derive(Clone)]
struct TickedRange {
    inner: RangedCoordf64,
    keys: Vec<f64>,
}

impl TickedRange {
    fn new((lo, hi): (f64, f64), ticks: &[(f64, String)]) -> Self {
        Self {
            inner: RangedCoordf64::from(lo..hi),
            keys: ticks.iter().map(|t| t.0).collect(),
        }
    }
}

impl Ranged for TickedRange {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        // No light mesh: only the ticks themselves get grid lines.
        if hint.max_num_points() == 0 || hint.weight().allow_light_points() {
            return Vec::new();
        }
        self.keys.clone()
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

fn tick_label(ticks: &[(f64, String)], v: f64) -> String {
    ticks
        .iter()
        .find(|(pos, _)| (pos - v).abs() <= 1e-9 * pos.abs().max(1.0))
        .map(|(_, label)| label.clone())
        .unwrap_or_default()
}

fn render_panel(area: &DrawingArea<SVGBackend<'_>, Shift>, panel: &Panel) -> Result<(), Box<dyn Error>> {
    let ((x0, x1), (y0, y1)) = panel.ranges();
    let x_ticks = panel.spec.x.ticks((x0, x1));
    let y_ticks = panel.spec.y.ticks((y0, y1));

    let longest_x = x_ticks.iter().map(|t| t.1.chars().count()).max().unwrap_or(0);
    let x_area = if panel.spec.x.rotate_labels {
        30 + 7 * longest_x as u32
    } else {
        45
    };

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .x_label_area_size(x_area)
        .y_label_area_size(70);
    if let Some(title) = &panel.spec.title {
        builder.caption(title, TextStyle::from((FONT, 16.0).into_font()));
    }
    let mut chart = builder.build_cartesian_2d(
        TickedRange::new((x0, x1), &x_ticks),
        TickedRange::new((y0, y1), &y_ticks),
    )?;

    let x_fmt = |v: &f64| tick_label(&x_ticks, *v);
    let y_fmt = |v: &f64| tick_label(&y_ticks, *v);
    let x_desc = panel.spec.x.description();
    let y_desc = panel.spec.y.description();
    let x_label_font = if panel.spec.x.rotate_labels {
        TextStyle::from((FONT, 11.0).into_font().transform(FontTransform::Rotate90))
    } else {
        TextStyle::from((FONT, 11.0).into_font())
    };

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(x_ticks.len().max(1))
        .y_labels(y_ticks.len().max(1))
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_label_style(x_label_font)
        .bold_line_style(BLACK.mix(0.15));
    if !panel.spec.x.grid {
        mesh.disable_x_mesh();
    }
    if !panel.spec.y.grid {
        mesh.disable_y_mesh();
    }
    mesh.draw()?;

    let range = ((x0, x1), (y0, y1));
    for element in &panel.elements {
        match element {
            Element::Series { xs, ys, style } => draw_series(&mut chart, panel, xs, ys, style)?,
            Element::Violin {
                data,
                position,
                style,
            } => draw_violin(&mut chart, panel, data, *position, style)?,
            Element::Bars(bars) => draw_bars(&mut chart, panel, range, bars)?,
            Element::Text { x, y, text, spec } => draw_text(&mut chart, panel, *x, *y, text, spec)?,
            Element::Band { xs, y0s, y1s, fill } => draw_band(&mut chart, panel, xs, y0s, y1s, fill)?,
        }
    }

    if let Some(pos) = panel.spec.legend {
        if panel.has_labels() {
            chart
                .configure_series_labels()
                .position(pos.to_plotters())
                .label_font(TextStyle::from((FONT, 11.0).into_font()))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
    }
    Ok(())
}

fn to_display(panel: &Panel, x: f64, y: f64) -> Option<(f64, f64)> {
    Some((
        panel.spec.x.scale.forward(x)?,
        panel.spec.y.scale.forward(y)?,
    ))
}

fn shape_style(color: Color, alpha: f64, filled: bool, width: u32) -> ShapeStyle {
    ShapeStyle {
        color: color.rgb().mix(alpha),
        filled,
        stroke_width: width,
    }
}

fn draw_series<'a>(
    chart: &mut Chart<'a, 'a>,
    panel: &Panel,
    xs: &[f64],
    ys: &[f64],
    style: &PlotStyle,
) -> Result<(), Box<dyn Error>> {
    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(&x, &y)| to_display(panel, x, y))
        .collect();
    let line = shape_style(style.color, style.alpha, false, style.line_width);
    let marker_fill = shape_style(style.color, style.alpha, true, 1);
    let marker_stroke = shape_style(style.color, style.alpha, false, 2);

    if points.len() > 1 {
        match style.line {
            LineStyle::Solid => {
                chart.draw_series(LineSeries::new(points.clone(), line))?;
            }
            LineStyle::Dashed => {
                chart.draw_series(DashedLineSeries::new(points.clone(), 6, 4, line))?;
            }
            LineStyle::None => {}
        }
    }

    if let Some(marker) = style.marker {
        let (outline, stroke) = marker.shape(0, 0);
        chart.draw_series(points.iter().map(|&p| {
            EmptyElement::at(p)
                + Polygon::new(outline.clone(), marker_fill)
                + PathElement::new(stroke.clone(), marker_stroke)
        }))?;
    }

    if let Some(label) = &style.label {
        let line_kind = style.line;
        let marker = style.marker;
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
            .label(label.as_str())
            .legend(move |(x, y)| {
                let segment = match line_kind {
                    LineStyle::None => Vec::new(),
                    _ => vec![(x, y), (x + 20, y)],
                };
                let (outline, stroke) = marker.map(|m| m.shape(x + 10, y)).unwrap_or_default();
                EmptyElement::at((0, 0))
                    + PathElement::new(segment, line)
                    + Polygon::new(outline, marker_fill)
                    + PathElement::new(stroke, marker_stroke)
            });
    }
    Ok(())
}

fn draw_violin(
    chart: &mut Chart<'_, '_>,
    panel: &Panel,
    data: &[f64],
    position: f64,
    style: &ViolinStyle,
) -> Result<(), Box<dyn Error>> {
    let Some(pos) = panel.spec.x.scale.forward(position) else {
        return Ok(());
    };
    let values: Vec<f64> = data
        .iter()
        .filter_map(|&v| panel.spec.y.scale.forward(v))
        .collect();
    let Some(stats) = violin::box_stats(&values) else {
        return Ok(());
    };

    let density = violin::kde(&values, KDE_POINTS);
    let peak = density.iter().map(|d| d.1).fold(0.0f64, f64::max);
    if peak > 0.0 {
        let w = style.half_width / peak;
        let mut body: Vec<(f64, f64)> = density.iter().map(|&(y, d)| (pos + d * w, y)).collect();
        body.extend(density.iter().rev().map(|&(y, d)| (pos - d * w, y)));
        chart.draw_series(std::iter::once(Polygon::new(
            body.clone(),
            shape_style(style.color, 0.35, true, 1),
        )))?;
        if let Some(&first) = body.first() {
            body.push(first);
        }
        chart.draw_series(std::iter::once(PathElement::new(
            body,
            shape_style(style.color, 1.0, false, 1),
        )))?;
    }

    let edge = shape_style(style.color, 1.0, false, 1);
    chart.draw_series([
        PathElement::new(vec![(pos, stats.whisker_lo), (pos, stats.q1)], edge),
        PathElement::new(vec![(pos, stats.q3), (pos, stats.whisker_hi)], edge),
    ])?;
    if style.show_box {
        let bw = style.half_width * 0.15;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(pos - bw, stats.q1), (pos + bw, stats.q3)],
            shape_style(style.color, 1.0, true, 1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(pos - bw, stats.median), (pos + bw, stats.median)],
            shape_style(style.accent, 1.0, false, 2),
        )))?;
    }
    let flier = shape_style(style.accent, 0.8, true, 1);
    chart.draw_series(
        stats
            .fliers
            .iter()
            .map(|&f| Circle::new((pos, f), 1, flier)),
    )?;
    Ok(())
}

fn draw_bars(
    chart: &mut Chart<'_, '_>,
    panel: &Panel,
    range: Range2,
    bars: &[Bar],
) -> Result<(), Box<dyn Error>> {
    let ((_, _), (y_lo, _)) = range;
    let base = panel.spec.y.scale.forward(0.0).unwrap_or(y_lo);
    for bar in bars {
        let (Some(x), Some(h)) = (
            panel.spec.x.scale.forward(bar.x),
            panel.spec.y.scale.forward(bar.height),
        ) else {
            continue;
        };
        let half = bar.width / 2.0;
        let corners = [(x - half, base), (x + half, h)];
        chart.draw_series([
            Rectangle::new(corners, shape_style(bar.fill, 1.0, true, 1)),
            Rectangle::new(corners, shape_style(bar.edge, 1.0, false, 1)),
        ])?;
    }
    Ok(())
}

fn draw_text(
    chart: &mut Chart<'_, '_>,
    panel: &Panel,
    x: f64,
    y: f64,
    text: &str,
    spec: &TextSpec,
) -> Result<(), Box<dyn Error>> {
    let Some(p) = to_display(panel, x, y) else {
        return Ok(());
    };
    let (dx, dy) = spec.offset;
    let pos = Pos::new(spec.h_align, spec.v_align);
    let font = (FONT, spec.size).into_font();
    if let Some(border) = spec.border {
        let halo = font.color(&border.rgb()).pos(pos);
        chart.draw_series([(-1, -1), (1, -1), (-1, 1), (1, 1)].into_iter().map(|(ox, oy)| {
            EmptyElement::at(p) + Text::new(text.to_string(), (dx + ox, dy + oy), halo.clone())
        }))?;
    }
    let style = font.color(&spec.color.rgb()).pos(pos);
    chart.draw_series(std::iter::once(
        EmptyElement::at(p) + Text::new(text.to_string(), (dx, dy), style),
    ))?;
    Ok(())
}

fn draw_band(
    chart: &mut Chart<'_, '_>,
    panel: &Panel,
    xs: &[f64],
    y0s: &[f64],
    y1s: &[f64],
    fill: &Fill,
) -> Result<(), Box<dyn Error>> {
    let columns: Vec<(f64, f64, f64)> = xs
        .iter()
        .zip(y0s.iter().zip(y1s))
        .filter_map(|(&x, (&a, &b))| {
            let x = panel.spec.x.scale.forward(x)?;
            let a = panel.spec.y.scale.forward(a)?;
            let b = panel.spec.y.scale.forward(b)?;
            Some((x, a, b))
        })
        .collect();
    if columns.len() < 2 {
        return Ok(());
    }
    let bands = if fill.gradient_to.is_some() {
        GRADIENT_BANDS
    } else {
        1
    };
    for k in 0..bands {
        let t0 = k as f64 / bands as f64;
        let t1 = (k + 1) as f64 / bands as f64;
        let mut poly: Vec<(f64, f64)> = columns
            .iter()
            .map(|&(x, a, b)| (x, a + (b - a) * t0))
            .collect();
        poly.extend(columns.iter().rev().map(|&(x, a, b)| (x, a + (b - a) * t1)));
        let rgb = match fill.gradient_to {
            Some(end) => palette::lerp(fill.color, end, (t0 + t1) / 2.0),
            None => fill.color.rgb(),
        };
        chart.draw_series(std::iter::once(Polygon::new(
            poly,
            ShapeStyle {
                color: rgb.mix(fill.alpha),
                filled: true,
                stroke_width: 0,
            },
        )))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "ringosc_plot_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn panel_range_follows_violin_and_series() {
        let mut gm = GraphMaker::new(Path::new("out"), "t", &RenderConfig::default());
        let ax = gm.create_ax(0, 0, AxesSpec::new(Axis::new("x", ""), Axis::new("y", "").log()));
        gm.violin(ax, &[1.0, 10.0, 100.0], 1.0, ViolinStyle::default());
        gm.plot(ax, &[3.0], &[1000.0], PlotStyle::default());
        let ((x0, x1), (y0, y1)) = gm.panels[0].ranges();
        assert!(x0 < 0.6 && x1 > 3.0);
        assert!(y0 < 0.0 && y1 > 3.0);
    }

    #[test]
    fn writes_svg_with_every_element_kind() {
        let dir = unique_dir("all_elements");
        let mut gm = GraphMaker::new(&dir, "demo", &RenderConfig::default());
        gm.create_grid(2, 1);
        let top = gm.create_ax(
            0,
            0,
            AxesSpec::new(
                Axis::new("RO topology", "-").lim(0.5, 2.5).fixed(&[1.0, 2.0], ["A", "B"]),
                Axis::new("C", "-").log().grid().lim(0.5, 1e4),
            )
            .title("violins"),
        );
        gm.fill_between_y(
            top,
            &[0.5, 2.5],
            &[59.0, 59.0],
            &[1e4, 1e4],
            Fill::gradient(Color::White, Color::Index(2)),
        );
        gm.violin(top, &[1.0, 2.0, 3.0, 50.0, 400.0], 1.0, ViolinStyle::default());
        gm.violin(top, &[10.0, 12.0, 11.0], 2.0, ViolinStyle::default());
        gm.text(top, 1.5, 3000.0, "1 stage", TextSpec::default().border(Color::White));

        let bottom = gm.create_ax(
            1,
            0,
            AxesSpec::new(Axis::new("x", "-"), Axis::new("y", "s")).legend(LegendPos::UpperRight),
        );
        gm.plot(
            bottom,
            &[1.0, 2.0, 3.0],
            &[2.0, 1.0, 3.0],
            PlotStyle::new(Color::Index(0)).line(LineStyle::Dashed).marker(Marker::Diamond).label("dashed"),
        );
        gm.plot(bottom, &[], &[], PlotStyle::new(Color::Grey).line(LineStyle::None).marker(Marker::Cross).label("legend only"));
        gm.bars(
            bottom,
            vec![Bar {
                x: 2.0,
                height: 1.5,
                width: 0.5,
                fill: Color::LightBlue,
                edge: Color::Index(0),
            }],
        );

        let path = gm.write_svg().unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("violins"));
        assert!(svg.contains("legend only"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mesh_lines_sit_on_the_axis_ticks() {
        use plotters::coord::ranged1d::{BoldPoints, LightPoints};

        let axis = Axis::new("C", "-").log().lim(0.8, 1e4);
        let range = axis.resolve_range(None);
        let ticks = axis.ticks(range);
        let coord = TickedRange::new(range, &ticks);
        assert_eq!(coord.key_points(BoldPoints(3)), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(coord.key_points(BoldPoints(0)).is_empty());
        assert!(coord.key_points(LightPoints::new(5, 50)).is_empty());
        assert_eq!(coord.map(&range.0, (0, 100)), 0);
        assert_eq!(coord.map(&range.1, (0, 100)), 100);
    }

    #[test]
    fn tick_labels_render_on_log_axes() {
        let dir = unique_dir("log_labels");
        let mut gm = GraphMaker::new(&dir, "labels", &RenderConfig::default());
        let ax = gm.create_ax(
            0,
            0,
            AxesSpec::new(Axis::new("x", "-").lim(0.0, 4.0), Axis::new("C", "-").log().lim(0.8, 1e4)),
        );
        gm.plot(ax, &[1.0, 3.0], &[10.0, 1000.0], PlotStyle::default());
        let svg = std::fs::read_to_string(gm.write_svg().unwrap()).unwrap();
        assert!(svg.contains("10³"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn panel_outside_grid_is_an_error() {
        let dir = unique_dir("outside");
        let mut gm = GraphMaker::new(&dir, "bad", &RenderConfig::default());
        gm.create_ax(1, 0, AxesSpec::default());
        assert!(gm.write_svg().is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
