/*!
# Scene Geometry

Single source of truth for everything drawn on the dot matrix. Both the SVG
writer and the rasterizer consume the [`Scene`] built here, so vector and
raster exports agree by construction.

Axis convention: x runs along sequence B (member), y along sequence A
(representative). Residue `i` (1-indexed) occupies the domain interval
`[i - 1, i]` on its axis.
*/

use emerald_core::coords::{CoordinateTransform, LinearScale, ScaleBinding};
use emerald_core::types::{AlignmentDot, AlignmentSafetyWindowMapping, AlignmentSegment, SeqPos, SequenceSafetyWindow, TickMark};
use emerald_core::windows::{merged_safety_windows, windows_contain};
use serde::{Deserialize, Serialize};

/// Minimum on-screen pixels per residue before dashed per-residue grid lines appear.
pub const GRID_MIN_CELL_PX: f64 = 8.0;
pub const DOT_RADIUS: f64 = 4.0;
pub const MINIMAP_SIZE: f64 = 150.0;
pub const DEFAULT_PLOT_SIZE: f64 = 800.0;

const MINIMAP_INSET: f64 = 10.0;
const BRACKET_OFFSET: f64 = 10.0;
const BRACKET_TICK: f64 = 6.0;
const TICK_LENGTH: f64 = 5.0;

/// Layer toggles. Every flag removes exactly one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualizationSettings {
    pub show_grid: bool,
    pub show_axes: bool,
    pub show_axis_labels: bool,
    pub show_edges: bool,
    pub show_dots: bool,
    pub show_safety_windows: bool,
    pub show_minimap: bool,
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            show_axis_labels: true,
            show_edges: true,
            show_dots: true,
            show_safety_windows: true,
            show_minimap: true,
        }
    }
}

impl VisualizationSettings {
    pub fn is_enabled(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::Background => true,
            LayerKind::Grid => self.show_grid,
            LayerKind::Axes => self.show_axes,
            LayerKind::AxisLabels => self.show_axis_labels,
            LayerKind::SafetyWindows => self.show_safety_windows,
            LayerKind::Edges => self.show_edges,
            LayerKind::Dots => self.show_dots,
            LayerKind::Minimap => self.show_minimap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Background,
    Grid,
    SafetyWindows,
    Edges,
    Dots,
    Axes,
    AxisLabels,
    Minimap,
}

impl LayerKind {
    /// Paint order, back to front.
    pub const ALL: [LayerKind; 8] = [
        LayerKind::Background,
        LayerKind::Grid,
        LayerKind::SafetyWindows,
        LayerKind::Edges,
        LayerKind::Dots,
        LayerKind::Axes,
        LayerKind::AxisLabels,
        LayerKind::Minimap,
    ];

    pub fn class_name(&self) -> &'static str {
        match self {
            LayerKind::Background => "layer-background",
            LayerKind::Grid => "layer-grid",
            LayerKind::SafetyWindows => "layer-safety-windows",
            LayerKind::Edges => "layer-edges",
            LayerKind::Dots => "layer-dots",
            LayerKind::Axes => "layer-axes",
            LayerKind::AxisLabels => "layer-axis-labels",
            LayerKind::Minimap => "minimap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 30.0,
            bottom: 70.0,
            left: 80.0,
        }
    }
}

/// Colors, fonts and margins shared by every exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub background_color: String,
    pub axis_color: String,
    pub grid_color: String,
    pub window_color: String,
    pub window_fill_opacity: f64,
    pub viewport_color: String,
    pub font_family: String,
    pub font_size: f64,
    pub margins: Margins,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            axis_color: "#333333".to_string(),
            grid_color: "#cccccc".to_string(),
            window_color: "green".to_string(),
            window_fill_opacity: 0.15,
            viewport_color: "red".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12.0,
            margins: Margins::default(),
        }
    }
}

/// Pull-based snapshot of everything an export needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default)]
    pub alignments: Vec<AlignmentSegment>,
    /// Sequence A residues.
    #[serde(default)]
    pub representative: String,
    /// Sequence B residues.
    #[serde(default)]
    pub member: String,
    /// Overrides `representative.len()` when the residues are not shipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_length: Option<u64>,
    #[serde(default)]
    pub representative_ticks: Vec<TickMark>,
    #[serde(default)]
    pub member_ticks: Vec<TickMark>,
    #[serde(default)]
    pub transform: CoordinateTransform,
    #[serde(default)]
    pub settings: VisualizationSettings,
    #[serde(default = "default_plot_size")]
    pub width: f64,
    #[serde(default = "default_plot_size")]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor_a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor_b: Option<String>,
}

fn default_plot_size() -> f64 {
    DEFAULT_PLOT_SIZE
}

impl Default for ExportData {
    fn default() -> Self {
        Self {
            alignments: Vec::new(),
            representative: String::new(),
            member: String::new(),
            representative_length: None,
            member_length: None,
            representative_ticks: Vec::new(),
            member_ticks: Vec::new(),
            transform: CoordinateTransform::IDENTITY,
            settings: VisualizationSettings::default(),
            width: DEFAULT_PLOT_SIZE,
            height: DEFAULT_PLOT_SIZE,
            descriptor_a: None,
            descriptor_b: None,
        }
    }
}

impl ExportData {
    pub fn new(alignments: Vec<AlignmentSegment>, representative: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            alignments,
            representative: representative.into(),
            member: member.into(),
            ..Default::default()
        }
    }

    pub fn representative_len(&self) -> u64 {
        self.representative_length
            .unwrap_or(self.representative.chars().count() as u64)
    }

    pub fn member_len(&self) -> u64 {
        self.member_length.unwrap_or(self.member.chars().count() as u64)
    }

    /// Member ticks, or one tick per residue of `member` when none were supplied.
    pub fn x_ticks(&self) -> Vec<TickMark> {
        if self.member_ticks.is_empty() {
            TickMark::for_sequence(&self.member)
        } else {
            self.member_ticks.clone()
        }
    }

    pub fn y_ticks(&self) -> Vec<TickMark> {
        if self.representative_ticks.is_empty() {
            TickMark::for_sequence(&self.representative)
        } else {
            self.representative_ticks.clone()
        }
    }

    pub fn safety_windows(&self) -> AlignmentSafetyWindowMapping {
        merged_safety_windows(&self.alignments)
    }

    pub fn plot_area(&self, margins: &Margins) -> PlotArea {
        PlotArea {
            left: margins.left,
            top: margins.top,
            right: (self.width - margins.right).max(margins.left),
            bottom: (self.height - margins.bottom).max(margins.top),
        }
    }

    /// Fresh base scales for this snapshot's size, bound to its transform.
    pub fn scale_binding(&self, plot: &PlotArea) -> ScaleBinding {
        let base_x = LinearScale::new((0.0, self.member_len() as f64), (plot.left, plot.right));
        let base_y = LinearScale::new((0.0, self.representative_len() as f64), (plot.top, plot.bottom));
        ScaleBinding::new(base_x, base_y, self.transform)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            opacity: 1.0,
            dash: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn dashed(mut self, on: f64, off: f64) -> Self {
        self.dash = Some((on, off));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub anchor: TextAnchor,
    pub font_size: f64,
    pub bold: bool,
    pub fill: String,
    /// Degrees, about `(x, y)`.
    pub rotate: Option<f64>,
    pub middle_baseline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<String>,
        fill_opacity: f64,
        stroke: Option<Stroke>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    Text(TextLabel),
}

impl Primitive {
    fn line((x1, y1): (f64, f64), (x2, y2): (f64, f64), stroke: Stroke) -> Self {
        Primitive::Line { x1, y1, x2, y2, stroke }
    }

    fn filled_rect(x: f64, y: f64, width: f64, height: f64, fill: &str, fill_opacity: f64) -> Self {
        Primitive::Rect {
            x,
            y,
            width,
            height,
            fill: Some(fill.to_string()),
            fill_opacity,
            stroke: None,
        }
    }
}

/// One independently toggled layer. `clipped` primitives are drawn inside the
/// plot area clip; `unclipped` ones may sit in the margins.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub clipped: Vec<Primitive>,
    pub unclipped: Vec<Primitive>,
}

impl Layer {
    fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            clipped: Vec::new(),
            unclipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.clipped.len() + self.unclipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.clipped.iter().chain(self.unclipped.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub plot: PlotArea,
    pub layers: Vec<Layer>,
}

impl Scene {
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }
}

/// Build the full scene for `data` at its own width and height.
pub fn build_scene(data: &ExportData, style: &RenderStyle) -> Scene {
    let ctx = SceneContext::new(data, style);
    let layers = LayerKind::ALL
        .iter()
        .copied()
        .filter(|kind| data.settings.is_enabled(*kind))
        .map(|kind| ctx.build_layer(kind))
        .collect();

    Scene {
        width: data.width,
        height: data.height,
        plot: ctx.plot,
        layers,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

struct SceneContext<'a> {
    data: &'a ExportData,
    style: &'a RenderStyle,
    plot: PlotArea,
    binding: ScaleBinding,
    windows: AlignmentSafetyWindowMapping,
    x_ticks: Vec<TickMark>,
    y_ticks: Vec<TickMark>,
}

impl<'a> SceneContext<'a> {
    fn new(data: &'a ExportData, style: &'a RenderStyle) -> Self {
        let plot = data.plot_area(&style.margins);
        Self {
            data,
            style,
            plot,
            binding: data.scale_binding(&plot),
            windows: data.safety_windows(),
            x_ticks: data.x_ticks(),
            y_ticks: data.y_ticks(),
        }
    }

    fn build_layer(&self, kind: LayerKind) -> Layer {
        match kind {
            LayerKind::Background => self.background(),
            LayerKind::Grid => self.grid(),
            LayerKind::SafetyWindows => self.safety_windows(),
            LayerKind::Edges => self.edges(),
            LayerKind::Dots => self.dots(),
            LayerKind::Axes => self.axes(),
            LayerKind::AxisLabels => self.axis_labels(),
            LayerKind::Minimap => self.minimap(),
        }
    }

    fn map(&self, axis: Axis, value: f64) -> f64 {
        match axis {
            Axis::X => self.binding.x(value),
            Axis::Y => self.binding.y(value),
        }
    }

    fn map_dot(&self, dot: AlignmentDot) -> (f64, f64) {
        (self.binding.x(dot.member_index()), self.binding.y(dot.representative_index()))
    }

    fn plot_range(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.plot.left, self.plot.right),
            Axis::Y => (self.plot.top, self.plot.bottom),
        }
    }

    fn length(&self, axis: Axis) -> SeqPos {
        match axis {
            Axis::X => self.data.member_len(),
            Axis::Y => self.data.representative_len(),
        }
    }

    fn ticks(&self, axis: Axis) -> &[TickMark] {
        match axis {
            Axis::X => &self.x_ticks,
            Axis::Y => &self.y_ticks,
        }
    }

    fn axis_windows(&self, axis: Axis) -> &[SequenceSafetyWindow] {
        match axis {
            Axis::X => &self.windows.sequence_b,
            Axis::Y => &self.windows.sequence_a,
        }
    }

    fn visible(&self, axis: Axis) -> (f64, f64) {
        let (x, y) = self.binding.visible_domain();
        match axis {
            Axis::X => x,
            Axis::Y => y,
        }
    }

    fn cell_px(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.binding.zoomed_x().bandwidth(),
            Axis::Y => self.binding.zoomed_y().bandwidth(),
        }
    }

    fn is_highlighted(&self, axis: Axis, position: Option<SeqPos>) -> bool {
        position.is_some_and(|p| windows_contain(self.axis_windows(axis), p))
    }

    /// Ticks whose residue center is on screen, thinned so labels never collide.
    fn visible_ticks(&self, axis: Axis) -> Vec<(f64, &TickMark)> {
        let (lo, hi) = self.plot_range(axis);
        let min_spacing = self.style.font_size + 2.0;

        let mut ticks: Vec<(f64, &TickMark)> = self
            .ticks(axis)
            .iter()
            .filter(|t| t.value.is_finite())
            .map(|t| (self.map(axis, t.value + 0.5), t))
            .filter(|(px, _)| *px >= lo && *px <= hi)
            .collect();
        ticks.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut kept: Vec<(f64, &TickMark)> = Vec::with_capacity(ticks.len());
        for (px, tick) in ticks {
            if kept.last().map_or(true, |(last, _)| px - last >= min_spacing) {
                kept.push((px, tick));
            }
        }
        kept
    }

    /// First, middle and last visible residue, deduplicated.
    fn index_markers(&self, axis: Axis) -> Vec<SeqPos> {
        let len = self.length(axis);
        if len == 0 {
            return Vec::new();
        }
        let (d0, d1) = self.visible(axis);
        let first = (d0.floor() as SeqPos + 1).min(len);
        let last = (d1.ceil() as SeqPos).clamp(first, len);
        let middle = first + (last - first) / 2;

        let mut markers = vec![first, middle, last];
        markers.dedup();
        markers
    }

    fn background(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::Background);
        layer.unclipped.push(Primitive::filled_rect(
            0.0,
            0.0,
            self.data.width,
            self.data.height,
            &self.style.background_color,
            1.0,
        ));
        layer
    }

    fn grid(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::Grid);
        let solid = Stroke::solid(&self.style.grid_color, 1.0).with_opacity(0.8);
        let dashed = Stroke::solid(&self.style.grid_color, 0.5).dashed(2.0, 2.0);

        for axis in [Axis::X, Axis::Y] {
            let (lo, hi) = self.plot_range(axis);
            let mut solid_values: Vec<f64> = Vec::new();

            for (_, tick) in self.visible_ticks(axis) {
                let px = self.map(axis, tick.value);
                if px < lo || px > hi {
                    continue;
                }
                solid_values.push(tick.value);
                layer.clipped.push(self.grid_line(axis, px, solid.clone()));
            }

            if self.cell_px(axis) >= GRID_MIN_CELL_PX {
                let (d0, d1) = self.visible(axis);
                for boundary in (d0.ceil() as SeqPos)..=(d1.floor() as SeqPos) {
                    let value = boundary as f64;
                    if solid_values.iter().any(|v| (v - value).abs() < f64::EPSILON) {
                        continue;
                    }
                    let px = self.map(axis, value);
                    layer.clipped.push(self.grid_line(axis, px, dashed.clone()));
                }
            }
        }
        layer
    }

    fn grid_line(&self, axis: Axis, px: f64, stroke: Stroke) -> Primitive {
        match axis {
            Axis::X => Primitive::line((px, self.plot.top), (px, self.plot.bottom), stroke),
            Axis::Y => Primitive::line((self.plot.left, px), (self.plot.right, px), stroke),
        }
    }

    /// Window span in pixels along `axis`, clamped to the plot; `None` when off screen.
    fn window_span(&self, axis: Axis, window: &SequenceSafetyWindow) -> Option<(f64, f64)> {
        let a = self.map(axis, (window.start_position - 1) as f64);
        let b = self.map(axis, window.end_position as f64);
        let (lo, hi) = (a.min(b), a.max(b));
        let (plot_lo, plot_hi) = self.plot_range(axis);
        if hi < plot_lo || lo > plot_hi {
            return None;
        }
        Some((lo.max(plot_lo), hi.min(plot_hi)))
    }

    fn safety_windows(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::SafetyWindows);
        let color = &self.style.window_color;
        let stroke = Stroke::solid(color, 2.0);

        // Sequence B: horizontal bracket above the plot.
        let yb = self.plot.top - BRACKET_OFFSET;
        for window in &self.windows.sequence_b {
            let Some((x0, x1)) = self.window_span(Axis::X, window) else {
                continue;
            };
            layer.unclipped.extend([
                Primitive::line((x0, yb + BRACKET_TICK), (x0, yb), stroke.clone()),
                Primitive::line((x0, yb), (x1, yb), stroke.clone()),
                Primitive::line((x1, yb), (x1, yb + BRACKET_TICK), stroke.clone()),
            ]);
        }

        // Sequence A: shaded band across the plot plus a vertical bracket on the right.
        let xb = self.plot.right + BRACKET_OFFSET;
        for window in &self.windows.sequence_a {
            let Some((y0, y1)) = self.window_span(Axis::Y, window) else {
                continue;
            };
            layer.clipped.push(Primitive::filled_rect(
                self.plot.left,
                y0,
                self.plot.width(),
                y1 - y0,
                color,
                self.style.window_fill_opacity,
            ));
            layer.unclipped.extend([
                Primitive::line((xb - BRACKET_TICK, y0), (xb, y0), stroke.clone()),
                Primitive::line((xb, y0), (xb, y1), stroke.clone()),
                Primitive::line((xb, y1), (xb - BRACKET_TICK, y1), stroke.clone()),
            ]);
        }
        layer
    }

    fn edges(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::Edges);
        for segment in &self.data.alignments {
            for edge in &segment.edges {
                let (from, to) = (edge.from_dot(), edge.to_dot());
                if !from.is_finite() || !to.is_finite() {
                    continue;
                }
                let p = edge.clamped_probability();
                let stroke = Stroke::solid(segment.dot_color(), 2.0 + 2.0 * p).with_opacity(0.5 + 0.5 * p);
                layer.clipped.push(Primitive::line(self.map_dot(from), self.map_dot(to), stroke));
            }
        }
        layer
    }

    fn dots(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::Dots);
        for segment in &self.data.alignments {
            for dot in [segment.start_dot, segment.end_dot].into_iter().flatten() {
                if !dot.is_finite() {
                    continue;
                }
                let (cx, cy) = self.map_dot(dot);
                layer.clipped.push(Primitive::Circle {
                    cx,
                    cy,
                    r: DOT_RADIUS,
                    fill: segment.dot_color().to_string(),
                });
            }
        }
        layer
    }

    fn axes(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::Axes);
        let stroke = Stroke::solid(&self.style.axis_color, 1.0);
        let plot = &self.plot;

        layer.unclipped.push(Primitive::line((plot.left, plot.bottom), (plot.right, plot.bottom), stroke.clone()));
        layer.unclipped.push(Primitive::line((plot.left, plot.top), (plot.left, plot.bottom), stroke.clone()));

        for (px, _) in self.visible_ticks(Axis::X) {
            layer
                .unclipped
                .push(Primitive::line((px, plot.bottom), (px, plot.bottom + TICK_LENGTH), stroke.clone()));
        }
        for (py, _) in self.visible_ticks(Axis::Y) {
            layer
                .unclipped
                .push(Primitive::line((plot.left - TICK_LENGTH, py), (plot.left, py), stroke.clone()));
        }
        layer
    }

    fn label(&self, x: f64, y: f64, content: String, anchor: TextAnchor, font_size: f64, highlighted: bool) -> TextLabel {
        TextLabel {
            x,
            y,
            content,
            anchor,
            font_size,
            bold: highlighted,
            fill: if highlighted {
                self.style.window_color.clone()
            } else {
                self.style.axis_color.clone()
            },
            rotate: None,
            middle_baseline: false,
        }
    }

    fn axis_labels(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::AxisLabels);
        let plot = &self.plot;
        let font = self.style.font_size;
        let small = (font - 2.0).max(1.0);

        let tick_y = plot.bottom + TICK_LENGTH + font;
        for (px, tick) in self.visible_ticks(Axis::X) {
            let hl = self.is_highlighted(Axis::X, tick.position());
            let label = self.label(px, tick_y, tick.label.clone(), TextAnchor::Middle, font, hl);
            layer.unclipped.push(Primitive::Text(label));
        }
        let marker_y = tick_y + font + 4.0;
        for index in self.index_markers(Axis::X) {
            let px = self.map(Axis::X, index as f64 - 0.5);
            let hl = self.is_highlighted(Axis::X, Some(index));
            let label = self.label(px, marker_y, index.to_string(), TextAnchor::Middle, small, hl);
            layer.unclipped.push(Primitive::Text(label));
        }

        let tick_x = plot.left - TICK_LENGTH - 3.0;
        for (py, tick) in self.visible_ticks(Axis::Y) {
            let hl = self.is_highlighted(Axis::Y, tick.position());
            let mut label = self.label(tick_x, py, tick.label.clone(), TextAnchor::End, font, hl);
            label.middle_baseline = true;
            layer.unclipped.push(Primitive::Text(label));
        }
        let marker_x = tick_x - font - 6.0;
        for index in self.index_markers(Axis::Y) {
            let py = self.map(Axis::Y, index as f64 - 0.5);
            let hl = self.is_highlighted(Axis::Y, Some(index));
            let mut label = self.label(marker_x, py, index.to_string(), TextAnchor::End, small, hl);
            label.middle_baseline = true;
            layer.unclipped.push(Primitive::Text(label));
        }

        let title_b = self.data.descriptor_b.clone().unwrap_or_else(|| "Sequence B".to_string());
        let title_a = self.data.descriptor_a.clone().unwrap_or_else(|| "Sequence A".to_string());
        let x_title = self.label(
            (plot.left + plot.right) / 2.0,
            self.data.height - 10.0,
            title_b,
            TextAnchor::Middle,
            font,
            false,
        );
        layer.unclipped.push(Primitive::Text(x_title));

        let (tx, ty) = (16.0, (plot.top + plot.bottom) / 2.0);
        let mut y_title = self.label(tx, ty, title_a, TextAnchor::Middle, font, false);
        y_title.rotate = Some(-90.0);
        layer.unclipped.push(Primitive::Text(y_title));
        layer
    }

    fn minimap(&self) -> Layer {
        let mut layer = Layer::new(LayerKind::Minimap);
        let mx = self.plot.right - MINIMAP_INSET - MINIMAP_SIZE;
        let my = self.plot.top + MINIMAP_INSET;
        let sx = LinearScale::new((0.0, self.data.member_len() as f64), (mx, mx + MINIMAP_SIZE));
        let sy = LinearScale::new((0.0, self.data.representative_len() as f64), (my, my + MINIMAP_SIZE));
        let color = &self.style.window_color;
        let items = &mut layer.unclipped;

        items.push(Primitive::Rect {
            x: mx,
            y: my,
            width: MINIMAP_SIZE,
            height: MINIMAP_SIZE,
            fill: Some(self.style.background_color.clone()),
            fill_opacity: 0.9,
            stroke: Some(Stroke::solid(&self.style.axis_color, 1.0)),
        });

        for w in &self.windows.sequence_b {
            let x0 = sx.map((w.start_position - 1) as f64);
            let x1 = sx.map(w.end_position as f64);
            items.push(Primitive::filled_rect(x0, my, x1 - x0, MINIMAP_SIZE, color, 0.25));
        }
        for w in &self.windows.sequence_a {
            let y0 = sy.map((w.start_position - 1) as f64);
            let y1 = sy.map(w.end_position as f64);
            items.push(Primitive::filled_rect(mx, y0, MINIMAP_SIZE, y1 - y0, color, 0.25));
        }

        for segment in &self.data.alignments {
            for edge in &segment.edges {
                let (from, to) = (edge.from_dot(), edge.to_dot());
                if !from.is_finite() || !to.is_finite() {
                    continue;
                }
                let p = edge.clamped_probability();
                let stroke = Stroke::solid(segment.dot_color(), 1.0).with_opacity(0.5 + 0.5 * p);
                items.push(Primitive::line(
                    (sx.map(from.member_index()), sy.map(from.representative_index())),
                    (sx.map(to.member_index()), sy.map(to.representative_index())),
                    stroke,
                ));
            }
        }

        let ((x0, x1), (y0, y1)) = self.binding.visible_domain();
        let (vx0, vx1) = (sx.map(x0), sx.map(x1));
        let (vy0, vy1) = (sy.map(y0), sy.map(y1));
        items.push(Primitive::Rect {
            x: vx0.min(vx1),
            y: vy0.min(vy1),
            width: (vx1 - vx0).abs(),
            height: (vy1 - vy0).abs(),
            fill: None,
            fill_opacity: 0.0,
            stroke: Some(Stroke::solid(&self.style.viewport_color, 1.5)),
        });
        layer
    }
}
