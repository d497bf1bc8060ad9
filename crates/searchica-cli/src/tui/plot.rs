//! Scatter plot of the current results.
//!
//! Points are drawn on a braille canvas. [`PlotBounds`] mirrors the
//! canvas's own coordinate mapping so a mouse position can be turned back
//! into the point drawn under it. [`PlotView`] holds the keyboard cursor
//! and the zoomed window; drawing and hit testing both use its bounds.

use ratatui::prelude::*;
use ratatui::symbols::Marker as CanvasMarker;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use searchica_core::{PlotPayload, Rgb, Trace};

/// Extra room around the data, as a fraction of its extent.
const MARGIN: f64 = 0.05;

/// Inner ring radius of the hovered marker, as a fraction of the x extent.
const RING_SCALE: f64 = 0.012;

const ZOOM_STEP: f64 = 1.5;
const MAX_ZOOM: f64 = 64.0;

/// One pan step, as a fraction of the visible extent.
const PAN_STEP: f64 = 0.2;

/// Braille cells are 2 dots wide and 4 dots high.
const DOTS_X: f64 = 2.0;
const DOTS_Y: f64 = 4.0;

/// Keyboard point cursor and visible window of the plot.
#[derive(Debug, Clone)]
pub struct PlotView {
    cursor: Option<usize>,
    zoom: f64,
    /// Data-space centre of the window; `None` is the centre of the data.
    center: Option<(f64, f64)>,
}

impl Default for PlotView {
    fn default() -> Self {
        Self {
            cursor: None,
            zoom: 1.0,
            center: None,
        }
    }
}

impl PlotView {
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Drop the cursor and show all points again.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.reset_zoom();
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
        self.center = None;
    }

    /// The data window shown for `trace`: every point when not zoomed or
    /// panned, otherwise a window `zoom` times smaller around the centre.
    pub fn bounds(&self, trace: Option<&Trace>) -> PlotBounds {
        let full = PlotBounds::fit(trace);
        if self.zoom <= 1.0 && self.center.is_none() {
            return full;
        }
        full.zoomed(self.center.unwrap_or_else(|| full.center()), self.zoom)
    }

    /// Zoom in one step, around the cursor point when there is one.
    pub fn zoom_in(&mut self, trace: Option<&Trace>) {
        if let Some(point) = self.cursor_point(trace) {
            self.center = Some(point);
        }
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    /// Zoom out one step. Back at full size the window is re-centred.
    pub fn zoom_out(&mut self) {
        let zoom = self.zoom / ZOOM_STEP;
        if zoom <= 1.0 + f64::EPSILON {
            self.reset_zoom();
        } else {
            self.zoom = zoom;
        }
    }

    /// Move the window by `dx`/`dy` pan steps; positive is right and up.
    pub fn pan(&mut self, trace: Option<&Trace>, dx: f64, dy: f64) {
        let bounds = self.bounds(trace);
        let (x, y) = bounds.center();
        self.center = Some((
            x + dx * PAN_STEP * (bounds.x[1] - bounds.x[0]),
            y + dy * PAN_STEP * (bounds.y[1] - bounds.y[0]),
        ));
    }

    /// Re-centre on the cursor point if it has left the window.
    pub fn follow_cursor(&mut self, trace: Option<&Trace>) {
        if let Some(point) = self.cursor_point(trace) {
            if !self.bounds(trace).contains(point) {
                self.center = Some(point);
            }
        }
    }

    fn cursor_point(&self, trace: Option<&Trace>) -> Option<(f64, f64)> {
        let (x, y) = trace?.point(self.cursor?)?;
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }

    /// Move the cursor through the points in rank order, wrapping around.
    pub fn step(&mut self, delta: isize, len: usize) -> Option<usize> {
        if len == 0 {
            self.cursor = None;
            return None;
        }
        let len_signed = len as isize;
        let next = match self.cursor {
            Some(current) => (current as isize + delta).rem_euclid(len_signed) as usize,
            None => 0,
        };
        self.cursor = Some(next);
        self.cursor
    }
}

/// Data-space bounds of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl PlotBounds {
    /// Bounds that fit every point of `trace` with a small margin.
    pub fn fit(trace: Option<&Trace>) -> Self {
        let points: Vec<(f64, f64)> = trace
            .map(|t| {
                t.points()
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            x: axis_bounds(points.iter().map(|p| p.0)),
            y: axis_bounds(points.iter().map(|p| p.1)),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x[0] + self.x[1]) / 2.0, (self.y[0] + self.y[1]) / 2.0)
    }

    /// Bounds `factor` times smaller than these, centred on `center`.
    pub fn zoomed(&self, (x, y): (f64, f64), factor: f64) -> Self {
        let half_width = (self.x[1] - self.x[0]) / 2.0 / factor;
        let half_height = (self.y[1] - self.y[0]) / 2.0 / factor;
        Self {
            x: [x - half_width, x + half_width],
            y: [y - half_height, y + half_height],
        }
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        (self.x[0]..=self.x[1]).contains(&x) && (self.y[0]..=self.y[1]).contains(&y)
    }

    /// Terminal cell a data point lands in, using the canvas's braille
    /// grid mapping. `None` when the point is outside the bounds.
    pub fn project(&self, canvas: Rect, (x, y): (f64, f64)) -> Option<Position> {
        let [left, right] = self.x;
        let [bottom, top] = self.y;
        if canvas.width == 0 || canvas.height == 0 || !self.contains((x, y)) {
            return None;
        }
        let width = f64::from(canvas.width) * DOTS_X - 1.0;
        let height = f64::from(canvas.height) * DOTS_Y - 1.0;
        let dot_x = ((x - left) * width / (right - left)) as u16;
        let dot_y = ((top - y) * height / (top - bottom)) as u16;
        Some(Position::new(
            canvas.x + dot_x / DOTS_X as u16,
            canvas.y + dot_y / DOTS_Y as u16,
        ))
    }
}

fn axis_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [-1.0, 1.0];
    }
    let span = hi - lo;
    if span < f64::EPSILON {
        return [lo - 1.0, hi + 1.0];
    }
    [lo - span * MARGIN, hi + span * MARGIN]
}

/// The part of the plot panel the canvas draws into.
pub fn canvas_area(area: Rect) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    }
}

fn info_area(area: Rect) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    Rect {
        y: inner.bottom().saturating_sub(1),
        height: inner.height.min(1),
        ..inner
    }
}

/// The point drawn at terminal position `pos` when the plot shows
/// `bounds`, if any.
///
/// Picks the nearest point whose cell is at most one cell away, so small
/// braille dots are still easy to hit.
pub fn hit_test(area: Rect, plot: &PlotPayload, bounds: PlotBounds, pos: Position) -> Option<usize> {
    let canvas = canvas_area(area);
    if !canvas.contains(pos) {
        return None;
    }
    let trace = plot.primary_trace()?;

    trace
        .points()
        .enumerate()
        .filter_map(|(i, point)| {
            let cell = bounds.project(canvas, point)?;
            let dx = (i32::from(cell.x) - i32::from(pos.x)).abs();
            let dy = (i32::from(cell.y) - i32::from(pos.y)).abs();
            (dx <= 1 && dy <= 1).then_some((dx * dx + dy * dy, i))
        })
        .min()
        .map(|(_, i)| i)
}

/// Blend `color` over `background` with the given opacity.
pub fn blend(color: Rgb, background: Rgb, opacity: f64) -> Rgb {
    let alpha = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
    let mix = |c: u8, bg: u8| (f64::from(bg) + (f64::from(c) - f64::from(bg)) * alpha).round() as u8;
    Rgb::new(mix(color.r, background.r), mix(color.g, background.g), mix(color.b, background.b))
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Render the plot panel.
///
/// `plot` is the figure to draw, already carrying any hover emphasis.
/// The hovered marker is ringed.
pub fn render(frame: &mut Frame, area: Rect, plot: &PlotPayload, view: &PlotView, hovered: Option<usize>, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let count = plot.point_count();
    let title = if view.zoom() > 1.0 {
        format!("Semantic map ({} points, zoom {:.1}x)", count, view.zoom())
    } else {
        format!("Semantic map ({} points)", count)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    frame.render_widget(block, area);

    let background = Rgb::parse_or(&plot.layout.plot_bgcolor, Rgb::WHITE);
    let foreground = if background.luminance() > 0.5 { Rgb::BLACK } else { Rgb::WHITE };
    let trace = plot.primary_trace();
    let bounds = view.bounds(trace);
    let cursor = view.cursor.filter(|i| *i < count);
    let hovered = hovered.filter(|i| *i < count);

    let canvas = Canvas::default()
        .marker(CanvasMarker::Braille)
        .background_color(to_color(background))
        .x_bounds(bounds.x)
        .y_bounds(bounds.y)
        .paint(|ctx| {
            draw_axes(ctx, plot, bounds, foreground);
            if let Some(trace) = trace {
                draw_points(ctx, trace, bounds, background, hovered, cursor, foreground);
            }
        });
    frame.render_widget(canvas, canvas_area(area));

    let info = match cursor.or(hovered) {
        Some(i) => trace.map(|t| t.hover_lines(i).join("  \u{00b7}  ")).unwrap_or_default(),
        None if count == 0 => "No results yet".to_string(),
        None => "Red: closer match, blue: weaker match".to_string(),
    };
    frame.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::Gray)),
        info_area(area),
    );
}

fn draw_axes(ctx: &mut Context, plot: &PlotPayload, bounds: PlotBounds, foreground: Rgb) {
    let [left, right] = bounds.x;
    let [bottom, top] = bounds.y;
    let faint = to_color(blend(foreground, Rgb::parse_or(&plot.layout.plot_bgcolor, Rgb::WHITE), 0.25));

    if plot.layout.xaxis.showgrid {
        for i in 1..4 {
            let x = left + (right - left) * f64::from(i) / 4.0;
            ctx.draw(&CanvasLine { x1: x, y1: bottom, x2: x, y2: top, color: faint });
        }
    }
    if plot.layout.yaxis.showgrid {
        for i in 1..4 {
            let y = bottom + (top - bottom) * f64::from(i) / 4.0;
            ctx.draw(&CanvasLine { x1: left, y1: y, x2: right, y2: y, color: faint });
        }
    }
    let axis_color = to_color(foreground);
    if plot.layout.xaxis.zeroline && (bottom..=top).contains(&0.0) {
        ctx.draw(&CanvasLine { x1: left, y1: 0.0, x2: right, y2: 0.0, color: axis_color });
    }
    if plot.layout.yaxis.zeroline && (left..=right).contains(&0.0) {
        ctx.draw(&CanvasLine { x1: 0.0, y1: bottom, x2: 0.0, y2: top, color: axis_color });
    }
    if plot.layout.xaxis.showticklabels {
        let style = Style::default().fg(axis_color);
        ctx.print(left, bottom, Span::styled(format!("{:.2}", left), style));
        ctx.print(right, bottom, Span::styled(format!("{:.2}", right), style));
    }
    if plot.layout.yaxis.showticklabels {
        let style = Style::default().fg(axis_color);
        ctx.print(left, top, Span::styled(format!("{:.2}", top), style));
    }
}

fn draw_points(
    ctx: &mut Context,
    trace: &Trace,
    bounds: PlotBounds,
    background: Rgb,
    hovered: Option<usize>,
    cursor: Option<usize>,
    foreground: Rgb,
) {
    let ring_unit = (bounds.x[1] - bounds.x[0]) * RING_SCALE;

    // Weakest matches first so the strongest end up on top.
    for (i, (x, y)) in trace.points().enumerate().rev() {
        let rgb = trace
            .marker
            .color_at(i)
            .map_or(Rgb::new(31, 119, 180), |c| Rgb::parse_or(c, Rgb::new(31, 119, 180)));
        let opacity = trace.marker.opacity.get(i).copied().unwrap_or(1.0);
        let color = to_color(blend(rgb, background, opacity.max(0.35)));

        ctx.draw(&Points { coords: &[(x, y)], color });

        if hovered == Some(i) {
            let full = to_color(rgb);
            ctx.draw(&Circle { x, y, radius: ring_unit * 2.0, color: full });
            ctx.draw(&Circle { x, y, radius: ring_unit, color: full });
        }
    }

    if let Some((x, y)) = cursor.and_then(|i| trace.point(i)) {
        ctx.layer();
        ctx.draw(&Circle { x, y, radius: ring_unit * 1.5, color: to_color(foreground) });
    }
}
