//! Scene painter
//!
//! Replays a [`Scene`] draw list onto a braille canvas. Scene coordinates are
//! y-down in scene units; the canvas is y-up, so every point is flipped
//! against the scene height.

use nebula_render::{Align, Color as SceneColor, Point, Scene, Shape};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Line as TextLine, Span},
    widgets::{
        Block, Borders,
        canvas::{Canvas, Circle, Context, Line, Rectangle},
    },
};

use crate::views::{CELL_HEIGHT, CELL_WIDTH};

/// Alpha below which a shape is not painted.
const MIN_ALPHA: u8 = 24;

/// Dash and gap length for dashed lines, in scene units.
const DASH: f64 = 12.0;

/// Ring spacing used to fill discs. One braille dot is a quarter cell.
const FILL_STEP: f64 = CELL_WIDTH / 2.0;

/// Terminal color for a scene color, premultiplied by alpha.
pub fn to_color(color: SceneColor) -> Color {
    let scale = |channel: u8| {
        let scaled = u16::from(channel) * u16::from(color.a) / 255;
        u8::try_from(scaled).unwrap_or(u8::MAX)
    };
    Color::Rgb(scale(color.r), scale(color.g), scale(color.b))
}

/// Render `scene` of the given scene size inside a bordered block.
pub fn render(frame: &mut Frame, scene: &Scene, size: (f64, f64), title: &str, area: Rect) {
    let (width, height) = size;
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| paint(ctx, scene, height));
    frame.render_widget(canvas, area);
}

fn paint(ctx: &mut Context<'_>, scene: &Scene, height: f64) {
    let flip = |p: Point| (p.x, height - p.y);

    for shape in &scene.shapes {
        match shape {
            Shape::Circle { center, radius, fill, stroke } => {
                let (x, y) = flip(*center);
                if let Some(fill) = fill.filter(|c| c.a >= MIN_ALPHA) {
                    let color = to_color(fill);
                    let mut r = *radius;
                    while r > 0.0 {
                        ctx.draw(&Circle { x, y, radius: r, color });
                        r -= FILL_STEP;
                    }
                    ctx.draw(&Line { x1: x, y1: y, x2: x, y2: y, color });
                }
                if let Some(stroke) = stroke.filter(|c| c.a >= MIN_ALPHA) {
                    ctx.draw(&Circle { x, y, radius: *radius, color: to_color(stroke) });
                }
            },
            Shape::Line { from, to, color, dashed, .. } => {
                if color.a < MIN_ALPHA {
                    continue;
                }
                let color = to_color(*color);
                for (a, b) in segments(*from, *to, *dashed) {
                    let (x1, y1) = flip(a);
                    let (x2, y2) = flip(b);
                    ctx.draw(&Line { x1, y1, x2, y2, color });
                }
            },
            Shape::Rect { origin, width, height: h, fill } => {
                if fill.a < MIN_ALPHA {
                    continue;
                }
                let (x, top) = flip(*origin);
                ctx.draw(&Rectangle {
                    x,
                    y: top - h,
                    width: *width,
                    height: *h,
                    color: to_color(*fill),
                });
            },
            Shape::Text { at, text, color, align, .. } => {
                if color.a < MIN_ALPHA || text.is_empty() {
                    continue;
                }
                let (x, y) = flip(Point::new(aligned_x(at.x, text, *align), at.y));
                // Text baselines sit half a row above the anchor.
                let y = y - CELL_HEIGHT / 2.0;
                ctx.print(
                    x,
                    y,
                    TextLine::from(Span::styled(text.clone(), Style::default().fg(to_color(*color)))),
                );
            },
        }
    }
}

/// Left edge of a label anchored at `x`.
fn aligned_x(x: f64, text: &str, align: Align) -> f64 {
    let width = text.chars().count() as f64 * CELL_WIDTH;
    match align {
        Align::Left => x,
        Align::Center => x - width / 2.0,
        Align::Right => x - width,
    }
}

/// Split a line into drawn segments.
fn segments(from: Point, to: Point, dashed: bool) -> Vec<(Point, Point)> {
    if !dashed {
        return vec![(from, to)];
    }
    let length = (to.x - from.x).hypot(to.y - from.y);
    if length <= DASH {
        return vec![(from, to)];
    }

    let at = |d: f64| {
        let t = d / length;
        Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
    };
    let mut out = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + DASH).min(length);
        out.push((at(start), at(end)));
        start += DASH * 2.0;
    }
    out
}
