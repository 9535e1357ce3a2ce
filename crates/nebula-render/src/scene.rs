//! Renderer-agnostic draw lists.
//!
//! Engines describe a frame as an ordered list of [`Shape`]s in screen
//! coordinates. Frontends replay the list onto whatever surface they own.

pub use nebula_proto::battle::Point;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled by `factor` in `[0, 1]`.
    #[must_use]
    pub fn fade(self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self { a: (f64::from(self.a) * factor).round() as u8, ..self }
    }

    /// Parse `#rrggbb`. Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Whether the color is invisible.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Mid gray.
    pub const GRAY: Self = Self::rgb(128, 128, 140);
    /// Dim gray.
    pub const DIM: Self = Self::rgb(70, 70, 85);
    /// Red.
    pub const RED: Self = Self::rgb(235, 70, 70);
    /// Orange.
    pub const ORANGE: Self = Self::rgb(245, 150, 50);
    /// Yellow.
    pub const YELLOW: Self = Self::rgb(240, 210, 80);
    /// Green.
    pub const GREEN: Self = Self::rgb(90, 210, 120);
    /// Cyan.
    pub const CYAN: Self = Self::rgb(80, 200, 230);
    /// Blue.
    pub const BLUE: Self = Self::rgb(90, 140, 250);
    /// Purple.
    pub const PURPLE: Self = Self::rgb(180, 110, 240);
}

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Anchor at the left edge.
    #[default]
    Left,
    /// Anchor at the center.
    Center,
    /// Anchor at the right edge.
    Right,
}

/// One draw primitive in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Filled and/or stroked circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius in pixels.
        radius: f64,
        /// Fill, if any.
        fill: Option<Color>,
        /// Stroke, if any.
        stroke: Option<Color>,
    },
    /// Straight segment.
    Line {
        /// Start.
        from: Point,
        /// End.
        to: Point,
        /// Stroke color.
        color: Color,
        /// Stroke width in pixels.
        width: f64,
        /// Dashed stroke.
        dashed: bool,
    },
    /// Axis-aligned filled rectangle.
    Rect {
        /// Top-left corner.
        origin: Point,
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
        /// Fill color.
        fill: Color,
    },
    /// Text label.
    Text {
        /// Anchor position.
        at: Point,
        /// Content.
        text: String,
        /// Color.
        color: Color,
        /// Font size in pixels.
        size: f64,
        /// Horizontal anchoring.
        align: Align,
    },
}

/// Ordered draw list for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Shapes in painter's order.
    pub shapes: Vec<Shape>,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape. Fully transparent shapes are skipped.
    pub fn push(&mut self, shape: Shape) {
        let visible = match &shape {
            Shape::Circle { fill, stroke, .. } => {
                fill.is_some_and(|c| !c.is_transparent())
                    || stroke.is_some_and(|c| !c.is_transparent())
            },
            Shape::Line { color, .. } | Shape::Text { color, .. } => !color.is_transparent(),
            Shape::Rect { fill, .. } => !fill.is_transparent(),
        };
        if visible {
            self.shapes.push(shape);
        }
    }

    /// Filled circle.
    pub fn disc(&mut self, center: Point, radius: f64, fill: Color) {
        self.push(Shape::Circle { center, radius, fill: Some(fill), stroke: None });
    }

    /// Stroked circle.
    pub fn ring(&mut self, center: Point, radius: f64, stroke: Color) {
        self.push(Shape::Circle { center, radius, fill: None, stroke: Some(stroke) });
    }

    /// Solid segment.
    pub fn line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.push(Shape::Line { from, to, color, width, dashed: false });
    }

    /// Dashed segment.
    pub fn dashed_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
        self.push(Shape::Line { from, to, color, width, dashed: true });
    }

    /// Filled rectangle.
    pub fn rect(&mut self, origin: Point, width: f64, height: f64, fill: Color) {
        self.push(Shape::Rect { origin, width, height, fill });
    }

    /// Text label.
    pub fn text(&mut self, at: Point, text: impl Into<String>, color: Color, size: f64, align: Align) {
        self.push(Shape::Text { at, text: text.into(), color, size, align });
    }

    /// Number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Linear interpolation between two points.
pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Euclidean distance.
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
