use std::fmt;

use image::Rgb;

/// An exact 8-bit RGB color.
///
/// Ordering is lexicographic over (R, G, B), which is the order in which
/// instances of one class are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl From<Rgb<u8>> for Color {
    fn from(pixel: Rgb<u8>) -> Self {
        Self(pixel.0)
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb(color.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "({}, {}, {})", r, g, b)
    }
}

/// Inclusive per-channel RGB range. `lower <= upper` on every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    pub lower: Color,
    pub upper: Color,
}

impl ColorRange {
    /// Returns `None` when `lower` exceeds `upper` on any channel.
    pub fn new(lower: Color, upper: Color) -> Option<Self> {
        let valid = lower.0.iter().zip(upper.0.iter()).all(|(lo, hi)| lo <= hi);
        valid.then_some(Self { lower, upper })
    }

    pub fn contains(&self, color: Color) -> bool {
        (0..3).all(|c| self.lower.0[c] <= color.0[c] && color.0[c] <= self.upper.0[c])
    }
}

/// A class name bound to the color range that encodes it in mask images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassColorRange {
    pub class_name: String,
    pub range: ColorRange,
}

/// Axis-aligned extent in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Integer box as written to annotation files: `(xmin, ymin, xmax, ymax)`
    /// truncated toward zero.
    pub fn truncated(&self) -> (i64, i64, i64, i64) {
        (
            self.min_x as i64,
            self.min_y as i64,
            self.max_x as i64,
            self.max_y as i64,
        )
    }
}

/// One annotated object: every pixel of a single exact color inside a
/// class's range, outlined by its convex hull.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub class_name: String,
    pub color: Color,
    /// Closed hull ring; the first vertex is repeated at the end.
    pub polygon: Vec<[f64; 2]>,
    pub bounding_box: BoundingBox,
}

impl Instance {
    /// Unique key of this instance within one image.
    pub fn key(&self) -> String {
        format!("{}/instance_{}", self.class_name, self.color)
    }
}

/// Everything written for one processed mask image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// File name of the un-annotated source image.
    pub filename: String,
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub depth: u8,
    pub instances: Vec<Instance>,
}
