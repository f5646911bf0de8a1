use std::collections::BTreeMap;

use image::RgbImage;
use crate::{
    color_map::ColorRangeMap,
    error::Result,
    types::{BoundingBox, Color, ColorRange, Instance},
};

/// Pixel coordinates `[x, y]` of every pixel sharing one exact color.
pub type Footprint = Vec<[f64; 2]>;

/// Trait for selecting in-range pixels and grouping them by exact color
pub trait PixelGrouper: Send + Sync {
    /// Group every pixel whose color lies within `range`, keyed by exact color.
    /// An empty map means no pixel matched.
    fn group_pixels(&self, image: &RgbImage, range: &ColorRange) -> Result<BTreeMap<Color, Footprint>>;
}

/// Trait for turning a footprint into an outline
pub trait HullBuilder: Send + Sync {
    /// Build a closed ring enclosing the footprint, plus its bounding box
    fn build_hull(&self, footprint: &[[f64; 2]]) -> Result<(Vec<[f64; 2]>, BoundingBox)>;
}

/// Main trait for instance extraction
pub trait InstanceExtractor: Send + Sync {
    /// Extract instances for every class of `color_map`, in class order then
    /// color order.
    fn extract_instances(&self, image: &RgbImage, color_map: &ColorRangeMap) -> Result<Vec<Instance>>;
}
