use geo::{BoundingRect, ConvexHull};
use geo_types::{MultiPoint, Point};
use crate::{
    error::{PixelanoError, Result},
    traits::HullBuilder,
    types::BoundingBox,
};

/// Convex hull builder using geo crate's quickhull implementation.
///
/// The ring is closed: its first vertex is repeated at the end. A single
/// pixel gives `[p, p]` and two pixels give `[a, b, a]`.
#[derive(Debug, Clone, Default)]
pub struct GeoConvexHull;

impl HullBuilder for GeoConvexHull {
    fn build_hull(&self, footprint: &[[f64; 2]]) -> Result<(Vec<[f64; 2]>, BoundingBox)> {
        let points: MultiPoint<f64> = footprint
            .iter()
            .map(|&[x, y]| Point::new(x, y))
            .collect::<Vec<_>>()
            .into();

        let hull = points.convex_hull();
        let rect = hull.bounding_rect().ok_or_else(|| {
            PixelanoError::GeometricComputation("Cannot build a hull from an empty footprint".to_string())
        })?;

        let ring = hull.exterior().coords().map(|c| [c.x, c.y]).collect();
        let bounding_box = BoundingBox {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        };

        Ok((ring, bounding_box))
    }
}
