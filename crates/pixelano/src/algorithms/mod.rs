pub mod masking;
pub mod hull;

pub use masking::*;
pub use hull::*;

use image::RgbImage;
use tracing::debug;
use crate::{
    color_map::ColorRangeMap,
    error::Result,
    types::Instance,
    traits::{PixelGrouper, HullBuilder, InstanceExtractor},
};

/// Standard instance extractor implementation
#[derive(Debug)]
pub struct StandardInstanceExtractor<G, H>
where
    G: PixelGrouper,
    H: HullBuilder,
{
    pub pixel_grouper: G,
    pub hull_builder: H,
}

impl<G, H> StandardInstanceExtractor<G, H>
where
    G: PixelGrouper,
    H: HullBuilder,
{
    pub fn new(pixel_grouper: G, hull_builder: H) -> Self {
        Self {
            pixel_grouper,
            hull_builder,
        }
    }
}

impl<G, H> InstanceExtractor for StandardInstanceExtractor<G, H>
where
    G: PixelGrouper,
    H: HullBuilder,
{
    fn extract_instances(&self, image: &RgbImage, color_map: &ColorRangeMap) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();

        for class in color_map {
            let groups = self.pixel_grouper.group_pixels(image, &class.range)?;
            if groups.is_empty() {
                debug!("No pixels found for class: {}", class.class_name);
                continue;
            }

            for (color, footprint) in groups {
                let (polygon, bounding_box) = self.hull_builder.build_hull(&footprint)?;
                instances.push(Instance {
                    class_name: class.class_name.clone(),
                    color,
                    polygon,
                    bounding_box,
                });
            }
        }

        Ok(instances)
    }
}
