use std::collections::BTreeMap;

use image::{GrayImage, Luma, RgbImage};
use crate::{
    error::Result,
    traits::{Footprint, PixelGrouper},
    types::{Color, ColorRange},
};

const MASK_ON: u8 = 255;
const MASK_OFF: u8 = 0;

/// Binary mask of the pixels whose color lies within `range` (inclusive on
/// every channel). Selected pixels are 255, the rest 0.
pub fn range_mask(image: &RgbImage, range: &ColorRange) -> GrayImage {
    imageproc::map::map_colors(image, |pixel| {
        if range.contains(Color::from(pixel)) {
            Luma([MASK_ON])
        } else {
            Luma([MASK_OFF])
        }
    })
}

/// Groups in-range pixels by their exact color.
///
/// Every pixel of one exact color lands in the same footprint, even when the
/// pixels form several disjoint blobs.
#[derive(Debug, Clone, Default)]
pub struct RangeMaskGrouper;

impl PixelGrouper for RangeMaskGrouper {
    fn group_pixels(&self, image: &RgbImage, range: &ColorRange) -> Result<BTreeMap<Color, Footprint>> {
        let mask = range_mask(image, range);

        let mut groups: BTreeMap<Color, Footprint> = BTreeMap::new();
        for (x, y, selected) in mask.enumerate_pixels() {
            if selected[0] == MASK_OFF {
                continue;
            }
            let color = Color::from(*image.get_pixel(x, y));
            groups.entry(color).or_default().push([x as f64, y as f64]);
        }

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn red_range() -> ColorRange {
        ColorRange::new(Color::new(200, 0, 0), Color::new(255, 0, 0)).unwrap()
    }

    #[test]
    fn test_range_mask_selects_only_in_range_pixels() {
        let mut image = RgbImage::new(4, 1);
        image.put_pixel(0, 0, Rgb([200, 0, 0]));
        image.put_pixel(1, 0, Rgb([199, 0, 0]));
        image.put_pixel(2, 0, Rgb([255, 0, 0]));
        image.put_pixel(3, 0, Rgb([255, 1, 0]));

        let mask = range_mask(&image, &red_range());
        let values: Vec<u8> = mask.pixels().map(|p| p[0]).collect();
        assert_eq!(values, [255, 0, 255, 0]);
    }

    #[test]
    fn test_groups_are_keyed_by_exact_color() {
        let mut image = RgbImage::new(3, 3);
        image.put_pixel(0, 0, Rgb([250, 0, 0]));
        image.put_pixel(2, 2, Rgb([250, 0, 0]));
        image.put_pixel(1, 1, Rgb([210, 0, 0]));

        let groups = RangeMaskGrouper.group_pixels(&image, &red_range()).unwrap();

        let colors: Vec<Color> = groups.keys().copied().collect();
        assert_eq!(colors, [Color::new(210, 0, 0), Color::new(250, 0, 0)]);
        assert_eq!(groups[&Color::new(250, 0, 0)], vec![[0.0, 0.0], [2.0, 2.0]]);
        assert_eq!(groups[&Color::new(210, 0, 0)], vec![[1.0, 1.0]]);
    }

    #[test]
    fn test_no_match_yields_empty_groups() {
        let image = RgbImage::from_pixel(5, 5, Rgb([0, 0, 255]));
        let groups = RangeMaskGrouper.group_pixels(&image, &red_range()).unwrap();
        assert!(groups.is_empty());
    }
}
