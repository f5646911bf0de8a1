//! # Pixelano - Mask Image to VOC Annotation Library
//!
//! Converts color-coded mask images into Pascal VOC style annotation files.
//! Each class owns an inclusive RGB range; every exact color found inside a
//! class's range becomes one instance, outlined by the convex hull of its
//! pixels.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: Swap pixel grouping or hull construction by implementing traits
//! - **Ordered Output**: Instances follow class-map order, then ascending exact color
//! - **VOC Support**: Write annotation XML and read it back
//! - **Batch Conversion**: Per-image failures are reported without stopping the batch
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixelano::{ColorRangeMap, Converter};
//! use std::path::Path;
//!
//! let color_map = ColorRangeMap::from_file("classes.txt")?;
//! let converter = Converter::builder(color_map).build();
//!
//! let report = converter.process_directory(Path::new("masks"), Path::new("dataset"))?;
//! println!("{} converted, {} failed", report.processed.len(), report.failed.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Known Limitation
//!
//! Instances are "all pixels of one exact color", not connected components:
//! two disjoint blobs painted with the identical color inside one image are
//! merged into a single instance whose hull spans both.

// Core modules
pub mod error;
pub mod types;
pub mod color_map;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{PixelanoError, Result};
pub use types::{Annotation, BoundingBox, ClassColorRange, Color, ColorRange, Instance};
pub use color_map::ColorRangeMap;
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{BatchReport, Converter, FailedImage, ImageReport, builder::ConverterBuilder};
pub use io::*;

/// Extractor used when no custom one is configured
pub type DefaultExtractor = StandardInstanceExtractor<RangeMaskGrouper, GeoConvexHull>;

impl Default for DefaultExtractor {
    fn default() -> Self {
        Self::new(RangeMaskGrouper, GeoConvexHull)
    }
}
