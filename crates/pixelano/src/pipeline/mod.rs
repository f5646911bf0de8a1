pub mod builder;

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{error, info, warn};
use crate::{
    color_map::ColorRangeMap,
    error::{PixelanoError, Result},
    io::locate::{SourceExtension, SourceLocator},
    traits::InstanceExtractor,
    types::Annotation,
};

/// Channel depth reported for every annotation; masks are decoded as RGB.
pub const CHANNEL_DEPTH: u8 = 3;

/// Outcome of one successfully converted mask image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub mask: PathBuf,
    pub source: PathBuf,
    pub annotation: PathBuf,
    pub instance_count: usize,
}

/// A mask image that could not be converted
#[derive(Debug)]
pub struct FailedImage {
    pub path: PathBuf,
    pub error: PixelanoError,
}

/// Results of a batch; one failed image never stops the others
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ImageReport>,
    pub failed: Vec<FailedImage>,
}

impl BatchReport {
    pub fn record(&mut self, path: &Path, result: Result<ImageReport>) {
        match result {
            Ok(report) => self.processed.push(report),
            Err(error) => {
                error!("Skipping {}: {}", path.display(), error);
                self.failed.push(FailedImage { path: path.to_path_buf(), error });
            }
        }
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.processed.extend(other.processed);
        self.failed.extend(other.failed);
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts mask images into VOC annotations next to copies of their
/// source images
pub struct Converter {
    color_map: ColorRangeMap,
    extractor: Box<dyn InstanceExtractor>,
    locator: SourceLocator,
}

impl Converter {
    /// Create a new converter builder
    pub fn builder(color_map: ColorRangeMap) -> builder::ConverterBuilder {
        builder::ConverterBuilder::new(color_map)
    }

    pub fn new(
        color_map: ColorRangeMap,
        extractor: Box<dyn InstanceExtractor>,
        locator: SourceLocator,
    ) -> Self {
        Self {
            color_map,
            extractor,
            locator,
        }
    }

    pub fn color_map(&self) -> &ColorRangeMap {
        &self.color_map
    }

    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    /// Build the annotation for an already decoded mask image
    pub fn annotate(&self, image: &RgbImage, source_name: &str) -> Result<Annotation> {
        let instances = self.extractor.extract_instances(image, &self.color_map)?;

        Ok(Annotation {
            filename: source_name.to_string(),
            path: source_name.to_string(),
            width: image.width(),
            height: image.height(),
            depth: CHANNEL_DEPTH,
            instances,
        })
    }

    /// Convert one mask image, writing `{base}.xml` and a copy of the source
    /// image into `output_dir`.
    ///
    /// The source image is searched for below the mask's own directory.
    pub fn process_image(&self, mask_path: &Path, output_dir: &Path) -> Result<ImageReport> {
        info!("Processing {}", mask_path.display());

        let not_found = |base_name: String| PixelanoError::SourceImageNotFound {
            mask: mask_path.to_path_buf(),
            base_name,
        };

        let base_name = self
            .locator
            .base_name(mask_path)
            .ok_or_else(|| not_found(mask_path.to_string_lossy().into_owned()))?;

        let search_dir = match mask_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let source = self
            .locator
            .find_source(search_dir, &base_name)
            .ok_or_else(|| not_found(base_name.clone()))?;
        let source_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| not_found(base_name.clone()))?;

        let image = image::open(mask_path)?.to_rgb8();
        let annotation = self.annotate(&image, &source_name)?;

        let copied = output_dir.join(&source_name);
        if !is_same_file(&source, &copied) {
            fs::copy(&source, &copied)?;
        }

        let annotation_path = output_dir.join(format!("{}.xml", base_name));
        annotation.save_voc(&annotation_path)?;

        info!(
            "Wrote {} ({} instances)",
            annotation_path.display(),
            annotation.instances.len()
        );

        Ok(ImageReport {
            mask: mask_path.to_path_buf(),
            source,
            annotation: annotation_path,
            instance_count: annotation.instances.len(),
        })
    }

    /// Convert explicitly listed images into `output_root`
    pub fn process_files(&self, files: &[PathBuf], output_root: &Path) -> BatchReport {
        let mut report = BatchReport::default();
        for file in files {
            report.record(file, self.process_image(file, output_root));
        }
        report
    }

    /// Convert every mask image (supported image extension, marked stem)
    /// directly inside `directory` into
    /// `output_root/<directory name>`
    pub fn process_directory(&self, directory: &Path, output_root: &Path) -> Result<BatchReport> {
        if !directory.is_dir() {
            return Err(PixelanoError::NotADirectory(directory.to_path_buf()));
        }

        let dir_name = match directory.file_name() {
            Some(name) => Some(name.to_os_string()),
            None => fs::canonicalize(directory)?.file_name().map(|n| n.to_os_string()),
        };
        let output_dir = match dir_name {
            Some(name) => output_root.join(name),
            None => output_root.to_path_buf(),
        };
        fs::create_dir_all(&output_dir)?;

        let mut masks = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file()
                && SourceExtension::from_path(&path).is_some()
                && self.locator.is_annotated(&path)
            {
                masks.push(path);
            }
        }
        masks.sort();

        if masks.is_empty() {
            warn!("No mask images found in {}", directory.display());
        }

        let report = self.process_files(&masks, &output_dir);
        info!(
            "{}: {} converted, {} failed",
            directory.display(),
            report.processed.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Get information about the converter configuration
    pub fn info(&self) -> String {
        format!(
            "Converter: {} classes, mask marker '{}'",
            self.color_map.len(),
            self.locator.marker()
        )
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::voc::VocAnnotation;
    use image::Rgb;
    use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

    fn color_map() -> ColorRangeMap {
        ColorRangeMap::parse("car\t200;0;0\t255;0;0\nperson\t0;200;0\t0;255;0\n").unwrap()
    }

    fn write_pair(dir: &Path, base: &str) {
        RgbImage::from_pixel(20, 10, Rgb([90, 90, 90]))
            .save(dir.join(format!("{}.png", base)))
            .unwrap();

        let mut mask = RgbImage::new(20, 10);
        draw_filled_rect_mut(&mut mask, Rect::at(2, 1).of_size(5, 4), Rgb([250, 0, 0]));
        draw_filled_rect_mut(&mut mask, Rect::at(10, 5).of_size(3, 3), Rgb([0, 220, 0]));
        mask.save(dir.join(format!("{}_a.png", base))).unwrap();
    }

    #[test]
    fn test_process_directory_writes_annotations_and_copies() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let scenes = input.path().join("scenes");
        fs::create_dir_all(&scenes).unwrap();
        write_pair(&scenes, "street");

        let converter = Converter::builder(color_map()).build();
        let report = converter.process_directory(&scenes, output.path()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.processed[0].instance_count, 2);

        let out_dir = output.path().join("scenes");
        assert!(out_dir.join("street.png").is_file());

        let parsed = VocAnnotation::from_voc_file(out_dir.join("street.xml")).unwrap();
        assert_eq!(parsed.filename, "street.png");
        assert_eq!((parsed.width, parsed.height, parsed.depth), (20, 10, 3));

        let car = &parsed.objects[0];
        assert_eq!(car.name, "car");
        assert_eq!((car.xmin, car.ymin, car.xmax, car.ymax), (2, 1, 6, 4));
        let person = &parsed.objects[1];
        assert_eq!(person.name, "person");
        assert_eq!((person.xmin, person.ymin, person.xmax, person.ymax), (10, 5, 12, 7));
    }

    #[test]
    fn test_missing_source_is_skipped_without_stopping_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_pair(input.path(), "good");
        RgbImage::new(4, 4).save(input.path().join("orphan_a.png")).unwrap();

        let converter = Converter::builder(color_map()).build();
        let report = converter.process_directory(input.path(), output.path()).unwrap();

        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].error,
            PixelanoError::SourceImageNotFound { ref base_name, .. } if base_name == "orphan"
        ));
    }

    #[test]
    fn test_corrupt_mask_fails_only_that_image() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_pair(input.path(), "good");
        fs::write(input.path().join("broken.png"), b"not an image").unwrap();
        fs::write(input.path().join("broken_a.png"), b"not an image").unwrap();

        let converter = Converter::builder(color_map()).build();
        let report = converter.process_directory(input.path(), output.path()).unwrap();

        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].error, PixelanoError::ImageLoad(_)));
    }

    #[test]
    fn test_single_file_goes_to_output_root() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_pair(input.path(), "street");

        let converter = Converter::builder(color_map()).build();
        let report = converter.process_files(&[input.path().join("street_a.png")], output.path());

        assert!(report.is_success());
        assert!(output.path().join("street.xml").is_file());
        assert!(output.path().join("street.png").is_file());
    }

    #[test]
    fn test_image_without_matches_still_gets_annotation() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        RgbImage::new(8, 8).save(input.path().join("empty.png")).unwrap();
        RgbImage::new(8, 8).save(input.path().join("empty_a.png")).unwrap();

        let converter = Converter::builder(color_map()).build();
        let report = converter.process_files(&[input.path().join("empty_a.png")], output.path());

        assert_eq!(report.processed[0].instance_count, 0);
        let parsed = VocAnnotation::from_voc_file(output.path().join("empty.xml")).unwrap();
        assert!(parsed.objects.is_empty());
    }

    #[test]
    fn test_non_directory_input_is_rejected() {
        let output = tempfile::tempdir().unwrap();
        let converter = Converter::builder(color_map()).build();
        let result = converter.process_directory(&output.path().join("missing"), output.path());
        assert!(matches!(result, Err(PixelanoError::NotADirectory(_))));
    }

    #[test]
    fn test_custom_marker_selects_masks() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        RgbImage::new(4, 4).save(input.path().join("street.png")).unwrap();
        RgbImage::new(4, 4).save(input.path().join("street-mask.png")).unwrap();
        RgbImage::new(4, 4).save(input.path().join("street_a.png")).unwrap();

        let converter = Converter::builder(color_map()).with_marker("-mask").build();
        let report = converter.process_directory(input.path(), output.path()).unwrap();

        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.processed[0].mask, input.path().join("street-mask.png"));
        assert!(converter.info().contains("'-mask'"));
    }

    #[test]
    fn test_marked_non_image_files_are_ignored() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_pair(input.path(), "street");
        fs::write(input.path().join("notes_a.txt"), b"todo").unwrap();

        let converter = Converter::builder(color_map()).build();
        let report = converter.process_directory(input.path(), output.path()).unwrap();

        assert!(report.is_success());
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.processed[0].mask, input.path().join("street_a.png"));
    }
}
