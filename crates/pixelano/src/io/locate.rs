use std::path::{Path, PathBuf};

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::warn;
use walkdir::WalkDir;

/// Marker that closes the stem of a mask image, e.g. `street_a.png`.
pub const DEFAULT_MARKER: &str = "_a";

/// Extensions a source image may carry (matched case-insensitively).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceExtension {
    Png,
    Jpg,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl SourceExtension {
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    /// Comma separated list of the supported extensions.
    pub fn supported() -> String {
        Self::iter().map(|ext| ext.to_string()).collect::<Vec<_>>().join(", ")
    }
}

/// Classifies mask files by name and finds the source image each one
/// annotates.
#[derive(Debug, Clone)]
pub struct SourceLocator {
    marker: String,
}

impl Default for SourceLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl SourceLocator {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// A mask's stem ends with the marker right before the extension.
    pub fn is_annotated(&self, path: &Path) -> bool {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.ends_with(&self.marker))
    }

    /// Stem of the source image: the mask's stem with a trailing marker
    /// removed. Stems without the marker are returned whole.
    pub fn base_name(&self, path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        Some(stem.strip_suffix(self.marker.as_str()).unwrap_or(stem).to_string())
    }

    /// Search `directory` and its subdirectories for a non-mask image whose
    /// stem equals `base_name` (ignoring case).
    ///
    /// The shallowest match wins; matches at equal depth are ordered by file
    /// name. Unreadable entries are skipped.
    pub fn find_source(&self, directory: &Path, base_name: &str) -> Option<PathBuf> {
        let wanted = base_name.to_lowercase();
        let mut best: Option<(usize, PathBuf)> = None;

        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry while searching {}: {}", directory.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let stem_matches = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.to_lowercase() == wanted);

            if stem_matches
                && SourceExtension::from_path(path).is_some()
                && !self.is_annotated(path)
                && best.as_ref().is_none_or(|(depth, _)| entry.depth() < *depth)
            {
                best = Some((entry.depth(), path.to_path_buf()));
            }
        }

        best.map(|(_, path)| path)
    }
}
