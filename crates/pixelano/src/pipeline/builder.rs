use crate::{
    color_map::ColorRangeMap,
    io::locate::{DEFAULT_MARKER, SourceLocator},
    pipeline::Converter,
    traits::InstanceExtractor,
    DefaultExtractor,
};

/// Builder for creating converters with a fluent API
pub struct ConverterBuilder {
    color_map: ColorRangeMap,
    extractor: Option<Box<dyn InstanceExtractor>>,
    marker: String,
}

impl ConverterBuilder {
    /// Create a new converter builder for the given class color map
    pub fn new(color_map: ColorRangeMap) -> Self {
        Self {
            color_map,
            extractor: None,
            marker: DEFAULT_MARKER.to_string(),
        }
    }

    /// Set the instance extractor (replaces any existing one)
    pub fn set_extractor<E>(mut self, extractor: E) -> Self
    where
        E: InstanceExtractor + 'static,
    {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Use a different mask-file marker than `_a`
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Build the converter with default components if not specified
    pub fn build(self) -> Converter {
        let extractor = self.extractor
            .unwrap_or_else(|| Box::new(DefaultExtractor::default()));

        Converter::new(self.color_map, extractor, SourceLocator::new(self.marker))
    }
}
