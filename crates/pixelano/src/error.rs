use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixelanoError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Geometric computation error: {0}")]
    GeometricComputation(String),

    #[error("Class color map line {line}: {message}")]
    ColorMap { line: usize, message: String },

    #[error("No source image named '{base_name}' found for mask {}", .mask.display())]
    SourceImageNotFound { mask: PathBuf, base_name: String },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Annotation parse error: {0}")]
    AnnotationParse(String),
}

pub type Result<T> = std::result::Result<T, PixelanoError>;
