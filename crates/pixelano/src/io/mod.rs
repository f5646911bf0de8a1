pub mod locate;
pub mod voc;

pub use locate::{DEFAULT_MARKER, SourceExtension, SourceLocator};
pub use voc::{VocAnnotation, VocObject};
