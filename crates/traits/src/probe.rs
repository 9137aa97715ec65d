//! ImageProber trait for reading pixel dimensions from image files.
//!
//! Page height depends on the full captured content height, so
//! dimensions must come from the actual image bytes rather than the
//! configured viewport width.

use shotbook_types::PixelDims;
use std::path::Path;
use thiserror::Error;

/// Error type for dimension probing.
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    #[error("Failed to read image '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Could not determine dimensions of '{path}': {message}")]
    Dimensions { path: String, message: String },
}

/// Reads the declared pixel width/height of an image file.
pub trait ImageProber: Send + Sync {
    fn probe(&self, path: &Path) -> Result<PixelDims, ProbeError>;
}
