use image::ImageReader;
use shotbook_traits::{ImageProber, ProbeError};
use shotbook_types::PixelDims;
use std::path::Path;

/// Reads pixel dimensions from PNG headers without decoding pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngProber;

impl PngProber {
    pub fn new() -> Self {
        Self
    }
}

impl ImageProber for PngProber {
    fn probe(&self, path: &Path) -> Result<PixelDims, ProbeError> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| ProbeError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let (width, height) = reader.into_dimensions().map_err(|e| ProbeError::Dimensions {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(PixelDims::new(width, height))
    }
}
