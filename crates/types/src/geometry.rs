/// Pixel dimensions of a raster image, as probed from the file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDims {
    pub width: u32,
    pub height: u32,
}

impl PixelDims {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Page margins in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMargins {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PageMargins {
    pub fn new(top: f32, left: f32, right: f32, bottom: f32) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Margins for the cover page (and the document default).
    pub fn cover() -> Self {
        Self::new(72.0, 60.0, 72.0, 20.0)
    }

    /// Margins for per-screenshot metadata pages.
    pub fn metadata() -> Self {
        Self::new(72.0, 60.0, 72.0, 72.0)
    }

    /// No margins; image pages are filled edge to edge.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
