pub mod geometry;
pub mod page;
pub mod viewport;

pub use geometry::{PageMargins, PixelDims};
pub use page::{PageMeta, PageRecord, SiteManifest};
pub use viewport::Viewport;
