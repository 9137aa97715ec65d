//! PDF document backend using lopdf.
//!
//! Builds the report document's object graph in memory and writes it
//! to storage in one pass on `finish`, with zlib-compressed content
//! streams and screenshots embedded as image XObjects.

mod engine;
mod probe;

pub use engine::{LopdfDocumentSink, LopdfEngine};
pub use probe::PngProber;
