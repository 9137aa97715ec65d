//! Capability seams for the shotbook report compiler.
//!
//! The compiler decides *what* goes into a report; these traits cover
//! *how* it gets onto storage: paginated document authoring and image
//! dimension probing. Concrete backends live in their own crates.

pub mod document;
pub mod probe;
pub mod recording;

pub use document::{DocumentEngine, DocumentSink, FieldColor, SinkError};
pub use probe::{ImageProber, ProbeError};
pub use recording::{PageEvent, RecordedDocument, RecordingEngine, RecordingSink};
