//! DocumentSink trait for abstracting paginated document authoring.
//!
//! The assembler describes report pages through this trait without
//! being tied to a particular document format or writer library.

use shotbook_types::{PageMargins, PixelDims};
use std::path::Path;
use thiserror::Error;

/// Error type for document authoring operations.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to create document '{path}': {message}")]
    Create { path: String, message: String },

    #[error("Failed to read image '{path}': {message}")]
    ImageRead { path: String, message: String },

    #[error("Failed to encode page content: {0}")]
    Encode(String),

    #[error("Failed to write document: {0}")]
    Write(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Write(err.to_string())
    }
}

/// Presentation role of a field value. The backend decides how the
/// role is styled; URLs are set apart from body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldColor {
    Body,
    Link,
}

/// A paginated document being written.
///
/// A freshly created sink already contains the cover page (portrait,
/// letter-sized, cover margins); fields written before the first
/// explicit page land there. Pages are appended in call order and the
/// document only reaches storage on [`DocumentSink::finish`].
pub trait DocumentSink {
    /// Append a text page sized to `dims` (one PDF point per pixel)
    /// with the given margins. Subsequent fields land on this page.
    fn begin_text_page(&mut self, dims: PixelDims, margins: PageMargins)
    -> Result<(), SinkError>;

    /// Write a labelled field at the current cursor: the label in
    /// heading size, the value below it, then a blank line.
    fn write_field(&mut self, label: &str, value: &str, color: FieldColor)
    -> Result<(), SinkError>;

    /// Append a page sized exactly to `dims` and place the image on
    /// it, filling the page from the origin corner.
    fn add_image_page(&mut self, dims: PixelDims, image_path: &Path) -> Result<(), SinkError>;

    /// Number of pages added so far, cover included.
    fn page_count(&self) -> usize;

    /// Write the document out and make it durable. Completion means
    /// the storage sink reported the write fully flushed, not merely
    /// buffered.
    fn finish(self) -> Result<(), SinkError>
    where
        Self: Sized;
}

/// Factory for [`DocumentSink`]s, one document per call.
///
/// Engines are shared across concurrent per-viewport assemblies, so
/// they must be cheap to clone and safe to use from multiple tasks.
pub trait DocumentEngine: Send + Sync {
    type Sink: DocumentSink + Send;

    /// Start a new document at `path`. The returned sink owns the
    /// target exclusively; nothing usable is left at `path` if the
    /// sink is dropped without `finish`.
    fn create(&self, path: &Path, title: &str) -> Result<Self::Sink, SinkError>;
}
