//! An in-memory document engine that records page structure.
//!
//! Nothing touches storage; finished documents are captured as event
//! lists. This backs the compiler's own tests and works in any
//! environment, including one without a writable filesystem.

use crate::document::{DocumentEngine, DocumentSink, FieldColor, SinkError};
use shotbook_types::{PageMargins, PixelDims};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One structural event in a recorded document.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    TextPage {
        dims: PixelDims,
        margins: PageMargins,
    },
    Field {
        label: String,
        value: String,
        color: FieldColor,
    },
    ImagePage {
        dims: PixelDims,
        path: PathBuf,
    },
}

/// A document captured by [`RecordingEngine`] after `finish`.
#[derive(Debug, Clone)]
pub struct RecordedDocument {
    pub path: PathBuf,
    pub title: String,
    pub events: Vec<PageEvent>,
    pub page_count: usize,
}

impl RecordedDocument {
    /// Fields written to the cover page, i.e. before any explicit page.
    pub fn cover_fields(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .take_while(|e| matches!(e, PageEvent::Field { .. }))
            .filter_map(|e| match e {
                PageEvent::Field { label, value, .. } => Some((label.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn text_page_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PageEvent::TextPage { .. }))
            .count()
    }

    pub fn image_page_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PageEvent::ImagePage { .. }))
            .count()
    }
}

#[derive(Debug, Default)]
struct EngineState {
    documents: Mutex<Vec<RecordedDocument>>,
    open_sinks: AtomicUsize,
    peak_open_sinks: AtomicUsize,
    fail_path_substring: Mutex<Option<String>>,
}

/// A cloneable in-memory [`DocumentEngine`].
///
/// All clones share one store, so a test can hand clones to concurrent
/// assemblies and inspect every finished document afterwards. The
/// engine also tracks how many sinks were open at once, which makes
/// concurrency bounds observable.
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    state: Arc<EngineState>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create` fail for any document path containing `needle`.
    pub fn fail_when_path_contains(&self, needle: impl Into<String>) {
        if let Ok(mut fail) = self.state.fail_path_substring.lock() {
            *fail = Some(needle.into());
        }
    }

    /// Documents that reached `finish`, in completion order.
    pub fn finished_documents(&self) -> Vec<RecordedDocument> {
        self.state
            .documents
            .lock()
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }

    /// Highest number of simultaneously open sinks observed.
    pub fn peak_open_sinks(&self) -> usize {
        self.state.peak_open_sinks.load(Ordering::SeqCst)
    }
}

impl DocumentEngine for RecordingEngine {
    type Sink = RecordingSink;

    fn create(&self, path: &Path, title: &str) -> Result<Self::Sink, SinkError> {
        if let Ok(fail) = self.state.fail_path_substring.lock()
            && let Some(needle) = fail.as_deref()
            && path.to_string_lossy().contains(needle)
        {
            return Err(SinkError::Create {
                path: path.display().to_string(),
                message: "injected create failure".to_string(),
            });
        }

        let open = self.state.open_sinks.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .peak_open_sinks
            .fetch_max(open, Ordering::SeqCst);

        Ok(RecordingSink {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            title: title.to_string(),
            events: Vec::new(),
            page_count: 1, // the cover page exists from creation
        })
    }
}

/// Sink half of [`RecordingEngine`].
#[derive(Debug)]
pub struct RecordingSink {
    state: Arc<EngineState>,
    path: PathBuf,
    title: String,
    events: Vec<PageEvent>,
    page_count: usize,
}

impl DocumentSink for RecordingSink {
    fn begin_text_page(
        &mut self,
        dims: PixelDims,
        margins: PageMargins,
    ) -> Result<(), SinkError> {
        self.events.push(PageEvent::TextPage { dims, margins });
        self.page_count += 1;
        Ok(())
    }

    fn write_field(
        &mut self,
        label: &str,
        value: &str,
        color: FieldColor,
    ) -> Result<(), SinkError> {
        self.events.push(PageEvent::Field {
            label: label.to_string(),
            value: value.to_string(),
            color,
        });
        Ok(())
    }

    fn add_image_page(&mut self, dims: PixelDims, image_path: &Path) -> Result<(), SinkError> {
        self.events.push(PageEvent::ImagePage {
            dims,
            path: image_path.to_path_buf(),
        });
        self.page_count += 1;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.page_count
    }

    fn finish(self) -> Result<(), SinkError> {
        let doc = RecordedDocument {
            path: self.path.clone(),
            title: self.title.clone(),
            events: self.events.clone(),
            page_count: self.page_count,
        };
        self.state
            .documents
            .lock()
            .map_err(|_| SinkError::Write("recording store lock poisoned".to_string()))?
            .push(doc);
        Ok(())
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        self.state.open_sinks.fetch_sub(1, Ordering::SeqCst);
    }
}
