//! shotbook compiles previously captured webpage screenshots and
//! crawl metadata into one paginated PDF report per viewport: a cover
//! page summarizing the run, then one metadata page and one image
//! page per screenshot.
//!
//! The crawler and the screenshot capture engine are external
//! collaborators; this crate only assembles their artifacts.

pub mod assemble;
pub mod config;
pub mod error;
pub mod locate;
pub mod matcher;
pub mod pipeline;
pub mod source;

pub use assemble::{ArtifactSummary, AssembleError};
pub use config::RunConfig;
pub use error::CompileError;
pub use pipeline::{ReportCompiler, RunReport, ViewportOutcome};
pub use source::{ManifestFileSource, SiteSource, SourceError};
