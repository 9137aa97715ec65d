//! Run configuration, loaded once and never mutated afterwards.
//!
//! Every component reads from an immutable [`RunConfig`] value that is
//! constructed before the run starts and handed into the orchestrator
//! behind an `Arc`.

use crate::error::CompileError;
use serde::Deserialize;
use shotbook_types::Viewport;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct DomainConfig {
    /// Site root URL (or bare host) the run was captured from, e.g.
    /// `https://example.com`. Used for artifact naming.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Root directory the capture engine wrote screenshots under;
    /// report documents are written here as well.
    pub output: PathBuf,
    /// Site manifest location; defaults to `sitemap.json` under the
    /// output root.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfOptions {
    /// When set, no per-screenshot metadata pages are produced, even
    /// for screenshots with matching crawl records.
    #[serde(default, rename = "excludeMeta")]
    pub exclude_meta: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub domain: DomainConfig,
    pub paths: PathsConfig,
    pub viewports: Vec<Viewport>,
    #[serde(default)]
    pub pdf_options: PdfOptions,
    /// Upper bound on concurrently assembled viewport documents.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_max_in_flight() -> usize {
    num_cpus::get().saturating_sub(1).clamp(2, 6)
}

impl RunConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self, CompileError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, CompileError> {
        let config: RunConfig = serde_yaml::from_str(text)?;
        if config.viewports.is_empty() {
            return Err(CompileError::Config(
                "at least one viewport must be configured".to_string(),
            ));
        }
        if config.max_in_flight == 0 {
            return Err(CompileError::Config(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.paths
            .manifest
            .clone()
            .unwrap_or_else(|| self.paths.output.join("sitemap.json"))
    }
}
