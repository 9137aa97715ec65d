//! Site manifest acquisition.
//!
//! The crawler records the pages it visited in a JSON manifest. The
//! orchestrator fetches it exactly once per run through [`SiteSource`],
//! which keeps the transport swappable in tests.

use shotbook_types::SiteManifest;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Could not read site manifest '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Could not decode site manifest '{path}': {message}")]
    Decode { path: String, message: String },
}

/// Provides the crawl manifest for a run.
pub trait SiteSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<SiteManifest, SourceError>> + Send;
}

/// Reads the manifest from a JSON file on disk, the layout the crawler
/// leaves behind next to the screenshots.
#[derive(Debug, Clone)]
pub struct ManifestFileSource {
    path: PathBuf,
}

impl ManifestFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SiteSource for ManifestFileSource {
    async fn fetch(&self) -> Result<SiteManifest, SourceError> {
        let display = self.path.display().to_string();
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Read {
                path: display.clone(),
                message: e.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode {
            path: display,
            message: e.to_string(),
        })
    }
}

/// In-memory source for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSiteSource {
    manifest: SiteManifest,
}

impl StaticSiteSource {
    pub fn new(manifest: SiteManifest) -> Self {
        Self { manifest }
    }
}

impl SiteSource for StaticSiteSource {
    async fn fetch(&self) -> Result<SiteManifest, SourceError> {
        Ok(self.manifest.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_source_reads_crawler_manifest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sitemap.json");
        fs::write(
            &path,
            r#"{"pages":[{"loc":"https://example.com/","meta":{"title":"Home","gaVersion":"UA-1"}}]}"#,
        )
        .unwrap();

        let manifest = ManifestFileSource::new(&path).fetch().await.unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.pages[0].loc, "https://example.com/");
        assert_eq!(manifest.pages[0].meta.ga_version.as_deref(), Some("UA-1"));
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let source = ManifestFileSource::new(dir.path().join("absent.json"));
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_source_bad_json_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sitemap.json");
        fs::write(&path, "not json at all").unwrap();
        assert!(matches!(
            ManifestFileSource::new(&path).fetch().await,
            Err(SourceError::Decode { .. })
        ));
    }
}
