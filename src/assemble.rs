//! Per-viewport report assembly.
//!
//! One call to [`assemble_viewport`] produces one complete document:
//! a cover page, then for each screenshot in discovery order an
//! optional metadata page followed by a mandatory image page. The
//! function is synchronous and self-contained so the orchestrator can
//! run it on a blocking worker thread.

use crate::config::RunConfig;
use crate::locate::locate_screenshots;
use crate::matcher::{PageIndex, normalize_loc};
use chrono::{Datelike, Utc};
use log::debug;
use shotbook_traits::{DocumentEngine, DocumentSink, FieldColor, ImageProber, ProbeError, SinkError};
use shotbook_types::{PageMargins, PageRecord, PixelDims, Viewport};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Assembly worker failed: {0}")]
    Worker(String),
}

/// What one successful assembly produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub path: PathBuf,
    pub page_count: usize,
    pub screenshots: usize,
}

struct Screenshot {
    file: PathBuf,
    dims: PixelDims,
    matched: Option<PageRecord>,
}

/// Today's date as `YYYY-M-D`, month and day unpadded.
pub fn utc_date_stamp() -> String {
    let now = Utc::now();
    format!("{}-{}-{}", now.year(), now.month(), now.day())
}

/// Flattens a site URL into a single path-safe name:
/// `https://example.com/shop/` becomes `example.com-shop`.
pub fn domain_dir_name(domain: &str) -> String {
    normalize_loc(domain).replace('/', "-")
}

pub fn artifact_path(output: &Path, domain: &str, viewport_name: &str, date: &str) -> PathBuf {
    output.join(format!(
        "{}-{}-{}.pdf",
        domain_dir_name(domain),
        viewport_name,
        date
    ))
}

/// Assembles the report document for one viewport.
///
/// Returns `Ok(None)` when the viewport has no screenshots, which is a
/// skip rather than a failure. Any probe or sink error is fatal for
/// this viewport: a partial report would misrepresent the run.
pub fn assemble_viewport<E, P>(
    config: &RunConfig,
    index: &PageIndex,
    viewport: &Viewport,
    engine: &E,
    prober: &P,
) -> Result<Option<ArtifactSummary>, AssembleError>
where
    E: DocumentEngine,
    P: ImageProber,
{
    let output_root = &config.paths.output;
    let files = locate_screenshots(output_root, viewport.width);
    if files.is_empty() {
        return Ok(None);
    }

    // Probe every file before touching the document so a corrupt
    // screenshot never leaves a half-written artifact behind.
    let mut shots = Vec::with_capacity(files.len());
    for file in files {
        let dims = prober.probe(&file)?;
        let matched = index.match_screenshot(&file, output_root).cloned();
        debug!(
            "screenshot {} ({}x{}), crawl record: {}",
            file.display(),
            dims.width,
            dims.height,
            matched.is_some()
        );
        shots.push(Screenshot {
            file,
            dims,
            matched,
        });
    }

    let date = utc_date_stamp();
    let path = artifact_path(output_root, &config.domain.name, &viewport.name, &date);
    let title = format!("{} {}", domain_dir_name(&config.domain.name), viewport.name);

    let mut sink = engine.create(&path, &title)?;
    write_cover(&mut sink, viewport, &date, &shots)?;

    for shot in &shots {
        if let Some(page) = &shot.matched
            && !config.pdf_options.exclude_meta
        {
            sink.begin_text_page(shot.dims, PageMargins::metadata())?;
            sink.write_field("URL", &page.loc, FieldColor::Link)?;
            sink.write_field(
                "Meta Title",
                page.meta.title.as_deref().unwrap_or(""),
                FieldColor::Body,
            )?;
            sink.write_field(
                "Meta Description",
                page.meta.description.as_deref().unwrap_or(""),
                FieldColor::Body,
            )?;
        }
        sink.add_image_page(shot.dims, &shot.file)?;
    }

    let page_count = sink.page_count();
    let screenshots = shots.len();
    sink.finish()?;

    Ok(Some(ArtifactSummary {
        path,
        page_count,
        screenshots,
    }))
}

/// Fills the cover page a fresh document starts with.
///
/// Date, viewport and screenshot count always appear. Website and
/// analytics fields come from the first screenshot in sequence that
/// has a crawl record; a run with no matches omits them.
fn write_cover<S: DocumentSink>(
    sink: &mut S,
    viewport: &Viewport,
    date: &str,
    shots: &[Screenshot],
) -> Result<(), SinkError> {
    let first_matched = shots.iter().find_map(|s| s.matched.as_ref());

    sink.write_field("Date", date, FieldColor::Body)?;
    if let Some(page) = first_matched {
        sink.write_field("Website", &page.loc, FieldColor::Link)?;
    }
    sink.write_field("Viewport", &viewport.display_label(), FieldColor::Body)?;
    if let Some(page) = first_matched
        && let Some(ga) = &page.meta.ga_version
    {
        sink.write_field("Google Analytics Version", ga, FieldColor::Body)?;
    }
    sink.write_field(
        "Number of webpages",
        &shots.len().to_string(),
        FieldColor::Body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::PageIndex;
    use shotbook_traits::{PageEvent, RecordingEngine};
    use shotbook_types::{PageMeta, SiteManifest};
    use std::fs;
    use tempfile::tempdir;

    struct StubProber {
        dims: PixelDims,
        fail_for: Option<String>,
    }

    impl StubProber {
        fn new(width: u32, height: u32) -> Self {
            Self {
                dims: PixelDims { width, height },
                fail_for: None,
            }
        }

        fn failing_for(mut self, substring: &str) -> Self {
            self.fail_for = Some(substring.to_string());
            self
        }
    }

    impl ImageProber for StubProber {
        fn probe(&self, path: &Path) -> Result<PixelDims, ProbeError> {
            if let Some(marker) = &self.fail_for
                && path.to_string_lossy().contains(marker.as_str())
            {
                return Err(ProbeError::Dimensions {
                    path: path.display().to_string(),
                    message: "not a png".to_string(),
                });
            }
            Ok(self.dims)
        }
    }

    fn viewport(name: &str, width: u32) -> Viewport {
        Viewport {
            name: name.to_string(),
            width,
            height: 900,
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"png").unwrap();
    }

    fn config_for(output: &Path, exclude_meta: bool) -> RunConfig {
        let yaml = format!(
            r#"
domain:
  name: https://example.com
paths:
  output: {}
viewports:
  - viewport: desktop
    width: 1600
    height: 900
pdf_options:
  excludeMeta: {}
"#,
            output.display(),
            exclude_meta
        );
        RunConfig::from_yaml(&yaml).unwrap()
    }

    fn index_for(pages: &[(&str, &str, Option<&str>)]) -> PageIndex {
        let manifest = SiteManifest {
            pages: pages
                .iter()
                .map(|(loc, title, ga)| PageRecord {
                    loc: loc.to_string(),
                    meta: PageMeta {
                        title: Some(title.to_string()),
                        description: Some(format!("{title} page")),
                        ga_version: ga.map(str::to_string),
                    },
                })
                .collect(),
        };
        PageIndex::build(&manifest)
    }

    #[test]
    fn test_matched_screenshot_gets_cover_meta_and_image_pages() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("example.com/blog/1600.png"));

        let config = config_for(dir.path(), false);
        let index = index_for(&[("https://example.com/blog", "Blog", Some("UA-7"))]);
        let engine = RecordingEngine::new();
        let prober = StubProber::new(1600, 3200);

        let summary = assemble_viewport(&config, &index, &viewport("desktop", 1600), &engine, &prober)
            .unwrap()
            .unwrap();
        // cover + metadata + image
        assert_eq!(summary.page_count, 3);
        assert_eq!(summary.screenshots, 1);
        assert!(summary.path.ends_with(format!(
            "example.com-desktop-{}.pdf",
            utc_date_stamp()
        )));

        let docs = engine.finished_documents();
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc.page_count, 3);
        assert_eq!(doc.text_page_count(), 1);
        assert_eq!(doc.image_page_count(), 1);

        let cover = doc.cover_fields();
        assert_eq!(cover[0].0, "Date");
        assert_eq!(cover[1], ("Website", "https://example.com/blog"));
        assert_eq!(cover[2], ("Viewport", "desktop (1600x900)"));
        assert_eq!(cover[3], ("Google Analytics Version", "UA-7"));
        assert_eq!(cover[4], ("Number of webpages", "1"));
    }

    #[test]
    fn test_unmatched_screenshot_still_gets_image_page() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("mystery/1600.png"));

        let config = config_for(dir.path(), false);
        let index = index_for(&[]);
        let engine = RecordingEngine::new();
        let prober = StubProber::new(1600, 2000);

        let summary = assemble_viewport(&config, &index, &viewport("desktop", 1600), &engine, &prober)
            .unwrap()
            .unwrap();
        // cover + image only
        assert_eq!(summary.page_count, 2);

        let docs = engine.finished_documents();
        let labels: Vec<&str> = docs[0].cover_fields().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Date", "Viewport", "Number of webpages"]);
    }

    #[test]
    fn test_exclude_meta_suppresses_metadata_pages() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("example.com/blog/1600.png"));

        let config = config_for(dir.path(), true);
        let index = index_for(&[("https://example.com/blog", "Blog", None)]);
        let engine = RecordingEngine::new();
        let prober = StubProber::new(1600, 3200);

        let summary = assemble_viewport(&config, &index, &viewport("desktop", 1600), &engine, &prober)
            .unwrap()
            .unwrap();
        assert_eq!(summary.page_count, 2);
        assert_eq!(engine.finished_documents()[0].text_page_count(), 0);
        // The cover still names the matched website.
        assert!(engine.finished_documents()[0]
            .cover_fields()
            .into_iter()
            .any(|(l, _)| l == "Website"));
    }

    #[test]
    fn test_no_screenshots_is_a_skip() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path(), false);
        let engine = RecordingEngine::new();
        let prober = StubProber::new(1600, 900);

        let result =
            assemble_viewport(&config, &index_for(&[]), &viewport("desktop", 1600), &engine, &prober)
                .unwrap();
        assert!(result.is_none());
        assert!(engine.finished_documents().is_empty());
    }

    #[test]
    fn test_cover_uses_first_matched_screenshot_anywhere_in_sequence() {
        let dir = tempdir().unwrap();
        // Sorted traversal visits `aaa` (unmatched) before `example.com`.
        touch(&dir.path().join("aaa/1600.png"));
        touch(&dir.path().join("example.com/blog/1600.png"));

        let config = config_for(dir.path(), false);
        let index = index_for(&[("https://example.com/blog", "Blog", Some("UA-2"))]);
        let engine = RecordingEngine::new();
        let prober = StubProber::new(1600, 900);

        assemble_viewport(&config, &index, &viewport("desktop", 1600), &engine, &prober).unwrap();

        let docs = engine.finished_documents();
        let website = docs[0]
            .cover_fields()
            .into_iter()
            .find(|(l, _)| *l == "Website")
            .map(|(_, v)| v);
        assert_eq!(website, Some("https://example.com/blog"));
    }

    #[test]
    fn test_metadata_page_reuses_screenshot_dimensions() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("example.com/blog/1600.png"));

        let config = config_for(dir.path(), false);
        let index = index_for(&[("https://example.com/blog", "Blog", None)]);
        let engine = RecordingEngine::new();
        let prober = StubProber::new(1600, 4800);

        assemble_viewport(&config, &index, &viewport("desktop", 1600), &engine, &prober).unwrap();

        let docs = engine.finished_documents();
        let text_dims: Vec<PixelDims> = docs[0]
            .events
            .iter()
            .filter_map(|e| match e {
                PageEvent::TextPage { dims, .. } => Some(*dims),
                _ => None,
            })
            .collect();
        assert_eq!(
            text_dims,
            vec![PixelDims {
                width: 1600,
                height: 4800
            }]
        );
    }

    #[test]
    fn test_probe_failure_aborts_before_creating_document() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("good/1600.png"));
        touch(&dir.path().join("ruined/1600.png"));

        let config = config_for(dir.path(), false);
        let engine = RecordingEngine::new();
        let prober = StubProber::new(1600, 900).failing_for("ruined");

        let result =
            assemble_viewport(&config, &index_for(&[]), &viewport("desktop", 1600), &engine, &prober);
        assert!(matches!(result, Err(AssembleError::Probe(_))));
        assert!(engine.finished_documents().is_empty());
    }

    #[test]
    fn test_artifact_naming_flattens_domain() {
        assert_eq!(domain_dir_name("https://example.com/shop/"), "example.com-shop");
        assert_eq!(domain_dir_name("example.com"), "example.com");
        let path = artifact_path(Path::new("out"), "https://example.com", "mobile", "2026-8-30");
        assert_eq!(path, PathBuf::from("out/example.com-mobile-2026-8-30.pdf"));
    }
}
