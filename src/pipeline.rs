//! Run orchestration: fan out one assembly per viewport, fan the
//! results back in.
//!
//! The manifest is fetched once, indexed, and shared read-only.
//! Viewport assemblies are independent of each other and run on
//! blocking worker threads, bounded by a semaphore; one viewport
//! failing never cancels its siblings. Outcomes are reported in
//! configuration order regardless of completion order.

use crate::assemble::{ArtifactSummary, AssembleError, assemble_viewport};
use crate::config::RunConfig;
use crate::error::CompileError;
use crate::matcher::PageIndex;
use crate::source::SiteSource;
use log::{error, info, warn};
use shotbook_traits::{DocumentEngine, ImageProber};
use shotbook_types::Viewport;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What happened to a single viewport during a run.
#[derive(Debug)]
pub enum ViewportOutcome {
    Produced {
        viewport: Viewport,
        artifact: ArtifactSummary,
    },
    Skipped {
        viewport: Viewport,
    },
    Failed {
        viewport: Viewport,
        error: AssembleError,
    },
}

/// Per-viewport outcomes of one run, in configuration order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<ViewportOutcome>,
}

impl RunReport {
    pub fn produced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ViewportOutcome::Produced { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ViewportOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ViewportOutcome::Failed { .. }))
            .count()
    }

    /// First failure in configuration order, if any.
    pub fn first_failure(&self) -> Option<(&Viewport, &AssembleError)> {
        self.outcomes.iter().find_map(|o| match o {
            ViewportOutcome::Failed { viewport, error } => Some((viewport, error)),
            _ => None,
        })
    }
}

/// Drives a full run: manifest fetch, page indexing, then one document
/// per configured viewport.
pub struct ReportCompiler<S, E, P> {
    config: Arc<RunConfig>,
    source: S,
    engine: Arc<E>,
    prober: Arc<P>,
}

impl<S, E, P> ReportCompiler<S, E, P>
where
    S: SiteSource,
    E: DocumentEngine + 'static,
    P: ImageProber + 'static,
{
    pub fn new(config: RunConfig, source: S, engine: E, prober: P) -> Self {
        Self {
            config: Arc::new(config),
            source,
            engine: Arc::new(engine),
            prober: Arc::new(prober),
        }
    }

    /// Runs the whole compilation.
    ///
    /// Returns `Ok` with the per-viewport report when every viewport
    /// either produced a document or was skipped. If any viewport
    /// failed, all siblings still run to completion before the first
    /// failure (in configuration order) is returned as the run error.
    pub async fn run(self) -> Result<RunReport, CompileError> {
        let manifest = self.source.fetch().await?;
        info!(
            "site manifest loaded: {} crawled page(s), {} viewport(s) configured",
            manifest.len(),
            self.config.viewports.len()
        );
        let index = Arc::new(PageIndex::build(&manifest));

        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut tasks = JoinSet::new();
        for (slot, viewport) in self.config.viewports.iter().cloned().enumerate() {
            let config = Arc::clone(&self.config);
            let index = Arc::clone(&index);
            let engine = Arc::clone(&self.engine);
            let prober = Arc::clone(&self.prober);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // Closed-semaphore is unreachable here; holding the
                // permit for the whole blocking call is the point.
                let _permit = semaphore.acquire_owned().await.ok();
                let result = tokio::task::spawn_blocking(move || {
                    assemble_viewport(&config, &index, &viewport, &*engine, &*prober)
                })
                .await
                .unwrap_or_else(|join_error| {
                    Err(AssembleError::Worker(join_error.to_string()))
                });
                (slot, result)
            });
        }

        let mut slots: Vec<Option<Result<Option<ArtifactSummary>, AssembleError>>> =
            (0..self.config.viewports.len()).map(|_| None).collect();
        let mut join_failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, result)) => slots[slot] = Some(result),
                Err(e) => {
                    if join_failure.is_none() {
                        join_failure = Some(e.to_string());
                    }
                }
            }
        }
        if let Some(message) = join_failure {
            return Err(CompileError::Runtime(message));
        }

        let mut report = RunReport::default();
        for (slot, result) in slots.into_iter().enumerate() {
            let viewport = self.config.viewports[slot].clone();
            let result =
                result.ok_or_else(|| CompileError::Runtime("worker vanished".to_string()))?;
            let outcome = match result {
                Ok(Some(artifact)) => {
                    info!(
                        "viewport {}: wrote {} ({} pages, {} screenshots)",
                        viewport.name,
                        artifact.path.display(),
                        artifact.page_count,
                        artifact.screenshots
                    );
                    ViewportOutcome::Produced { viewport, artifact }
                }
                Ok(None) => {
                    warn!(
                        "screenshots for viewport {} do not exist, skipping",
                        viewport.name
                    );
                    ViewportOutcome::Skipped { viewport }
                }
                Err(error) => {
                    error!("viewport {} failed: {}", viewport.name, error);
                    ViewportOutcome::Failed { viewport, error }
                }
            };
            report.outcomes.push(outcome);
        }

        if let Some((viewport, error)) = report.first_failure() {
            return Err(CompileError::Assembly {
                viewport: viewport.name.clone(),
                message: error.to_string(),
            });
        }
        Ok(report)
    }
}
