//! Design orchestrator
//!
//! The Orchestrator turns design references into an effective site design:
//! - Fetching each document through the [`SourceRegistry`]
//! - Ingesting it into a fresh [`DesignState`] via the configured plugin
//! - Resolving the accumulated state into a frozen [`SiteDesign`]
//!
//! ## Architecture
//!
//! ```text
//! design_ref ──▶ SourceRegistry ──▶ Ingester ──▶ DesignState
//!   (URI)          (fetch)          (plugin)       (accumulate)
//!                                                      │
//!                                                      ▼ finalize()
//!                                   (ResolutionStatus, SiteDesign)
//! ```
//!
//! The whole pipeline runs under `resolve_timeout_secs` and can be cancelled
//! through a oneshot channel.

mod design;
mod resolve;

pub use design::{ResolutionIssue, ResolutionStatus, SiteDesign};
pub use resolve::resolve;

use crate::config::OrchestratorConfig;
use crate::error::{Error, Result};
use crate::ingester::Ingester;
use crate::source::SourceRegistry;
use crate::state::DesignState;
use crate::traits::IngestParams;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{Instrument, Span, debug, info, warn};

/// Produces effective site designs from design references
///
/// ## Threading
///
/// Every call builds its own design state, so one orchestrator can serve
/// concurrent requests.
pub struct Orchestrator {
    ingester: Arc<Ingester>,
    sources: Arc<SourceRegistry>,
    config: OrchestratorConfig,
    span: Span,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in design sources
    ///
    /// # Returns
    ///
    /// - `Ok(Orchestrator)`: Ready to resolve designs
    /// - `Err(Error::Config)`: Invalid configuration
    pub fn new(ingester: Arc<Ingester>, config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;

        if !ingester.has_plugin(&config.plugin) {
            warn!(
                "Ingestion plugin {} is not enabled yet; design references will fail until it is",
                config.plugin
            );
        }

        Ok(Self {
            ingester,
            sources: Arc::new(SourceRegistry::with_defaults()),
            config,
            span: tracing::info_span!("orchestrator"),
        })
    }

    /// Use a different source registry
    pub fn with_sources(mut self, sources: Arc<SourceRegistry>) -> Self {
        self.sources = sources;
        self
    }

    /// Record under the given span instead of a fresh `orchestrator` span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Build the effective site design behind one design reference
    ///
    /// # Parameters
    ///
    /// - `design_ref`: Design reference URI, e.g. `file:///etc/drydock/site.yaml`
    ///
    /// # Returns
    ///
    /// - `Ok((ResolutionStatus, SiteDesign))`: The effective design
    /// - `Err(Error::Config)`: Unparseable reference or unsupported scheme
    /// - `Err(Error::Processing)`: Unreadable document or unresolvable design
    /// - `Err(Error::Timeout)`: Resolution exceeded `resolve_timeout_secs`
    pub async fn get_effective_site(&self, design_ref: &str) -> Result<(ResolutionStatus, SiteDesign)> {
        self.get_effective_site_from(&[design_ref]).await
    }

    /// Build one effective site design from several design references
    ///
    /// Documents are ingested in order into a single state, so a later
    /// document overrides entities of the same identity from earlier ones.
    pub async fn get_effective_site_from<S: AsRef<str>>(
        &self,
        design_refs: &[S],
    ) -> Result<(ResolutionStatus, SiteDesign)> {
        if design_refs.is_empty() {
            return Err(Error::invalid_argument("At least one design reference is required"));
        }

        let span = self.span.clone();
        let pipeline = self.build(design_refs).instrument(span);

        if self.config.resolve_timeout_secs == 0 {
            return pipeline.await;
        }

        let limit = Duration::from_secs(self.config.resolve_timeout_secs);
        tokio::time::timeout(limit, pipeline).await.map_err(|_| {
            Error::timeout(format!(
                "Site design resolution exceeded {}s",
                self.config.resolve_timeout_secs
            ))
        })?
    }

    /// Build the effective site design, giving up when `cancel` fires
    ///
    /// Dropping the sender does not cancel; only an explicit send does.
    ///
    /// # Returns
    ///
    /// - `Err(Error::Cancelled)`: The cancel signal arrived first
    /// - Otherwise as [`Orchestrator::get_effective_site`]
    pub async fn get_effective_site_with_cancel(
        &self,
        design_ref: &str,
        mut cancel: oneshot::Receiver<()>,
    ) -> Result<(ResolutionStatus, SiteDesign)> {
        let work = self.get_effective_site(design_ref);
        tokio::pin!(work);

        // A dropped sender yields Err and disables the cancel branch
        tokio::select! {
            result = &mut work => result,

            Ok(()) = &mut cancel => {
                info!("Site design resolution for {} cancelled", design_ref);
                Err(Error::cancelled(format!("Resolution of {} was cancelled", design_ref)))
            }
        }
    }

    async fn build<S: AsRef<str>>(&self, design_refs: &[S]) -> Result<(ResolutionStatus, SiteDesign)> {
        let mut state = DesignState::new();

        for design_ref in design_refs {
            let design_ref = design_ref.as_ref();
            let content = self.sources.fetch(design_ref).await?;

            let params = IngestParams::from_content(content).with_design_ref(design_ref);
            let summary = self
                .ingester
                .ingest_data(&self.config.plugin, Some(&mut state), &params)
                .await?;

            debug!(
                "Ingested {} entities from {} ({} replaced, {} dropped)",
                summary.total(),
                design_ref,
                summary.replaced,
                summary.dropped
            );
        }

        let (status, design) = state.finalize()?;

        match &status {
            ResolutionStatus::Resolved => info!("Resolved site design ({} entities)", design.entity_count()),
            ResolutionStatus::ResolvedWithIssues(issues) => {
                for issue in issues {
                    warn!("Resolution issue: {}", issue);
                }
                info!(
                    "Resolved site design ({} entities, {} issue(s))",
                    design.entity_count(),
                    issues.len()
                );
            }
        }

        Ok((status, design))
    }
}
