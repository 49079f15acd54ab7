use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::EnrichmentConfig;
use crate::engine::{EngineReporter, EnrichmentEngine};
use crate::error::AppError;
use crate::filter::filter_candidates;
use crate::traits::{MetadataProvider, Pacer, ResultSink, SourceLister};

/// What a finished run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub city: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Panoramas listed by the survey API
    pub total_candidates: usize,
    /// Panoramas that needed a lookup
    pub filtered: usize,
    pub chunks: usize,
    pub pacing_waits: usize,
    pub enriched: usize,
    pub unresolved: usize,
    pub not_found: usize,
    pub status_failures: usize,
    pub transport_failures: usize,
}

/// Orchestrates one run: list → filter → look up in chunks → publish.
///
/// Generic over all external collaborators via traits, so the whole run can
/// be exercised without network or filesystem access.
pub struct EnrichmentService<L, P, Z, K>
where
    L: SourceLister,
    P: MetadataProvider,
    Z: Pacer,
    K: ResultSink,
{
    lister: L,
    engine: EnrichmentEngine<P, Z>,
    sink: K,
    city: String,
}

impl<L, P, Z, K> EnrichmentService<L, P, Z, K>
where
    L: SourceLister,
    P: MetadataProvider,
    Z: Pacer,
    K: ResultSink,
{
    pub fn new(
        lister: L,
        provider: P,
        pacer: Z,
        sink: K,
        config: &EnrichmentConfig,
    ) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            lister,
            engine: EnrichmentEngine::new(provider, pacer, config),
            sink,
            city: config.city.clone(),
        })
    }

    /// Run the job to completion.
    ///
    /// Fails without looking anything up if the source cannot be listed,
    /// and fails after all lookups if the sink rejects the results.
    pub async fn run<R: EngineReporter>(&self, reporter: &R) -> Result<RunSummary, AppError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(%run_id, city = %self.city, "Listing panoramas");

        let candidates = self.lister.list_candidates().await?;
        let total_candidates = candidates.len();
        tracing::info!(%run_id, total_candidates, "Listed panoramas");

        let filtered = filter_candidates(candidates);
        let output = self.engine.run(&filtered, &self.sink, reporter).await?;

        let stats = output.stats;
        Ok(RunSummary {
            run_id,
            city: self.city.clone(),
            started_at,
            finished_at: Utc::now(),
            total_candidates,
            filtered: filtered.len(),
            chunks: stats.chunks,
            pacing_waits: stats.pacing_waits,
            enriched: stats.enriched,
            unresolved: stats.unresolved(),
            not_found: stats.not_found,
            status_failures: stats.status_failures,
            transport_failures: stats.transport_failures,
        })
    }
}
