use std::future::Future;

use crate::error::AppError;
use crate::models::{Candidate, EnrichedRecord, LookupOutcome, UnresolvedRecord};

/// Supplies the full list of panoramas to consider for enrichment.
pub trait SourceLister: Send + Sync + Clone {
    fn list_candidates(&self) -> impl Future<Output = Result<Vec<Candidate>, AppError>> + Send;
}

/// Looks up imagery metadata for a single panorama.
///
/// Failures are returned as data and never abort the run.
pub trait MetadataProvider: Send + Sync + Clone {
    fn lookup(&self, pano_id: &str) -> impl Future<Output = LookupOutcome> + Send;
}

/// Receives the final result lists once, at the end of a run.
pub trait ResultSink: Send + Sync + Clone {
    fn publish(
        &self,
        enriched: &[EnrichedRecord],
        unresolved: &[UnresolvedRecord],
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Decides how long to hold off before the next chunk is dispatched.
pub trait Pacer: Send + Sync + Clone {
    /// Called between chunks, never before the first or after the last.
    fn wait_before_next_chunk(&self, next_chunk: usize) -> impl Future<Output = ()> + Send;
}

/// A no-op ResultSink for dry runs.
#[derive(Debug, Clone)]
pub struct NullSink;

impl ResultSink for NullSink {
    async fn publish(
        &self,
        enriched: &[EnrichedRecord],
        unresolved: &[UnresolvedRecord],
    ) -> Result<(), AppError> {
        tracing::info!(
            enriched = enriched.len(),
            unresolved = unresolved.len(),
            "Dry run, discarding results"
        );
        Ok(())
    }
}
