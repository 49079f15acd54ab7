use futures::StreamExt;
use futures::stream;
use serde::Serialize;

use crate::config::EnrichmentConfig;
use crate::error::AppError;
use crate::filter::{ChunkPlan, FilteredCandidate};
use crate::models::{EnrichedRecord, LookupFailure, LookupOutcome, UnresolvedRecord};
use crate::traits::{MetadataProvider, Pacer, ResultSink};

/// Where the engine is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Dispatching { chunk: usize },
    Settling { chunk: usize },
    Pacing { next_chunk: usize },
    Finalizing,
    Done,
}

/// Events emitted by the engine for monitoring/logging.
#[derive(Debug, Clone)]
pub enum EngineEvent<'a> {
    StateChanged(EngineState),
    ChunkSettled {
        chunk: usize,
        chunk_count: usize,
        size: usize,
        enriched: usize,
        unresolved: usize,
    },
    LookupFailed {
        pano_id: &'a str,
        failure: &'a LookupFailure,
    },
    Finished {
        stats: &'a EngineStats,
    },
}

/// Trait for receiving engine events (decoupled logging).
pub trait EngineReporter: Send + Sync {
    fn report(&self, event: EngineEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEngineReporter;

impl EngineReporter for TracingEngineReporter {
    fn report(&self, event: EngineEvent<'_>) {
        match event {
            EngineEvent::StateChanged(state) => {
                tracing::debug!(?state, "Engine state changed");
            }
            EngineEvent::ChunkSettled {
                chunk,
                chunk_count,
                size,
                enriched,
                unresolved,
            } => {
                tracing::info!(
                    chunk = chunk + 1,
                    chunk_count,
                    size,
                    enriched,
                    unresolved,
                    "Chunk settled"
                );
            }
            EngineEvent::LookupFailed { pano_id, failure } => {
                tracing::debug!(%pano_id, %failure, "No metadata for panorama");
            }
            EngineEvent::Finished { stats } => {
                tracing::info!(
                    chunks = stats.chunks,
                    pacing_waits = stats.pacing_waits,
                    enriched = stats.enriched,
                    unresolved = stats.unresolved(),
                    transport_failures = stats.transport_failures,
                    "Enrichment finished"
                );
            }
        }
    }
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub chunks: usize,
    pub pacing_waits: usize,
    pub enriched: usize,
    pub not_found: usize,
    pub status_failures: usize,
    pub transport_failures: usize,
}

impl EngineStats {
    pub fn unresolved(&self) -> usize {
        self.not_found + self.status_failures + self.transport_failures
    }
}

/// Everything the engine produced. Lists are in lookup completion order.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub enriched: Vec<EnrichedRecord>,
    pub unresolved: Vec<UnresolvedRecord>,
    pub stats: EngineStats,
}

impl EngineOutput {
    fn classify<R: EngineReporter>(&mut self, pano_id: &str, outcome: LookupOutcome, reporter: &R) {
        match outcome {
            Ok(metadata) => {
                self.enriched.push(EnrichedRecord::new(pano_id, &metadata));
                self.stats.enriched += 1;
            }
            Err(failure) => {
                reporter.report(EngineEvent::LookupFailed {
                    pano_id,
                    failure: &failure,
                });
                match failure {
                    LookupFailure::NotFound => self.stats.not_found += 1,
                    LookupFailure::Status(_) => self.stats.status_failures += 1,
                    LookupFailure::Transport(_) => self.stats.transport_failures += 1,
                }
                self.unresolved.push(UnresolvedRecord::new(pano_id));
            }
        }
    }
}

/// Chunked, paced batch lookup of panorama metadata.
///
/// Each chunk fans out one lookup per panorama, at most `max_in_flight` at a
/// time, and waits for every lookup to settle before moving on. Chunks never
/// overlap, and the pacer runs between every pair of consecutive chunks no
/// matter how the chunk went.
pub struct EnrichmentEngine<P, Z>
where
    P: MetadataProvider,
    Z: Pacer,
{
    provider: P,
    pacer: Z,
    chunk_size: usize,
    max_in_flight: usize,
}

impl<P, Z> EnrichmentEngine<P, Z>
where
    P: MetadataProvider,
    Z: Pacer,
{
    pub fn new(provider: P, pacer: Z, config: &EnrichmentConfig) -> Self {
        Self {
            provider,
            pacer,
            chunk_size: config.chunk_size,
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    /// Look up every candidate and hand both result lists to `sink` once.
    ///
    /// Per-lookup failures are recorded as [`UnresolvedRecord`]s. The only
    /// error this returns is the sink's.
    pub async fn run<K, R>(
        &self,
        candidates: &[FilteredCandidate],
        sink: &K,
        reporter: &R,
    ) -> Result<EngineOutput, AppError>
    where
        K: ResultSink,
        R: EngineReporter,
    {
        reporter.report(EngineEvent::StateChanged(EngineState::Idle));

        let plan = ChunkPlan::new(candidates, self.chunk_size);
        let chunk_count = plan.chunk_count();
        let mut output = EngineOutput::default();

        for (index, chunk) in plan.chunks().enumerate() {
            reporter.report(EngineEvent::StateChanged(EngineState::Dispatching {
                chunk: index,
            }));
            let mut pending = stream::iter(chunk)
                .map(|candidate| async move {
                    let outcome = self.provider.lookup(&candidate.pano_id).await;
                    (candidate.pano_id.as_str(), outcome)
                })
                .buffer_unordered(self.max_in_flight);

            reporter.report(EngineEvent::StateChanged(EngineState::Settling {
                chunk: index,
            }));
            let enriched_before = output.enriched.len();
            let unresolved_before = output.unresolved.len();
            while let Some((pano_id, outcome)) = pending.next().await {
                output.classify(pano_id, outcome, reporter);
            }
            output.stats.chunks += 1;

            reporter.report(EngineEvent::ChunkSettled {
                chunk: index,
                chunk_count,
                size: chunk.len(),
                enriched: output.enriched.len() - enriched_before,
                unresolved: output.unresolved.len() - unresolved_before,
            });

            if plan.is_last(index) {
                break;
            }

            reporter.report(EngineEvent::StateChanged(EngineState::Pacing {
                next_chunk: index + 1,
            }));
            self.pacer.wait_before_next_chunk(index + 1).await;
            output.stats.pacing_waits += 1;
        }

        reporter.report(EngineEvent::StateChanged(EngineState::Finalizing));
        sink.publish(&output.enriched, &output.unresolved).await?;

        reporter.report(EngineEvent::StateChanged(EngineState::Done));
        reporter.report(EngineEvent::Finished {
            stats: &output.stats,
        });

        Ok(output)
    }
}
