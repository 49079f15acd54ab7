//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::{EngineEvent, EngineReporter, EngineState};
use crate::error::AppError;
use crate::models::{
    Candidate, EnrichedRecord, LookupFailure, LookupOutcome, PanoMetadata, UnresolvedRecord,
};
use crate::traits::{MetadataProvider, Pacer, ResultSink, SourceLister};

/// Metadata with the given world size and 10x10 tiles, copyright `"x"`.
pub fn sample_metadata(world_width: u32, world_height: u32) -> PanoMetadata {
    PanoMetadata {
        world_width,
        world_height,
        tile_width: 10,
        tile_height: 10,
        copyright: "x".to_string(),
        center_heading: 0.0,
        origin_heading: 0.0,
        origin_pitch: 0.0,
    }
}

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// Mock source lister returning a fixed candidate list or an error.
#[derive(Clone)]
pub struct MockSource {
    response: Arc<Mutex<Option<Result<Vec<Candidate>, AppError>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Some(Ok(candidates)))),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            response: Arc::new(Mutex::new(Some(Err(error)))),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of times the list was requested.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl SourceLister for MockSource {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, AppError> {
        *self.calls.lock().unwrap() += 1;
        self.response
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

/// Mock metadata provider keyed by panorama id.
///
/// Unknown ids resolve to `sample_metadata(13312, 6656)`. Every lookup
/// appends `start:<id>` and `end:<id>` to a shared log and is counted while
/// in flight.
#[derive(Clone, Default)]
pub struct MockProvider {
    outcomes: Arc<Mutex<HashMap<String, LookupOutcome>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    default_delay: Arc<Mutex<Option<Duration>>>,
    log: Arc<Mutex<Vec<String>>>,
    /// (current, peak) concurrent lookups.
    in_flight: Arc<Mutex<(usize, usize)>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(self, pano_id: &str, metadata: PanoMetadata) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(pano_id.to_string(), Ok(metadata));
        self
    }

    pub fn with_failure(self, pano_id: &str, failure: LookupFailure) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(pano_id.to_string(), Err(failure));
        self
    }

    pub fn with_delay(self, pano_id: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(pano_id.to_string(), delay);
        self
    }

    /// Delay for every id without its own `with_delay`.
    pub fn with_default_delay(self, delay: Duration) -> Self {
        *self.default_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Number of lookups issued so far.
    pub fn lookups(&self) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("start:"))
            .count()
    }

    /// Highest number of lookups that were in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().1
    }
}

impl MetadataProvider for MockProvider {
    async fn lookup(&self, pano_id: &str) -> LookupOutcome {
        self.log.lock().unwrap().push(format!("start:{pano_id}"));
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            in_flight.0 += 1;
            in_flight.1 = in_flight.1.max(in_flight.0);
        }

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(pano_id)
            .copied()
            .or(*self.default_delay.lock().unwrap());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(pano_id)
            .cloned()
            .unwrap_or_else(|| Ok(sample_metadata(13312, 6656)));

        self.in_flight.lock().unwrap().0 -= 1;
        self.log.lock().unwrap().push(format!("end:{pano_id}"));
        outcome
    }
}

// ---------------------------------------------------------------------------
// RecordingPacer
// ---------------------------------------------------------------------------

/// Zero-delay pacer that records the chunk index of every wait.
#[derive(Clone, Default)]
pub struct RecordingPacer {
    waits: Arc<Mutex<Vec<usize>>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<usize> {
        self.waits.lock().unwrap().clone()
    }
}

impl Pacer for RecordingPacer {
    async fn wait_before_next_chunk(&self, next_chunk: usize) {
        self.waits.lock().unwrap().push(next_chunk);
    }
}

// ---------------------------------------------------------------------------
// MockSink
// ---------------------------------------------------------------------------

type Published = (Vec<EnrichedRecord>, Vec<UnresolvedRecord>);

/// Mock sink that records every publish call.
#[derive(Clone, Default)]
pub struct MockSink {
    published: Arc<Mutex<Vec<Published>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

impl ResultSink for MockSink {
    async fn publish(
        &self,
        enriched: &[EnrichedRecord],
        unresolved: &[UnresolvedRecord],
    ) -> Result<(), AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        self.published
            .lock()
            .unwrap()
            .push((enriched.to_vec(), unresolved.to_vec()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reporters
// ---------------------------------------------------------------------------

/// Reporter that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl EngineReporter for NoopReporter {}

/// Reporter that records every state transition.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    states: Arc<Mutex<Vec<EngineState>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<EngineState> {
        self.states.lock().unwrap().clone()
    }
}

impl EngineReporter for RecordingReporter {
    fn report(&self, event: EngineEvent<'_>) {
        if let EngineEvent::StateChanged(state) = event {
            self.states.lock().unwrap().push(state);
        }
    }
}
