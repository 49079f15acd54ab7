use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

/// Settings for a single enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Deployment name, e.g. `"amsterdam"`. Selects the survey server and
    /// the output file names.
    pub city: String,
    /// Lookups per chunk. A chunk settles completely before pacing.
    pub chunk_size: usize,
    /// Upper bound on concurrent lookups inside one chunk. Keeps a large
    /// chunk within the process's socket and file descriptor limits.
    pub max_in_flight: usize,
    /// Cooldown between consecutive chunks.
    pub pacing_interval: Duration,
}

impl EnrichmentConfig {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            pacing_interval: DEFAULT_PACING_INTERVAL,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_pacing_interval(mut self, interval: Duration) -> Self {
        self.pacing_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.city.trim().is_empty() {
            return Err(AppError::ConfigError("city must not be empty".into()));
        }
        if self.chunk_size == 0 {
            return Err(AppError::ConfigError(
                "chunk_size must be at least 1".into(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(AppError::ConfigError(
                "max_in_flight must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Root of the survey deployment for this city.
    pub fn survey_base_url(&self) -> String {
        format!("https://sidewalk-{}.cs.washington.edu", self.city)
    }

    /// Endpoint listing every panorama known to the survey.
    pub fn source_url(&self) -> String {
        format!("{}/adminapi/panos", self.survey_base_url())
    }

    pub fn enriched_filename(&self) -> String {
        format!("{}_pano_image_data.json", self.city)
    }

    pub fn unresolved_filename(&self) -> String {
        format!("{}_unretrievable_panos.json", self.city)
    }
}
