use std::time::Duration;

use panoflag_core::config::EnrichmentConfig;
use panoflag_core::error::AppError;
use panoflag_core::models::Candidate;
use panoflag_core::traits::SourceLister;
use reqwest::Client;

const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Lists panoramas from a Project Sidewalk deployment's admin API.
///
/// The whole list arrives in one response, which for a large city is tens
/// of megabytes, hence the generous default timeout.
#[derive(Clone)]
pub struct SidewalkSourceLister {
    client: Client,
    url: String,
    timeout_secs: u64,
}

impl SidewalkSourceLister {
    /// Lister for the deployment named in `config`.
    pub fn for_config(config: &EnrichmentConfig) -> Result<Self, AppError> {
        Self::new(config.source_url())
    }

    /// Lister for an explicit endpoint URL.
    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        Self::with_timeout(url, DEFAULT_SOURCE_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("panoflag/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SourceLister for SidewalkSourceLister {
    async fn list_candidates(&self) -> Result<Vec<Candidate>, AppError> {
        tracing::info!(url = %self.url, "Fetching panorama list");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                self.url
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        decode_candidates(body)
    }
}

/// Decode the survey payload element by element.
///
/// Elements that are not candidate-shaped are skipped so one bad row cannot
/// sink the run; a body that is not an array at all is an error.
fn decode_candidates(body: serde_json::Value) -> Result<Vec<Candidate>, AppError> {
    let serde_json::Value::Array(items) = body else {
        return Err(AppError::HttpError(
            "Expected a JSON array of panoramas".to_string(),
        ));
    };

    let total = items.len();
    let candidates: Vec<Candidate> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    let skipped = total - candidates.len();
    if skipped > 0 {
        tracing::warn!(skipped, "Skipped malformed panorama entries");
    }
    Ok(candidates)
}
