use std::time::Duration;

use panoflag_core::error::AppError;
use panoflag_core::models::{LookupFailure, LookupOutcome, PanoMetadata};
use panoflag_core::traits::MetadataProvider;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Street View panorama metadata client.
///
/// Queries `{base_url}?pano=<id>` on an endpoint that answers with the
/// Maps JavaScript API `getPanorama` payload (status, copyright, tiles).
#[derive(Clone)]
pub struct StreetViewMetadataProvider {
    client: Client,
    base_url: Url,
}

impl StreetViewMetadataProvider {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        Self::with_timeout(base_url, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid provider URL '{base_url}': {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("panoflag/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn lookup_url(&self, pano_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("pano", pano_id);
        url
    }
}

impl MetadataProvider for StreetViewMetadataProvider {
    async fn lookup(&self, pano_id: &str) -> LookupOutcome {
        let response = self
            .client
            .get(self.lookup_url(pano_id))
            .send()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupFailure::NotFound);
        }
        if !status.is_success() {
            return Err(LookupFailure::Transport(format!("HTTP {}", status.as_u16())));
        }

        let body: PanoramaResponse = response
            .json()
            .await
            .map_err(|e| LookupFailure::Transport(format!("Failed to decode metadata: {e}")))?;

        body.into_outcome()
    }
}

// ---- getPanorama payload ----

#[derive(Debug, Deserialize)]
struct PanoramaResponse {
    status: String,
    #[serde(default)]
    copyright: Option<String>,
    #[serde(default)]
    tiles: Option<Tiles>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tiles {
    world_size: Size,
    tile_size: Size,
    #[serde(default)]
    center_heading: f64,
    #[serde(default)]
    origin_heading: f64,
    #[serde(default)]
    origin_pitch: f64,
}

#[derive(Debug, Deserialize)]
struct Size {
    width: u32,
    height: u32,
}

impl PanoramaResponse {
    fn into_outcome(self) -> LookupOutcome {
        match self.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" | "NOT_FOUND" => return Err(LookupFailure::NotFound),
            _ => return Err(LookupFailure::Status(self.status)),
        }

        let tiles = self
            .tiles
            .ok_or_else(|| LookupFailure::Transport("OK response without tiles".to_string()))?;

        Ok(PanoMetadata {
            world_width: tiles.world_size.width,
            world_height: tiles.world_size.height,
            tile_width: tiles.tile_size.width,
            tile_height: tiles.tile_size.height,
            copyright: self.copyright.unwrap_or_default(),
            center_heading: tiles.center_heading,
            origin_heading: tiles.origin_heading,
            origin_pitch: tiles.origin_pitch,
        })
    }
}
