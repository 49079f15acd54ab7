use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// One panorama as listed by the survey API.
///
/// Only the fields the enrichment run needs are decoded; everything else in
/// the survey payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub pano_id: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Candidate {
    pub fn new(pano_id: impl Into<String>) -> Self {
        Self {
            pano_id: Some(pano_id.into()),
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// True when the panorama has an id but is missing either image dimension.
    ///
    /// A zero dimension counts as missing.
    pub fn needs_enrichment(&self) -> bool {
        let has_id = self.pano_id.as_deref().is_some_and(|id| !id.is_empty());
        has_id && (!is_present(self.width) || !is_present(self.height))
    }
}

fn is_present(dimension: Option<f64>) -> bool {
    matches!(dimension, Some(v) if v != 0.0 && !v.is_nan())
}

/// Imagery metadata returned by the provider for a single panorama.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanoMetadata {
    /// Full panorama width in pixels
    pub world_width: u32,
    /// Full panorama height in pixels
    pub world_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub copyright: String,
    pub center_heading: f64,
    pub origin_heading: f64,
    pub origin_pitch: f64,
}

/// A panorama whose metadata was retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub pano_id: String,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub copyright: String,
    #[serde(serialize_with = "serialize_angle")]
    pub center_heading: f64,
    #[serde(serialize_with = "serialize_angle")]
    pub origin_heading: f64,
    #[serde(serialize_with = "serialize_angle")]
    pub origin_pitch: f64,
}

/// Whole-valued angles are written without a fraction (`0`, `90`), the way
/// the result documents have always been written.
fn serialize_angle<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl EnrichedRecord {
    pub fn new(pano_id: impl Into<String>, metadata: &PanoMetadata) -> Self {
        Self {
            pano_id: pano_id.into(),
            image_width: metadata.world_width,
            image_height: metadata.world_height,
            tile_width: metadata.tile_width,
            tile_height: metadata.tile_height,
            copyright: metadata.copyright.clone(),
            center_heading: metadata.center_heading,
            origin_heading: metadata.origin_heading,
            origin_pitch: metadata.origin_pitch,
        }
    }
}

/// A panorama whose metadata could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnresolvedRecord {
    pub pano_id: String,
}

impl UnresolvedRecord {
    pub fn new(pano_id: impl Into<String>) -> Self {
        Self {
            pano_id: pano_id.into(),
        }
    }
}

/// Why a single lookup did not yield metadata.
///
/// Every variant ends up as an [`UnresolvedRecord`]; the distinction only
/// shows in logs and run statistics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The provider reports no imagery for this panorama.
    #[error("no imagery available")]
    NotFound,

    /// The provider answered with some other non-OK status.
    #[error("provider status {0}")]
    Status(String),

    /// The provider could not be reached or answered with garbage.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl LookupFailure {
    /// True when the panorama could not be checked at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, LookupFailure::Transport(_))
    }
}

/// Result of one provider lookup.
pub type LookupOutcome = Result<PanoMetadata, LookupFailure>;
