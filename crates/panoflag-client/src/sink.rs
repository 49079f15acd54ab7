use std::path::{Path, PathBuf};

use panoflag_core::config::EnrichmentConfig;
use panoflag_core::error::AppError;
use panoflag_core::models::{EnrichedRecord, UnresolvedRecord};
use panoflag_core::traits::ResultSink;
use serde::Serialize;
use serde::de::DeserializeOwned;

const ENRICHED_HEADER: [&str; 9] = [
    "pano_id",
    "image_width",
    "image_height",
    "tile_width",
    "tile_height",
    "copyright",
    "center_heading",
    "origin_heading",
    "origin_pitch",
];
const UNRESOLVED_HEADER: [&str; 1] = ["pano_id"];

/// Writes the two result documents into a directory.
///
/// `{city}_pano_image_data.json` and `{city}_unretrievable_panos.json`,
/// plus `.csv` twins when CSV export is on.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    enriched_filename: String,
    unresolved_filename: String,
    write_csv: bool,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>, config: &EnrichmentConfig) -> Self {
        Self {
            dir: dir.into(),
            enriched_filename: config.enriched_filename(),
            unresolved_filename: config.unresolved_filename(),
            write_csv: false,
        }
    }

    pub fn with_csv(mut self, write_csv: bool) -> Self {
        self.write_csv = write_csv;
        self
    }

    pub fn enriched_path(&self) -> PathBuf {
        self.dir.join(&self.enriched_filename)
    }

    pub fn unresolved_path(&self) -> PathBuf {
        self.dir.join(&self.unresolved_filename)
    }
}

impl ResultSink for JsonFileSink {
    async fn publish(
        &self,
        enriched: &[EnrichedRecord],
        unresolved: &[UnresolvedRecord],
    ) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| sink_error(&self.dir, e))?;

        write_json(&self.enriched_path(), enriched).await?;
        write_json(&self.unresolved_path(), unresolved).await?;
        tracing::info!(
            enriched = enriched.len(),
            unresolved = unresolved.len(),
            dir = %self.dir.display(),
            "Wrote result documents"
        );

        if self.write_csv {
            write_csv(&csv_path(&self.enriched_path()), &ENRICHED_HEADER, enriched).await?;
            write_csv(&csv_path(&self.unresolved_path()), &UNRESOLVED_HEADER, unresolved).await?;
            tracing::info!("Wrote CSV exports");
        }

        Ok(())
    }
}

/// Re-export previously written result documents as CSV.
///
/// Returns the paths of the two CSV files.
pub async fn convert_json_to_csv(
    dir: &Path,
    config: &EnrichmentConfig,
) -> Result<(PathBuf, PathBuf), AppError> {
    let sink = JsonFileSink::new(dir, config);

    let enriched: Vec<EnrichedRecord> = read_json(&sink.enriched_path()).await?;
    let unresolved: Vec<UnresolvedRecord> = read_json(&sink.unresolved_path()).await?;

    let enriched_csv = csv_path(&sink.enriched_path());
    let unresolved_csv = csv_path(&sink.unresolved_path());
    write_csv(&enriched_csv, &ENRICHED_HEADER, &enriched).await?;
    write_csv(&unresolved_csv, &UNRESOLVED_HEADER, &unresolved).await?;

    Ok((enriched_csv, unresolved_csv))
}

fn csv_path(json_path: &Path) -> PathBuf {
    json_path.with_extension("csv")
}

fn sink_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::SinkError(format!("Failed to write {}: {e}", path.display()))
}

async fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<(), AppError> {
    let bytes = serde_json::to_vec(records)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| sink_error(path, e))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn write_csv<T: Serialize>(
    path: &Path,
    header: &[&str],
    records: &[T],
) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .map_err(|e| AppError::CsvError(e.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::CsvError(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::CsvError(e.to_string()))?;

    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| sink_error(path, e))
}
