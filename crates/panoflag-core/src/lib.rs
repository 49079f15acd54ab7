pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod models;
pub mod pacing;
pub mod service;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::EnrichmentConfig;
pub use engine::{EngineOutput, EngineStats, EnrichmentEngine, TracingEngineReporter};
pub use error::AppError;
pub use models::{Candidate, EnrichedRecord, LookupFailure, PanoMetadata, UnresolvedRecord};
pub use service::{EnrichmentService, RunSummary};
pub use traits::{MetadataProvider, NullSink, Pacer, ResultSink, SourceLister};
