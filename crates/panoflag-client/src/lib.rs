pub mod provider;
pub mod sink;
pub mod source;

pub use provider::StreetViewMetadataProvider;
pub use sink::{JsonFileSink, convert_json_to_csv};
pub use source::SidewalkSourceLister;
