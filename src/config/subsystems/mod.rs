pub mod similarity;
pub mod processor;

pub use similarity::{SimilarityConfig, SimilarityMetric};
pub use processor::ProcessorConfig;
