//! logsift groups large collections of free-form text lines (log entries and
//! the like) into clusters of near-duplicates, so each cluster can be shown
//! through one representative line.
//!
//! Input is split into fixed-size chunks that are clustered in parallel with
//! a greedy first-match pass, then merged in chunk order into one result.

// Module declarations
pub mod error;
pub mod config;
pub mod types;
pub mod text;
pub mod matcher;
pub mod cluster;
pub mod utils;

// Re-exports
pub use error::{Error, Result};
pub use config::{SiftConfig, SimilarityConfig, SimilarityMetric, ProcessorConfig};
pub use types::{Item, Cluster, ClusterSet, ClusterSummary};
pub use matcher::{SimilarityAlgorithm, SimilarityCalculator};
pub use cluster::{Clusterer, TextExtractor, AsText, cluster, cluster_lines};
pub use utils::{CancellationToken, ProgressObserver, ProgressUpdate};
