// cluster/mod.rs
pub mod extract;
pub mod partition;
pub mod chunk;
pub mod scheduler;
pub mod merge;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use log::{info, debug};

use crate::config::SiftConfig;
use crate::error::{Error, Result};
use crate::matcher::{SimilarityAlgorithm, SimilarityCalculator};
use crate::types::ClusterSet;
use crate::utils::{CancellationToken, ProgressObserver, ProgressUpdate};

pub use self::chunk::ChunkClusterer;
pub use self::extract::{AsText, TextExtractor};
pub use self::merge::{ClusterMerger, merge_all};
pub use self::partition::{Chunk, partition};
pub use self::scheduler::ChunkScheduler;

/// Entry point tying the pipeline together: partition, parallel per-chunk
/// clustering, then an in-order merge.
pub struct Clusterer {
    config: SiftConfig,
    calc: SimilarityCalculator,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
    cancel: Option<CancellationToken>,
    progress: Option<Arc<dyn ProgressObserver>>,
}

impl fmt::Debug for Clusterer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clusterer")
            .field("config", &self.config)
            .field("calc", &self.calc)
            .field("dedicated_pool", &self.thread_pool.is_some())
            .field("cancellable", &self.cancel.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Clusterer {
    pub fn new(config: SiftConfig) -> Result<Self> {
        let calc = SimilarityCalculator::new(&config.similarity)?;
        Self::build(config, calc)
    }

    /// Like `new`, but compares with `algorithm` instead of `config.similarity.metric`.
    pub fn with_algorithm(config: SiftConfig, algorithm: Box<dyn SimilarityAlgorithm>) -> Result<Self> {
        let calc = SimilarityCalculator::with_algorithm(&config.similarity, algorithm)?;
        Self::build(config, calc)
    }

    fn build(config: SiftConfig, calc: SimilarityCalculator) -> Result<Self> {
        config.validate()?;

        // Initialize thread pool if thread count specified
        let thread_pool = if config.processor.thread_count > 0 {
            Some(Arc::new(rayon::ThreadPoolBuilder::new()
                .num_threads(config.processor.thread_count)
                .thread_name(|i| format!("sift-worker-{}", i))
                .build()?))
        } else {
            None // Use rayon's default thread pool
        };

        Ok(Self { config, calc, thread_pool, cancel: None, progress: None })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress<P: ProgressObserver + 'static>(mut self, observer: P) -> Self {
        self.progress = Some(Arc::new(observer));
        self
    }

    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    pub fn similarity(&self) -> &SimilarityCalculator {
        &self.calc
    }

    /// Clusters `items`, returning either the complete merged result or the
    /// first error. The same input and configuration always give the same result.
    pub fn cluster<T, I, E>(&self, items: I, extractor: E) -> Result<ClusterSet<T>>
    where
        T: Send,
        I: IntoIterator<Item = T>,
        E: TextExtractor<T>,
    {
        let chunk_size = self.config.processor.chunk_size;
        if chunk_size == 0 {
            return Err(Error::invalid_argument("chunk_size must be a positive integer"));
        }

        let values: Vec<T> = items.into_iter().collect();
        if values.is_empty() {
            debug!("No items to cluster");
            return Ok(ClusterSet::new());
        }
        let total_items = values.len();

        let stopwatch = Instant::now();
        let chunks = partition(values, chunk_size)?;
        let chunk_count = chunks.len();

        let scheduler = ChunkScheduler::new(&self.calc)
            .with_pool(self.thread_pool.as_deref())
            .with_cancellation(self.cancel.as_ref())
            .with_progress(self.progress.as_deref());
        let per_chunk = scheduler.run(chunks, &extractor)?;
        info!("Finished parallel processing of {} similarity chunks ({} ms)",
            chunk_count, stopwatch.elapsed().as_millis());

        let stopwatch = Instant::now();
        if let Some(token) = &self.cancel {
            token.check()?;
        }
        let merged = merge_all(&self.calc, per_chunk, self.cancel.as_ref())?;
        info!("Merged similarity groups: {} items in {} clusters ({} ms)",
            total_items, merged.len(), stopwatch.elapsed().as_millis());

        if let Some(observer) = &self.progress {
            observer.on_progress(ProgressUpdate::refresh(
                format!("Grouped {} lines into {} clusters", total_items, merged.len())
            ));
        }
        Ok(merged)
    }
}

/// Clusters `items` with the default similarity policy and `chunk_size` items per chunk.
pub fn cluster<T, I, F>(items: I, chunk_size: usize, extractor: F) -> Result<ClusterSet<T>>
where
    T: Send,
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Option<String> + Sync,
{
    let mut config = SiftConfig::default();
    config.processor.chunk_size = chunk_size;
    Clusterer::new(config)?.cluster(items, extractor)
}

/// `cluster` for plain text lines.
pub fn cluster_lines<S>(lines: Vec<S>, chunk_size: usize) -> Result<ClusterSet<S>>
where
    S: AsRef<str> + Send,
{
    let mut config = SiftConfig::default();
    config.processor.chunk_size = chunk_size;
    Clusterer::new(config)?.cluster(lines, AsText)
}
