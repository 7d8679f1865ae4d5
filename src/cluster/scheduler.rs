// src/cluster/scheduler.rs

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use rayon::prelude::*;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::matcher::SimilarityCalculator;
use crate::types::ClusterSet;
use crate::utils::{CancellationToken, ProgressObserver, ProgressUpdate};
use super::chunk::ChunkClusterer;
use super::extract::TextExtractor;
use super::partition::Chunk;

/// Runs one `ChunkClusterer` per chunk on a rayon pool and joins on all of
/// them. Fail-fast: after the first error no further chunk starts its pass,
/// finished results are dropped, and that error is returned.
pub struct ChunkScheduler<'a> {
    calc: &'a SimilarityCalculator,
    pool: Option<&'a rayon::ThreadPool>,
    cancel: Option<&'a CancellationToken>,
    progress: Option<&'a dyn ProgressObserver>,
}

impl<'a> ChunkScheduler<'a> {
    pub fn new(calc: &'a SimilarityCalculator) -> Self {
        Self { calc, pool: None, cancel: None, progress: None }
    }

    /// Dedicated pool; without one rayon's global pool is used.
    pub fn with_pool(mut self, pool: Option<&'a rayon::ThreadPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_cancellation(mut self, cancel: Option<&'a CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: Option<&'a dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Clusters every chunk and returns the results indexed by chunk, whatever
    /// order the workers finished in.
    pub fn run<T, E>(&self, chunks: Vec<Chunk<T>>, extractor: &E) -> Result<Vec<ClusterSet<T>>>
    where
        T: Send,
        E: TextExtractor<T> + ?Sized,
    {
        let total = chunks.len();
        let aborted = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);

        let job = || {
            chunks.into_par_iter()
                .map(|chunk| self.run_chunk(chunk, extractor, &aborted, &completed, total))
                .collect::<Result<Vec<Option<ClusterSet<T>>>>>()
        };

        let results = match self.pool {
            Some(pool) => pool.install(job)?,
            None => job()?,
        };

        // Chunks only skip their pass after another one failed
        results.into_iter().collect::<Option<Vec<_>>>().ok_or(Error::Cancelled)
    }

    fn run_chunk<T, E>(
        &self,
        chunk: Chunk<T>,
        extractor: &E,
        aborted: &AtomicBool,
        completed: &AtomicUsize,
        total: usize,
    ) -> Result<Option<ClusterSet<T>>>
    where
        E: TextExtractor<T> + ?Sized,
    {
        if aborted.load(Ordering::SeqCst) {
            return Ok(None);
        }
        if let Some(token) = self.cancel {
            if let Err(e) = token.check() {
                aborted.store(true, Ordering::SeqCst);
                return Err(e);
            }
        }

        let index = chunk.index;
        let size = chunk.len();
        let clusterer = ChunkClusterer::new(self.calc);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| clusterer.cluster_chunk(chunk, extractor)))
            .unwrap_or_else(|payload| Err(Error::chunk_task(index, panic_message(payload.as_ref()))));

        match outcome {
            Ok(set) => {
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                debug!("Chunk {} ({} items) -> {} clusters [{}/{}]", index, size, set.len(), done, total);
                if let Some(observer) = self.progress {
                    observer.on_progress(ProgressUpdate::status(
                        format!("Clustered chunk {}/{}", done, total)
                    ));
                }
                Ok(Some(set))
            },
            Err(e) => {
                aborted.store(true, Ordering::SeqCst);
                warn!("Chunk {} failed, abandoning remaining chunks: {}", index, e);
                Err(e)
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "chunk task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::partition::partition;
    use crate::config::SimilarityConfig;
    use std::sync::Mutex;

    fn calc() -> SimilarityCalculator {
        SimilarityCalculator::new(&SimilarityConfig::default()).unwrap()
    }

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("entry number {}", i % 3)).collect()
    }

    #[test]
    fn results_follow_chunk_order() {
        let calc = calc();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let chunks = partition(words(40), 4).unwrap();

        let extract = |s: &String| Some(s.clone());
        let sets = ChunkScheduler::new(&calc).with_pool(Some(&pool)).run(chunks, &extract).unwrap();

        assert_eq!(sets.len(), 10);
        for (i, set) in sets.iter().enumerate() {
            assert_eq!(set.item(0, 0).map(|item| item.value().clone()), Some(format!("entry number {}", (i * 4) % 3)));
        }
    }

    #[test]
    fn reports_progress_per_chunk() {
        let calc = calc();
        let seen = Mutex::new(Vec::new());
        let observer = |update: ProgressUpdate| seen.lock().unwrap().push(update.status);
        let chunks = partition(words(9), 3).unwrap();

        let extract = |s: &String| Some(s.clone());
        ChunkScheduler::new(&calc).with_progress(Some(&observer)).run(chunks, &extract).unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, vec!["Clustered chunk 1/3", "Clustered chunk 2/3", "Clustered chunk 3/3"]);
    }

    #[test]
    fn panics_become_chunk_errors() {
        let calc = calc();
        let chunks = partition(words(6), 3).unwrap();
        let extract = |s: &String| -> Option<String> {
            if s.ends_with('2') { panic!("bad line") }
            Some(s.clone())
        };

        let err = ChunkScheduler::new(&calc).run(chunks, &extract).unwrap_err();
        match err {
            Error::ChunkTask { message, .. } => assert_eq!(message, "bad line"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cancelled_before_start() {
        let calc = calc();
        let token = CancellationToken::new();
        token.cancel();
        let chunks = partition(words(6), 2).unwrap();

        let extract = |s: &String| Some(s.clone());
        let err = ChunkScheduler::new(&calc).with_cancellation(Some(&token)).run(chunks, &extract).unwrap_err();
        assert!(err.is_cancelled());
    }
}
