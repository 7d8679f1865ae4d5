// src/cluster/merge.rs

use log::{debug, trace};

use crate::error::Result;
use crate::matcher::SimilarityCalculator;
use crate::types::ClusterSet;
use crate::utils::CancellationToken;

/// Single-threaded accumulator folding per-chunk results in chunk order.
#[derive(Debug)]
pub struct ClusterMerger<'a, T> {
    calc: &'a SimilarityCalculator,
    accumulator: ClusterSet<T>,
    absorbed: usize,
}

impl<'a, T> ClusterMerger<'a, T> {
    /// Seeds the accumulator with the first chunk's clusters, order unchanged.
    pub fn new(calc: &'a SimilarityCalculator, seed: ClusterSet<T>) -> Self {
        Self { calc, accumulator: seed, absorbed: 1 }
    }

    /// Folds `other` in: each of its clusters, in creation order, joins the
    /// first accumulator cluster whose representative matches its own, or is
    /// appended as a new cluster.
    pub fn absorb(&mut self, other: ClusterSet<T>) {
        let before = self.accumulator.len();
        let mut joined = 0usize;

        for candidate in other {
            match self.accumulator.first_match(candidate.representative_key(), self.calc) {
                Some(index) => {
                    trace!("Cluster '{}' merges into '{}'",
                        candidate.representative(),
                        self.accumulator.cluster(index).map(|c| c.representative()).unwrap_or_default());
                    self.accumulator.absorb_into(index, candidate);
                    joined += 1;
                },
                None => self.accumulator.push(candidate),
            }
        }

        self.absorbed += 1;
        debug!("Merge step {}: {} clusters joined existing ones, {} -> {} clusters",
            self.absorbed, joined, before, self.accumulator.len());
    }

    pub fn len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    pub fn finish(self) -> ClusterSet<T> {
        self.accumulator
    }
}

/// Folds `sets` left to right. `cancel` is checked before every merge step.
pub fn merge_all<T>(
    calc: &SimilarityCalculator,
    sets: Vec<ClusterSet<T>>,
    cancel: Option<&CancellationToken>,
) -> Result<ClusterSet<T>> {
    let mut sets = sets.into_iter();
    let mut merger = match sets.next() {
        Some(seed) => ClusterMerger::new(calc, seed),
        None => return Ok(ClusterSet::new()),
    };

    for set in sets {
        if let Some(token) = cancel {
            token.check()?;
        }
        merger.absorb(set);
    }

    Ok(merger.finish())
}
