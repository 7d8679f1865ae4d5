// src/cluster/chunk.rs

use log::trace;

use crate::error::{Error, Result};
use crate::matcher::SimilarityCalculator;
use crate::types::{Cluster, ClusterSet, Item};
use super::extract::TextExtractor;
use super::partition::Chunk;

/// Greedy first-match clustering of a single chunk. Touches only the chunk
/// it is given, so any number of them can run side by side.
#[derive(Debug, Clone, Copy)]
pub struct ChunkClusterer<'a> {
    calc: &'a SimilarityCalculator,
}

impl<'a> ChunkClusterer<'a> {
    pub fn new(calc: &'a SimilarityCalculator) -> Self {
        Self { calc }
    }

    /// Extracts every value's text, then clusters the chunk. Any value
    /// without text fails the chunk before clustering starts.
    pub fn cluster_chunk<T, E>(&self, chunk: Chunk<T>, extractor: &E) -> Result<ClusterSet<T>>
    where
        E: TextExtractor<T> + ?Sized,
    {
        let offset = chunk.offset;
        let items = chunk.values.into_iter().enumerate()
            .map(|(i, value)| match extractor.extract(&value) {
                Some(text) => Ok(Item::new(value, text, self.calc)),
                None => Err(Error::Extraction { index: offset + i }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.cluster_items(items))
    }

    /// Each item joins the first cluster, in creation order, whose
    /// representative matches it; otherwise it starts a new cluster.
    pub fn cluster_items<T>(&self, items: impl IntoIterator<Item = Item<T>>) -> ClusterSet<T> {
        let mut set = ClusterSet::new();
        for item in items {
            match set.first_match(item.comparison_key(), self.calc) {
                Some(index) => {
                    trace!("'{}' joins cluster {}", item.text(), index);
                    set.append_item(index, item);
                },
                None => {
                    trace!("'{}' opens cluster {}", item.text(), set.len());
                    set.push(Cluster::new(item));
                },
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityConfig;

    fn calc(threshold: f64) -> SimilarityCalculator {
        SimilarityCalculator::new(&SimilarityConfig::default().with_threshold(threshold)).unwrap()
    }

    fn texts(set: &ClusterSet<&'static str>) -> Vec<Vec<&'static str>> {
        set.iter().map(|c| c.values().copied().collect()).collect()
    }

    fn chunk(values: Vec<&'static str>) -> Chunk<&'static str> {
        Chunk { index: 0, offset: 0, values }
    }

    #[test]
    fn groups_near_duplicates() {
        let calc = calc(0.75);
        let clusterer = ChunkClusterer::new(&calc);
        let extract = |s: &&'static str| Some(s.to_string());

        let set = clusterer.cluster_chunk(chunk(vec!["cat", "cats", "dog"]), &extract).unwrap();
        assert_eq!(texts(&set), vec![vec!["cat", "cats"], vec!["dog"]]);
        assert_eq!(set.cluster(0).unwrap().representative(), "cat");
    }

    #[test]
    fn first_match_not_best_match() {
        // "abbx" is 2 edits from "aaxx" and 1 edit from "abbb"; it still joins the older cluster
        let calc = calc(0.5);
        let clusterer = ChunkClusterer::new(&calc);
        let extract = |s: &&'static str| Some(s.to_string());

        let set = clusterer.cluster_chunk(chunk(vec!["aaxx", "abbb", "abbx"]), &extract).unwrap();
        assert_eq!(texts(&set), vec![vec!["aaxx", "abbx"], vec!["abbb"]]);
    }

    #[test]
    fn representative_is_fixed() {
        // "aab" matches "aaa" but "abb" only matches "aab": no chaining through members
        let calc = calc(0.6);
        let clusterer = ChunkClusterer::new(&calc);
        let extract = |s: &&'static str| Some(s.to_string());

        let set = clusterer.cluster_chunk(chunk(vec!["aaa", "aab", "abb"]), &extract).unwrap();
        assert_eq!(texts(&set), vec![vec!["aaa", "aab"], vec!["abb"]]);
    }

    #[test]
    fn missing_text_reports_global_index() {
        let calc = calc(0.8);
        let clusterer = ChunkClusterer::new(&calc);
        let extract = |s: &&'static str| if s.is_empty() { None } else { Some(s.to_string()) };

        let chunk = Chunk { index: 2, offset: 10, values: vec!["ok", "", "fine"] };
        let err = clusterer.cluster_chunk(chunk, &extract).unwrap_err();
        assert!(matches!(err, Error::Extraction { index: 11 }));
    }
}
