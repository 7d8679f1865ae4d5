use std::borrow::Cow;
use std::fmt;
use log::debug;

use crate::config::SimilarityConfig;
use crate::error::Result;
use crate::text::TextNormalizer;
use super::algorithms::{SimilarityAlgorithm, SimilarityAlgorithmFactory};

/// Similarity policy shared read-only by every chunk worker and the merger.
pub struct SimilarityCalculator {
    algorithm: Box<dyn SimilarityAlgorithm>,
    normalizer: TextNormalizer,
    threshold: f64,
}

impl fmt::Debug for SimilarityCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimilarityCalculator")
            .field("algorithm", &self.algorithm.name())
            .field("normalizer", &self.normalizer)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl SimilarityCalculator {
    pub fn new(config: &SimilarityConfig) -> Result<Self> {
        Self::with_algorithm(config, SimilarityAlgorithmFactory::create(config.metric))
    }

    /// Uses a caller-supplied algorithm in place of `config.metric`.
    pub fn with_algorithm(config: &SimilarityConfig, algorithm: Box<dyn SimilarityAlgorithm>) -> Result<Self> {
        config.validate()?;
        debug!("Similarity policy: {} at threshold {:.3} (case sensitive: {}, masking: {})",
            algorithm.name(), config.threshold, config.case_sensitive, config.masks_tokens());

        Ok(Self {
            algorithm,
            normalizer: TextNormalizer::new(config),
            threshold: config.threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// The form of `text` the algorithm actually compares.
    pub fn comparison_key<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.normalizer.normalize(text)
    }

    /// Compares two raw texts, normalizing both first.
    pub fn matches(&self, source: &str, target: &str) -> bool {
        let source_key = self.comparison_key(source);
        let target_key = self.comparison_key(target);
        self.matches_keys(&source_key, &target_key)
    }

    /// Compares two already-normalized keys.
    #[inline]
    pub fn matches_keys(&self, source_key: &str, target_key: &str) -> bool {
        self.algorithm.is_match(source_key, target_key, self.threshold)
    }

    pub fn score(&self, source: &str, target: &str) -> f64 {
        let source_key = self.comparison_key(source);
        let target_key = self.comparison_key(target);
        self.algorithm.compare_texts(&source_key, &target_key)
    }
}

/// One-shot form of the similarity decision for callers without a calculator.
pub fn matches(source: &str, target: &str, config: &SimilarityConfig) -> Result<bool> {
    Ok(SimilarityCalculator::new(config)?.matches(source, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityMetric;
    use crate::Error;

    #[test]
    fn case_flag_is_applied_before_distance() {
        let strict = SimilarityConfig::default().with_threshold(1.0);
        assert!(!matches("ERROR", "error", &strict).unwrap());

        let folded = strict.clone().with_case_sensitive(false);
        assert!(matches("ERROR", "error", &folded).unwrap());
    }

    #[test]
    fn titlecase_matches_lowercase_when_folded() {
        let folded = SimilarityConfig::default().with_threshold(1.0).with_case_sensitive(false);
        assert!(matches("\u{01C5}", "\u{01C6}", &folded).unwrap());
    }

    #[test]
    fn empty_strings_always_match() {
        for metric in [SimilarityMetric::Exact, SimilarityMetric::Jaccard, SimilarityMetric::Levenshtein] {
            let config = SimilarityConfig::default().with_metric(metric).with_threshold(1.0);
            assert!(matches("", "", &config).unwrap(), "{}", metric.as_str());
        }
    }

    #[test]
    fn masking_lets_ids_differ() {
        let config = SimilarityConfig {
            mask_numbers: true,
            ..SimilarityConfig::default().with_threshold(1.0)
        };
        let calc = SimilarityCalculator::new(&config).unwrap();
        assert!(calc.matches("request 1234 failed", "request 98 failed"));
        assert_eq!(calc.score("request 1234 failed", "request 98 failed"), 1.0);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let config = SimilarityConfig::default().with_threshold(0.0);
        assert!(matches!(SimilarityCalculator::new(&config), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn custom_algorithm_is_used() {
        struct AlwaysSimilar;
        impl SimilarityAlgorithm for AlwaysSimilar {
            fn name(&self) -> &'static str { "always" }
            fn compare_texts(&self, _: &str, _: &str) -> f64 { 1.0 }
        }

        let calc = SimilarityCalculator::with_algorithm(&SimilarityConfig::default(), Box::new(AlwaysSimilar)).unwrap();
        assert_eq!(calc.algorithm_name(), "always");
        assert!(calc.matches("cat", "dog"));
    }
}
