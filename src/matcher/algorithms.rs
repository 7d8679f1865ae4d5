use ahash::AHashSet;
use crate::config::SimilarityMetric;

/// Slack for float comparisons against the configured threshold.
pub(crate) const THRESHOLD_EPSILON: f64 = 1e-9;

/// The SimilarityAlgorithm trait defines the interface for comparing text similarity.
/// All similarity scores are normalized between 0.0 (completely different) and 1.0 (identical).
/// Implementations must be pure: they are called concurrently from every chunk worker.
pub trait SimilarityAlgorithm: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Compares two raw text strings and returns their similarity score
    fn compare_texts(&self, source: &str, target: &str) -> f64;

    /// Decides whether two texts are close enough under `threshold`.
    /// Implementations may override this with a cheaper bounded check.
    fn is_match(&self, source: &str, target: &str, threshold: f64) -> bool {
        self.compare_texts(source, target) + THRESHOLD_EPSILON >= threshold
    }
}

/// ExactMatcher accepts only identical texts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl ExactMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl SimilarityAlgorithm for ExactMatcher {
    fn name(&self) -> &'static str {
        SimilarityMetric::Exact.as_str()
    }

    #[inline]
    fn compare_texts(&self, source: &str, target: &str) -> f64 {
        if source == target { 1.0 } else { 0.0 }
    }
}

/// JaccardMatcher compares the sets of character bigrams of both texts.
#[derive(Debug, Default, Clone, Copy)]
pub struct JaccardMatcher;

impl JaccardMatcher {
    pub fn new() -> Self {
        Self
    }

    fn bigrams(text: &str) -> AHashSet<(char, char)> {
        let chars: Vec<char> = text.chars().collect();
        match chars.len() {
            0 => AHashSet::new(),
            // A lone character is its own shingle
            1 => std::iter::once((chars[0], '\0')).collect(),
            _ => chars.windows(2).map(|w| (w[0], w[1])).collect(),
        }
    }
}

impl SimilarityAlgorithm for JaccardMatcher {
    fn name(&self) -> &'static str {
        SimilarityMetric::Jaccard.as_str()
    }

    fn compare_texts(&self, source: &str, target: &str) -> f64 {
        if source == target {
            return 1.0;
        }

        let source_set = Self::bigrams(source);
        let target_set = Self::bigrams(target);
        if source_set.is_empty() || target_set.is_empty() {
            return 0.0;
        }

        let intersection = source_set.intersection(&target_set).count();
        let union = source_set.len() + target_set.len() - intersection;
        intersection as f64 / union as f64
    }
}

/// LevenshteinMatcher implements similarity based on normalized edit distance:
/// `1 - distance / max(len(a), len(b), 1)`, lengths counted in chars.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevenshteinMatcher;

impl LevenshteinMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Largest edit distance still accepted for texts whose longer side has `max_len` chars.
    fn allowed_distance(max_len: usize, threshold: f64) -> usize {
        let allowed = (1.0 - threshold) * max_len as f64 + THRESHOLD_EPSILON;
        if allowed <= 0.0 { 0 } else { allowed.floor() as usize }
    }

    pub fn levenshtein_distance(source: &[char], target: &[char]) -> usize {
        Self::bounded_distance(source, target, usize::MAX).unwrap_or(usize::MAX)
    }

    /// Two-row edit distance that gives up once every cell in a row exceeds `bound`.
    fn bounded_distance(source: &[char], target: &[char], bound: usize) -> Option<usize> {
        if source.is_empty() || target.is_empty() {
            let distance = source.len().max(target.len());
            return (distance <= bound).then_some(distance);
        }

        let mut prev: Vec<usize> = (0..=target.len()).collect();
        let mut curr = vec![0usize; target.len() + 1];

        for (i, &s) in source.iter().enumerate() {
            curr[0] = i + 1;
            let mut row_min = curr[0];
            for (j, &t) in target.iter().enumerate() {
                let cost = if s == t { 0 } else { 1 };
                curr[j + 1] = (prev[j + 1] + 1)     // deletion
                    .min(curr[j] + 1)               // insertion
                    .min(prev[j] + cost);           // substitution
                row_min = row_min.min(curr[j + 1]);
            }
            if row_min > bound {
                return None;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        let distance = prev[target.len()];
        (distance <= bound).then_some(distance)
    }
}

impl SimilarityAlgorithm for LevenshteinMatcher {
    fn name(&self) -> &'static str {
        SimilarityMetric::Levenshtein.as_str()
    }

    fn compare_texts(&self, source: &str, target: &str) -> f64 {
        if source == target {
            return 1.0;
        }
        let source_chars: Vec<char> = source.chars().collect();
        let target_chars: Vec<char> = target.chars().collect();
        let max_len = source_chars.len().max(target_chars.len()).max(1);

        let distance = Self::levenshtein_distance(&source_chars, &target_chars);
        1.0 - (distance as f64 / max_len as f64)
    }

    fn is_match(&self, source: &str, target: &str, threshold: f64) -> bool {
        if source == target {
            return true;
        }
        let source_chars: Vec<char> = source.chars().collect();
        let target_chars: Vec<char> = target.chars().collect();
        let max_len = source_chars.len().max(target_chars.len()).max(1);
        let allowed = Self::allowed_distance(max_len, threshold);

        // The length gap alone is a lower bound on the distance
        if source_chars.len().abs_diff(target_chars.len()) > allowed {
            return false;
        }
        Self::bounded_distance(&source_chars, &target_chars, allowed).is_some()
    }
}

/// Factory for creating similarity algorithm instances
pub struct SimilarityAlgorithmFactory;

impl SimilarityAlgorithmFactory {
    pub fn create(metric: SimilarityMetric) -> Box<dyn SimilarityAlgorithm> {
        match metric {
            SimilarityMetric::Exact => Box::new(ExactMatcher::new()),
            SimilarityMetric::Jaccard => Box::new(JaccardMatcher::new()),
            SimilarityMetric::Levenshtein => Box::new(LevenshteinMatcher::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(LevenshteinMatcher::levenshtein_distance(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(LevenshteinMatcher::levenshtein_distance(&chars(""), &chars("abc")), 3);
        assert_eq!(LevenshteinMatcher::levenshtein_distance(&chars(""), &chars("")), 0);
        assert_eq!(LevenshteinMatcher::levenshtein_distance(&chars("héllo"), &chars("hello")), 1);
    }

    #[test]
    fn bounded_distance_gives_up() {
        assert_eq!(LevenshteinMatcher::bounded_distance(&chars("aaaa"), &chars("bbbb"), 2), None);
        assert_eq!(LevenshteinMatcher::bounded_distance(&chars("cat"), &chars("cats"), 1), Some(1));
    }

    #[test]
    fn levenshtein_threshold_edges() {
        let matcher = LevenshteinMatcher::new();
        // distance 1 over 4 chars => 0.75 similar
        assert!(matcher.is_match("cat", "cats", 0.75));
        assert!(!matcher.is_match("cat", "cats", 0.76));
        assert!((matcher.compare_texts("cat", "cats") - 0.75).abs() < 1e-12);
        // 0.8 is not exactly representable; 1 edit in 5 must still pass
        assert!(matcher.is_match("abcde", "abcdx", 0.8));
        assert!(matcher.is_match("", "", 1.0));
        assert!(!matcher.is_match("", "a", 0.5));
        assert!(!matcher.is_match("a", "b", 0.0001));
    }

    #[test]
    fn bounded_check_agrees_with_score() {
        let matcher = LevenshteinMatcher::new();
        let samples = ["", "a", "cat", "cats", "dog", "catalog", "Kofax Capture", "kofax capture 12"];
        for threshold in [0.1, 0.3, 0.5, 0.75, 0.9, 1.0] {
            for a in samples {
                for b in samples {
                    let by_score = matcher.compare_texts(a, b) + THRESHOLD_EPSILON >= threshold;
                    assert_eq!(matcher.is_match(a, b, threshold), by_score, "{:?} vs {:?} @ {}", a, b, threshold);
                }
            }
        }
    }

    #[test]
    fn jaccard_scores() {
        let matcher = JaccardMatcher::new();
        assert_eq!(matcher.compare_texts("abc", "abc"), 1.0);
        assert_eq!(matcher.compare_texts("", ""), 1.0);
        assert_eq!(matcher.compare_texts("", "ab"), 0.0);
        // {ab, bc} vs {ab, bd} => 1/3
        assert!((matcher.compare_texts("abc", "abd") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn exact_only_accepts_identity() {
        let matcher = ExactMatcher::new();
        assert!(matcher.is_match("x", "x", 1.0));
        assert!(!matcher.is_match("x", "X", 0.01));
    }

    #[test]
    fn factory_names() {
        for metric in [SimilarityMetric::Exact, SimilarityMetric::Jaccard, SimilarityMetric::Levenshtein] {
            assert_eq!(SimilarityAlgorithmFactory::create(metric).name(), metric.as_str());
        }
    }
}
