pub mod algorithms;
pub mod similarity;

pub use algorithms::{
    SimilarityAlgorithm, SimilarityAlgorithmFactory,
    ExactMatcher, JaccardMatcher, LevenshteinMatcher,
};
pub use similarity::{SimilarityCalculator, matches};
