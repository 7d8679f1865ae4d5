//! Comparison-key normalization: token masking and case folding.
//!
//! The key is what the similarity metric sees. The original text of an item
//! is kept as-is for presentation.

pub mod masking;

use std::borrow::Cow;
use crate::config::SimilarityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNormalizer {
    case_sensitive: bool,
    mask_guids: bool,
    mask_timestamps: bool,
    mask_hex: bool,
    mask_numbers: bool,
}

impl TextNormalizer {
    pub fn new(config: &SimilarityConfig) -> Self {
        Self {
            case_sensitive: config.case_sensitive,
            mask_guids: config.mask_guids,
            mask_timestamps: config.mask_timestamps,
            mask_hex: config.mask_hex,
            mask_numbers: config.mask_numbers,
        }
    }

    /// True when `normalize` can never change its input.
    pub fn is_identity(&self) -> bool {
        self.case_sensitive
            && !(self.mask_guids || self.mask_timestamps || self.mask_hex || self.mask_numbers)
    }

    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut key = Cow::Borrowed(text);
        if self.is_identity() {
            return key;
        }

        // guids and timestamps before numbers, which would eat their digits
        if self.mask_guids {
            key = masking::mask_guids(key);
        }
        if self.mask_timestamps {
            key = masking::mask_timestamps(key);
        }
        if self.mask_hex {
            key = masking::mask_hex(key);
        }
        if self.mask_numbers {
            key = masking::mask_numbers(key);
        }
        if !self.case_sensitive {
            // titlecase letters such as 'ǅ' are not is_uppercase but still fold
            let folded = key.to_lowercase();
            if folded != key {
                key = Cow::Owned(folded);
            }
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_identity() {
        let normalizer = TextNormalizer::new(&SimilarityConfig::default());
        assert!(normalizer.is_identity());
        assert!(matches!(normalizer.normalize("Some Text 42"), Cow::Borrowed("Some Text 42")));
    }

    #[test]
    fn case_folding() {
        let config = SimilarityConfig::default().with_case_sensitive(false);
        let normalizer = TextNormalizer::new(&config);
        assert_eq!(normalizer.normalize("Disk FULL"), "disk full");
        assert!(matches!(normalizer.normalize("already lower"), Cow::Borrowed(_)));
    }

    #[test]
    fn titlecase_letters_fold() {
        let config = SimilarityConfig::default().with_case_sensitive(false);
        let normalizer = TextNormalizer::new(&config);
        assert_eq!(normalizer.normalize("\u{01C5}emal"), "\u{01C6}emal");
        assert_eq!(normalizer.normalize("\u{01C4}"), normalizer.normalize("\u{01C6}"));
    }

    #[test]
    fn masking_runs_in_order() {
        let config = SimilarityConfig {
            mask_guids: true,
            mask_timestamps: true,
            mask_numbers: true,
            ..SimilarityConfig::default()
        };
        let normalizer = TextNormalizer::new(&config);
        assert_eq!(
            normalizer.normalize("2023-01-02 03:04:05 job 7 id 3f2504e0-4f89-11d3-9a0c-0305e82c3301"),
            "<time> job <num> id <guid>"
        );
    }
}
