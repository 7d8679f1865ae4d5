// src/config/subsystems/similarity.rs

use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimilarityMetric {
    Exact,
    Jaccard,
    #[default]
    Levenshtein,
}

impl SimilarityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::Exact => "exact",
            SimilarityMetric::Jaccard => "jaccard",
            SimilarityMetric::Levenshtein => "levenshtein",
        }
    }
}

impl FromStr for SimilarityMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_matches('"').to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "jaccard" => Ok(Self::Jaccard),
            "levenshtein" => Ok(Self::Levenshtein),
            _ => Err(Error::Config(format!("Invalid similarity metric: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    pub metric: SimilarityMetric,
    /// Minimum required closeness, in (0, 1]. 1.0 only accepts identical keys.
    pub threshold: f64,
    /// When false, texts are lowercased before comparison.
    pub case_sensitive: bool,

    // Token masking applied to comparison keys
    pub mask_guids: bool,
    pub mask_timestamps: bool,
    pub mask_hex: bool,
    pub mask_numbers: bool,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::default(),
            threshold: 0.8,
            case_sensitive: true,
            mask_guids: false,
            mask_timestamps: false,
            mask_hex: false,
            mask_numbers: false,
        }
    }
}

impl SimilarityConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Whether any masking pass is enabled.
    pub fn masks_tokens(&self) -> bool {
        self.mask_guids || self.mask_timestamps || self.mask_hex || self.mask_numbers
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(Error::invalid_argument(
                format!("similarity threshold must be in (0, 1], got {}", self.threshold)
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.trim_matches('"').parse::<bool>().map_err(|_| Error::Config(
        format!("Invalid {} (must be true or false): {}", key, value)
    ))
}

impl FromIni for SimilarityConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "similarity" {
            return None;
        }

        match key {
            "metric" => {
                Some(value.parse::<SimilarityMetric>().map(|metric| self.metric = metric))
            },
            "threshold" => {
                match value.parse::<f64>() {
                    Ok(threshold) if threshold > 0.0 && threshold <= 1.0 => {
                        self.threshold = threshold;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid threshold (must be in (0, 1]): {}", value)
                    ))),
                }
            },
            "case_sensitive" => Some(parse_bool(key, value).map(|v| self.case_sensitive = v)),
            "mask_guids" => Some(parse_bool(key, value).map(|v| self.mask_guids = v)),
            "mask_timestamps" => Some(parse_bool(key, value).map(|v| self.mask_timestamps = v)),
            "mask_hex" => Some(parse_bool(key, value).map(|v| self.mask_hex = v)),
            "mask_numbers" => Some(parse_bool(key, value).map(|v| self.mask_numbers = v)),
            _ => None,
        }
    }
}
