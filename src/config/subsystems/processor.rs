// src/config/subsystems/processor.rs

use serde::{Serialize, Deserialize};
use log::LevelFilter;
use crate::error::{Error, Result};
use crate::config::FromIni;

const LOG_LEVELS: [&str; 6] = ["none", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Number of items per parallel work unit.
    pub chunk_size: usize,
    /// Worker count for a dedicated pool; 0 shares rayon's global pool.
    pub thread_count: usize,
    pub log_level: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            thread_count: 0,
            log_level: "info".to_string(),
        }
    }
}

impl ProcessorConfig {
    pub fn get_log_level(&self) -> LevelFilter {
        match self.log_level.as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "none" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }

    /// Worker count the clustering pass will actually run with.
    pub fn effective_threads(&self) -> usize {
        if self.thread_count > 0 {
            self.thread_count
        } else {
            num_cpus::get()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::invalid_argument("chunk_size must be a positive integer"));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::Config(
                format!("Invalid log level '{}'. Must be one of: none, error, warn, info, debug, trace", self.log_level)
            ));
        }
        Ok(())
    }
}

impl FromIni for ProcessorConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "processor" {
            return None;
        }

        match key {
            "chunk_size" => {
                match value.parse::<usize>() {
                    Ok(size) if size > 0 => {
                        self.chunk_size = size;
                        Some(Ok(()))
                    },
                    _ => Some(Err(Error::Config(
                        format!("Invalid chunk_size (must be > 0): {}", value)
                    ))),
                }
            },
            "thread_count" => {
                match value.parse::<usize>() {
                    Ok(count) => {
                        self.thread_count = count;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid thread_count: {}", value)
                    ))),
                }
            },
            "log_level" => {
                let level_str = value.trim_matches('"').to_lowercase();
                if LOG_LEVELS.contains(&level_str.as_str()) {
                    self.log_level = level_str;
                    Some(Ok(()))
                } else {
                    Some(Err(Error::Config(
                        format!("Invalid log level '{}'. Must be one of: none, error, warn, info, debug, trace", value)
                    )))
                }
            },
            _ => None,
        }
    }
}
