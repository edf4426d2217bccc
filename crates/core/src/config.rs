use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::budget::SearchBudget;
use crate::error::{ChainError, Result};
use crate::request::{ExpectedType, SearchRequest, SearchRequestBuilder, validate_limits};
use crate::search::SearchStrategy;

/// User-facing search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub max_chains: usize,
    pub min_chain_length: usize,
    pub max_chain_length: usize,
    pub timeout_ms: u64,
    /// Types whose members are never explored.
    pub ignored_types: Vec<String>,
    pub max_frontier: usize,
    pub strategy: SearchStrategy,
    /// Graph builder pool size; `None` uses the available parallelism.
    pub worker_threads: Option<usize>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_chains: 20,
            min_chain_length: 2,
            max_chain_length: 4,
            timeout_ms: 3000,
            ignored_types: vec![
                "java.lang.Object".to_string(),
                "java.lang.Class".to_string(),
                "java.lang.String".to_string(),
            ],
            max_frontier: 50_000,
            strategy: SearchStrategy::Breadth,
            worker_threads: None,
        }
    }
}

impl ChainConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ChainError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(ChainError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        validate_limits(
            self.min_chain_length,
            self.max_chain_length,
            self.max_chains,
            self.max_frontier,
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// A fresh budget whose deadline starts now.
    pub fn budget(&self) -> SearchBudget {
        SearchBudget::with_timeout(self.timeout())
    }

    /// Request builder carrying these limits; entry points are still to be added.
    pub fn request_builder(&self, expected: ExpectedType) -> SearchRequestBuilder {
        SearchRequest::builder(expected)
            .min_chain_length(self.min_chain_length)
            .max_chain_length(self.max_chain_length)
            .max_results(self.max_chains)
            .max_frontier(self.max_frontier)
            .excluded_types(self.ignored_types.iter().cloned())
    }
}
