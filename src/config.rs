use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::btree::{BPlusTree, BPlusTreeError, DEFAULT_ORDER, MIN_ORDER};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("B+ tree error: {0}")]
    TreeError(#[from] BPlusTreeError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for building an index, loadable from JSON
///
/// ```json
/// { "order": 5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum children per internal node
    pub order: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }
}

impl IndexConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BPlusTreeError> {
        if self.order < MIN_ORDER {
            return Err(BPlusTreeError::InvalidOrder(self.order));
        }
        Ok(())
    }

    /// Build an empty tree with these settings
    pub fn build(&self) -> ConfigResult<BPlusTree> {
        Ok(BPlusTree::from_config(self)?)
    }
}
