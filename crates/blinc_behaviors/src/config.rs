//! Behavior defaults configuration (behaviors.toml)
//!
//! ```toml
//! [toggle]
//! initial = false
//!
//! [filter]
//! default_query = ""
//! case_sensitive = false
//! ```
//!
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BehaviorError, Result};

/// Top-level behavior configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub toggle: ToggleConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Toggle defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToggleConfig {
    /// Starting value of uncontrolled toggles
    #[serde(default)]
    pub initial: bool,
}

/// Filter defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Starting query of uncontrolled filters
    #[serde(default = "default_query")]
    pub default_query: Option<String>,
    /// Whether the substring filter matches case
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_query() -> Option<String> {
    Some(String::new())
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
            case_sensitive: false,
        }
    }
}

impl BehaviorConfig {
    /// Parse a config document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| BehaviorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded behavior config");
        Ok(config)
    }
}
