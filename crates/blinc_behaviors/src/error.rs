//! Behavior error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by behavior construction, commands and config loading
#[derive(Error, Debug)]
pub enum BehaviorError {
    /// A filter was built without a filter function
    #[error("filter requires a filter function")]
    MissingFilterFunc,

    /// Focus or blur was commanded before a target was captured
    #[error("no focus target has been captured")]
    MissingTarget,

    /// Failed to read a config file
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a config document
    #[error("invalid behavior config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for behavior operations
pub type Result<T> = std::result::Result<T, BehaviorError>;
