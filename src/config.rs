//! Optional JSON settings file.
//!
//! Every field is optional; anything left out keeps the built-in default.
//! Command-line flags are applied on top of these values.
//!
//! ```json
//! {
//!   "extensions": ["jpg", "heic", "mov"],
//!   "concurrency": 4,
//!   "mode": "copy",
//!   "include_hidden": false,
//!   "follow_symlinks": false,
//!   "read_error_policy": "skip"
//! }
//! ```

use crate::core::grouper::ReadErrorPolicy;
use crate::core::organize::OperationMode;
use crate::core::pipeline::PipelineBuilder;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Values read from a settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub extensions: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub mode: Option<OperationMode>,
    pub include_hidden: Option<bool>,
    pub follow_symlinks: Option<bool>,
    pub read_error_policy: Option<ReadErrorPolicy>,
}

impl Settings {
    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    /// Apply every value that is set
    pub fn apply(&self, mut builder: PipelineBuilder) -> PipelineBuilder {
        if let Some(extensions) = &self.extensions {
            builder = builder.extensions(extensions.iter().cloned());
        }
        if let Some(concurrency) = self.concurrency {
            builder = builder.concurrency(concurrency);
        }
        if let Some(mode) = self.mode {
            builder = builder.mode(mode);
        }
        if let Some(include) = self.include_hidden {
            builder = builder.include_hidden(include);
        }
        if let Some(follow) = self.follow_symlinks {
            builder = builder.follow_symlinks(follow);
        }
        if let Some(policy) = self.read_error_policy {
            builder = builder.read_error_policy(policy);
        }
        builder
    }
}
