//! On-disk configuration
//!
//! Loaded from `.distiller.json`. Every field has a default, so an empty
//! object (or a missing file) is a valid configuration. CLI flags are applied
//! on top by the binary.

use crate::error::{DistillError, Result, ResultExt};
use distiller_ir::StripOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".distiller.json";

/// Configuration loaded from .distiller.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistillConfig {
    /// Stripper options
    pub strip: StripOptions,
    /// Worker threads for batch runs (0 = rayon default)
    pub workers: usize,
    /// Collect per-file failures instead of stopping at the first one
    pub continue_on_error: bool,
}

impl DistillConfig {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from an explicit path; the file must exist
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DistillError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).context(format!("loading {}", path.display()))
    }

    /// Load `.distiller.json` from `dir`, or defaults when there is none
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = Self::default_path(dir);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join(DEFAULT_CONFIG_FILE)
    }

    pub fn with_strip(mut self, strip: StripOptions) -> Self {
        self.strip = strip;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }
}
