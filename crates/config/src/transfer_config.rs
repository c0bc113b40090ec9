//! Transfer configuration section

use crate::validation::{ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};

/// Rate limiting and progress reporting for streamed bodies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransferConfig {
    /// Target rate in bytes per second (0 = unlimited)
    pub bandwidth_limit: u64,

    /// Expected body size in bytes, used for the progress percentage (0 = unknown)
    pub size_hint: u64,

    /// Render a progress line while transferring
    pub show_progress: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            bandwidth_limit: 0,
            size_hint: 0,
            show_progress: true,
        }
    }
}

impl TransferConfig {
    pub fn is_throttled(&self) -> bool {
        self.bandwidth_limit > 0
    }
}

impl ConfigSection for TransferConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        // every value of every field is meaningful
        Ok(())
    }

    fn merge(&mut self, other: Self) {
        self.bandwidth_limit = other.bandwidth_limit;
        self.size_hint = other.size_hint;
        self.show_progress = other.show_progress;
    }

    fn section_name(&self) -> &'static str {
        "transfer"
    }
}
