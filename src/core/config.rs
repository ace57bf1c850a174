/// Session configuration — pacing defaults loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::core::scheduler::seconds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Host-side pacing settings. Every field is optional in the RON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds per revealed character unless a node overrides it.
    pub print_speed: f64,
    /// Seconds per revealed character while fast-forwarding.
    pub fast_forward_speed: f64,
    /// Seconds to wait before auto-advancing a click-to-advance node.
    pub auto_advance_delay: f64,
    /// Upper bound on tasks fired by a single tick.
    pub max_tasks_per_tick: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            print_speed: 0.02,
            fast_forward_speed: 0.008,
            auto_advance_delay: 1.0,
            max_tasks_per_tick: 4096,
        }
    }
}

impl SessionConfig {
    pub fn load_from_ron(path: &Path) -> Result<SessionConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<SessionConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    pub fn fast_forward_interval(&self) -> Duration {
        seconds(self.fast_forward_speed)
    }

    pub fn auto_advance_interval(&self) -> Duration {
        seconds(self.auto_advance_delay)
    }
}
