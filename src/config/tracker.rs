//! Status tracking configuration.

use crate::task::domain::TaskState;
use crate::task::services::{ArchivePolicy, DEFAULT_MAX_UPDATE_ATTEMPTS, TrackerOptions};
use serde::Deserialize;

/// Tracker configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackerSettings {
    /// States that archive a task on arrival.
    #[serde(default = "default_archive_statuses")]
    pub archive_statuses: Vec<TaskState>,
    /// Attempts per status update before giving up on version conflicts.
    #[serde(default = "default_max_update_attempts")]
    pub max_update_attempts: u32,
}

impl TrackerSettings {
    /// Converts the settings into service options.
    #[must_use]
    pub fn options(&self) -> TrackerOptions {
        TrackerOptions {
            archive_policy: ArchivePolicy::new(self.archive_statuses.iter().copied()),
            max_update_attempts: self.max_update_attempts,
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            archive_statuses: default_archive_statuses(),
            max_update_attempts: DEFAULT_MAX_UPDATE_ATTEMPTS,
        }
    }
}

fn default_archive_statuses() -> Vec<TaskState> {
    ArchivePolicy::default().states().to_vec()
}

const fn default_max_update_attempts() -> u32 {
    DEFAULT_MAX_UPDATE_ATTEMPTS
}
