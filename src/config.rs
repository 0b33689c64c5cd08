/// Tracker configuration
use serde::{Deserialize, Serialize};

/// Most closed tabs kept in the archive
pub const DEFAULT_ARCHIVE_CAPACITY: usize = 1000;

/// Most history entries kept per open tab
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Limits applied by the tab state reducer.
///
/// Deserializes from a partial JS object; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    pub archive_capacity: usize,
    /// `None` keeps every entry for as long as the tab stays open
    pub history_limit: Option<usize>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            archive_capacity: DEFAULT_ARCHIVE_CAPACITY,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}
