//! Tracker configuration
//!
//! Supplied by the embedding page as JSON, e.g.
//! `{"globalSlot": "ClickTracker", "listenerApi": "auto"}`. Every field is
//! optional.

use crate::tracker::error::TrackerResult;
use serde::{Deserialize, Serialize};

/// Default name of the global slot the tracker is installed under
pub const DEFAULT_GLOBAL_SLOT: &str = "ClickTracker";

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "click_tracker=debug";

/// Which event registration API a host should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerApi {
    /// Standard API when available, legacy otherwise
    #[default]
    Auto,
    /// `addEventListener` / `removeEventListener`
    Standard,
    /// `attachEvent` / `detachEvent`
    Legacy,
}

impl ListenerApi {
    /// Resolve `Auto` against what the environment supports.
    pub fn resolve(self, has_standard: bool) -> ListenerApi {
        match self {
            ListenerApi::Auto if has_standard => ListenerApi::Standard,
            ListenerApi::Auto => ListenerApi::Legacy,
            explicit => explicit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    pub global_slot: String,
    pub listener_api: ListenerApi,
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            global_slot: DEFAULT_GLOBAL_SLOT.to_string(),
            listener_api: ListenerApi::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Parse a JSON configuration; blank input yields the defaults.
    pub fn from_json(json: &str) -> TrackerResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}
