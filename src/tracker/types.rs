use serde::{Deserialize, Serialize};

/// Page coordinates of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionData {
    pub x: i32,
    pub y: i32,
}

/// Record delivered to the tracking callback once per click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickTrackingData {
    /// Backslash-joined, root-to-target node descriptors
    pub path: String,
    pub position: PositionData,
    /// Page location at click time
    pub url: String,
}

/// Whether a tracker currently has a click listener attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackerState {
    Inactive,
    Active,
}

impl std::fmt::Display for TrackerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerState::Inactive => write!(f, "inactive"),
            TrackerState::Active => write!(f, "active"),
        }
    }
}
