//! Click tracking
//!
//! [`ClickTracker`] owns the listener lifecycle: at most one click listener per
//! tracker, replaced on every `start_tracking` and detached by `stop_tracking`.

pub mod click_tracker;
pub mod error;
pub mod types;

pub use click_tracker::{ClickTracker, TrackingCallback};
pub use error::{TrackerError, TrackerResult, MISSING_CALLBACK_MESSAGE};
pub use types::{ClickTrackingData, PositionData, TrackerState};
