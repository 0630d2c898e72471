//! Tracker errors
//!
//! Every fallible operation in the crate reports one of these.

use thiserror::Error;

/// Message carried by [`TrackerError::InvalidArgument`] when tracking is
/// started without a callback.
pub const MISSING_CALLBACK_MESSAGE: &str = "You must provide a callback to log data.";

/// Errors that can occur while tracking clicks
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Node is not attached to the document: {0}")]
    DetachedNode(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Listener registration error: {0}")]
    ListenerRegistration(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl TrackerError {
    pub(crate) fn missing_callback() -> Self {
        TrackerError::InvalidArgument(MISSING_CALLBACK_MESSAGE.to_string())
    }
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_callback_message() {
        let err = TrackerError::missing_callback();
        assert!(matches!(err, TrackerError::InvalidArgument(ref msg) if msg == MISSING_CALLBACK_MESSAGE));
        assert_eq!(
            err.to_string(),
            "Invalid argument: You must provide a callback to log data."
        );
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: TrackerError = json_err.into();
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
