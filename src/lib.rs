//! Click Tracker - report what was clicked, where, and on which page.
//!
//! A [`ClickTracker`] attaches one click listener to a document and turns
//! every click into a [`ClickTrackingData`] record (`path`, `position`, `url`)
//! handed to a callback. The document is reached through the
//! [`DocumentHost`] capability: [`MemoryDocument`] for native use and tests,
//! and a `web-sys` host when compiled for `wasm32`.

pub mod capture;
pub mod config;
pub mod registry;
pub mod tracker;

pub use capture::{ClickEvent, DocumentHost, ListenerId, MemoryDocument, NodeId};
pub use config::{ListenerApi, TrackerConfig};
pub use tracker::{
    ClickTracker, ClickTrackingData, PositionData, TrackerError, TrackerResult, TrackerState,
    TrackingCallback,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` if a
/// global subscriber was already set. In the browser, events go to the
/// devtools console without timestamps, since `wasm32-unknown-unknown` has no
/// system clock.
pub fn init_logging(default_filter: &str) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    #[cfg(not(target_arch = "wasm32"))]
    let fmt_layer = tracing_subscriber::fmt::layer();

    #[cfg(target_arch = "wasm32")]
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(tracing_web::MakeWebConsoleWriter::new());

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("Click Tracker v{} logging initialized", env!("CARGO_PKG_VERSION"));
    }
    initialized
}
