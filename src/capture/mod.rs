//! Document capture
//!
//! The [`DocumentHost`] capability and its implementations, plus the
//! derivation of tracking records from raw click events.

pub mod memory;
pub mod path;
pub mod traits;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::{MemoryDocument, NodeId};
pub use path::{derive_path, derive_position, derive_tracking_data, describe_node, PATH_SEPARATOR};
pub use traits::{ClickEvent, ClickListener, DocumentHost, ListenerId};
