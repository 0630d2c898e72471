//! Browser implementations
//!
//! Uses `web-sys` for the document and `wasm-bindgen` for the JavaScript surface.

pub mod binding;
pub mod document;

pub use binding::{install, install_click_tracker, JsClickTracker};
pub use document::WebDocument;
