//! JavaScript surface
//!
//! Publishes a tracker object on `window` so page scripts can call
//! `ClickTracker.startTracking(cb)` and `ClickTracker.stopTracking()`.
//! Callbacks are invoked as `cb(data, document)`.

use crate::capture::web::document::{click_from_event, describe_js_value, WebDocument};
use crate::config::TrackerConfig;
use crate::registry::{self, Installation, SharedTracker};
use crate::tracker::error::{TrackerError, TrackerResult};
use crate::tracker::{ClickTrackingData, TrackingCallback};
use anyhow::anyhow;
use js_sys::{Function, Reflect, JSON};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, Node};

fn to_js_error(err: TrackerError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn to_js_object<T: Serialize>(value: &T) -> TrackerResult<JsValue> {
    let json = serde_json::to_string(value)?;
    JSON::parse(&json).map_err(|e| TrackerError::Host(describe_js_value(&e)))
}

fn js_callback(function: Function) -> TrackingCallback<Node> {
    TrackingCallback::new(move |data: &ClickTrackingData, context: &Node| -> anyhow::Result<()> {
        let payload = to_js_object(data)?;
        function
            .call2(&JsValue::UNDEFINED, &payload, context)
            .map(|_| ())
            .map_err(|e| anyhow!(describe_js_value(&e)))
    })
}

/// Tracker handle exposed to page scripts
#[wasm_bindgen(js_name = ClickTracker)]
pub struct JsClickTracker {
    inner: SharedTracker<WebDocument>,
}

#[wasm_bindgen(js_class = ClickTracker)]
impl JsClickTracker {
    /// Start tracking; anything other than a function is rejected.
    #[wasm_bindgen(js_name = startTracking)]
    pub fn start_tracking(&self, callback: JsValue) -> Result<(), JsValue> {
        let callback = callback.dyn_into::<Function>().ok().map(js_callback);
        self.inner
            .borrow_mut()
            .start_tracking(callback)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = stopTracking)]
    pub fn stop_tracking(&self) -> Result<(), JsValue> {
        self.inner.borrow_mut().stop_tracking().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = isTracking)]
    pub fn is_tracking(&self) -> bool {
        self.inner.borrow().is_tracking()
    }

    #[wasm_bindgen(js_name = getDomPath)]
    pub fn get_dom_path(&self, node: Node) -> Result<String, JsValue> {
        self.inner.borrow().derive_path(&node).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = getClickPosition)]
    pub fn get_click_position(&self, event: MouseEvent) -> Result<JsValue, JsValue> {
        let tracker = self.inner.borrow();
        click_from_event(event.into())
            .and_then(|click| to_js_object(&tracker.derive_position(&click)))
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = getTrackingData)]
    pub fn get_tracking_data(&self, event: MouseEvent) -> Result<JsValue, JsValue> {
        let tracker = self.inner.borrow();
        click_from_event(event.into())
            .and_then(|click| tracker.derive_tracking_data(&click))
            .and_then(|data| to_js_object(&data))
            .map_err(to_js_error)
    }
}

/// Install the tracker on `window` under the configured slot.
///
/// Returns `false` without touching anything when the slot is already taken.
pub fn install(config: &TrackerConfig) -> TrackerResult<bool> {
    if registry::is_occupied(&config.global_slot) {
        tracing::debug!("Click tracker '{}' already installed", config.global_slot);
        return Ok(false);
    }

    let host = WebDocument::new(config)?;
    let slot = JsValue::from_str(&config.global_slot);

    let occupied = Reflect::has(host.window(), &slot)
        .map_err(|e| TrackerError::Host(describe_js_value(&e)))?;
    if occupied {
        tracing::debug!("window.{} already defined, skipping install", config.global_slot);
        return Ok(false);
    }

    let tracker = match registry::install(&config.global_slot, host.clone()) {
        Installation::Installed(tracker) => tracker,
        Installation::AlreadyInstalled => return Ok(false),
    };

    let handle = JsValue::from(JsClickTracker { inner: tracker });
    Reflect::set(host.window(), &slot, &handle)
        .map_err(|e| TrackerError::Host(describe_js_value(&e)))?;
    Ok(true)
}

/// Entry point for page scripts: `installClickTracker('{"listenerApi": "auto"}')`.
#[wasm_bindgen(js_name = installClickTracker)]
pub fn install_click_tracker(config: Option<String>) -> Result<bool, JsValue> {
    let config = TrackerConfig::from_json(config.as_deref().unwrap_or_default()).map_err(to_js_error)?;
    crate::init_logging(&config.log_filter);
    install(&config).map_err(to_js_error)
}
