//! Browser document host
//!
//! Wraps the page's `document`. The event registration API (standard
//! `addEventListener` or legacy `attachEvent`) is resolved once, when the host
//! is constructed.

use crate::capture::traits::{ClickEvent, ClickListener, DocumentHost, ListenerId};
use crate::config::{ListenerApi, TrackerConfig};
use crate::tracker::error::{TrackerError, TrackerResult};
use js_sys::{Function, Reflect};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, Node, Window};

const CLICK_EVENT: &str = "click";
const LEGACY_CLICK_EVENT: &str = "onclick";

type JsListener = Closure<dyn FnMut(Event)>;

#[derive(Default)]
struct Registrations {
    active: HashMap<ListenerId, JsListener>,
    // A callback can stop tracking from inside a click, so a removed closure
    // may still be running. It is freed once no dispatch is in progress.
    retired: Vec<JsListener>,
}

/// [`DocumentHost`] backed by the browser's `window.document`
#[derive(Clone)]
pub struct WebDocument {
    window: Window,
    document: Document,
    api: ListenerApi,
    registrations: Rc<RefCell<Registrations>>,
    dispatch_depth: Rc<Cell<usize>>,
}

impl WebDocument {
    /// Host for the current page's document.
    pub fn new(config: &TrackerConfig) -> TrackerResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| TrackerError::Host("No global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| TrackerError::Host("Window has no document".to_string()))?;

        Ok(Self::with_document(window, document, config.listener_api))
    }

    pub fn with_document(window: Window, document: Document, api: ListenerApi) -> Self {
        let api = api.resolve(has_method(&document, "addEventListener"));
        tracing::debug!("Using {:?} click listener API", api);

        Self {
            window,
            document,
            api,
            registrations: Rc::new(RefCell::new(Registrations::default())),
            dispatch_depth: Rc::new(Cell::new(0)),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Registration API in use, never [`ListenerApi::Auto`]
    pub fn listener_api(&self) -> ListenerApi {
        self.api
    }

    /// Free removed closures unless one of our listeners is running.
    fn release_retired(&self) {
        if self.dispatch_depth.get() > 0 {
            return;
        }
        let released = std::mem::take(&mut self.registrations.borrow_mut().retired);
        if !released.is_empty() {
            tracing::trace!("Freed {} removed click listener(s)", released.len());
        }
    }

    fn legacy_method(&self, name: &str) -> TrackerResult<Function> {
        Reflect::get(&self.document, &JsValue::from_str(name))
            .ok()
            .and_then(|method| method.dyn_into::<Function>().ok())
            .ok_or_else(|| {
                TrackerError::ListenerRegistration(format!("document.{} is not available", name))
            })
    }
}

impl std::fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDocument")
            .field("api", &self.api)
            .field("listeners", &self.registrations.borrow().active.len())
            .finish()
    }
}

fn has_method(target: &JsValue, name: &str) -> bool {
    Reflect::get(target, &JsValue::from_str(name))
        .map(|value| value.is_function())
        .unwrap_or(false)
}

/// Best-effort text for a thrown JavaScript value
pub(crate) fn describe_js_value(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}

/// Integer coordinate read by name; legacy event objects are not `MouseEvent`s.
fn coordinate(event: &Event, name: &str) -> i32 {
    Reflect::get(event, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.as_f64())
        .map(|value| value as i32)
        .unwrap_or_default()
}

/// Convert a browser click event into the host-neutral form.
pub(crate) fn click_from_event(event: Event) -> TrackerResult<ClickEvent<Node>> {
    let target = event
        .target()
        .and_then(|target| target.dyn_into::<Node>().ok())
        .or_else(|| {
            Reflect::get(&event, &JsValue::from_str("srcElement"))
                .ok()
                .and_then(|source| source.dyn_into::<Node>().ok())
        })
        .ok_or_else(|| TrackerError::Host("Click event has no node target".to_string()))?;

    Ok(ClickEvent {
        target,
        page_x: coordinate(&event, "pageX"),
        page_y: coordinate(&event, "pageY"),
        client_x: coordinate(&event, "clientX"),
        client_y: coordinate(&event, "clientY"),
    })
}

impl DocumentHost for WebDocument {
    type Node = Node;

    fn document(&self) -> Node {
        self.document.clone().into()
    }

    fn parent_node(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn node_name(&self, node: &Node) -> String {
        node.node_name()
    }

    fn class_attribute(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>()
            .and_then(|element| element.get_attribute("class"))
    }

    fn location_href(&self) -> TrackerResult<String> {
        self.window
            .location()
            .href()
            .map_err(|e| TrackerError::Host(format!("location.href: {}", describe_js_value(&e))))
    }

    fn add_click_listener(&self, listener: ClickListener<Node>) -> TrackerResult<ListenerId> {
        self.release_retired();

        let depth = self.dispatch_depth.clone();
        let closure = JsListener::new(move |event: Event| {
            depth.set(depth.get() + 1);
            let result = click_from_event(event)
                .map_err(anyhow::Error::from)
                .and_then(|click| listener(&click));
            depth.set(depth.get() - 1);
            if let Err(err) = result {
                // Surfaces in the page's dispatch like any other listener exception.
                wasm_bindgen::throw_str(&format!("{:#}", err));
            }
        });

        match self.api {
            ListenerApi::Legacy => {
                self.legacy_method("attachEvent")?
                    .call2(
                        &self.document,
                        &JsValue::from_str(LEGACY_CLICK_EVENT),
                        closure.as_ref(),
                    )
                    .map_err(|e| TrackerError::ListenerRegistration(describe_js_value(&e)))?;
            }
            ListenerApi::Auto | ListenerApi::Standard => {
                self.document
                    .add_event_listener_with_callback(CLICK_EVENT, closure.as_ref().unchecked_ref())
                    .map_err(|e| TrackerError::ListenerRegistration(describe_js_value(&e)))?;
            }
        }

        let id = ListenerId::new();
        self.registrations.borrow_mut().active.insert(id, closure);
        tracing::debug!("Added click listener {} ({:?})", id, self.api);
        Ok(id)
    }

    fn remove_click_listener(&self, id: ListenerId) -> TrackerResult<bool> {
        let removed = self.registrations.borrow_mut().active.remove(&id);
        let Some(closure) = removed else {
            return Ok(false);
        };

        let result = match self.api {
            ListenerApi::Legacy => self.legacy_method("detachEvent").and_then(|detach| {
                detach
                    .call2(
                        &self.document,
                        &JsValue::from_str(LEGACY_CLICK_EVENT),
                        closure.as_ref(),
                    )
                    .map(|_| ())
                    .map_err(|e| TrackerError::ListenerRegistration(describe_js_value(&e)))
            }),
            ListenerApi::Auto | ListenerApi::Standard => self
                .document
                .remove_event_listener_with_callback(CLICK_EVENT, closure.as_ref().unchecked_ref())
                .map_err(|e| TrackerError::ListenerRegistration(describe_js_value(&e))),
        };

        self.registrations.borrow_mut().retired.push(closure);
        self.release_retired();
        result?;
        tracing::debug!("Removed click listener {}", id);
        Ok(true)
    }
}
