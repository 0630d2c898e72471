//! Global tracker slot
//!
//! A page installs its tracker under a well-known name exactly once. Loading
//! the tracker again while the slot is occupied leaves the existing tracker
//! (and its listener) in place.

use crate::capture::traits::DocumentHost;
use crate::tracker::ClickTracker;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Tracker shared between the slot and its callers
pub type SharedTracker<H> = Rc<RefCell<ClickTracker<H>>>;

/// Outcome of [`install`]
pub enum Installation<H: DocumentHost> {
    /// The slot was empty and now holds this tracker
    Installed(SharedTracker<H>),
    /// The slot was already occupied; nothing changed
    AlreadyInstalled,
}

impl<H: DocumentHost> Installation<H> {
    pub fn is_installed(&self) -> bool {
        matches!(self, Installation::Installed(_))
    }
}

thread_local! {
    static SLOTS: RefCell<HashMap<String, Rc<dyn Any>>> = RefCell::new(HashMap::new());
}

/// Install a tracker for `host` under `slot` unless the slot is taken.
pub fn install<H: DocumentHost>(slot: &str, host: H) -> Installation<H> {
    SLOTS.with(|slots| {
        let mut slots = slots.borrow_mut();
        if slots.contains_key(slot) {
            tracing::debug!("Click tracker slot '{}' already occupied", slot);
            return Installation::AlreadyInstalled;
        }

        let tracker: SharedTracker<H> = Rc::new(RefCell::new(ClickTracker::new(host)));
        slots.insert(slot.to_string(), tracker.clone());
        tracing::info!("Click tracker installed as '{}'", slot);
        Installation::Installed(tracker)
    })
}

pub fn is_occupied(slot: &str) -> bool {
    SLOTS.with(|slots| slots.borrow().contains_key(slot))
}

/// Free `slot`. Returns `false` if it was empty.
///
/// The tracker detaches its listener once the last shared handle is dropped.
pub fn uninstall(slot: &str) -> bool {
    let removed = SLOTS.with(|slots| slots.borrow_mut().remove(slot));
    if removed.is_some() {
        tracing::info!("Click tracker '{}' uninstalled", slot);
    }
    removed.is_some()
}
