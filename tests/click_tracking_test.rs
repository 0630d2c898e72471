//! End-to-end click tracking against the in-memory document

use click_tracker::registry::{self, Installation};
use click_tracker::{
    ClickTracker, ClickTrackingData, MemoryDocument, NodeId, PositionData, TrackerError,
    TrackingCallback,
};
use std::cell::RefCell;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<ClickTrackingData>>>;

fn recorder() -> (Calls, Option<TrackingCallback<NodeId>>) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = calls.clone();
    let callback = TrackingCallback::new(move |data: &ClickTrackingData, _context: &NodeId| {
        sink.borrow_mut().push(data.clone());
        Ok(())
    });
    (calls, Some(callback))
}

#[test]
fn test_nested_path() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let div = doc.append_element(&doc.root(), "DIV", Some("a")).unwrap();
    let span = doc.append_element(&div, "SPAN", Some("b")).unwrap();

    let tracker = ClickTracker::new(doc.clone());
    assert_eq!(tracker.derive_path(&span).unwrap(), "div.a\\span.b");
}

#[test]
fn test_two_and_three_class_paths() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let two = doc.append_element(&doc.root(), "DIV", Some("foo bar")).unwrap();
    let three = doc.append_element(&doc.root(), "DIV", Some("foo bar baz")).unwrap();

    let tracker = ClickTracker::new(doc.clone());
    assert_eq!(tracker.derive_path(&two).unwrap(), "div.foo.bar");
    assert_eq!(tracker.derive_path(&three).unwrap(), "div.foo.bar baz");
}

#[test]
fn test_click_delivers_record_once() {
    let doc = MemoryDocument::new("https://shop.example.com/cart");
    let body = doc.append_element(&doc.root(), "BODY", None).unwrap();
    let button = doc.append_element(&body, "BUTTON", Some("checkout primary")).unwrap();
    doc.set_scroll(0, 500);

    let mut tracker = ClickTracker::new(doc.clone());
    let (calls, callback) = recorder();
    tracker.start_tracking(callback).unwrap();

    doc.click(&button, 240, 910).unwrap();

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        ClickTrackingData {
            path: "body\\button.checkout.primary".to_string(),
            position: PositionData { x: 240, y: 910 },
            url: "https://shop.example.com/cart".to_string(),
        }
    );
}

#[test]
fn test_url_is_read_at_click_time() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let link = doc.append_element(&doc.root(), "A", None).unwrap();

    let mut tracker = ClickTracker::new(doc.clone());
    let (calls, callback) = recorder();
    tracker.start_tracking(callback).unwrap();

    doc.click(&link, 1, 1).unwrap();
    doc.set_location("https://shop.example.com/#details");
    doc.click(&link, 1, 1).unwrap();

    let urls: Vec<String> = calls.borrow().iter().map(|c| c.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            "https://shop.example.com/".to_string(),
            "https://shop.example.com/#details".to_string(),
        ]
    );
}

#[test]
fn test_second_start_supersedes_first() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let div = doc.append_element(&doc.root(), "DIV", None).unwrap();

    let mut tracker = ClickTracker::new(doc.clone());
    let (first, cb1) = recorder();
    let (second, cb2) = recorder();
    tracker.start_tracking(cb1).unwrap();
    tracker.start_tracking(cb2).unwrap();

    doc.click(&div, 0, 0).unwrap();

    assert!(first.borrow().is_empty());
    assert_eq!(second.borrow().len(), 1);
    assert_eq!(doc.listener_count(), 1);
}

#[test]
fn test_stop_prevents_callback() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let div = doc.append_element(&doc.root(), "DIV", None).unwrap();

    let mut tracker = ClickTracker::new(doc.clone());
    let (calls, callback) = recorder();
    tracker.start_tracking(callback).unwrap();
    tracker.stop_tracking().unwrap();

    doc.click(&div, 0, 0).unwrap();
    assert!(calls.borrow().is_empty());
    assert!(!tracker.is_tracking());
}

#[test]
fn test_stop_without_start() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let div = doc.append_element(&doc.root(), "DIV", None).unwrap();

    let mut tracker = ClickTracker::new(doc.clone());
    tracker.stop_tracking().unwrap();
    tracker.stop_tracking().unwrap();

    doc.click(&div, 0, 0).unwrap();
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn test_start_without_callback_is_rejected() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let div = doc.append_element(&doc.root(), "DIV", None).unwrap();
    let mut tracker = ClickTracker::new(doc.clone());

    let err = tracker.start_tracking(None).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidArgument(_)));
    assert!(err.to_string().contains("You must provide a callback to log data."));
    assert!(!tracker.is_tracking());
    assert_eq!(doc.listener_count(), 0);

    let (calls, callback) = recorder();
    tracker.start_tracking(callback).unwrap();
    assert!(tracker.start_tracking(None).is_err());

    doc.click(&div, 0, 0).unwrap();
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_callback_error_reaches_dispatcher() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let div = doc.append_element(&doc.root(), "DIV", None).unwrap();

    let mut tracker = ClickTracker::new(doc.clone());
    tracker
        .start_tracking(Some(TrackingCallback::new(
            |data: &ClickTrackingData, _context: &NodeId| {
                anyhow::bail!("transport rejected {}", data.path)
            },
        )))
        .unwrap();

    let err = doc.click(&div, 0, 0).unwrap_err();
    assert_eq!(err.to_string(), "transport rejected div");
    assert!(tracker.is_tracking());
}

#[test]
fn test_detached_target_reaches_dispatcher() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let orphan = doc.create_element("DIV", Some("ghost"));

    let mut tracker = ClickTracker::new(doc.clone());
    let (calls, callback) = recorder();
    tracker.start_tracking(callback).unwrap();

    let err = doc.click(&orphan, 0, 0).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::DetachedNode(_))
    ));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_node_from_other_document_reaches_dispatcher() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let other = MemoryDocument::new("https://other.example.com/");
    let foreign = other.append_element(&other.root(), "DIV", None).unwrap();
    doc.append_element(&doc.root(), "DIV", None).unwrap();

    let mut tracker = ClickTracker::new(doc.clone());
    let (calls, callback) = recorder();
    tracker.start_tracking(callback).unwrap();

    let err = doc.click(&foreign, 0, 0).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::DetachedNode(_))
    ));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_global_slot_installs_once() {
    let doc = MemoryDocument::new("https://shop.example.com/");
    let div = doc.append_element(&doc.root(), "DIV", None).unwrap();

    let tracker = match registry::install("ClickTracker", doc.clone()) {
        Installation::Installed(tracker) => tracker,
        Installation::AlreadyInstalled => panic!("first install must succeed"),
    };
    let (calls, callback) = recorder();
    tracker.borrow_mut().start_tracking(callback).unwrap();

    assert!(!registry::install("ClickTracker", doc.clone()).is_installed());

    doc.click(&div, 0, 0).unwrap();
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(doc.listener_count(), 1);

    drop(tracker);
    assert!(registry::uninstall("ClickTracker"));
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn test_init_logging_is_repeatable() {
    click_tracker::init_logging("click_tracker=trace");
    assert!(!click_tracker::init_logging("click_tracker=trace"));
}
