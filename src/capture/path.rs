//! DOM path and click record derivation
//!
//! A DOM path identifies what was clicked by its ancestor chain, e.g.
//! `div.content\ul.menu\li.item.active`. Node names are lower-cased, class
//! names keep their case.

use crate::capture::traits::{ClickEvent, DocumentHost};
use crate::tracker::error::{TrackerError, TrackerResult};
use crate::tracker::types::{ClickTrackingData, PositionData};

/// Separator between node descriptors in a DOM path
pub const PATH_SEPARATOR: &str = "\\";

/// Build the descriptor for a single node.
///
/// Only the first space of the class attribute becomes a `.`, so
/// `"foo bar baz"` yields `tag.foo.bar baz`. Existing consumers of the paths
/// key on this exact format.
pub fn describe_node(node_name: &str, class_attribute: Option<&str>) -> String {
    let tag = node_name.to_lowercase();
    match class_attribute.filter(|classes| !classes.is_empty()) {
        Some(classes) => format!("{}.{}", tag, classes.replacen(' ', ".", 1)),
        None => tag,
    }
}

/// Derive the root-to-target DOM path of `target`, excluding the document node.
///
/// Fails with [`TrackerError::DetachedNode`] if the ancestor chain ends before
/// reaching the document.
pub fn derive_path<H: DocumentHost>(host: &H, target: &H::Node) -> TrackerResult<String> {
    let document = host.document();
    let mut descriptors = Vec::new();
    let mut current = target.clone();

    while current != document {
        let class_attribute = host.class_attribute(&current);
        descriptors.push(describe_node(
            &host.node_name(&current),
            class_attribute.as_deref(),
        ));

        current = match host.parent_node(&current) {
            Some(parent) => parent,
            None => {
                descriptors.reverse();
                return Err(TrackerError::DetachedNode(descriptors.join(PATH_SEPARATOR)));
            }
        };
    }

    descriptors.reverse();
    Ok(descriptors.join(PATH_SEPARATOR))
}

/// Page coordinates of a click, as reported by the event.
pub fn derive_position<N>(event: &ClickEvent<N>) -> PositionData {
    PositionData {
        x: event.page_x,
        y: event.page_y,
    }
}

/// Compose the full tracking record for a click.
pub fn derive_tracking_data<H: DocumentHost>(
    host: &H,
    event: &ClickEvent<H::Node>,
) -> TrackerResult<ClickTrackingData> {
    Ok(ClickTrackingData {
        path: derive_path(host, &event.target)?,
        position: derive_position(event),
        url: host.location_href()?,
    })
}
