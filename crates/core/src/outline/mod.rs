//! Document outline: discovery, id write-back, and the navigator view model.

mod active;
mod tracker;

pub use active::resolve_active;
pub use tracker::{OutlineTracker, TrackerStatus};

use crate::config::SlugStyle;
use crate::ids::assign_ids;
use log::{debug, warn};
use readnav_traits::DocumentSurface;
use readnav_types::{HeadingEntry, HeadingId, HeadingLevel, NodeKey, Outline};
use serde::Serialize;

/// An outline together with the element behind each entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedOutline {
    pub outline: Outline,
    /// `nodes[i]` is the element of `outline.entries()[i]`.
    pub nodes: Vec<NodeKey>,
}

impl ScannedOutline {
    pub fn node_for(&self, id: &HeadingId) -> Option<NodeKey> {
        self.outline
            .position(id)
            .and_then(|index| self.nodes.get(index).copied())
    }

    pub fn id_for(&self, node: NodeKey) -> Option<&HeadingId> {
        self.nodes
            .iter()
            .position(|key| *key == node)
            .and_then(|index| self.outline.entries().get(index))
            .map(|entry| &entry.id)
    }
}

/// Builds the outline of the content root matched by `root_selector`.
///
/// Headings lacking a usable id get one synthesized and written back onto the
/// element so `#id` links resolve. Returns `None` while the root is absent.
pub fn scan_outline(
    document: &dyn DocumentSurface,
    root_selector: &str,
    style: SlugStyle,
) -> Option<ScannedOutline> {
    let headings = document.headings_under(root_selector)?;
    let assignments = assign_ids(&headings, style);

    let mut entries = Vec::with_capacity(assignments.len());
    let mut nodes = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        if assignment.rewritten {
            if let Err(e) = document.set_attribute(assignment.key, "id", assignment.id.as_str()) {
                warn!(
                    "[OUTLINE] Could not write id '{}' onto {}: {}",
                    assignment.id, assignment.key, e
                );
            }
        }
        nodes.push(assignment.key);
        entries.push(HeadingEntry::new(
            assignment.id,
            assignment.text,
            assignment.level,
        ));
    }

    debug!(
        "[OUTLINE] Scanned '{}' on {}: {} headings",
        root_selector,
        document.name(),
        entries.len()
    );
    Some(ScannedOutline {
        outline: Outline::from(entries),
        nodes,
    })
}

/// One row of the "On this page" navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItemView {
    pub id: HeadingId,
    pub text: String,
    pub href: String,
    pub level: HeadingLevel,
    pub indent: u8,
    pub active: bool,
}

impl OutlineItemView {
    pub fn build(outline: &Outline, active: Option<&HeadingId>) -> Vec<OutlineItemView> {
        outline
            .iter()
            .map(|entry| OutlineItemView {
                id: entry.id.clone(),
                text: entry.text.clone(),
                href: entry.id.fragment(),
                level: entry.level,
                indent: entry.level.indent(),
                active: active == Some(&entry.id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readnav_traits::{HeadingSpec, InMemoryDocument};

    #[test]
    fn test_scan_writes_synthesized_ids_back() {
        let doc = InMemoryDocument::new();
        let keys = doc.mount_root(
            "content",
            [
                HeadingSpec::h2("Intro"),
                HeadingSpec::h2("Setup").with_id("setup"),
                HeadingSpec::h3("Details"),
            ],
        );

        let scanned = scan_outline(&doc, "content", SlugStyle::Literal).unwrap();

        assert_eq!(scanned.outline.len(), 3);
        assert_eq!(doc.attribute(keys[0], "id").as_deref(), Some("intro-0"));
        assert_eq!(doc.attribute(keys[1], "id").as_deref(), Some("setup"));
        assert_eq!(doc.attribute(keys[2], "id").as_deref(), Some("details-2"));
        // Only the two synthesized ids were written.
        assert_eq!(doc.write_count(), 2);
    }

    #[test]
    fn test_scan_absent_root() {
        let doc = InMemoryDocument::new();
        assert!(scan_outline(&doc, "content", SlugStyle::Literal).is_none());
    }

    #[test]
    fn test_scan_empty_root() {
        let doc = InMemoryDocument::new();
        doc.mount_root("content", Vec::<HeadingSpec>::new());
        let scanned = scan_outline(&doc, "content", SlugStyle::Literal).unwrap();
        assert!(scanned.outline.is_empty());
    }

    #[test]
    fn test_node_lookup_both_ways() {
        let doc = InMemoryDocument::new();
        let keys = doc.mount_root("content", [HeadingSpec::h2("A"), HeadingSpec::h2("B")]);
        let scanned = scan_outline(&doc, "content", SlugStyle::Literal).unwrap();

        let b = HeadingId::new("b-1");
        assert_eq!(scanned.node_for(&b), Some(keys[1]));
        assert_eq!(scanned.id_for(keys[0]).map(HeadingId::as_str), Some("a-0"));
        assert_eq!(scanned.id_for(NodeKey::new(999)), None);
    }

    #[test]
    fn test_view_marks_single_active_entry() {
        let outline = Outline::from(vec![
            HeadingEntry::new("intro-0", "Intro", HeadingLevel::H2),
            HeadingEntry::new("details-1", "Details", HeadingLevel::H3),
        ]);
        let active = HeadingId::new("details-1");
        let view = OutlineItemView::build(&outline, Some(&active));

        assert_eq!(view[0].href, "#intro-0");
        assert!(!view[0].active);
        assert!(view[1].active);
        assert_eq!(view[1].indent, 1);
    }
}
