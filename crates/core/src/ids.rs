//! Heading slugs and collision-free id allocation.
//!
//! Ids are derived from heading text plus the heading's position among the
//! tracked headings, so the same content always yields the same ids.

use crate::config::SlugStyle;
use readnav_traits::HeadingNode;
use readnav_types::{HeadingId, HeadingLevel, NodeKey};
use std::collections::HashSet;

/// Stem used when a heading's text slugs to nothing.
const FALLBACK_STEM: &str = "section";

/// Turns heading text into an id stem containing only `[a-z0-9-]`.
pub fn slugify(text: &str, style: SlugStyle) -> String {
    let source = match style {
        SlugStyle::Literal => text.to_lowercase(),
        SlugStyle::Transliterate => ::slug::slugify(text),
    };
    source
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// One tracked heading with its final id.
#[derive(Debug, Clone, PartialEq)]
pub struct IdAssignment {
    pub key: NodeKey,
    pub id: HeadingId,
    pub text: String,
    pub level: HeadingLevel,
    /// The id differs from what the element carried and must be written back.
    pub rewritten: bool,
}

#[derive(Debug, Default)]
struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    fn claim(&mut self, id: &str) -> bool {
        self.taken.insert(id.to_string())
    }

    fn allocate(&mut self, stem: &str, position: usize) -> String {
        let base = format!("{stem}-{position}");
        if self.claim(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if self.claim(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn usable_id(node: &HeadingNode) -> Option<&str> {
    node.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
}

/// Assigns a unique id to every level-2/level-3 heading in `nodes`, keeping
/// document order and dropping other levels.
///
/// Existing ids are kept; the first element to carry a given id owns it. A
/// later duplicate `x` at position `i` becomes `x-i`, and a heading without an
/// id gets `<slug>-i`. Anything that still collides gains a further `-n`.
pub fn assign_ids(nodes: &[HeadingNode], style: SlugStyle) -> Vec<IdAssignment> {
    let tracked: Vec<(&HeadingNode, HeadingLevel)> = nodes
        .iter()
        .filter_map(|node| {
            HeadingLevel::try_from(node.level)
                .ok()
                .map(|level| (node, level))
        })
        .collect();

    let mut allocator = IdAllocator::default();
    let owns_existing: Vec<bool> = tracked
        .iter()
        .map(|(node, _)| usable_id(node).is_some_and(|id| allocator.claim(id)))
        .collect();

    tracked
        .iter()
        .zip(owns_existing)
        .enumerate()
        .map(|(position, ((node, level), owned))| {
            let id = if owned {
                usable_id(node).unwrap_or_default().to_string()
            } else {
                let stem = match usable_id(node) {
                    Some(duplicate) => duplicate.to_string(),
                    None => {
                        let slug = slugify(&node.text, style);
                        if slug.is_empty() {
                            FALLBACK_STEM.to_string()
                        } else {
                            slug
                        }
                    }
                };
                allocator.allocate(&stem, position)
            };
            IdAssignment {
                key: node.key,
                rewritten: node.id.as_deref() != Some(id.as_str()),
                id: HeadingId::from(id),
                text: node.text.trim().to_string(),
                level: *level,
            }
        })
        .collect()
}
