//! Newtype wrappers for heading identifiers and platform element handles
//!
//! A `HeadingId` is the string written into a heading's `id` attribute and used
//! as the URL fragment; a `NodeKey` is the opaque handle a platform hands out
//! for one of its elements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// The anchor identifier of a heading (e.g. `setup-1`)
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadingId(Arc<str>);

impl HeadingId {
    /// Creates a new HeadingId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this heading ID
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The in-page link target for this heading, e.g. `#setup-1`
    pub fn fragment(&self) -> String {
        format!("#{}", self.0)
    }
}

impl From<String> for HeadingId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for HeadingId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<Arc<str>> for HeadingId {
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

impl AsRef<str> for HeadingId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for HeadingId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for HeadingId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for HeadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle for an element owned by a platform surface.
///
/// Keys are only meaningful to the surface that issued them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(u32);

impl NodeKey {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_heading_id_creation() {
        let id1 = HeadingId::new("intro-0");
        let id2 = HeadingId::from("intro-0");
        let id3 = HeadingId::from(String::from("intro-0"));

        assert_eq!(id1, id2);
        assert_eq!(id2, id3);
        assert_eq!(id1.as_str(), "intro-0");
        assert_eq!(id1, "intro-0");
    }

    #[test]
    fn test_heading_id_fragment() {
        assert_eq!(HeadingId::new("setup-1").fragment(), "#setup-1");
    }

    #[test]
    fn test_heading_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&HeadingId::new("details-2")).unwrap();
        assert_eq!(json, "\"details-2\"");
    }

    #[test]
    fn test_node_key_hash_map_usage() {
        let mut tops = HashMap::new();
        tops.insert(NodeKey::new(3), 120.0);
        tops.insert(NodeKey::new(7), 640.0);

        assert_eq!(tops.get(&NodeKey::new(3)), Some(&120.0));
        assert_eq!(NodeKey::new(7).raw(), 7);
        assert_eq!(NodeKey::new(7).to_string(), "node#7");
    }
}
