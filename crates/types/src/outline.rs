use crate::ids::HeadingId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading levels tracked by the outline. Only two tiers are navigable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    H2,
    H3,
}

impl HeadingLevel {
    /// Visual indent step: top-tier entries sit flush, sub-entries one step in.
    pub fn indent(self) -> u8 {
        match self {
            HeadingLevel::H2 => 0,
            HeadingLevel::H3 => 1,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHeadingLevel(pub u8);

impl fmt::Display for InvalidHeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heading level {} is not tracked (expected 2 or 3)", self.0)
    }
}

impl std::error::Error for InvalidHeadingLevel {}

impl TryFrom<u8> for HeadingLevel {
    type Error = InvalidHeadingLevel;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(InvalidHeadingLevel(other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.as_u8()
    }
}

/// One navigable section marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingEntry {
    /// Unique within the document; written back onto the heading element.
    pub id: HeadingId,
    /// The heading's visible label.
    pub text: String,
    pub level: HeadingLevel,
}

impl HeadingEntry {
    pub fn new(id: impl Into<HeadingId>, text: impl Into<String>, level: HeadingLevel) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
        }
    }
}

/// Ordered headings of a document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline {
    entries: Vec<HeadingEntry>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeadingEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[HeadingEntry] {
        &self.entries
    }

    pub fn get(&self, id: &HeadingId) -> Option<&HeadingEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn position(&self, id: &HeadingId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    pub fn contains(&self, id: &HeadingId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &HeadingId> {
        self.entries.iter().map(|entry| &entry.id)
    }
}

impl From<Vec<HeadingEntry>> for Outline {
    fn from(entries: Vec<HeadingEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Outline {
    type Item = &'a HeadingEntry;
    type IntoIter = std::slice::Iter<'a, HeadingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
