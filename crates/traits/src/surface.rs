//! DocumentSurface and Viewport traits for abstracting the rendered page.
//!
//! These traits let the navigation components query headings, mutate element
//! attributes and read scroll geometry without touching a real DOM. The
//! in-memory implementations work in any environment and back the tests.

use crate::error::SurfaceError;
use readnav_types::{HeadingId, NodeKey, ScrollMetrics};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A heading element found under a content root.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingNode {
    pub key: NodeKey,
    /// Numeric heading level (`2` for `<h2>`). Untracked levels are filtered by the caller.
    pub level: u8,
    /// Text content of the heading.
    pub text: String,
    /// The element's current `id` attribute, if any.
    pub id: Option<String>,
}

/// Read and write access to the rendered document.
///
/// # Implementations
///
/// - `InMemoryDocument`: element table held in memory (always available)
/// - `DomSurface` in `readnav-wasm`: the browser DOM
pub trait DocumentSurface {
    /// Heading elements under the content root matched by `root_selector`, in
    /// document order.
    ///
    /// Returns `None` when the root is not mounted (yet).
    fn headings_under(&self, root_selector: &str) -> Option<Vec<HeadingNode>>;

    fn set_attribute(&self, node: NodeKey, name: &str, value: &str) -> Result<(), SurfaceError>;

    fn set_class(&self, node: NodeKey, class: &str, enabled: bool) -> Result<(), SurfaceError>;

    fn set_style(&self, node: NodeKey, property: &str, value: &str) -> Result<(), SurfaceError>;

    /// Top edge of `node` relative to the document (not the viewport).
    fn document_top(&self, node: NodeKey) -> Option<f64>;

    /// Returns a human-readable name for this surface (for logging/debugging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Scroll geometry and scroll control of the visible window.
pub trait Viewport {
    fn metrics(&self) -> ScrollMetrics;

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    /// Rewrites the URL fragment without triggering a jump.
    fn set_fragment(&self, id: &HeadingId);
}

/// Description of a heading to place into an [`InMemoryDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingSpec {
    pub level: u8,
    pub text: String,
    pub id: Option<String>,
    pub top: Option<f64>,
}

impl HeadingSpec {
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            id: None,
            top: None,
        }
    }

    pub fn h2(text: impl Into<String>) -> Self {
        Self::new(2, text)
    }

    pub fn h3(text: impl Into<String>) -> Self {
        Self::new(3, text)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Document-relative top edge. Defaults to a 400px rhythm by position.
    pub fn at(mut self, top: f64) -> Self {
        self.top = Some(top);
        self
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryNode {
    level: Option<u8>,
    text: String,
    top: f64,
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    styles: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_key: u32,
    nodes: HashMap<NodeKey, MemoryNode>,
    roots: HashMap<String, Vec<NodeKey>>,
    writes: usize,
}

impl MemoryState {
    fn insert(&mut self, node: MemoryNode) -> NodeKey {
        let key = NodeKey::new(self.next_key);
        self.next_key += 1;
        self.nodes.insert(key, node);
        key
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut MemoryNode, SurfaceError> {
        self.nodes.get_mut(&key).ok_or(SurfaceError::UnknownNode(key))
    }
}

/// An in-memory document.
///
/// Content roots are registered under the selector that finds them, so a test
/// can model content that mounts after the page is constructed.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    state: RefCell<MemoryState>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a content root holding the given headings, returning their keys
    /// in document order.
    pub fn mount_root(
        &self,
        selector: impl Into<String>,
        headings: impl IntoIterator<Item = HeadingSpec>,
    ) -> Vec<NodeKey> {
        let mut state = self.state.borrow_mut();
        let keys: Vec<NodeKey> = headings
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                let mut node = MemoryNode {
                    level: Some(spec.level),
                    text: spec.text,
                    top: spec.top.unwrap_or(200.0 + 400.0 * index as f64),
                    ..MemoryNode::default()
                };
                if let Some(id) = spec.id {
                    node.attributes.insert("id".to_string(), id);
                }
                state.insert(node)
            })
            .collect();
        state.roots.insert(selector.into(), keys.clone());
        keys
    }

    /// Removes a content root. Its heading nodes stay addressable.
    pub fn unmount_root(&self, selector: &str) -> bool {
        self.state.borrow_mut().roots.remove(selector).is_some()
    }

    /// Adds a plain element (menu trigger, panel, progress fill, ...).
    pub fn add_element(&self) -> NodeKey {
        self.state.borrow_mut().insert(MemoryNode::default())
    }

    pub fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    pub fn has_class(&self, node: NodeKey, class: &str) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.classes.contains(class))
    }

    pub fn style(&self, node: NodeKey, property: &str) -> Option<String> {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .and_then(|n| n.styles.get(property).cloned())
    }

    /// Overwrites an element's `id` the way page markup would.
    pub fn set_raw_id(&self, node: NodeKey, id: &str) {
        if let Some(n) = self.state.borrow_mut().nodes.get_mut(&node) {
            n.attributes.insert("id".to_string(), id.to_string());
        }
    }

    pub fn set_document_top(&self, node: NodeKey, top: f64) {
        if let Some(n) = self.state.borrow_mut().nodes.get_mut(&node) {
            n.top = top;
        }
    }

    /// Number of successful attribute/class/style writes so far.
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }
}

impl DocumentSurface for InMemoryDocument {
    fn headings_under(&self, root_selector: &str) -> Option<Vec<HeadingNode>> {
        let state = self.state.borrow();
        let keys = state.roots.get(root_selector)?;
        let headings = keys
            .iter()
            .filter_map(|key| {
                let node = state.nodes.get(key)?;
                Some(HeadingNode {
                    key: *key,
                    level: node.level?,
                    text: node.text.clone(),
                    id: node.attributes.get("id").cloned(),
                })
            })
            .collect();
        Some(headings)
    }

    fn set_attribute(&self, node: NodeKey, name: &str, value: &str) -> Result<(), SurfaceError> {
        let mut state = self.state.borrow_mut();
        state
            .node_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }

    fn set_class(&self, node: NodeKey, class: &str, enabled: bool) -> Result<(), SurfaceError> {
        let mut state = self.state.borrow_mut();
        let target = state.node_mut(node)?;
        if enabled {
            target.classes.insert(class.to_string());
        } else {
            target.classes.remove(class);
        }
        state.writes += 1;
        Ok(())
    }

    fn set_style(&self, node: NodeKey, property: &str, value: &str) -> Result<(), SurfaceError> {
        let mut state = self.state.borrow_mut();
        state
            .node_mut(node)?
            .styles
            .insert(property.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }

    fn document_top(&self, node: NodeKey) -> Option<f64> {
        self.state.borrow().nodes.get(&node).map(|n| n.top)
    }

    fn name(&self) -> &'static str {
        "InMemoryDocument"
    }
}

/// An in-memory viewport whose geometry is set by the caller.
#[derive(Debug, Default)]
pub struct InMemoryViewport {
    metrics: Cell<ScrollMetrics>,
    scrolls: RefCell<Vec<(f64, ScrollBehavior)>>,
    fragment: RefCell<Option<String>>,
}

impl InMemoryViewport {
    pub fn new(scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            metrics: Cell::new(ScrollMetrics::new(0.0, scroll_height, viewport_height)),
            ..Self::default()
        }
    }

    pub fn set_metrics(&self, metrics: ScrollMetrics) {
        self.metrics.set(metrics);
    }

    pub fn set_scroll_top(&self, scroll_top: f64) {
        let mut metrics = self.metrics.get();
        metrics.scroll_top = scroll_top;
        self.metrics.set(metrics);
    }

    /// Every `scroll_to` request received, oldest first.
    pub fn scroll_requests(&self) -> Vec<(f64, ScrollBehavior)> {
        self.scrolls.borrow().clone()
    }

    pub fn fragment(&self) -> Option<String> {
        self.fragment.borrow().clone()
    }
}

impl Viewport for InMemoryViewport {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics.get()
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        self.scrolls.borrow_mut().push((top, behavior));
        let max = self.metrics.get().scrollable_distance().max(0.0);
        self.set_scroll_top(top.clamp(0.0, max));
    }

    fn set_fragment(&self, id: &HeadingId) {
        *self.fragment.borrow_mut() = Some(id.fragment());
    }
}
