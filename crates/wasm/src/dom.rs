//! DOM-backed document surface and viewport.
//!
//! Elements are handed to the core as [`NodeKey`]s. The [`NodeTable`] owns the
//! mapping and is shared with the observer and event adapters so that
//! intersection targets and event paths resolve to the same keys.

use readnav_traits::{DocumentSurface, HeadingNode, ScrollBehavior, SurfaceError, Viewport};
use readnav_types::{HeadingId, NodeKey, ScrollMetrics};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, ScrollToOptions, Window};

/// Registry of the elements the core has been told about.
///
/// Keys are never reused. Lookups by element go through a JS `Map`, which
/// compares by object identity.
pub struct NodeTable {
    by_key: RefCell<HashMap<NodeKey, Element>>,
    keys: js_sys::Map,
    next: Cell<u32>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self {
            by_key: RefCell::new(HashMap::new()),
            keys: js_sys::Map::new(),
            next: Cell::new(0),
        }
    }

    /// Returns the key for `element`, registering it on first sight.
    pub fn register(&self, element: &Element) -> NodeKey {
        if let Some(key) = self.key_of(element) {
            return key;
        }
        let key = NodeKey::new(self.next.get());
        self.next.set(key.raw() + 1);
        self.keys.set(element, &JsValue::from(key.raw()));
        self.by_key.borrow_mut().insert(key, element.clone());
        key
    }

    pub fn key_of(&self, element: &Element) -> Option<NodeKey> {
        self.keys
            .get(element)
            .as_f64()
            .map(|raw| NodeKey::new(raw as u32))
    }

    pub fn element(&self, key: NodeKey) -> Option<Element> {
        self.by_key.borrow().get(&key).cloned()
    }

    /// Keys of the registered elements found in `values`, in order.
    pub fn keys_in(&self, values: &js_sys::Array) -> Vec<NodeKey> {
        values
            .iter()
            .filter_map(|value| value.dyn_into::<Element>().ok())
            .filter_map(|element| self.key_of(&element))
            .collect()
    }

    /// Forgets elements that are no longer in the document, returning how
    /// many were dropped.
    pub fn prune_detached(&self) -> usize {
        let mut by_key = self.by_key.borrow_mut();
        let before = by_key.len();
        by_key.retain(|_, element| {
            let connected = element.is_connected();
            if !connected {
                self.keys.delete(element);
            }
            connected
        });
        before - by_key.len()
    }

    pub fn len(&self) -> usize {
        self.by_key.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.borrow().is_empty()
    }
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTable")
            .field("elements", &self.len())
            .field("next", &self.next.get())
            .finish()
    }
}

pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn heading_level(element: &Element) -> Option<u8> {
    match element.tag_name().to_ascii_lowercase().as_str() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// The live page, seen through the document and viewport seams.
#[derive(Debug, Clone)]
pub struct DomSurface {
    window: Window,
    document: Document,
    nodes: Rc<NodeTable>,
}

impl DomSurface {
    pub fn new(window: Window, document: Document, nodes: Rc<NodeTable>) -> Self {
        Self {
            window,
            document,
            nodes,
        }
    }

    /// Looks up an element by id and registers it.
    pub fn register_by_id(&self, id: &str) -> Option<NodeKey> {
        self.document
            .get_element_by_id(id)
            .map(|element| self.nodes.register(&element))
    }

    pub fn nodes(&self) -> &Rc<NodeTable> {
        &self.nodes
    }

    fn element(&self, node: NodeKey) -> Result<Element, SurfaceError> {
        self.nodes.element(node).ok_or(SurfaceError::UnknownNode(node))
    }

    fn rejected(node: NodeKey, err: JsValue) -> SurfaceError {
        SurfaceError::Rejected {
            node,
            message: js_message(&err),
        }
    }
}

impl DocumentSurface for DomSurface {
    fn headings_under(&self, root_selector: &str) -> Option<Vec<HeadingNode>> {
        let root = self.document.get_element_by_id(root_selector)?;
        let found = root.query_selector_all("h1, h2, h3, h4, h5, h6").ok()?;
        let pruned = self.nodes.prune_detached();
        if pruned > 0 {
            log::debug!("[DOM] Dropped {} detached elements", pruned);
        }

        let mut headings = Vec::with_capacity(found.length() as usize);
        for index in 0..found.length() {
            let Some(element) = found.item(index).and_then(|n| n.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let Some(level) = heading_level(&element) else {
                continue;
            };
            let id = element.id();
            headings.push(HeadingNode {
                key: self.nodes.register(&element),
                level,
                text: element.text_content().unwrap_or_default(),
                id: (!id.is_empty()).then_some(id),
            });
        }
        Some(headings)
    }

    fn set_attribute(&self, node: NodeKey, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.element(node)?
            .set_attribute(name, value)
            .map_err(|e| Self::rejected(node, e))
    }

    fn set_class(&self, node: NodeKey, class: &str, enabled: bool) -> Result<(), SurfaceError> {
        self.element(node)?
            .class_list()
            .toggle_with_force(class, enabled)
            .map(|_| ())
            .map_err(|e| Self::rejected(node, e))
    }

    fn set_style(&self, node: NodeKey, property: &str, value: &str) -> Result<(), SurfaceError> {
        let element = self.element(node)?;
        let html = element
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| SurfaceError::Rejected {
                node,
                message: "element has no inline style".to_string(),
            })?;
        html.style()
            .set_property(property, value)
            .map_err(|e| Self::rejected(node, e))
    }

    fn document_top(&self, node: NodeKey) -> Option<f64> {
        let element = self.nodes.element(node)?;
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        Some(element.get_bounding_client_rect().top() + scroll_y)
    }

    fn name(&self) -> &'static str {
        "DomSurface"
    }
}

impl Viewport for DomSurface {
    fn metrics(&self) -> ScrollMetrics {
        let scroll_top = self.window.scroll_y().unwrap_or(0.0);
        let scroll_height = self
            .document
            .document_element()
            .map(|root| f64::from(root.scroll_height()))
            .unwrap_or(0.0);
        let viewport_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        ScrollMetrics::new(scroll_top, scroll_height, viewport_height)
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn set_fragment(&self, id: &HeadingId) {
        let Ok(history) = self.window.history() else {
            return;
        };
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(&id.fragment())) {
            log::warn!("[DOM] Could not update URL fragment: {}", js_message(&e));
        }
    }
}
