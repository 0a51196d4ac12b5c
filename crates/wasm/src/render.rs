//! Renders the "On this page" list.

use crate::dom::js_message;
use log::warn;
use readnav_core::OutlineItemView;
use readnav_types::HeadingId;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event};

const LINK_ATTR: &str = "data-heading-id";
const ACTIVE_CLASS: &str = "is-active";

/// The rendered outline list inside its container.
pub struct TocList {
    document: Document,
    container: Element,
    links: RefCell<Vec<(HeadingId, Element)>>,
}

impl TocList {
    pub fn new(document: Document, container: Element) -> Self {
        Self {
            document,
            container,
            links: RefCell::new(Vec::new()),
        }
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    /// Replaces the list with `rows`. An empty outline renders nothing.
    pub fn render(&self, rows: &[OutlineItemView]) {
        self.container.set_inner_html("");
        self.links.borrow_mut().clear();
        if rows.is_empty() {
            return;
        }
        if let Err(e) = self.build(rows) {
            warn!("[TOC] Could not render outline: {}", js_message(&e));
        }
    }

    fn build(&self, rows: &[OutlineItemView]) -> Result<(), JsValue> {
        let list = self.document.create_element("ul")?;
        list.set_class_name("toc-list");

        let mut links = Vec::with_capacity(rows.len());
        for row in rows {
            let item = self.document.create_element("li")?;
            item.set_class_name(&format!("toc-item toc-indent-{}", row.indent));

            let link = self.document.create_element("a")?;
            link.set_attribute("href", &row.href)?;
            link.set_attribute(LINK_ATTR, row.id.as_str())?;
            link.set_class_name("toc-link");
            link.set_text_content(Some(&row.text));
            if row.active {
                mark(&link, true);
            }

            item.append_child(&link)?;
            list.append_child(&item)?;
            links.push((row.id.clone(), link));
        }
        self.container.append_child(&list)?;
        *self.links.borrow_mut() = links;
        Ok(())
    }

    /// Moves the active marker. Exactly one link carries it while `active` is set.
    pub fn mark_active(&self, active: Option<&HeadingId>) {
        for (id, link) in self.links.borrow().iter() {
            mark(link, Some(id) == active);
        }
    }
}

fn mark(link: &Element, active: bool) {
    let _ = link.class_list().toggle_with_force(ACTIVE_CLASS, active);
    let result = if active {
        link.set_attribute("aria-current", "location")
    } else {
        link.remove_attribute("aria-current")
    };
    if let Err(e) = result {
        warn!("[TOC] Could not mark link: {}", js_message(&e));
    }
}

/// The heading id of the outline link an event landed on, if any.
pub fn link_target(event: &Event) -> Option<HeadingId> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let link = target.closest(&format!("a[{}]", LINK_ATTR)).ok()??;
    link.get_attribute(LINK_ATTR).map(HeadingId::from)
}
