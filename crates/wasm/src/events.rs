//! Document-level listeners via `gloo::events`.

use crate::dom::NodeTable;
use gloo::events::EventListener;
use readnav_traits::{EventHub, EventKind, Listener, ListenerId, UiEvent};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, KeyboardEvent};

fn dom_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Click => "click",
        EventKind::KeyDown => "keydown",
    }
}

pub struct BrowserEvents {
    document: Document,
    nodes: Rc<NodeTable>,
    next: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, EventListener>>,
}

impl BrowserEvents {
    pub fn new(document: Document, nodes: Rc<NodeTable>) -> Self {
        Self {
            document,
            nodes,
            next: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}

impl EventHub for BrowserEvents {
    fn add_listener(&self, kind: EventKind, mut listener: Listener) -> ListenerId {
        let nodes = Rc::clone(&self.nodes);
        let dom_listener = EventListener::new(&self.document, dom_name(kind), move |event: &Event| {
            let translated = match kind {
                EventKind::Click => UiEvent::click(nodes.keys_in(&event.composed_path())),
                EventKind::KeyDown => {
                    let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    UiEvent::key(key_event.key())
                }
            };
            listener(&translated);
        });

        let id = ListenerId::new(self.next.get() + 1);
        self.next.set(id.raw());
        self.listeners.borrow_mut().insert(id, dom_listener);
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.listeners.borrow_mut().remove(&id);
        removed.is_some()
    }
}
