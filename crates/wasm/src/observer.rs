//! `IntersectionObserver` adapter.

use crate::dom::{NodeTable, js_message};
use log::debug;
use readnav_traits::{
    IntersectionCallback, IntersectionEntry, IntersectionSource, ObserverHandle, SurfaceError,
};
use readnav_types::{NodeKey, TriggerBand};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct Connected {
    observer: IntersectionObserver,
    _callback: ObserverClosure,
}

pub struct BrowserIntersections {
    nodes: Rc<NodeTable>,
    next: Cell<u64>,
    connected: RefCell<HashMap<ObserverHandle, Connected>>,
}

impl BrowserIntersections {
    pub fn new(nodes: Rc<NodeTable>) -> Self {
        Self {
            nodes,
            next: Cell::new(0),
            connected: RefCell::new(HashMap::new()),
        }
    }
}

impl IntersectionSource for BrowserIntersections {
    fn observe(
        &self,
        band: TriggerBand,
        targets: &[NodeKey],
        mut callback: IntersectionCallback,
    ) -> Result<ObserverHandle, SurfaceError> {
        let nodes = Rc::clone(&self.nodes);
        let closure: ObserverClosure = Closure::new(
            move |records: js_sys::Array, _observer: IntersectionObserver| {
                let batch: Vec<IntersectionEntry> = records
                    .iter()
                    .filter_map(|record| record.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|record| {
                        let target = nodes.key_of(&record.target())?;
                        Some(IntersectionEntry {
                            target,
                            is_intersecting: record.is_intersecting(),
                            bounding_top: record.bounding_client_rect().top(),
                        })
                    })
                    .collect();
                if !batch.is_empty() {
                    callback(&batch);
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&band.root_margin());
        init.set_threshold(&JsValue::from_f64(0.0));
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
                .map_err(|e| SurfaceError::Unavailable(js_message(&e)))?;

        for key in targets {
            match self.nodes.element(*key) {
                Some(element) => observer.observe(&element),
                None => debug!("[OBSERVER] Skipping unregistered {}", key),
            }
        }

        let handle = ObserverHandle::new(self.next.get() + 1);
        self.next.set(handle.raw());
        self.connected.borrow_mut().insert(
            handle,
            Connected {
                observer,
                _callback: closure,
            },
        );
        Ok(handle)
    }

    fn disconnect(&self, handle: ObserverHandle) -> bool {
        let removed = self.connected.borrow_mut().remove(&handle);
        match removed {
            Some(connected) => {
                connected.observer.disconnect();
                true
            }
            None => false,
        }
    }
}
