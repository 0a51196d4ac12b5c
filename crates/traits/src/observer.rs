//! IntersectionSource trait for viewport-intersection signals.

use crate::error::SurfaceError;
use readnav_types::{NodeKey, TriggerBand};
use std::cell::RefCell;

/// One element's intersection change, as delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeKey,
    pub is_intersecting: bool,
    /// Top of the target's bounding box in viewport coordinates.
    pub bounding_top: f64,
}

impl IntersectionEntry {
    pub fn entering(target: NodeKey, bounding_top: f64) -> Self {
        Self {
            target,
            is_intersecting: true,
            bounding_top,
        }
    }

    pub fn leaving(target: NodeKey, bounding_top: f64) -> Self {
        Self {
            target,
            is_intersecting: false,
            bounding_top,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

impl ObserverHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Receives one batch of entries per platform callback, in delivery order.
pub type IntersectionCallback = Box<dyn FnMut(&[IntersectionEntry])>;

pub trait IntersectionSource {
    /// Starts observing `targets` against `band`.
    fn observe(
        &self,
        band: TriggerBand,
        targets: &[NodeKey],
        callback: IntersectionCallback,
    ) -> Result<ObserverHandle, SurfaceError>;

    /// Stops an observer. Returns `false` if it was not connected.
    fn disconnect(&self, handle: ObserverHandle) -> bool;
}

struct ManualObserver {
    handle: ObserverHandle,
    band: TriggerBand,
    targets: Vec<NodeKey>,
    callback: Option<IntersectionCallback>,
}

#[derive(Default)]
struct ManualState {
    next_handle: u64,
    observers: Vec<ManualObserver>,
}

/// Intersection source whose batches are delivered by hand.
#[derive(Default)]
pub struct ManualIntersections {
    state: RefCell<ManualState>,
}

impl ManualIntersections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn band(&self, handle: ObserverHandle) -> Option<TriggerBand> {
        self.state
            .borrow()
            .observers
            .iter()
            .find(|observer| observer.handle == handle)
            .map(|observer| observer.band)
    }

    /// Targets observed by any connected observer.
    pub fn observed_targets(&self) -> Vec<NodeKey> {
        self.state
            .borrow()
            .observers
            .iter()
            .flat_map(|observer| observer.targets.iter().copied())
            .collect()
    }

    /// Delivers one batch. Each connected observer receives the entries for
    /// the targets it observes, in the given order. Returns the number of
    /// callbacks invoked.
    pub fn deliver(&self, entries: &[IntersectionEntry]) -> usize {
        let handles: Vec<ObserverHandle> = self
            .state
            .borrow()
            .observers
            .iter()
            .map(|observer| observer.handle)
            .collect();

        let mut invoked = 0;
        for handle in handles {
            let taken = {
                let mut state = self.state.borrow_mut();
                state
                    .observers
                    .iter_mut()
                    .find(|observer| observer.handle == handle)
                    .and_then(|observer| {
                        let batch: Vec<IntersectionEntry> = entries
                            .iter()
                            .filter(|entry| observer.targets.contains(&entry.target))
                            .copied()
                            .collect();
                        if batch.is_empty() {
                            None
                        } else {
                            observer.callback.take().map(|callback| (callback, batch))
                        }
                    })
            };
            let Some((mut callback, batch)) = taken else {
                continue;
            };
            callback(&batch);
            invoked += 1;

            let mut state = self.state.borrow_mut();
            if let Some(observer) = state
                .observers
                .iter_mut()
                .find(|observer| observer.handle == handle)
            {
                observer.callback = Some(callback);
            }
        }
        invoked
    }
}

impl IntersectionSource for ManualIntersections {
    fn observe(
        &self,
        band: TriggerBand,
        targets: &[NodeKey],
        callback: IntersectionCallback,
    ) -> Result<ObserverHandle, SurfaceError> {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = ObserverHandle(state.next_handle);
        state.observers.push(ManualObserver {
            handle,
            band,
            targets: targets.to_vec(),
            callback: Some(callback),
        });
        Ok(handle)
    }

    fn disconnect(&self, handle: ObserverHandle) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.observers.len();
        state.observers.retain(|observer| observer.handle != handle);
        before != state.observers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_deliver_filters_to_observed_targets() {
        let source = ManualIntersections::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let a = NodeKey::new(1);
        let b = NodeKey::new(2);
        source
            .observe(
                TriggerBand::default(),
                &[a],
                Box::new(move |batch: &[IntersectionEntry]| sink.borrow_mut().extend(batch.iter().map(|e| e.target))),
            )
            .unwrap();

        let invoked = source.deliver(&[
            IntersectionEntry::entering(b, 0.0),
            IntersectionEntry::entering(a, 10.0),
        ]);
        assert_eq!(invoked, 1);
        assert_eq!(*seen.borrow(), vec![a]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let source = ManualIntersections::new();
        let target = NodeKey::new(1);
        let handle = source
            .observe(TriggerBand::default(), &[target], Box::new(|_: &[IntersectionEntry]| {}))
            .unwrap();

        assert_eq!(source.connected(), 1);
        assert!(source.disconnect(handle));
        assert!(!source.disconnect(handle));
        assert_eq!(source.deliver(&[IntersectionEntry::entering(target, 0.0)]), 0);
    }
}
