//! EventHub trait for document-level pointer and keyboard listeners.

use readnav_types::NodeKey;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
}

/// A UI event as seen by document-level listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A click. `path` lists the known elements on the event's composed path,
    /// innermost first.
    Click { path: Vec<NodeKey> },
    KeyDown { key: String },
}

impl UiEvent {
    pub fn click(path: impl IntoIterator<Item = NodeKey>) -> Self {
        UiEvent::Click {
            path: path.into_iter().collect(),
        }
    }

    pub fn key(key: impl Into<String>) -> Self {
        UiEvent::KeyDown { key: key.into() }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Click { .. } => EventKind::Click,
            UiEvent::KeyDown { .. } => EventKind::KeyDown,
        }
    }

    /// Whether the event target is `node` or one of its descendants.
    pub fn is_within(&self, node: NodeKey) -> bool {
        match self {
            UiEvent::Click { path } => path.contains(&node),
            UiEvent::KeyDown { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub type Listener = Box<dyn FnMut(&UiEvent)>;

pub trait EventHub {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId;

    /// Returns `false` if the listener was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

struct Registration {
    id: ListenerId,
    kind: EventKind,
    listener: Option<Listener>,
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    registrations: Vec<Registration>,
}

/// An event hub whose events are dispatched by hand.
///
/// Dispatch follows DOM rules for a single target: listeners added during a
/// dispatch do not see that event, listeners removed during it are skipped.
#[derive(Default)]
pub struct ManualEventHub {
    state: RefCell<HubState>,
}

impl ManualEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .registrations
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.state.borrow().registrations.len()
    }

    /// Dispatches `event`, returning the number of listeners invoked.
    pub fn dispatch(&self, event: &UiEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<ListenerId> = self
            .state
            .borrow()
            .registrations
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| registration.id)
            .collect();

        let mut invoked = 0;
        for id in snapshot {
            let taken = self
                .state
                .borrow_mut()
                .registrations
                .iter_mut()
                .find(|registration| registration.id == id)
                .and_then(|registration| registration.listener.take());
            let Some(mut listener) = taken else {
                continue;
            };
            listener(event);
            invoked += 1;

            if let Some(registration) = self
                .state
                .borrow_mut()
                .registrations
                .iter_mut()
                .find(|registration| registration.id == id)
            {
                registration.listener = Some(listener);
            }
        }
        invoked
    }
}

impl EventHub for ManualEventHub {
    fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        state.registrations.push(Registration {
            id,
            kind,
            listener: Some(listener),
        });
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.registrations.len();
        state
            .registrations
            .retain(|registration| registration.id != id);
        before != state.registrations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_by_kind() {
        let hub = ManualEventHub::new();
        let clicks = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&clicks);

        hub.add_listener(EventKind::Click, Box::new(move |_: &UiEvent| *counter.borrow_mut() += 1));
        hub.add_listener(EventKind::KeyDown, Box::new(|_: &UiEvent| {}));

        assert_eq!(hub.dispatch(&UiEvent::click([NodeKey::new(100)])), 1);
        assert_eq!(hub.dispatch(&UiEvent::key("Escape")), 1);
        assert_eq!(*clicks.borrow(), 1);
    }

    #[test]
    fn test_listener_added_during_dispatch_misses_current_event() {
        let hub = Rc::new(ManualEventHub::new());
        let inner = Rc::clone(&hub);

        hub.add_listener(
            EventKind::Click,
            Box::new(move |_: &UiEvent| {
                inner.add_listener(EventKind::Click, Box::new(|_: &UiEvent| {}));
            }),
        );

        assert_eq!(hub.dispatch(&UiEvent::click([NodeKey::new(100)])), 1);
        assert_eq!(hub.listener_count(EventKind::Click), 2);
    }

    #[test]
    fn test_listener_removing_itself() {
        let hub = Rc::new(ManualEventHub::new());
        let inner = Rc::clone(&hub);
        let slot: Rc<RefCell<Option<ListenerId>>> = Rc::new(RefCell::new(None));
        let own_id = Rc::clone(&slot);

        let id = hub.add_listener(
            EventKind::KeyDown,
            Box::new(move |_: &UiEvent| {
                if let Some(id) = *own_id.borrow() {
                    inner.remove_listener(id);
                }
            }),
        );
        *slot.borrow_mut() = Some(id);

        assert_eq!(hub.dispatch(&UiEvent::key("x")), 1);
        assert_eq!(hub.total_listeners(), 0);
        assert_eq!(hub.dispatch(&UiEvent::key("x")), 0);
    }

    #[test]
    fn test_is_within_uses_path() {
        let panel = NodeKey::new(4);
        let link = NodeKey::new(9);
        assert!(UiEvent::click([link, panel]).is_within(panel));
        assert!(!UiEvent::click([link]).is_within(panel));
        assert!(!UiEvent::key("Escape").is_within(panel));
    }
}
