//! The header's "explore" overlay menu.
//!
//! The trigger toggles the panel; while open, a click outside both elements or
//! the cancel key closes it. The outside-click listener exists only while the
//! menu is open.

use crate::config::MenuConfig;
use crate::error::NavError;
use crate::platform::Platform;
use log::{debug, info, warn};
use readnav_traits::{EventKind, ListenerId, SurfaceError, UiEvent};
use readnav_types::{MenuState, NodeKey};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct MenuInner {
    platform: Platform,
    config: MenuConfig,
    trigger: NodeKey,
    panel: NodeKey,
    state: Cell<MenuState>,
    mount_listeners: RefCell<Vec<ListenerId>>,
    outside_listener: Cell<Option<ListenerId>>,
    torn_down: Cell<bool>,
}

pub struct OverlayMenu {
    inner: Rc<MenuInner>,
}

impl OverlayMenu {
    /// Wires the menu to its trigger and panel, rendering the closed state.
    pub fn mount(
        platform: &Platform,
        config: MenuConfig,
        trigger: NodeKey,
        panel: NodeKey,
    ) -> Result<Self, NavError> {
        config.validate()?;
        let inner = Rc::new(MenuInner {
            platform: platform.clone(),
            config,
            trigger,
            panel,
            state: Cell::new(MenuState::Closed),
            mount_listeners: RefCell::new(Vec::new()),
            outside_listener: Cell::new(None),
            torn_down: Cell::new(false),
        });
        inner.render()?;

        let weak = Rc::downgrade(&inner);
        let on_trigger = platform.events.add_listener(
            EventKind::Click,
            Box::new(move |event: &UiEvent| {
                if let Some(inner) = weak.upgrade() {
                    if event.is_within(inner.trigger) {
                        toggle(&inner);
                    }
                }
            }),
        );

        let weak = Rc::downgrade(&inner);
        let on_key = platform.events.add_listener(
            EventKind::KeyDown,
            Box::new(move |event: &UiEvent| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let UiEvent::KeyDown { key } = event {
                    if inner.state.get().is_open() && *key == inner.config.cancel_key {
                        debug!("[MENU] '{}' pressed, closing", key);
                        close(&inner);
                    }
                }
            }),
        );

        inner.mount_listeners.borrow_mut().extend([on_trigger, on_key]);
        info!("[MENU] Mounted on trigger {} / panel {}", trigger, panel);
        Ok(Self { inner })
    }

    pub fn open(&self) {
        open(&self.inner);
    }

    pub fn close(&self) {
        close(&self.inner);
    }

    pub fn toggle(&self) {
        toggle(&self.inner);
    }

    pub fn state(&self) -> MenuState {
        self.inner.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.get().is_open()
    }

    /// Every listener this menu currently holds on the event hub.
    pub fn listener_ids(&self) -> Vec<ListenerId> {
        let mut ids = self.inner.mount_listeners.borrow().clone();
        ids.extend(self.inner.outside_listener.get());
        ids
    }

    /// Removes every listener, leaving an open panel rendered closed. Later
    /// calls do nothing.
    pub fn teardown(&self) {
        let inner = &self.inner;
        if inner.torn_down.replace(true) {
            return;
        }
        inner.detach_outside();
        for id in inner.mount_listeners.borrow_mut().drain(..) {
            inner.platform.events.remove_listener(id);
        }
        if inner.state.replace(MenuState::Closed).is_open() {
            inner.rerender();
        }
        info!("[MENU] Torn down");
    }
}

impl Drop for OverlayMenu {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for OverlayMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayMenu")
            .field("state", &self.inner.state.get())
            .field("trigger", &self.inner.trigger)
            .field("panel", &self.inner.panel)
            .finish()
    }
}

impl MenuInner {
    fn render(&self) -> Result<(), SurfaceError> {
        let open = self.state.get().is_open();
        let document = &self.platform.document;
        document.set_attribute(self.trigger, "aria-expanded", self.state.get().aria_expanded())?;
        document.set_attribute(self.panel, "aria-hidden", if open { "false" } else { "true" })?;
        document.set_class(self.panel, &self.config.open_class, open)?;
        document.set_class(self.panel, &self.config.closed_class, !open)?;
        if self.config.manage_display {
            document.set_style(self.panel, "display", if open { "block" } else { "none" })?;
        }
        Ok(())
    }

    fn rerender(&self) {
        if let Err(e) = self.render() {
            warn!("[MENU] Could not reflect state {:?}: {}", self.state.get(), e);
        }
    }

    fn detach_outside(&self) {
        if let Some(id) = self.outside_listener.take() {
            self.platform.events.remove_listener(id);
        }
    }
}

fn open(inner: &Rc<MenuInner>) {
    if inner.torn_down.get() || inner.state.get().is_open() {
        return;
    }
    inner.state.set(MenuState::Open);
    inner.rerender();

    if inner.outside_listener.get().is_none() {
        let weak: Weak<MenuInner> = Rc::downgrade(inner);
        let id = inner.platform.events.add_listener(
            EventKind::Click,
            Box::new(move |event: &UiEvent| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if !event.is_within(inner.trigger) && !event.is_within(inner.panel) {
                    debug!("[MENU] Outside click, closing");
                    close(&inner);
                }
            }),
        );
        inner.outside_listener.set(Some(id));
    }
    debug!("[MENU] Opened");
}

fn close(inner: &Rc<MenuInner>) {
    if inner.torn_down.get() || !inner.state.get().is_open() {
        return;
    }
    inner.state.set(MenuState::Closed);
    inner.detach_outside();
    inner.rerender();
    debug!("[MENU] Closed");
}

fn toggle(inner: &Rc<MenuInner>) {
    if inner.state.get().is_open() {
        close(inner);
    } else {
        open(inner);
    }
}
