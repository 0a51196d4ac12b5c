use super::{OutlineItemView, ScannedOutline, resolve_active, scan_outline};
use crate::config::OutlineConfig;
use crate::error::NavError;
use crate::platform::Platform;
use log::{debug, info, warn};
use readnav_traits::{
    IntersectionEntry, ObserverHandle, ScrollBehavior, SurfaceError, TaskHandle,
};
use readnav_types::{HeadingId, Outline};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Lifecycle of an [`OutlineTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStatus {
    /// Constructed, `start()` not called yet.
    Idle,
    /// The content root was missing on `attempt` lookups; a retry is pending.
    Waiting { attempt: u32 },
    /// Outline built; observing if it has entries.
    Ready,
    /// The content root never appeared within the retry budget.
    Abandoned,
    TornDown,
}

type ActiveListener = Box<dyn FnMut(Option<&HeadingId>)>;
type OutlineListener = Box<dyn FnMut(&[OutlineItemView])>;

struct TrackerInner {
    platform: Platform,
    config: OutlineConfig,
    status: Cell<TrackerStatus>,
    scanned: RefCell<ScannedOutline>,
    active: RefCell<Option<HeadingId>>,
    retry_timer: Cell<Option<TaskHandle>>,
    observer: Cell<Option<ObserverHandle>>,
    listeners: RefCell<Vec<ActiveListener>>,
    outline_listeners: RefCell<Vec<OutlineListener>>,
}

/// Builds the page outline and keeps track of the heading being read.
///
/// The tracker owns its retry timer and intersection observer. Both are
/// released by [`teardown`](Self::teardown), which also runs on drop.
pub struct OutlineTracker {
    inner: Rc<TrackerInner>,
}

impl OutlineTracker {
    pub fn new(platform: &Platform, config: OutlineConfig) -> Self {
        Self {
            inner: Rc::new(TrackerInner {
                platform: platform.clone(),
                config,
                status: Cell::new(TrackerStatus::Idle),
                scanned: RefCell::new(ScannedOutline::default()),
                active: RefCell::new(None),
                retry_timer: Cell::new(None),
                observer: Cell::new(None),
                listeners: RefCell::new(Vec::new()),
                outline_listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Looks up the content root, retrying on the configured schedule until it
    /// mounts, then starts observing its headings.
    ///
    /// Calling `start` on a tracker that already started is a no-op. An
    /// invalid configuration is rejected before anything is scheduled.
    pub fn start(&self) -> Result<(), NavError> {
        match self.inner.status.get() {
            TrackerStatus::TornDown => Err(NavError::TornDown),
            TrackerStatus::Idle => {
                self.inner.config.validate()?;
                run_attempt(&self.inner, 1);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Drops the current outline and scans again from the first attempt.
    ///
    /// The active heading survives if it is still part of the new outline.
    /// While the content root is missing the outline stays empty, and
    /// outline subscribers are told so.
    pub fn rescan(&self) -> Result<(), NavError> {
        let inner = &self.inner;
        if inner.status.get() == TrackerStatus::TornDown {
            return Err(NavError::TornDown);
        }
        inner.config.validate()?;
        inner.release_handles();
        *inner.scanned.borrow_mut() = ScannedOutline::default();
        inner.status.set(TrackerStatus::Idle);
        run_attempt(inner, 1);

        let stale = inner
            .active
            .borrow()
            .as_ref()
            .is_some_and(|id| !inner.scanned.borrow().outline.contains(id));
        if stale {
            set_active(inner, None);
        }
        if inner.status.get() != TrackerStatus::Ready {
            notify_outline(inner);
        }
        Ok(())
    }

    /// Smooth-scrolls so the heading lands the configured offset below the
    /// viewport top, and marks it active immediately.
    pub fn scroll_to(&self, id: &HeadingId) -> Result<(), NavError> {
        let inner = &self.inner;
        if inner.status.get() == TrackerStatus::TornDown {
            return Err(NavError::TornDown);
        }
        let node = inner
            .scanned
            .borrow()
            .node_for(id)
            .ok_or_else(|| NavError::UnknownHeading(id.clone()))?;
        let top = inner
            .platform
            .document
            .document_top(node)
            .ok_or(SurfaceError::UnknownNode(node))?;

        let target = (top - inner.config.scroll_offset_px).max(0.0);
        debug!("[OUTLINE] Scrolling to '{}' at {:.0}px", id, target);
        inner.platform.viewport.scroll_to(target, ScrollBehavior::Smooth);
        if inner.config.update_fragment {
            inner.platform.viewport.set_fragment(id);
        }
        set_active(inner, Some(id.clone()));
        Ok(())
    }

    pub fn outline(&self) -> Outline {
        self.inner.scanned.borrow().outline.clone()
    }

    pub fn active_id(&self) -> Option<HeadingId> {
        self.inner.active.borrow().clone()
    }

    pub fn status(&self) -> TrackerStatus {
        self.inner.status.get()
    }

    /// Navigator rows for the current outline and active heading.
    pub fn outline_view(&self) -> Vec<OutlineItemView> {
        OutlineItemView::build(
            &self.inner.scanned.borrow().outline,
            self.inner.active.borrow().as_ref(),
        )
    }

    /// Registers a callback run whenever the active heading changes.
    pub fn subscribe(&self, listener: impl FnMut(Option<&HeadingId>) + 'static) {
        if self.inner.status.get() != TrackerStatus::TornDown {
            self.inner.listeners.borrow_mut().push(Box::new(listener));
        }
    }

    /// Registers a callback run with the navigator rows each time an outline
    /// is built, including builds that land after a retry or a rescan.
    pub fn subscribe_outline(&self, listener: impl FnMut(&[OutlineItemView]) + 'static) {
        if self.inner.status.get() != TrackerStatus::TornDown {
            self.inner.outline_listeners.borrow_mut().push(Box::new(listener));
        }
    }

    /// Cancels any pending retry, disconnects the observer and drops
    /// subscribers. Calling it again does nothing.
    pub fn teardown(&self) {
        let inner = &self.inner;
        if inner.status.get() == TrackerStatus::TornDown {
            return;
        }
        inner.release_handles();
        inner.status.set(TrackerStatus::TornDown);
        inner.listeners.borrow_mut().clear();
        inner.outline_listeners.borrow_mut().clear();
        *inner.active.borrow_mut() = None;
        *inner.scanned.borrow_mut() = ScannedOutline::default();
        info!("[OUTLINE] Tracker for '{}' torn down", inner.config.content_root);
    }
}

impl Drop for OutlineTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for OutlineTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineTracker")
            .field("status", &self.inner.status.get())
            .field("headings", &self.inner.scanned.borrow().outline.len())
            .field("active", &self.inner.active.borrow())
            .finish()
    }
}

impl TrackerInner {
    fn release_handles(&self) {
        if let Some(timer) = self.retry_timer.take() {
            self.platform.scheduler.cancel(timer);
        }
        if let Some(observer) = self.observer.take() {
            self.platform.intersections.disconnect(observer);
        }
    }
}

fn run_attempt(inner: &Rc<TrackerInner>, attempt: u32) {
    inner.retry_timer.set(None);
    let config = &inner.config;

    if let Some(scanned) = scan_outline(
        inner.platform.document.as_ref(),
        &config.content_root,
        config.slug_style,
    ) {
        install(inner, scanned);
        return;
    }

    if attempt >= config.retry.max_attempts {
        warn!(
            "[OUTLINE] Content root '{}' not found after {} attempts; giving up",
            config.content_root, attempt
        );
        inner.status.set(TrackerStatus::Abandoned);
        return;
    }

    let delay = config.retry.delay_after(attempt);
    debug!(
        "[OUTLINE] Content root '{}' missing (attempt {}), retrying in {:?}",
        config.content_root, attempt, delay
    );
    let weak: Weak<TrackerInner> = Rc::downgrade(inner);
    let handle = inner.platform.scheduler.set_timeout(
        delay,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                run_attempt(&inner, attempt + 1);
            }
        }),
    );
    inner.retry_timer.set(Some(handle));
    inner.status.set(TrackerStatus::Waiting { attempt });
}

fn install(inner: &Rc<TrackerInner>, scanned: ScannedOutline) {
    let nodes = scanned.nodes.clone();
    *inner.scanned.borrow_mut() = scanned;
    inner.status.set(TrackerStatus::Ready);
    info!(
        "[OUTLINE] Tracking {} headings under '{}'",
        nodes.len(),
        inner.config.content_root
    );
    notify_outline(inner);
    if nodes.is_empty() {
        return;
    }

    let weak = Rc::downgrade(inner);
    let observed = inner.platform.intersections.observe(
        inner.config.band,
        &nodes,
        Box::new(move |batch: &[IntersectionEntry]| {
            if let Some(inner) = weak.upgrade() {
                on_intersections(&inner, batch);
            }
        }),
    );
    match observed {
        Ok(handle) => inner.observer.set(Some(handle)),
        Err(e) => warn!("[OUTLINE] Active-heading tracking unavailable: {}", e),
    }
}

fn notify_outline(inner: &Rc<TrackerInner>) {
    let rows = OutlineItemView::build(
        &inner.scanned.borrow().outline,
        inner.active.borrow().as_ref(),
    );
    let mut listeners = std::mem::take(&mut *inner.outline_listeners.borrow_mut());
    for listener in listeners.iter_mut() {
        listener(&rows);
    }
    if inner.status.get() != TrackerStatus::TornDown {
        let mut slot = inner.outline_listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }
}

fn on_intersections(inner: &Rc<TrackerInner>, batch: &[IntersectionEntry]) {
    if inner.status.get() != TrackerStatus::Ready {
        return;
    }
    let resolved = resolve_active(
        batch,
        &inner.scanned.borrow(),
        &inner.config.band,
        inner.config.tiebreak,
    );
    if resolved.is_some() {
        set_active(inner, resolved);
    }
}

fn set_active(inner: &Rc<TrackerInner>, next: Option<HeadingId>) {
    if *inner.active.borrow() == next {
        return;
    }
    debug!("[OUTLINE] Active heading -> {:?}", next.as_ref().map(HeadingId::as_str));
    *inner.active.borrow_mut() = next.clone();

    // Listeners may subscribe or tear down while being notified.
    let mut listeners = std::mem::take(&mut *inner.listeners.borrow_mut());
    for listener in listeners.iter_mut() {
        listener(next.as_ref());
    }
    if inner.status.get() != TrackerStatus::TornDown {
        let mut slot = inner.listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }
}
