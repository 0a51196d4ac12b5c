//! Reading-progress bar driven once per display frame.

use crate::config::ProgressConfig;
use crate::error::NavError;
use crate::platform::Platform;
use log::{debug, info, warn};
use readnav_traits::{TaskHandle, Viewport};
use readnav_types::{NodeKey, ScrollProgress};
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Reads the viewport and returns how far through the document the reader is.
pub fn sample(viewport: &dyn Viewport) -> ScrollProgress {
    ScrollProgress::from_metrics(viewport.metrics())
}

struct ProgressInner {
    platform: Platform,
    config: ProgressConfig,
    fill: NodeKey,
    frame: Cell<Option<TaskHandle>>,
    running: Cell<bool>,
    torn_down: Cell<bool>,
    origin_written: Cell<bool>,
    current: Cell<ScrollProgress>,
    written: Cell<Option<ScrollProgress>>,
    frames_sampled: Cell<u64>,
}

/// Scales a fill element horizontally to match reading progress.
pub struct ProgressIndicator {
    inner: Rc<ProgressInner>,
}

impl ProgressIndicator {
    pub fn new(platform: &Platform, config: ProgressConfig, fill: NodeKey) -> Self {
        Self {
            inner: Rc::new(ProgressInner {
                platform: platform.clone(),
                config,
                fill,
                frame: Cell::new(None),
                running: Cell::new(false),
                torn_down: Cell::new(false),
                origin_written: Cell::new(false),
                current: Cell::new(ScrollProgress::START),
                written: Cell::new(None),
                frames_sampled: Cell::new(0),
            }),
        }
    }

    /// Starts the frame loop. A no-op while already running.
    pub fn start(&self) -> Result<(), NavError> {
        let inner = &self.inner;
        if inner.torn_down.get() {
            return Err(NavError::TornDown);
        }
        if inner.running.get() {
            return Ok(());
        }
        inner.config.validate()?;
        if !inner.origin_written.get() {
            inner.platform.document.set_style(
                inner.fill,
                "transform-origin",
                &inner.config.transform_origin,
            )?;
            inner.origin_written.set(true);
        }
        inner.running.set(true);
        schedule(inner);
        info!("[PROGRESS] Started on {}", inner.fill);
        Ok(())
    }

    /// Stops the loop, leaving no frame callback pending. `start` resumes it.
    pub fn stop(&self) {
        let inner = &self.inner;
        inner.running.set(false);
        if let Some(frame) = inner.frame.take() {
            inner.platform.scheduler.cancel(frame);
            debug!("[PROGRESS] Stopped after {} frames", inner.frames_sampled.get());
        }
    }

    pub fn teardown(&self) {
        if self.inner.torn_down.replace(true) {
            return;
        }
        self.stop();
    }

    /// The value written by the most recent frame.
    pub fn current(&self) -> ScrollProgress {
        self.inner.current.get()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn frames_sampled(&self) -> u64 {
        self.inner.frames_sampled.get()
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn schedule(inner: &Rc<ProgressInner>) {
    let weak: Weak<ProgressInner> = Rc::downgrade(inner);
    let handle = inner.platform.scheduler.request_frame(Box::new(move |_timestamp| {
        if let Some(inner) = weak.upgrade() {
            on_frame(&inner);
        }
    }));
    inner.frame.set(Some(handle));
}

fn on_frame(inner: &Rc<ProgressInner>) {
    inner.frame.set(None);
    if !inner.running.get() {
        return;
    }

    let progress = sample(inner.platform.viewport.as_ref());
    inner.current.set(progress);
    inner.frames_sampled.set(inner.frames_sampled.get() + 1);

    if inner.written.get() != Some(progress) {
        match inner
            .platform
            .document
            .set_style(inner.fill, "transform", &progress.to_scale_x())
        {
            Ok(()) => inner.written.set(Some(progress)),
            Err(e) => warn!("[PROGRESS] Could not update fill: {}", e),
        }
    }

    schedule(inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fixture::Fixture;
    use readnav_traits::InMemoryViewport;
    use readnav_types::ScrollMetrics;

    #[test]
    fn test_sample_basic() {
        let viewport = InMemoryViewport::new(3000.0, 1000.0);
        assert_eq!(sample(&viewport), ScrollProgress::START);

        viewport.set_scroll_top(1000.0);
        assert_eq!(sample(&viewport).value(), 0.5);

        viewport.set_scroll_top(2000.0);
        assert_eq!(sample(&viewport), ScrollProgress::COMPLETE);
    }

    #[test]
    fn test_sample_short_page_is_zero() {
        let viewport = InMemoryViewport::new(800.0, 800.0);
        assert_eq!(sample(&viewport).value(), 0.0);

        viewport.set_metrics(ScrollMetrics::new(0.0, 600.0, 800.0));
        assert_eq!(sample(&viewport).value(), 0.0);
    }

    #[test]
    fn test_sample_clamps_overscroll_and_nan() {
        let viewport = InMemoryViewport::new(3000.0, 1000.0);
        viewport.set_metrics(ScrollMetrics::new(2600.0, 3000.0, 1000.0));
        assert_eq!(sample(&viewport).value(), 1.0);

        viewport.set_metrics(ScrollMetrics::new(-40.0, 3000.0, 1000.0));
        assert_eq!(sample(&viewport).value(), 0.0);

        viewport.set_metrics(ScrollMetrics::new(f64::NAN, 3000.0, 1000.0));
        assert_eq!(sample(&viewport).value(), 0.0);
    }

    #[test]
    fn test_start_writes_origin_and_schedules_frame() {
        let fx = Fixture::new();
        let fill = fx.document.add_element();
        let bar = ProgressIndicator::new(&fx.platform(), ProgressConfig::default(), fill);

        bar.start().unwrap();

        assert_eq!(fx.document.style(fill, "transform-origin").as_deref(), Some("left"));
        assert_eq!(fx.document.style(fill, "transform"), None);
        assert_eq!(fx.scheduler.pending_frames(), 1);
        assert!(bar.is_running());
    }

    #[test]
    fn test_each_frame_resamples_and_reschedules() {
        let fx = Fixture::new();
        let fill = fx.document.add_element();
        let bar = ProgressIndicator::new(&fx.platform(), ProgressConfig::default(), fill);
        bar.start().unwrap();

        fx.scheduler.run_frame();
        assert_eq!(fx.document.style(fill, "transform").as_deref(), Some("scaleX(0)"));
        assert_eq!(fx.scheduler.pending_frames(), 1);

        fx.viewport.set_scroll_top(500.0);
        fx.scheduler.run_frame();
        assert_eq!(fx.document.style(fill, "transform").as_deref(), Some("scaleX(0.25)"));
        assert_eq!(bar.current().value(), 0.25);
        assert_eq!(bar.frames_sampled(), 2);
    }

    #[test]
    fn test_unchanged_progress_is_not_rewritten() {
        let fx = Fixture::new();
        let fill = fx.document.add_element();
        let bar = ProgressIndicator::new(&fx.platform(), ProgressConfig::default(), fill);
        bar.start().unwrap();

        fx.scheduler.run_frame();
        let writes = fx.document.write_count();
        fx.scheduler.run_frame();
        fx.scheduler.run_frame();

        assert_eq!(fx.document.write_count(), writes);
        assert_eq!(bar.frames_sampled(), 3);
    }

    #[test]
    fn test_double_start_runs_one_loop() {
        let fx = Fixture::new();
        let fill = fx.document.add_element();
        let bar = ProgressIndicator::new(&fx.platform(), ProgressConfig::default(), fill);

        bar.start().unwrap();
        bar.start().unwrap();
        assert_eq!(fx.scheduler.pending_frames(), 1);

        fx.scheduler.run_frame();
        assert_eq!(fx.scheduler.pending_frames(), 1);
    }

    #[test]
    fn test_stop_leaves_nothing_pending() {
        let fx = Fixture::new();
        let fill = fx.document.add_element();
        let bar = ProgressIndicator::new(&fx.platform(), ProgressConfig::default(), fill);
        bar.start().unwrap();
        fx.scheduler.run_frame();

        bar.stop();

        assert_eq!(fx.scheduler.pending_frames(), 0);
        assert!(!bar.is_running());
        assert_eq!(fx.scheduler.run_frame(), 0);

        bar.start().unwrap();
        assert_eq!(fx.scheduler.pending_frames(), 1);
    }

    #[test]
    fn test_teardown_twice_and_restart_refused() {
        let fx = Fixture::new();
        let fill = fx.document.add_element();
        let bar = ProgressIndicator::new(&fx.platform(), ProgressConfig::default(), fill);
        bar.start().unwrap();

        bar.teardown();
        bar.teardown();

        assert_eq!(fx.scheduler.cancelled(), 1);
        assert_eq!(fx.scheduler.pending_frames(), 0);
        assert_eq!(bar.start(), Err(NavError::TornDown));
    }

    #[test]
    fn test_missing_fill_is_reported() {
        let fx = Fixture::new();
        let bar = ProgressIndicator::new(
            &fx.platform(),
            ProgressConfig::default(),
            NodeKey::new(4242),
        );
        assert!(matches!(bar.start(), Err(NavError::Surface(_))));
        assert!(!bar.is_running());
    }

    #[test]
    fn test_blank_origin_is_rejected_before_writing() {
        let fx = Fixture::new();
        let fill = fx.document.add_element();
        let config = ProgressConfig {
            transform_origin: "  ".to_string(),
        };
        let bar = ProgressIndicator::new(&fx.platform(), config, fill);

        assert!(matches!(bar.start(), Err(NavError::Config(_))));
        assert_eq!(fx.document.write_count(), 0);
        assert_eq!(fx.scheduler.pending_frames(), 0);
    }
}
