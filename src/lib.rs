//! # readnav
//!
//! Reading navigation for long-form pages.
//!
//! [`ReadingNavigator`] mounts the three components of `readnav-core` on one
//! [`Platform`]:
//! - an [`OutlineTracker`] for the "On this page" navigator,
//! - an optional [`ProgressIndicator`] for the top reading-progress bar,
//! - an optional [`OverlayMenu`] for the header's explore menu.
//!
//! The components share nothing but the platform; each can also be used on
//! its own. Browser hosts use `readnav-wasm`; tests and headless hosts plug in
//! the in-memory providers from [`traits`].

pub use readnav_core::{
    ConfigError, MenuConfig, NavConfig, NavError, OutlineConfig, OutlineItemView, OutlineTracker,
    OverlayMenu, Platform, ProgressConfig, ProgressIndicator, RetryPolicy, SlugStyle,
    TiebreakPolicy, TrackerStatus, assign_ids, sample, scan_outline, slugify,
};
pub use readnav_traits as traits;
pub use readnav_types as types;

use log::info;
use readnav_types::{HeadingId, MenuState, NodeKey};
use serde::Serialize;

/// The page elements the optional components attach to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigatorElements {
    /// Trigger and panel of the explore menu.
    pub menu: Option<(NodeKey, NodeKey)>,
    /// Fill element of the progress bar.
    pub progress_fill: Option<NodeKey>,
}

/// Point-in-time view of a mounted navigator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorSnapshot {
    pub outline: Vec<OutlineItemView>,
    pub active_id: Option<HeadingId>,
    pub progress: f64,
    pub menu: Option<MenuState>,
}

pub struct ReadingNavigator {
    outline: OutlineTracker,
    progress: Option<ProgressIndicator>,
    menu: Option<OverlayMenu>,
}

impl ReadingNavigator {
    /// Validates `config` and starts every component whose elements are given.
    ///
    /// A failure part-way through drops the components already started, which
    /// tears them down.
    pub fn mount(
        platform: &Platform,
        config: NavConfig,
        elements: NavigatorElements,
    ) -> Result<Self, NavError> {
        config.validate()?;
        let NavConfig {
            outline,
            progress,
            menu,
        } = config;

        let tracker = OutlineTracker::new(platform, outline);
        tracker.start()?;

        let progress = match elements.progress_fill {
            Some(fill) => {
                let indicator = ProgressIndicator::new(platform, progress, fill);
                indicator.start()?;
                Some(indicator)
            }
            None => None,
        };

        let menu = match elements.menu {
            Some((trigger, panel)) => Some(OverlayMenu::mount(platform, menu, trigger, panel)?),
            None => None,
        };

        info!(
            "[NAVIGATOR] Mounted (progress: {}, menu: {})",
            progress.is_some(),
            menu.is_some()
        );
        Ok(Self {
            outline: tracker,
            progress,
            menu,
        })
    }

    /// Like [`mount`](Self::mount), reading the configuration from JSON.
    pub fn mount_json(
        platform: &Platform,
        config: &str,
        elements: NavigatorElements,
    ) -> Result<Self, NavError> {
        Self::mount(platform, NavConfig::from_json(config)?, elements)
    }

    pub fn outline(&self) -> &OutlineTracker {
        &self.outline
    }

    pub fn progress(&self) -> Option<&ProgressIndicator> {
        self.progress.as_ref()
    }

    pub fn menu(&self) -> Option<&OverlayMenu> {
        self.menu.as_ref()
    }

    pub fn scroll_to(&self, id: &HeadingId) -> Result<(), NavError> {
        self.outline.scroll_to(id)
    }

    pub fn snapshot(&self) -> NavigatorSnapshot {
        NavigatorSnapshot {
            outline: self.outline.outline_view(),
            active_id: self.outline.active_id(),
            progress: self
                .progress
                .as_ref()
                .map(|p| p.current().value())
                .unwrap_or(0.0),
            menu: self.menu.as_ref().map(OverlayMenu::state),
        }
    }

    /// The snapshot as JSON, for hosts that render outside Rust.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }

    /// Tears every component down. Safe to call more than once.
    pub fn teardown(&self) {
        if let Some(menu) = &self.menu {
            menu.teardown();
        }
        if let Some(progress) = &self.progress {
            progress.teardown();
        }
        self.outline.teardown();
    }
}

impl std::fmt::Debug for ReadingNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadingNavigator")
            .field("outline", &self.outline)
            .field("progress", &self.progress.is_some())
            .field("menu", &self.menu)
            .finish()
    }
}
