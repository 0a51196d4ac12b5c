//! # readnav-core
//!
//! Platform-agnostic reading-navigation core.
//!
//! This crate provides the three page-level navigation aids:
//! - **outline**: heading discovery, stable id assignment, active-heading tracking
//! - **progress**: per-frame reading-progress sampling driving a fill element
//! - **menu**: the header overlay menu's open/closed state and dismissal
//! - **ids**: heading slugs and collision-free id allocation
//! - **config**: serde-backed configuration with validated defaults
//! - **error**: error types for the components
//!
//! ## Design Principle
//!
//! This crate has **no platform dependencies**:
//! - No DOM access (`web-sys`)
//! - No timers or animation frames of its own
//! - No threading; everything runs on the UI thread
//!
//! All platform functionality is provided through the `readnav-traits`
//! seams, bundled in a [`Platform`].

// Re-export foundation crates
pub use readnav_traits as traits;
pub use readnav_types as types;

pub mod config;
pub mod error;
pub mod ids;
pub mod menu;
pub mod outline;
pub mod platform;
pub mod progress;

pub use config::{
    ConfigError, MenuConfig, NavConfig, OutlineConfig, ProgressConfig, RetryPolicy, SlugStyle,
    TiebreakPolicy,
};
pub use error::NavError;
pub use ids::{IdAssignment, assign_ids, slugify};
pub use menu::OverlayMenu;
pub use outline::{OutlineItemView, OutlineTracker, ScannedOutline, TrackerStatus, scan_outline};
pub use platform::Platform;
pub use progress::{ProgressIndicator, sample};
