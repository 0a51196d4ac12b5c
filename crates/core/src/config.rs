//! Configuration for the navigation components.
//!
//! Every field has a default matching the lesson-page layout (a 96px sticky
//! header, content root `#content`). Configs deserialize from camelCase JSON
//! with missing fields falling back to those defaults.

use readnav_types::TriggerBand;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Malformed configuration JSON: {0}")]
    Json(String),
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// How heading text is turned into an id stem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlugStyle {
    /// Lower-case, whitespace runs to `-`, drop everything outside `[a-z0-9-]`.
    #[default]
    Literal,
    /// Transliterate to ASCII first (`Café` -> `cafe`), then apply `Literal`.
    Transliterate,
}

/// Which heading wins when one intersection batch reports several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TiebreakPolicy {
    /// The last intersecting entry in delivery order.
    #[default]
    LastDelivered,
    /// The intersecting entry whose top is closest to the band's top edge.
    NearestBandTop,
}

/// Bounded retry for content that mounts after the page is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Total lookups, including the first one.
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    /// Multiplier applied per retry. `1.0` keeps the delay fixed.
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            initial_delay_ms: 50,
            backoff_factor: 1.0,
            max_delay_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: delay_ms,
            backoff_factor: 1.0,
            max_delay_ms: delay_ms,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let scaled = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent);
        let capped = scaled.min(self.max_delay_ms.max(self.initial_delay_ms) as f64);
        Duration::from_millis(capped.round() as u64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(invalid("retry.maxAttempts", "must be at least 1"));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(invalid(
                "retry.backoffFactor",
                format!("must be a finite number >= 1.0, got {}", self.backoff_factor),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlineConfig {
    /// Selector (element id) of the region whose headings form the outline.
    pub content_root: String,
    pub band: TriggerBand,
    /// Distance kept between the viewport top and a heading after `scroll_to`.
    pub scroll_offset_px: f64,
    pub retry: RetryPolicy,
    pub slug_style: SlugStyle,
    pub tiebreak: TiebreakPolicy,
    /// Rewrite the URL fragment on `scroll_to`.
    pub update_fragment: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            content_root: "content".to_string(),
            band: TriggerBand::default(),
            scroll_offset_px: 96.0,
            retry: RetryPolicy::default(),
            slug_style: SlugStyle::default(),
            tiebreak: TiebreakPolicy::default(),
            update_fragment: true,
        }
    }
}

impl OutlineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_root.trim().is_empty() {
            return Err(invalid("outline.contentRoot", "must not be empty"));
        }
        if !self.band.top_inset_px.is_finite() || self.band.top_inset_px < 0.0 {
            return Err(invalid(
                "outline.band.topInsetPx",
                "must be a finite, non-negative pixel value",
            ));
        }
        if !(0.0..1.0).contains(&self.band.bottom_inset_fraction) {
            return Err(invalid(
                "outline.band.bottomInsetFraction",
                format!("must lie in [0, 1), got {}", self.band.bottom_inset_fraction),
            ));
        }
        if !self.scroll_offset_px.is_finite() || self.scroll_offset_px < 0.0 {
            return Err(invalid(
                "outline.scrollOffsetPx",
                "must be a finite, non-negative pixel value",
            ));
        }
        self.retry.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressConfig {
    /// `transform-origin` written once on the fill element.
    pub transform_origin: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            transform_origin: "left".to_string(),
        }
    }
}

impl ProgressConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transform_origin.trim().is_empty() {
            return Err(invalid("progress.transformOrigin", "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuConfig {
    /// `KeyboardEvent.key` value that dismisses the menu.
    pub cancel_key: String,
    pub open_class: String,
    pub closed_class: String,
    /// Also drive the panel's `display` style.
    pub manage_display: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            cancel_key: "Escape".to_string(),
            open_class: "is-open".to_string(),
            closed_class: "is-closed".to_string(),
            manage_display: true,
        }
    }
}

impl MenuConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cancel_key.is_empty() {
            return Err(invalid("menu.cancelKey", "must not be empty"));
        }
        if self.open_class.contains(char::is_whitespace)
            || self.closed_class.contains(char::is_whitespace)
        {
            return Err(invalid("menu", "class names must not contain whitespace"));
        }
        Ok(())
    }
}

/// Configuration for all three components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavConfig {
    pub outline: OutlineConfig,
    pub progress: ProgressConfig,
    pub menu: MenuConfig,
}

impl NavConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: NavConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.outline.validate()?;
        self.progress.validate()?;
        self.menu.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_page_layout() {
        let config = NavConfig::default();
        assert_eq!(config.outline.content_root, "content");
        assert_eq!(config.outline.band.root_margin(), "-96px 0px -70% 0px");
        assert_eq!(config.outline.scroll_offset_px, 96.0);
        assert_eq!(config.menu.cancel_key, "Escape");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = NavConfig::from_json(
            r#"{ "outline": { "contentRoot": "article", "tiebreak": "nearestBandTop" } }"#,
        )
        .unwrap();

        assert_eq!(config.outline.content_root, "article");
        assert_eq!(config.outline.tiebreak, TiebreakPolicy::NearestBandTop);
        assert_eq!(config.outline.retry, RetryPolicy::default());
        assert_eq!(config.menu, MenuConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        let result = NavConfig::from_json("{ outline: ");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let result = NavConfig::from_json(r#"{ "outline": { "band": { "bottomInsetFraction": 1.5 } } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "outline.band.bottomInsetFraction", .. })
        ));

        let result = NavConfig::from_json(r#"{ "outline": { "retry": { "maxAttempts": 0 } } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "retry.maxAttempts", .. })
        ));
    }

    #[test]
    fn test_fixed_retry_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(50));
        assert_eq!(policy.delay_after(15), Duration::from_millis(50));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_delay_ms: 50,
            backoff_factor: 2.0,
            max_delay_ms: 300,
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(50));
        assert_eq!(policy.delay_after(2), Duration::from_millis(100));
        assert_eq!(policy.delay_after(3), Duration::from_millis(200));
        assert_eq!(policy.delay_after(4), Duration::from_millis(300));
        assert_eq!(policy.delay_after(9), Duration::from_millis(300));
    }
}
