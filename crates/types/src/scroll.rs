use serde::{Deserialize, Serialize};

/// Vertical scroll geometry as reported by a viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    /// Current vertical scroll offset.
    pub scroll_top: f64,
    /// Total document height.
    pub scroll_height: f64,
    /// Visible viewport height.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    /// Distance the document can scroll; negative for pages shorter than the viewport.
    pub fn scrollable_distance(&self) -> f64 {
        self.scroll_height - self.viewport_height
    }
}

/// Reading completion in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScrollProgress(f64);

impl ScrollProgress {
    pub const START: ScrollProgress = ScrollProgress(0.0);
    pub const COMPLETE: ScrollProgress = ScrollProgress(1.0);

    /// Clamps into `[0, 1]`; non-finite input maps to `0`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    /// Progress for the given metrics. Pages that cannot scroll report `0`.
    pub fn from_metrics(metrics: ScrollMetrics) -> Self {
        let distance = metrics.scrollable_distance();
        if distance.is_nan() || distance <= 0.0 {
            return Self::START;
        }
        Self::new(metrics.scroll_top / distance)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// CSS transform for a left-anchored fill element.
    pub fn to_scale_x(self) -> String {
        format!("scaleX({})", self.0)
    }
}

/// Sub-region of the viewport in which a heading counts as "active".
///
/// The band starts `top_inset_px` below the viewport top (the sticky header)
/// and ends `bottom_inset_fraction` of the viewport height above its bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriggerBand {
    pub top_inset_px: f64,
    pub bottom_inset_fraction: f64,
}

impl Default for TriggerBand {
    fn default() -> Self {
        Self {
            top_inset_px: 96.0,
            bottom_inset_fraction: 0.70,
        }
    }
}

impl TriggerBand {
    /// Renders the band as an IntersectionObserver `rootMargin` string.
    pub fn root_margin(&self) -> String {
        format!(
            "-{}px 0px -{}% 0px",
            format_number(self.top_inset_px),
            format_number(self.bottom_inset_fraction * 100.0)
        )
    }

    /// Band edges `(top, bottom)` in viewport coordinates.
    pub fn edges(&self, viewport_height: f64) -> (f64, f64) {
        let top = self.top_inset_px;
        let bottom = viewport_height * (1.0 - self.bottom_inset_fraction);
        (top, bottom.max(top))
    }

    /// Distance from a bounding top (viewport coordinates) to the band's top edge.
    pub fn distance_to_top(&self, bounding_top: f64) -> f64 {
        (bounding_top - self.top_inset_px).abs()
    }
}

fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
