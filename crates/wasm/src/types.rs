//! Configuration accepted by the JavaScript constructor.

use readnav_core::NavConfig;
use serde::{Deserialize, Serialize};

/// Ids of the page elements the navigator attaches to.
///
/// A missing element only disables the component that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    /// Container the "On this page" list is rendered into.
    pub toc_container: String,
    pub menu_trigger: String,
    pub menu_panel: String,
    pub progress_fill: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            toc_container: "toc".to_string(),
            menu_trigger: "explore-trigger".to_string(),
            menu_panel: "explore-panel".to_string(),
            progress_fill: "reading-progress-fill".to_string(),
        }
    }
}

/// `NavConfig` plus the element ids, as one camelCase object:
///
/// ```javascript
/// new ReadingNav({
///   outline: { contentRoot: "content", scrollOffsetPx: 96 },
///   elements: { tocContainer: "toc" },
/// });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BindingConfig {
    #[serde(flatten)]
    pub nav: NavConfig,
    pub elements: ElementIds,
}
