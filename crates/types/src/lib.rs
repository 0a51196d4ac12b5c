pub mod ids;
pub mod menu;
pub mod outline;
pub mod scroll;

pub use ids::{HeadingId, NodeKey};
pub use menu::MenuState;
pub use outline::{HeadingEntry, HeadingLevel, InvalidHeadingLevel, Outline};
pub use scroll::{ScrollMetrics, ScrollProgress, TriggerBand};
