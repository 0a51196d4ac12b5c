//! Error types for the navigation components.
//!
//! Components absorb platform failures (log and carry on); these errors only
//! surface from explicit calls such as `scroll_to` or configuration parsing.

use crate::config::ConfigError;
use readnav_traits::SurfaceError;
use readnav_types::HeadingId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    #[error("No heading with id '{0}' in the outline")]
    UnknownHeading(HeadingId),
    #[error("Component has been torn down")]
    TornDown,
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
}
