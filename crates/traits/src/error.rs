use readnav_types::NodeKey;
use thiserror::Error;

/// Error type for platform surface mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeKey),

    #[error("Surface rejected update of {node}: {message}")]
    Rejected { node: NodeKey, message: String },

    #[error("Platform facility unavailable: {0}")]
    Unavailable(String),
}
