//! Error types for voxel editing operations

use thiserror::Error;

/// Result type for editing operations
pub type Result<T> = std::result::Result<T, EditError>;

/// Errors surfaced by the editing core.
///
/// Clicking empty space, undoing an empty history and writing outside the
/// grid are deliberately *not* errors; they resolve to no-ops.
#[derive(Error, Debug)]
pub enum EditError {
    /// A batch lifecycle call was made in the wrong state, e.g. a second
    /// `begin_batch` while one is still open
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// No tool with this name is registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// No animation frame with this index exists
    #[error("Unknown frame: {0}")]
    UnknownFrame(usize),

    /// Settings file I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization error
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}
