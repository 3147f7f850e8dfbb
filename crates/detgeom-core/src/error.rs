//! Error types for detgeom.
//!
//! Only scene edits and document I/O return errors. Placement resolution
//! never fails; malformed hierarchies degrade and are reported through
//! [`Diagnostic`](crate::diagnostics::Diagnostic) values instead.

use thiserror::Error;

/// The main error type for detgeom operations.
#[derive(Error, Debug)]
pub enum DetGeomError {
    /// The global context has not been initialized.
    #[error("detgeom not initialized - call detgeom::init() first")]
    NotInitialized,

    /// The global context has already been initialized.
    #[error("detgeom already initialized")]
    AlreadyInitialized,

    /// A volume with the given name already exists.
    #[error("volume '{0}' already exists")]
    VolumeExists(String),

    /// A volume with the given name was not found.
    #[error("volume '{0}' not found")]
    VolumeNotFound(String),

    /// The name is empty or collides with the world volume.
    #[error("'{0}' is not a valid volume name")]
    InvalidName(String),

    /// Placing `volume` inside `mother` would close a loop in the hierarchy.
    #[error("placing '{volume}' inside '{mother}' would create a cycle")]
    CyclicParentage { volume: String, mother: String },

    /// The volume is owned by an active drag gesture.
    #[error("volume '{0}' is being dragged")]
    DragInProgress(String),

    /// A drag operation was requested while no gesture is active.
    #[error("no drag gesture is active")]
    NoActiveDrag,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for detgeom operations.
pub type Result<T> = std::result::Result<T, DetGeomError>;
