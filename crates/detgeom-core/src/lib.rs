//! Core of detgeom: placement of detector volumes in a named hierarchy.
//!
//! Volumes are kept in a flat list and refer to their mother volume by name.
//! This crate provides:
//! - [`HierarchyIndex`] for name lookup and parent/children grouping
//! - [`TransformEngine`] for world poses and world→local conversion under
//!   the fixed-axis X, Y, Z rotation convention
//! - [`Scene`] for edits, [`DragSession`] for interactive drags, and
//!   [`diagnose`] for reporting broken references
//! - Global state management and configuration options

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Field names like mother_volume mirror the document keys
#![allow(clippy::struct_field_names)]

pub mod diagnostics;
pub mod document;
pub mod drag;
pub mod error;
pub mod hierarchy;
pub mod options;
pub mod pose;
pub mod scene;
pub mod state;
pub mod transform;
pub mod volume;

pub use diagnostics::{diagnose, Diagnostic};
pub use document::GeometryDocument;
pub use drag::{DragRole, DragSession, PreviewEffect};
pub use error::{DetGeomError, Result};
pub use hierarchy::{HierarchyIndex, ParentKey};
pub use options::Options;
pub use pose::Pose;
pub use scene::Scene;
pub use state::{with_context, with_context_mut, Context};
pub use transform::{convert_world_to_local, resolve_world_pose, LocalPlacement, TransformEngine};
pub use volume::{BooleanOperation, Coordinates, Volume, VolumeKind, WORLD_VOLUME_NAME};

// Re-export glam types for convenience
pub use glam::{DQuat, DVec3};
