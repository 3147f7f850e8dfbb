//! detgeom: placement engine for detector geometry editors.
//!
//! A detector geometry is a flat list of volumes (boxes, cylinders, tori,
//! assemblies, ...) where each volume names its mother volume and stores its
//! position and rotation relative to that mother. detgeom resolves the world
//! pose of every volume, converts poses dragged in a 3D view back into the
//! mother's frame, and keeps the hierarchy consistent under edits.
//!
//! # Quick Start
//!
//! ```no_run
//! use detgeom::*;
//!
//! fn main() -> Result<()> {
//!     init()?;
//!
//!     add_volume(Volume::new("Tank", VolumeKind::Cylinder)
//!         .with_position(DVec3::new(0.0, 0.0, 500.0)))?;
//!     let crystal = add_volume(Volume::new("Crystal", VolumeKind::Box)
//!         .with_mother("Tank")
//!         .with_position(DVec3::new(10.0, 0.0, 0.0)))?;
//!
//!     // Where does the crystal end up?
//!     let world = crystal.world_pose();
//!     println!("{world:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Conventions
//!
//! - Lengths are millimeters and angles are radians everywhere. Unit tags
//!   stored in documents are carried along but never interpreted.
//! - A rotation `(x, y, z)` rotates about X, then about the new Y, then about
//!   the new Z (`Rx · Ry · Rz`).
//! - A volume with no mother, or with mother `"World"`, is placed in the
//!   world frame.
//! - Broken references never fail placement: the volume is drawn in the
//!   world frame and reported by [`diagnostics()`].

// Documentation lints - the free functions mirror core methods
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod document;
mod drag;
mod init;
mod volumes;

pub use document::*;
pub use drag::*;
pub use init::*;
pub use volumes::*;

// Re-export core types
pub use detgeom_core::{
    diagnostics::Diagnostic,
    document::GeometryDocument,
    drag::{DragRole, PreviewEffect},
    error::{DetGeomError, Result},
    options::Options,
    pose::Pose,
    state::{with_context, with_context_mut, Context},
    transform::{LocalPlacement, TransformEngine},
    volume::{BooleanOperation, Coordinates, Volume, VolumeKind, WORLD_VOLUME_NAME},
    DQuat, DVec3,
};
