//! Volume management.
//!
//! Volumes are identified by name. A [`VolumeHandle`] is just that name; every
//! call looks the volume up in the global scene again, so a handle stays
//! valid across edits to other volumes.
//!
//! # Example
//!
//! ```no_run
//! use detgeom::*;
//!
//! fn main() -> Result<()> {
//!     init()?;
//!
//!     let tank = add_volume(Volume::new("Tank", VolumeKind::Cylinder))?;
//!     let module = add_volume(Volume::new("Module", VolumeKind::Assembly).with_mother("Tank"))?;
//!
//!     // Move the tank; the module follows.
//!     tank.set_local_pose(&Pose::from_position(DVec3::new(0.0, 0.0, 100.0)))?;
//!     assert_eq!(module.world_pose().unwrap().position.z, 100.0);
//!
//!     Ok(())
//! }
//! ```

use crate::{with_context, with_context_mut, Diagnostic, LocalPlacement, Pose, Result, Volume, VolumeKind};

/// Adds a volume to the scene.
///
/// Fails if the name is already used, is empty or `"World"`, or if the new
/// volume would close a placement cycle.
pub fn add_volume(volume: Volume) -> Result<VolumeHandle> {
    let name = volume.name.clone();
    with_context_mut(|ctx| ctx.scene.add_volume(volume))?;
    Ok(VolumeHandle { name })
}

/// Gets an existing volume by name.
#[must_use]
pub fn get_volume(name: &str) -> Option<VolumeHandle> {
    with_context(|ctx| {
        if ctx.scene.contains(name) {
            Some(VolumeHandle {
                name: name.to_string(),
            })
        } else {
            None
        }
    })
}

/// Removes a volume by name and returns its record.
///
/// Volumes placed inside it move to its mother and keep their world poses.
/// Fails if that would rewrite the volume currently being dragged.
pub fn remove_volume(name: &str) -> Result<Volume> {
    with_context_mut(|ctx| {
        let options = ctx.options.clone();
        ctx.scene.remove_volume(name, &options)
    })
}

/// Removes all volumes and the world record, and abandons any drag gesture.
pub fn remove_all_volumes() {
    with_context_mut(|ctx| {
        ctx.scene.clear();
    });
}

/// Returns all volume names, in record order.
#[must_use]
pub fn get_all_volumes() -> Vec<String> {
    with_context(|ctx| ctx.scene.volumes().iter().map(|v| v.name.clone()).collect())
}

/// Returns the world pose of every volume, in record order.
///
/// This is what a viewer calls once per frame to place its meshes.
#[must_use]
pub fn world_poses() -> Vec<(String, Pose)> {
    with_context(|ctx| ctx.scene.world_poses(&ctx.options))
}

/// Lists broken mother references, cycles and malformed fields.
#[must_use]
pub fn diagnostics() -> Vec<Diagnostic> {
    with_context(|ctx| ctx.scene.diagnostics())
}

/// Handle for a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeHandle {
    name: String,
}

impl VolumeHandle {
    /// Returns the name of this volume.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the volume still exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        with_context(|ctx| ctx.scene.contains(&self.name))
    }

    /// Returns the kind of the volume.
    #[must_use]
    pub fn kind(&self) -> Option<VolumeKind> {
        with_context(|ctx| ctx.scene.get(&self.name).map(|v| v.kind))
    }

    /// Returns a copy of the volume record.
    #[must_use]
    pub fn record(&self) -> Option<Volume> {
        with_context(|ctx| ctx.scene.get(&self.name).cloned())
    }

    /// Returns the mother's name, or `None` when placed in the world frame.
    #[must_use]
    pub fn mother_volume(&self) -> Option<String> {
        with_context(|ctx| {
            ctx.scene
                .get(&self.name)
                .and_then(|v| v.mother_name().map(str::to_string))
        })
    }

    /// Returns the names of the volumes placed directly inside this one.
    #[must_use]
    pub fn children(&self) -> Vec<String> {
        with_context(|ctx| {
            let index = ctx.scene.index();
            index
                .lookup(&self.name)
                .map(|i| {
                    index
                        .children(detgeom_core::ParentKey::Volume(i))
                        .map(|(_, v)| v.name.clone())
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Returns the pose relative to the mother volume.
    #[must_use]
    pub fn local_pose(&self) -> Option<Pose> {
        with_context(|ctx| ctx.scene.local_pose(&self.name))
    }

    /// Returns the pose relative to the world frame.
    #[must_use]
    pub fn world_pose(&self) -> Option<Pose> {
        with_context(|ctx| ctx.scene.world_pose(&self.name, &ctx.options))
    }

    /// Sets the pose relative to the mother volume.
    pub fn set_local_pose(&self, pose: &Pose) -> Result<&Self> {
        with_context_mut(|ctx| ctx.scene.set_local_pose(&self.name, pose))?;
        Ok(self)
    }

    /// Places the volume at a world pose; the record stores the equivalent
    /// pose in the mother's frame, which is returned.
    pub fn set_world_pose(&self, world: &Pose) -> Result<LocalPlacement> {
        with_context_mut(|ctx| {
            let options = ctx.options.clone();
            ctx.scene.set_world_pose(&self.name, world, &options)
        })
    }

    /// Moves the volume into `mother` (`None` for the world frame).
    ///
    /// With `keep_world_pose` the volume stays where it is in the world;
    /// otherwise it keeps its local pose and moves with the new mother.
    pub fn set_mother_volume(&self, mother: Option<&str>, keep_world_pose: bool) -> Result<&Self> {
        with_context_mut(|ctx| {
            let options = ctx.options.clone();
            ctx.scene
                .set_mother_volume(&self.name, mother, keep_world_pose, &options)
        })?;
        Ok(self)
    }

    /// Renames the volume, updating every reference to it.
    pub fn rename(&mut self, new_name: &str) -> Result<&mut Self> {
        with_context_mut(|ctx| ctx.scene.rename_volume(&self.name, new_name))?;
        self.name = new_name.to_string();
        Ok(self)
    }
}
