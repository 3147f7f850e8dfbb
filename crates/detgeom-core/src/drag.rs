//! Interactive drag gestures.
//!
//! A gesture starts with [`DragSession::begin`], receives any number of
//! cheap [`DragSession::preview_pose`] updates while the pointer moves, and
//! ends with either [`DragSession::commit_pose`] (exact world→local
//! conversion, written to the record) or [`DragSession::cancel`] (record
//! restored to its state before the gesture).
//!
//! What a preview writes depends on the dragged volume's role:
//!
//! | role           | preview                                   |
//! |----------------|-------------------------------------------|
//! | `Leaf`         | kept in the session, record untouched     |
//! | `Mother`       | written to the record so children follow  |
//! | `Intermediate` | raw world pose kept in the session        |
//!
//! A `Mother` is placed in the world frame, so writing its world pose as
//! its local pose is exact. An `Intermediate` volume would need a full
//! frame conversion on every pointer event, which is deferred to commit.

use crate::error::{DetGeomError, Result};
use crate::options::Options;
use crate::pose::Pose;
use crate::transform::{LocalPlacement, TransformEngine};
use crate::volume::{Coordinates, Volume};

/// How a dragged volume relates to the rest of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRole {
    /// Has no children.
    Leaf,
    /// Has children and is placed in the world frame.
    Mother,
    /// Has children and is placed inside another volume.
    Intermediate,
}

/// What a preview did with the pose it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEffect {
    /// The volume record was updated.
    Written,
    /// The pose is only held by the session until commit.
    Deferred,
}

/// State of one drag gesture on one volume.
#[derive(Debug, Clone)]
pub struct DragSession {
    volume: String,
    role: DragRole,
    original_position: Coordinates,
    original_rotation: Coordinates,
    preview_world: Option<Pose>,
    wrote_record: bool,
}

impl DragSession {
    /// Starts a gesture on the named volume.
    pub fn begin(volumes: &[Volume], name: &str) -> Result<Self> {
        let engine = TransformEngine::new(volumes);
        let index = engine
            .index()
            .lookup(name)
            .ok_or_else(|| DetGeomError::VolumeNotFound(name.to_string()))?;
        let role = if !engine.index().has_children(index) {
            DragRole::Leaf
        } else if engine.parent_frame(index).is_none() {
            DragRole::Mother
        } else {
            DragRole::Intermediate
        };
        let volume = &volumes[index];
        log::debug!("drag started on '{name}' ({role:?})");
        Ok(Self {
            volume: name.to_string(),
            role,
            original_position: volume.position.clone(),
            original_rotation: volume.rotation.clone(),
            preview_world: None,
            wrote_record: false,
        })
    }

    /// Returns the name of the dragged volume.
    #[must_use]
    pub fn volume(&self) -> &str {
        &self.volume
    }

    /// Returns the role the volume had when the gesture started.
    #[must_use]
    pub fn role(&self) -> DragRole {
        self.role
    }

    /// Returns the latest previewed world pose, if any.
    #[must_use]
    pub fn preview_world_pose(&self) -> Option<Pose> {
        self.preview_world
    }

    /// Applies an intermediate world pose reported by the viewer.
    ///
    /// Not algebraically exact for anything but `Mother` volumes; use
    /// [`DragSession::commit_pose`] to finish the gesture.
    pub fn preview_pose(&mut self, volumes: &mut [Volume], world: &Pose) -> Result<PreviewEffect> {
        let world = world.sanitized();
        self.preview_world = Some(world);
        match self.role {
            DragRole::Leaf | DragRole::Intermediate => Ok(PreviewEffect::Deferred),
            DragRole::Mother => {
                let volume = find_mut(volumes, &self.volume)?;
                volume.set_local_pose(&world);
                self.wrote_record = true;
                Ok(PreviewEffect::Written)
            }
        }
    }

    /// Finishes the gesture at `world`, writing the exact local pose.
    pub fn commit_pose(
        self,
        volumes: &mut [Volume],
        world: &Pose,
        options: &Options,
    ) -> Result<LocalPlacement> {
        let mut placement = {
            let engine = TransformEngine::new(volumes).with_fallback_logging(options.warn_on_fallback);
            let index = engine
                .index()
                .lookup(&self.volume)
                .ok_or_else(|| DetGeomError::VolumeNotFound(self.volume.clone()))?;
            engine.convert_world_to_local(index, world)
        };
        placement.pose.snap_position(options.snap_translate);
        placement.pose.snap_rotation(options.snap_rotate);

        find_mut(volumes, &self.volume)?.set_local_pose(&placement.pose);
        log::debug!(
            "drag on '{}' committed at local position {} rotation {}",
            self.volume,
            placement.pose.position,
            placement.pose.rotation
        );
        Ok(placement)
    }

    /// Abandons the gesture, restoring the record if a preview touched it.
    pub fn cancel(self, volumes: &mut [Volume]) -> Result<()> {
        if self.wrote_record {
            let volume = find_mut(volumes, &self.volume)?;
            volume.position = self.original_position;
            volume.rotation = self.original_rotation;
        }
        log::debug!("drag on '{}' cancelled", self.volume);
        Ok(())
    }
}

fn find_mut<'v>(volumes: &'v mut [Volume], name: &str) -> Result<&'v mut Volume> {
    volumes
        .iter_mut()
        .find(|v| v.name == name)
        .ok_or_else(|| DetGeomError::VolumeNotFound(name.to_string()))
}
