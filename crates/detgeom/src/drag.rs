//! Drag gestures on the global scene.
//!
//! A viewer's transform gizmo reports world poses. While the pointer moves,
//! feed them to [`preview_drag`]; on release, call [`commit_drag`] with the
//! final pose to write the exact local placement. [`cancel_drag`] undoes
//! whatever the previews wrote.
//!
//! While a gesture is active, draw the dragged volume at
//! [`display_world_pose`] rather than [`VolumeHandle::world_pose`](crate::VolumeHandle::world_pose).

use crate::{with_context, with_context_mut, DragRole, LocalPlacement, Pose, PreviewEffect, Result};

/// Starts dragging the named volume.
///
/// Fails if another gesture is already active or the volume does not exist.
pub fn begin_drag(name: &str) -> Result<DragRole> {
    let role = with_context_mut(|ctx| ctx.scene.begin_drag(name))?;
    log::debug!("begin drag on '{name}' as {role:?}");
    Ok(role)
}

/// Reports an intermediate world pose for the dragged volume.
pub fn preview_drag(world: &Pose) -> Result<PreviewEffect> {
    with_context_mut(|ctx| ctx.scene.preview_drag(world))
}

/// Finishes the gesture at `world` and returns the local placement written.
///
/// Snapping from the global [`Options`](crate::Options) is applied here.
pub fn commit_drag(world: &Pose) -> Result<LocalPlacement> {
    with_context_mut(|ctx| {
        let options = ctx.options.clone();
        ctx.scene.commit_drag(world, &options)
    })
}

/// Abandons the gesture.
pub fn cancel_drag() -> Result<()> {
    with_context_mut(|ctx| ctx.scene.cancel_drag())
}

/// Returns the name of the volume being dragged, if any.
#[must_use]
pub fn dragged_volume() -> Option<String> {
    with_context(|ctx| ctx.scene.active_drag().map(|s| s.volume().to_string()))
}

/// Returns the pose a viewer should draw the named volume at.
#[must_use]
pub fn display_world_pose(name: &str) -> Option<Pose> {
    with_context(|ctx| ctx.scene.display_world_pose(name, &ctx.options))
}
