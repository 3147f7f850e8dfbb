//! The editable scene: the volume list plus the active drag gesture.

use serde_json::Value;

use crate::diagnostics::{diagnose, Diagnostic};
use crate::document::GeometryDocument;
use crate::drag::{DragRole, DragSession, PreviewEffect};
use crate::error::{DetGeomError, Result};
use crate::hierarchy::{HierarchyIndex, ParentKey};
use crate::options::Options;
use crate::pose::Pose;
use crate::transform::{LocalPlacement, TransformEngine};
use crate::volume::{is_world_name, Volume};

/// Owner of all volume records.
///
/// Volumes refer to each other only by name, so the scene keeps them in a
/// plain list and builds a [`HierarchyIndex`] whenever one is needed. While
/// a drag gesture is active, only the gesture may write the dragged record.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    world: Value,
    volumes: Vec<Volume>,
    active_drag: Option<DragSession>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scene from a document. Records are taken as-is; use
    /// [`Scene::diagnostics`] to find broken references.
    pub fn from_document(document: GeometryDocument) -> Self {
        Self {
            world: document.world,
            volumes: document.volumes,
            active_drag: None,
        }
    }

    /// Returns a document holding a copy of the current records.
    #[must_use]
    pub fn to_document(&self) -> GeometryDocument {
        GeometryDocument {
            world: self.world.clone(),
            volumes: self.volumes.clone(),
        }
    }

    /// Returns all volume records in order.
    #[must_use]
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Returns the number of volumes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Returns true if the scene has no volumes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Gets a volume by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    /// Checks if a volume with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Builds a fresh hierarchy index.
    #[must_use]
    pub fn index(&self) -> HierarchyIndex<'_> {
        HierarchyIndex::build(&self.volumes)
    }

    /// Builds a transform engine over the current records.
    #[must_use]
    pub fn engine(&self, options: &Options) -> TransformEngine<'_> {
        TransformEngine::new(&self.volumes).with_fallback_logging(options.warn_on_fallback)
    }

    /// Lists broken references and malformed fields.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        diagnose(&self.volumes)
    }

    /// Adds a volume.
    ///
    /// Fails if the name is taken or invalid, or if the new record would
    /// close a placement cycle (for example with an existing record that
    /// already names it as mother).
    pub fn add_volume(&mut self, volume: Volume) -> Result<()> {
        validate_name(&volume.name)?;
        if self.contains(&volume.name) {
            return Err(DetGeomError::VolumeExists(volume.name));
        }
        self.volumes.push(volume);
        let last = self.volumes.len() - 1;
        if TransformEngine::new(&self.volumes).lies_on_cycle(last) {
            let volume = self.volumes.remove(last);
            return Err(DetGeomError::CyclicParentage {
                mother: volume.mother_volume.unwrap_or_default(),
                volume: volume.name,
            });
        }
        log::debug!("added volume '{}'", self.volumes[last].name);
        Ok(())
    }

    /// Removes a volume.
    ///
    /// Its children move to its own mother and keep their world poses. A
    /// child that would end up as its own mother is placed in the world
    /// frame instead. Fails without touching the scene if the removal would
    /// rewrite the record of the volume being dragged.
    pub fn remove_volume(&mut self, name: &str, options: &Options) -> Result<Volume> {
        self.ensure_writable(name)?;
        let position = self.position_of(name)?;

        let children: Vec<(usize, Pose)> = {
            let engine = self.engine(options);
            engine
                .index()
                .children(ParentKey::Volume(position))
                .filter(|(i, v)| *i != position && v.name != name)
                .map(|(i, _)| (i, engine.resolve_world_pose(i)))
                .collect()
        };
        for (i, _) in &children {
            self.ensure_writable(&self.volumes[*i].name)?;
        }

        let removed = self.volumes.remove(position);
        for &(child, world) in &children {
            let child = if child > position { child - 1 } else { child };
            let volume = &mut self.volumes[child];
            volume.mother_volume = removed
                .mother_volume
                .clone()
                .filter(|mother| *mother != volume.name);
            let placement = self.engine(options).convert_world_to_local(child, &world);
            self.volumes[child].set_local_pose(&placement.pose);
        }
        log::debug!(
            "removed volume '{name}', re-placed {} children",
            children.len()
        );
        Ok(removed)
    }

    /// Renames a volume and rewrites every reference to it.
    ///
    /// Fails if the volume being dragged is the one renamed or refers to it.
    pub fn rename_volume(&mut self, old: &str, new: &str) -> Result<()> {
        self.ensure_writable(old)?;
        if let Some(session) = &self.active_drag {
            let refers = self.get(session.volume()).is_some_and(|v| {
                v.mother_volume.as_deref() == Some(old) || v.boolean_parent.as_deref() == Some(old)
            });
            if refers {
                return Err(DetGeomError::DragInProgress(session.volume().to_string()));
            }
        }
        validate_name(new)?;
        if old == new {
            return Ok(());
        }
        if self.contains(new) {
            return Err(DetGeomError::VolumeExists(new.to_string()));
        }
        let position = self.position_of(old)?;
        self.volumes[position].name = new.to_string();
        for volume in &mut self.volumes {
            if volume.mother_volume.as_deref() == Some(old) {
                volume.mother_volume = Some(new.to_string());
            }
            if volume.boolean_parent.as_deref() == Some(old) {
                volume.boolean_parent = Some(new.to_string());
            }
        }
        log::debug!("renamed volume '{old}' to '{new}'");
        Ok(())
    }

    /// Returns the local pose of a volume.
    #[must_use]
    pub fn local_pose(&self, name: &str) -> Option<Pose> {
        self.get(name).map(Volume::local_pose)
    }

    /// Overwrites the local pose of a volume.
    pub fn set_local_pose(&mut self, name: &str, pose: &Pose) -> Result<()> {
        self.ensure_writable(name)?;
        let position = self.position_of(name)?;
        self.volumes[position].set_local_pose(pose);
        Ok(())
    }

    /// Returns the world pose of a volume.
    #[must_use]
    pub fn world_pose(&self, name: &str, options: &Options) -> Option<Pose> {
        self.engine(options).resolve_world_pose_by_name(name)
    }

    /// Returns `(name, world pose)` for every volume, in record order.
    #[must_use]
    pub fn world_poses(&self, options: &Options) -> Vec<(String, Pose)> {
        let poses = self.engine(options).resolve_all();
        self.volumes
            .iter()
            .map(|v| v.name.clone())
            .zip(poses)
            .collect()
    }

    /// Returns the pose a viewer should draw the volume at.
    ///
    /// During a drag this is the latest preview for the dragged volume.
    #[must_use]
    pub fn display_world_pose(&self, name: &str, options: &Options) -> Option<Pose> {
        match &self.active_drag {
            Some(session) if session.volume() == name => session
                .preview_world_pose()
                .or_else(|| self.world_pose(name, options)),
            _ => self.world_pose(name, options),
        }
    }

    /// Places a volume at a world pose, converting into its mother's frame.
    pub fn set_world_pose(
        &mut self,
        name: &str,
        world: &Pose,
        options: &Options,
    ) -> Result<LocalPlacement> {
        self.ensure_writable(name)?;
        self.write_world_pose(name, world, options)
    }

    /// Moves a volume into another mother (`None` or `"World"` for the root).
    ///
    /// With `keep_world_pose` the local pose is recomputed so the volume does
    /// not move; otherwise the local pose is kept and the volume moves with
    /// its new mother.
    pub fn set_mother_volume(
        &mut self,
        name: &str,
        mother: Option<&str>,
        keep_world_pose: bool,
        options: &Options,
    ) -> Result<()> {
        self.ensure_writable(name)?;
        let position = self.position_of(name)?;
        let mother = mother.filter(|m| !is_world_name(m));

        if let Some(mother) = mother {
            if !self.contains(mother) {
                return Err(DetGeomError::VolumeNotFound(mother.to_string()));
            }
            if mother == name || self.index().would_create_cycle(position, mother) {
                return Err(DetGeomError::CyclicParentage {
                    volume: name.to_string(),
                    mother: mother.to_string(),
                });
            }
        }

        let world = keep_world_pose.then(|| self.engine(options).resolve_world_pose(position));
        self.volumes[position].mother_volume = mother.map(str::to_string);
        if let Some(world) = world {
            self.write_world_pose(name, &world, options)?;
        }
        log::debug!("'{name}' now placed in '{}'", mother.unwrap_or("World"));
        Ok(())
    }

    /// Returns the active drag gesture, if any.
    #[must_use]
    pub fn active_drag(&self) -> Option<&DragSession> {
        self.active_drag.as_ref()
    }

    /// Starts a drag gesture. Only one gesture may be active at a time.
    pub fn begin_drag(&mut self, name: &str) -> Result<DragRole> {
        if let Some(session) = &self.active_drag {
            return Err(DetGeomError::DragInProgress(session.volume().to_string()));
        }
        let session = DragSession::begin(&self.volumes, name)?;
        let role = session.role();
        self.active_drag = Some(session);
        Ok(role)
    }

    /// Feeds an intermediate world pose to the active gesture.
    pub fn preview_drag(&mut self, world: &Pose) -> Result<PreviewEffect> {
        let session = self.active_drag.as_mut().ok_or(DetGeomError::NoActiveDrag)?;
        session.preview_pose(&mut self.volumes, world)
    }

    /// Ends the active gesture at `world`.
    pub fn commit_drag(&mut self, world: &Pose, options: &Options) -> Result<LocalPlacement> {
        let session = self.active_drag.take().ok_or(DetGeomError::NoActiveDrag)?;
        session.commit_pose(&mut self.volumes, world, options)
    }

    /// Abandons the active gesture and restores the dragged record.
    pub fn cancel_drag(&mut self) -> Result<()> {
        let session = self.active_drag.take().ok_or(DetGeomError::NoActiveDrag)?;
        session.cancel(&mut self.volumes)
    }

    /// Removes all volumes, the world record and any active gesture.
    pub fn clear(&mut self) {
        self.world = Value::Null;
        self.volumes.clear();
        self.active_drag = None;
    }

    fn write_world_pose(
        &mut self,
        name: &str,
        world: &Pose,
        options: &Options,
    ) -> Result<LocalPlacement> {
        let position = self.position_of(name)?;
        let placement = self.engine(options).convert_world_to_local(position, world);
        self.volumes[position].set_local_pose(&placement.pose);
        Ok(placement)
    }

    fn position_of(&self, name: &str) -> Result<usize> {
        self.volumes
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| DetGeomError::VolumeNotFound(name.to_string()))
    }

    fn ensure_writable(&self, name: &str) -> Result<()> {
        match &self.active_drag {
            Some(session) if session.volume() == name => {
                Err(DetGeomError::DragInProgress(name.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if is_world_name(name) || name.trim().is_empty() {
        return Err(DetGeomError::InvalidName(name.to_string()));
    }
    Ok(())
}
