//! World/local placement resolution over the volume hierarchy.
//!
//! A volume's world pose is its local pose composed onto the world pose of
//! its mother, recursively up to the root frame. Assemblies take part in the
//! chain exactly like physical volumes.
//!
//! Resolution never fails. A volume whose mother is missing, is itself, or
//! that sits on a mother cycle is placed as if its mother were the world:
//! its local pose is its world pose. The inverse path applies the same rule,
//! so [`TransformEngine::convert_world_to_local`] always undoes
//! [`TransformEngine::resolve_world_pose`].

use std::collections::HashSet;

use glam::DVec3;
use serde::Serialize;

use crate::hierarchy::HierarchyIndex;
use crate::pose::Pose;
use crate::volume::{Volume, CANONICAL_ANGLE_UNIT, CANONICAL_LENGTH_UNIT};

/// A pose in the mother's frame, ready to be written into a volume record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocalPlacement {
    pub pose: Pose,
    /// Unit of `pose.position`; always [`CANONICAL_LENGTH_UNIT`].
    pub position_unit: &'static str,
    /// Unit of `pose.rotation`; always [`CANONICAL_ANGLE_UNIT`].
    pub rotation_unit: &'static str,
}

impl LocalPlacement {
    fn canonical(pose: Pose) -> Self {
        Self {
            pose,
            position_unit: CANONICAL_LENGTH_UNIT,
            rotation_unit: CANONICAL_ANGLE_UNIT,
        }
    }
}

/// Why a volume was placed directly in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Orphan,
    SelfReference,
    Cycle,
}

/// Forward and inverse placement transforms for one snapshot of a scene.
#[derive(Debug, Clone)]
pub struct TransformEngine<'a> {
    index: HierarchyIndex<'a>,
    log_fallbacks: bool,
}

impl<'a> TransformEngine<'a> {
    /// Indexes `volumes` and creates an engine over them.
    pub fn new(volumes: &'a [Volume]) -> Self {
        Self::from_index(HierarchyIndex::build(volumes))
    }

    /// Creates an engine over an existing index.
    pub fn from_index(index: HierarchyIndex<'a>) -> Self {
        Self {
            index,
            log_fallbacks: true,
        }
    }

    /// Sets whether degraded placements are logged at `warn` level.
    ///
    /// When disabled they are still logged at `debug` level.
    #[must_use]
    pub fn with_fallback_logging(mut self, enabled: bool) -> Self {
        self.log_fallbacks = enabled;
        self
    }

    /// Returns the underlying hierarchy index.
    #[must_use]
    pub fn index(&self) -> &HierarchyIndex<'a> {
        &self.index
    }

    /// Places `local` in the frame given by `parent_world`.
    #[must_use]
    pub fn compose(parent_world: &Pose, local: &Pose) -> Pose {
        parent_world.compose(local)
    }

    /// Returns the world pose of the volume at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the indexed volumes.
    #[must_use]
    pub fn resolve_world_pose(&self, index: usize) -> Pose {
        self.resolve(index, &mut HashSet::new(), &mut [])
    }

    /// Returns the world pose of the named volume, if it exists.
    #[must_use]
    pub fn resolve_world_pose_by_name(&self, name: &str) -> Option<Pose> {
        self.index.lookup(name).map(|i| self.resolve_world_pose(i))
    }

    /// Returns the world pose of every volume, in input order.
    ///
    /// Shared ancestors are resolved once.
    #[must_use]
    pub fn resolve_all(&self) -> Vec<Pose> {
        let mut memo = vec![None; self.index.len()];
        (0..self.index.len())
            .map(|i| self.resolve(i, &mut HashSet::new(), &mut memo))
            .collect()
    }

    /// Returns the world pose of the frame the volume's local pose lives in.
    ///
    /// `None` means the world frame, either because the volume is root-placed
    /// or because its mother reference is degraded.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the indexed volumes.
    #[must_use]
    pub fn parent_frame(&self, index: usize) -> Option<Pose> {
        let mut visited = HashSet::from([index]);
        self.parent_frame_inner(index, &mut visited, &mut [])
    }

    /// Converts a world pose of the volume at `index` into its mother's frame.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the indexed volumes.
    #[must_use]
    pub fn convert_world_to_local(&self, index: usize, world: &Pose) -> LocalPlacement {
        let world = world.sanitized();
        let pose = match self.parent_frame(index) {
            Some(parent_world) => parent_world.localize(&world),
            None => world,
        };
        LocalPlacement::canonical(pose)
    }

    /// Returns true if following mother links from `index` leads back to it.
    ///
    /// Self-references count as cycles.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the indexed volumes.
    #[must_use]
    pub fn lies_on_cycle(&self, index: usize) -> bool {
        let mut visited = HashSet::new();
        let mut current = index;
        while let Some(next) = self.index.mother_index(current) {
            if next == index {
                return true;
            }
            if !visited.insert(next) {
                return false;
            }
            current = next;
        }
        false
    }

    fn resolve(
        &self,
        index: usize,
        visited: &mut HashSet<usize>,
        memo: &mut [Option<Pose>],
    ) -> Pose {
        if let Some(Some(pose)) = memo.get(index) {
            return *pose;
        }
        let local = self.index.volumes()[index].local_pose();
        if !visited.insert(index) {
            self.report(index, Fallback::Cycle);
            return local;
        }
        let world = match self.parent_frame_inner(index, visited, memo) {
            Some(parent_world) => parent_world.compose(&local),
            None => local,
        };
        if let Some(slot) = memo.get_mut(index) {
            *slot = Some(world);
        }
        world
    }

    fn parent_frame_inner(
        &self,
        index: usize,
        visited: &mut HashSet<usize>,
        memo: &mut [Option<Pose>],
    ) -> Option<Pose> {
        let volume = &self.index.volumes()[index];
        let mother = volume.mother_name()?;
        if mother == volume.name {
            self.report(index, Fallback::SelfReference);
            return None;
        }
        let Some(parent) = self.index.lookup(mother) else {
            self.report(index, Fallback::Orphan);
            return None;
        };
        if parent == index || self.lies_on_cycle(index) {
            self.report(index, Fallback::Cycle);
            return None;
        }
        // Assemblies are resolved through their own chain like any mother.
        Some(self.resolve(parent, visited, memo))
    }

    fn report(&self, index: usize, fallback: Fallback) {
        let volume = &self.index.volumes()[index];
        let mother = volume.mother_volume.as_deref().unwrap_or_default();
        let reason = match fallback {
            Fallback::Orphan => "mother volume does not exist",
            Fallback::SelfReference => "volume is its own mother",
            Fallback::Cycle => "mother chain loops back to the volume",
        };
        if self.log_fallbacks {
            log::warn!(
                "placing '{}' in the world frame: {reason} (motherVolume = '{mother}')",
                volume.name
            );
        } else {
            log::debug!(
                "placing '{}' in the world frame: {reason} (motherVolume = '{mother}')",
                volume.name
            );
        }
    }
}

/// Resolves the world pose of the named volume within `volumes`.
#[must_use]
pub fn resolve_world_pose(volumes: &[Volume], name: &str) -> Option<Pose> {
    TransformEngine::new(volumes).resolve_world_pose_by_name(name)
}

/// Converts a world pose of the named volume into its mother's frame.
#[must_use]
pub fn convert_world_to_local(
    volumes: &[Volume],
    name: &str,
    world_position: DVec3,
    world_rotation: DVec3,
) -> Option<LocalPlacement> {
    let engine = TransformEngine::new(volumes);
    let index = engine.index().lookup(name)?;
    Some(engine.convert_world_to_local(index, &Pose::new(world_position, world_rotation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeKind;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn boxed(name: &str, mother: &str, position: DVec3, rotation: DVec3) -> Volume {
        Volume::new(name, VolumeKind::Box)
            .with_mother(mother)
            .with_position(position)
            .with_rotation(rotation)
    }

    #[test]
    fn test_root_placed_is_identity() {
        let volumes = vec![boxed("A", "World", DVec3::new(1.5, -2.0, 7.0), DVec3::new(0.1, 0.2, 0.3))];
        let world = resolve_world_pose(&volumes, "A").unwrap();
        assert_eq!(world, volumes[0].local_pose());
    }

    #[test]
    fn test_simple_nesting() {
        let volumes = vec![
            boxed("A", "World", DVec3::new(10.0, 0.0, 0.0), DVec3::ZERO),
            boxed("B", "A", DVec3::new(5.0, 0.0, 0.0), DVec3::ZERO),
        ];
        let world = resolve_world_pose(&volumes, "B").unwrap();
        assert_eq!(world.position, DVec3::new(15.0, 0.0, 0.0));
        assert_eq!(world.rotation, DVec3::ZERO);
    }

    #[test]
    fn test_rotated_parent() {
        let volumes = vec![
            boxed("A", "World", DVec3::ZERO, DVec3::new(0.0, 0.0, FRAC_PI_2)),
            boxed("B", "A", DVec3::X, DVec3::ZERO),
        ];
        let world = resolve_world_pose(&volumes, "B").unwrap();
        assert!(world.position.abs_diff_eq(DVec3::Y, 1e-12));
    }

    #[test]
    fn test_assembly_passthrough() {
        let volumes = vec![
            Volume::new("ASM", VolumeKind::Assembly).with_position(DVec3::new(0.0, 0.0, 10.0)),
            boxed("C", "ASM", DVec3::ZERO, DVec3::ZERO),
        ];
        let world = resolve_world_pose(&volumes, "C").unwrap();
        assert_eq!(world.position, DVec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_nested_assemblies_compose() {
        let volumes = vec![
            Volume::new("Outer", VolumeKind::Assembly)
                .with_position(DVec3::new(100.0, 0.0, 0.0))
                .with_rotation(DVec3::new(0.0, 0.0, FRAC_PI_2)),
            Volume::new("Inner", VolumeKind::Assembly)
                .with_mother("Outer")
                .with_position(DVec3::new(10.0, 0.0, 0.0)),
            boxed("Leaf", "Inner", DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO),
        ];
        let world = resolve_world_pose(&volumes, "Leaf").unwrap();
        assert!(world.position.abs_diff_eq(DVec3::new(100.0, 11.0, 0.0), 1e-9));
        assert!((world.rotation.z - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_composition_order() {
        // Parent about X, child about Y: the child's Y axis is the parent's
        // rotated Y, so the world rotation is Rx · Ry, not Ry · Rx.
        let volumes = vec![
            boxed("A", "World", DVec3::ZERO, DVec3::new(FRAC_PI_2, 0.0, 0.0)),
            boxed("B", "A", DVec3::ZERO, DVec3::new(0.0, 0.3, 0.0)),
        ];
        let world = resolve_world_pose(&volumes, "B").unwrap();
        assert!((world.rotation - DVec3::new(FRAC_PI_2, 0.3, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_cycle_returns_local_pose() {
        let volumes = vec![
            boxed("A", "B", DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.0, 0.5, 0.0)),
            boxed("B", "A", DVec3::new(4.0, 5.0, 6.0), DVec3::ZERO),
        ];
        let engine = TransformEngine::new(&volumes);
        assert_eq!(engine.resolve_world_pose(0), volumes[0].local_pose());
        assert_eq!(engine.resolve_world_pose(1), volumes[1].local_pose());
        assert!(engine.lies_on_cycle(0));
    }

    #[test]
    fn test_chain_into_cycle_composes_onto_cycle_member() {
        let volumes = vec![
            boxed("A", "B", DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO),
            boxed("B", "A", DVec3::new(2.0, 0.0, 0.0), DVec3::ZERO),
            boxed("C", "A", DVec3::new(0.0, 3.0, 0.0), DVec3::ZERO),
        ];
        let engine = TransformEngine::new(&volumes);
        assert!(!engine.lies_on_cycle(2));
        assert_eq!(engine.resolve_world_pose(2).position, DVec3::new(1.0, 3.0, 0.0));
        assert_eq!(engine.resolve_all()[2], engine.resolve_world_pose(2));
    }

    #[test]
    fn test_self_reference_returns_local_pose() {
        let volumes = vec![boxed("A", "A", DVec3::new(9.0, 8.0, 7.0), DVec3::new(0.1, 0.0, 0.0))];
        let engine = TransformEngine::new(&volumes);
        assert_eq!(engine.resolve_world_pose(0), volumes[0].local_pose());
        assert!(engine.parent_frame(0).is_none());
    }

    #[test]
    fn test_orphan_returns_local_pose() {
        let volumes = vec![boxed("A", "Gone", DVec3::new(1.0, 1.0, 1.0), DVec3::ZERO)];
        let engine = TransformEngine::new(&volumes).with_fallback_logging(false);
        assert_eq!(engine.resolve_world_pose(0), volumes[0].local_pose());
    }

    #[test]
    fn test_associativity() {
        let volumes = vec![
            boxed("A", "World", DVec3::new(3.0, -1.0, 2.0), DVec3::new(0.4, -0.2, 1.0)),
            boxed("B", "A", DVec3::new(-5.0, 2.0, 0.5), DVec3::new(-0.7, 0.9, 0.1)),
            boxed("C", "B", DVec3::new(1.0, 1.0, -4.0), DVec3::new(0.3, 0.3, -2.0)),
        ];
        let engine = TransformEngine::new(&volumes);
        let direct = engine.resolve_world_pose(2);
        let stepwise = TransformEngine::compose(&engine.resolve_world_pose(1), &volumes[2].local_pose());
        let memoized = engine.resolve_all()[2];
        assert!(direct.abs_diff_eq(&stepwise, 1e-12));
        assert!(direct.abs_diff_eq(&memoized, 1e-12));
    }

    #[test]
    fn test_world_to_local_roundtrip() {
        let volumes = vec![
            boxed("A", "World", DVec3::new(20.0, 0.0, -5.0), DVec3::new(0.0, PI / 3.0, 0.0)),
            boxed("B", "A", DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.2, -0.4, 0.6)),
        ];
        let engine = TransformEngine::new(&volumes);
        let world = engine.resolve_world_pose(1);
        let placement = engine.convert_world_to_local(1, &world);
        assert!(placement.pose.abs_diff_eq(&volumes[1].local_pose(), 1e-9));
        assert_eq!(placement.position_unit, "mm");
        assert_eq!(placement.rotation_unit, "rad");
    }

    #[test]
    fn test_world_to_local_root_is_identity() {
        let volumes = vec![boxed("A", "World", DVec3::ZERO, DVec3::ZERO)];
        let world = Pose::new(DVec3::new(4.0, 5.0, 6.0), DVec3::new(0.1, 0.2, 0.3));
        let placement =
            convert_world_to_local(&volumes, "A", world.position, world.rotation).unwrap();
        assert_eq!(placement.pose, world);
    }

    #[test]
    fn test_world_to_local_sanitizes_input() {
        let volumes = vec![boxed("A", "World", DVec3::ZERO, DVec3::ZERO)];
        let placement = convert_world_to_local(
            &volumes,
            "A",
            DVec3::new(f64::NAN, 1.0, 2.0),
            DVec3::ZERO,
        )
        .unwrap();
        assert_eq!(placement.pose.position, DVec3::new(0.0, 1.0, 2.0));
    }

    #[test]
    fn test_unknown_volume() {
        let volumes = vec![boxed("A", "World", DVec3::ZERO, DVec3::ZERO)];
        assert!(resolve_world_pose(&volumes, "Nope").is_none());
        assert!(convert_world_to_local(&volumes, "Nope", DVec3::ZERO, DVec3::ZERO).is_none());
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_index_out_of_range_panics() {
        let volumes = vec![boxed("A", "World", DVec3::ZERO, DVec3::ZERO)];
        let _ = TransformEngine::new(&volumes).resolve_world_pose(1);
    }
}
