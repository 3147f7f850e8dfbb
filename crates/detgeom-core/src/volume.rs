//! Volume records as they appear in the geometry document.
//!
//! A [`Volume`] refers to its mother only by name. Everything the placement
//! engine does not interpret (dimensions, materials, colors, ...) is kept in
//! [`Volume::dimensions`] and written back verbatim.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pose::Pose;

/// Name of the implicit root frame.
pub const WORLD_VOLUME_NAME: &str = "World";

/// Unit tag stamped on positions written by the engine.
pub const CANONICAL_LENGTH_UNIT: &str = "mm";

/// Unit tag stamped on rotations written by the engine.
pub const CANONICAL_ANGLE_UNIT: &str = "rad";

/// The kind of solid or container a volume describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeKind {
    Box,
    Cylinder,
    Sphere,
    Trapezoid,
    Torus,
    Ellipsoid,
    Polycone,
    /// Non-physical container; placed like any other volume but has no solid.
    Assembly,
    /// Result of a boolean combination of component volumes.
    Union,
}

impl VolumeKind {
    /// Returns the document tag for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VolumeKind::Box => "box",
            VolumeKind::Cylinder => "cylinder",
            VolumeKind::Sphere => "sphere",
            VolumeKind::Trapezoid => "trapezoid",
            VolumeKind::Torus => "torus",
            VolumeKind::Ellipsoid => "ellipsoid",
            VolumeKind::Polycone => "polycone",
            VolumeKind::Assembly => "assembly",
            VolumeKind::Union => "union",
        }
    }
}

/// How a boolean component contributes to its boolean parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOperation {
    Union,
    Subtract,
}

/// A `{x, y, z}` triple as stored in the document.
///
/// Components are optional so that a record with a missing or `null`
/// component stays inspectable; readers see such components as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
    /// Display unit tag. Presentation metadata only, never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Coordinates {
    /// Creates a fully populated triple without a unit tag.
    #[must_use]
    pub fn new(v: DVec3) -> Self {
        Self {
            x: Some(v.x),
            y: Some(v.y),
            z: Some(v.z),
            unit: None,
        }
    }

    /// Returns the triple with missing or non-finite components as zero.
    #[must_use]
    pub fn value(&self) -> DVec3 {
        let read = |c: Option<f64>| c.filter(|v| v.is_finite()).unwrap_or(0.0);
        DVec3::new(read(self.x), read(self.y), read(self.z))
    }

    /// Overwrites all three components.
    pub fn set(&mut self, v: DVec3) {
        self.x = Some(v.x);
        self.y = Some(v.y);
        self.z = Some(v.z);
    }

    /// Returns the names of components that are missing or not finite.
    pub fn malformed_components(&self) -> impl Iterator<Item = &'static str> + '_ {
        [("x", self.x), ("y", self.y), ("z", self.z)]
            .into_iter()
            .filter(|(_, c)| !c.is_some_and(f64::is_finite))
            .map(|(axis, _)| axis)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One placed solid or container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Unique name; the only way other records refer to this one.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VolumeKind,
    /// Position in the mother's frame, millimeters.
    #[serde(default)]
    pub position: Coordinates,
    /// Fixed-axis XYZ rotation in the mother's frame, radians.
    #[serde(default)]
    pub rotation: Coordinates,
    /// Name of the mother volume; `None`, empty or `"World"` means the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_volume: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_boolean_component: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_operation: Option<BooleanOperation>,
    /// Type-specific payload, opaque to the placement engine.
    #[serde(flatten)]
    pub dimensions: Map<String, Value>,
}

impl Volume {
    /// Creates a volume at the origin of the world frame.
    pub fn new(name: impl Into<String>, kind: VolumeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: Coordinates::new(DVec3::ZERO),
            rotation: Coordinates::new(DVec3::ZERO),
            mother_volume: None,
            is_boolean_component: false,
            boolean_parent: None,
            boolean_operation: None,
            dimensions: Map::new(),
        }
    }

    /// Sets the local position.
    #[must_use]
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position.set(position);
        self
    }

    /// Sets the local XYZ rotation in radians.
    #[must_use]
    pub fn with_rotation(mut self, rotation: DVec3) -> Self {
        self.rotation.set(rotation);
        self
    }

    /// Sets the mother volume by name.
    #[must_use]
    pub fn with_mother(mut self, mother: impl Into<String>) -> Self {
        self.mother_volume = Some(mother.into());
        self
    }

    /// Adds an opaque dimension field.
    #[must_use]
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    /// Returns the pose relative to the mother's frame.
    #[must_use]
    pub fn local_pose(&self) -> Pose {
        Pose::new(self.position.value(), self.rotation.value())
    }

    /// Overwrites the local pose and stamps the canonical unit tags.
    pub fn set_local_pose(&mut self, pose: &Pose) {
        let pose = pose.sanitized();
        self.position.set(pose.position);
        self.position.unit = Some(CANONICAL_LENGTH_UNIT.to_string());
        self.rotation.set(pose.rotation);
        self.rotation.unit = Some(CANONICAL_ANGLE_UNIT.to_string());
    }

    /// Returns the mother's name, or `None` when the mother is the root frame.
    #[must_use]
    pub fn mother_name(&self) -> Option<&str> {
        self.mother_volume
            .as_deref()
            .filter(|m| !is_world_name(m))
    }

    /// Returns true if this volume is placed directly in the root frame.
    #[must_use]
    pub fn is_root_placed(&self) -> bool {
        self.mother_name().is_none()
    }

    /// Returns true if this volume is an assembly.
    #[must_use]
    pub fn is_assembly(&self) -> bool {
        self.kind == VolumeKind::Assembly
    }
}

/// Returns true if `name` designates the root frame.
#[must_use]
pub fn is_world_name(name: &str) -> bool {
    name.is_empty() || name == WORLD_VOLUME_NAME
}
