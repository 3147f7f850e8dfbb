//! Rigid poses and the fixed-axis rotation convention.
//!
//! Rotations are stored as three angles `(x, y, z)` in radians and always
//! mean "rotate about X, then about the rotated Y, then about the twice
//! rotated Z". As a matrix that is `Rx · Ry · Rz`, and as a quaternion
//! `qx * qy * qz`. Every conversion in this crate goes through the helpers
//! below so the order can never drift between the forward and inverse paths.

use glam::{DAffine3, DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// `|m13|` above which the XYZ extraction is treated as gimbal locked.
const GIMBAL_THRESHOLD: f64 = 0.999_999_9;

/// Builds the rotation matrix `Rx(x) · Ry(y) · Rz(z)`.
#[must_use]
pub fn rotation_matrix(angles: DVec3) -> DMat3 {
    DMat3::from_rotation_x(angles.x)
        * DMat3::from_rotation_y(angles.y)
        * DMat3::from_rotation_z(angles.z)
}

/// Builds the quaternion `qx * qy * qz` matching [`rotation_matrix`].
#[must_use]
pub fn rotation_quat(angles: DVec3) -> DQuat {
    DQuat::from_rotation_x(angles.x)
        * DQuat::from_rotation_y(angles.y)
        * DQuat::from_rotation_z(angles.z)
}

/// Extracts XYZ angles from a rotation matrix built as `Rx · Ry · Rz`.
///
/// `y` lands in `[-π/2, π/2]`, `x` and `z` in `(-π, π]`. At gimbal lock the
/// whole residual rotation is attributed to `x` and `z` is zero.
#[must_use]
pub fn euler_from_matrix(m: DMat3) -> DVec3 {
    // glam is column-major: m.z_axis.x is row 0, column 2.
    let m11 = m.x_axis.x;
    let m12 = m.y_axis.x;
    let m13 = m.z_axis.x;
    let m22 = m.y_axis.y;
    let m23 = m.z_axis.y;
    let m32 = m.y_axis.z;
    let m33 = m.z_axis.z;

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < GIMBAL_THRESHOLD {
        DVec3::new((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        DVec3::new(m32.atan2(m22), y, 0.0)
    }
}

/// Extracts XYZ angles from a quaternion built as `qx * qy * qz`.
#[must_use]
pub fn euler_from_quat(q: DQuat) -> DVec3 {
    euler_from_matrix(DMat3::from_quat(q.normalize()))
}

/// Replaces NaN and infinite components with zero.
#[must_use]
pub fn finite_or_zero(v: DVec3) -> DVec3 {
    let clean = |c: f64| if c.is_finite() { c } else { 0.0 };
    DVec3::new(clean(v.x), clean(v.y), clean(v.z))
}

/// A position and a fixed-axis XYZ rotation, in millimeters and radians.
///
/// Depending on context a pose is either local (relative to the mother
/// volume's frame) or world (relative to the root frame).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Translation in millimeters.
    pub position: DVec3,
    /// XYZ rotation angles in radians.
    pub rotation: DVec3,
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DVec3::ZERO,
    };

    /// Creates a pose from a position and XYZ angles.
    #[must_use]
    pub fn new(position: DVec3, rotation: DVec3) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated pose at `position`.
    #[must_use]
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Creates a pose at the origin with the given XYZ angles.
    #[must_use]
    pub fn from_rotation(rotation: DVec3) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Creates a pose from a position and a quaternion.
    #[must_use]
    pub fn from_position_quat(position: DVec3, rotation: DQuat) -> Self {
        Self {
            position,
            rotation: euler_from_quat(rotation),
        }
    }

    /// Returns a copy with every non-finite component replaced by zero.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            position: finite_or_zero(self.position),
            rotation: finite_or_zero(self.rotation),
        }
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    /// Returns the rotation as a quaternion.
    #[must_use]
    pub fn quat(&self) -> DQuat {
        rotation_quat(self.rotation)
    }

    /// Returns the rotation as a matrix.
    #[must_use]
    pub fn matrix(&self) -> DMat3 {
        rotation_matrix(self.rotation)
    }

    /// Returns the rigid transform mapping this pose's frame into its parent.
    #[must_use]
    pub fn to_affine(&self) -> DAffine3 {
        DAffine3::from_mat3_translation(self.matrix(), self.position)
    }

    /// Places `local` inside the frame described by `self`.
    ///
    /// The position goes through `Rx · Ry · Rz` of this pose and is then
    /// offset by this pose's position. The rotation is `q(self) * q(local)`.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        let position = self.position + self.matrix() * local.position;
        let rotation = self.quat() * local.quat();
        Self::from_position_quat(position, rotation)
    }

    /// Expresses the world pose `world` in the frame described by `self`.
    ///
    /// Exact inverse of [`Pose::compose`]:
    /// `parent.localize(&parent.compose(&l)) ≈ l`.
    #[must_use]
    pub fn localize(&self, world: &Self) -> Self {
        let parent = DAffine3::from_rotation_translation(self.quat(), self.position);
        let position = parent.inverse().transform_point3(world.position);
        let rotation = self.quat().inverse() * world.quat();
        Self::from_position_quat(position, rotation)
    }

    /// Returns true if both poses describe the same placement within `eps`.
    ///
    /// Rotations are compared as matrices so equivalent angle triples
    /// (wraparound, gimbal lock) compare equal.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, eps: f64) -> bool {
        self.position.abs_diff_eq(other.position, eps)
            && self.matrix().abs_diff_eq(other.matrix(), eps)
    }

    /// Returns the rotation in degrees.
    #[must_use]
    pub fn rotation_degrees(&self) -> DVec3 {
        self.rotation * (180.0 / std::f64::consts::PI)
    }

    /// Sets the rotation from angles in degrees.
    pub fn set_rotation_degrees(&mut self, degrees: DVec3) {
        self.rotation = degrees * (std::f64::consts::PI / 180.0);
    }

    /// Snaps the position to multiples of `snap` millimeters.
    pub fn snap_position(&mut self, snap: f64) {
        if snap > 0.0 {
            self.position = (self.position / snap).round() * snap;
        }
    }

    /// Snaps each rotation angle to multiples of `snap_degrees`.
    pub fn snap_rotation(&mut self, snap_degrees: f64) {
        if snap_degrees > 0.0 {
            let mut degrees = self.rotation_degrees();
            degrees = (degrees / snap_degrees).round() * snap_degrees;
            self.set_rotation_degrees(degrees);
        }
    }
}
