//! Transform component for scene nodes.

use crate::math::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Rotation whose local +Z axis points along `z_axis`, with local +Y as close
/// to `up` as possible.
///
/// When `z_axis` is parallel to `up` the basis is nudged sideways instead of
/// collapsing.
pub(crate) fn rotation_facing(z_axis: Vec3, up: Vec3) -> Quat {
    let z = z_axis.normalize_or(Vec3::Z);
    let mut x = up.cross(z);
    if x.length_squared() < 1e-12 {
        // nudge off the pole
        let nudged = if up.z.abs() < 0.999 {
            z + Vec3::new(0.0, 0.0, 1e-4)
        } else {
            z + Vec3::new(1e-4, 0.0, 0.0)
        };
        x = up.cross(nudged.normalize());
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Position, rotation, and scale of a scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Local position.
    pub position: Vec3,
    /// Local rotation.
    pub rotation: Quat,
    /// Local scale.
    pub scale: Vec3,
    /// Whether the matrix needs recomposing.
    dirty: bool,
    /// Cached local matrix.
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create a new identity transform.
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            dirty: false,
            matrix: Mat4::IDENTITY,
        }
    }

    /// Create a transform from position.
    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self::new();
        t.set_position(position);
        t
    }

    /// Set position.
    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    /// Set rotation from XYZ Euler angles (radians).
    #[inline]
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
        self.dirty = true;
    }

    /// Set rotation from quaternion.
    #[inline]
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Set scale.
    #[inline]
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Rotate around the local X axis.
    #[inline]
    pub fn rotate_x(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_x(angle)).normalize();
        self.dirty = true;
    }

    /// Turn so that local +Z points at `target`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.rotation = rotation_facing(target - self.position, up);
        self.dirty = true;
    }

    /// Local +Y in parent space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local +Z in parent space.
    pub fn back(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// The local transformation matrix.
    pub fn matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.matrix = self.compose();
            self.dirty = false;
        }
        self.matrix
    }

    /// Compose the matrix without touching the cache.
    pub fn compose(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Check if the matrix needs recomposing.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
