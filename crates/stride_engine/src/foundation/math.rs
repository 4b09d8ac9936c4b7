//! Math utilities and types
//!
//! Provides the fundamental math types shared by the collision and
//! simulation modules.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Normalizes a vector, falling back to `fallback` when the input is too
/// short to carry a direction. Never returns NaN components.
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or(fallback)
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    #[must_use]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform with position and a uniform scale factor
    #[must_use]
    pub fn from_position_scale(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale: Vec3::new(scale, scale, scale),
            ..Default::default()
        }
    }

    /// Apply this transform to a point (scale, then rotate, then translate)
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(&point)
    }

    /// Apply this transform to a direction vector (no translation)
    #[must_use]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(&vector)
    }
}
