//! Primitive collision shapes
//!
//! Plain geometric value types shared by the collision math, the spatial
//! index, and the narrow phase. Intersection and contact logic lives in
//! [`intersect`](super::intersect) and [`contact`](super::contact).

use crate::foundation::math::{normalize_or, Vec3};

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Start point
    pub a: Vec3,
    /// End point
    pub b: Vec3,
}

impl Line {
    /// Creates a new line segment
    #[must_use]
    pub const fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    /// Direction from start to end (not normalized)
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.b - self.a
    }
}

/// A ray for intersection queries
///
/// The direction need not be normalized; intersection parameters are
/// measured in multiples of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at parameter t
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// An axis-aligned box spanned by two opposite corners
///
/// The corners are not required to be min/max ordered; consumers order
/// them on demand via [`min`](Self::min) and [`max`](Self::max).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// First corner
    pub a: Vec3,
    /// Opposite corner
    pub b: Vec3,
}

impl Aabb {
    /// Creates a new box from two opposite corners
    #[must_use]
    pub const fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    /// Component-wise smaller corner
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.a.inf(&self.b)
    }

    /// Component-wise larger corner
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.a.sup(&self.b)
    }

    /// Center of the box
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.a + self.b) / 2.0
    }
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex in world space
    pub a: Vec3,
    /// Second vertex
    pub b: Vec3,
    /// Third vertex
    pub c: Vec3,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            a: Vec3::zeros(),
            b: Vec3::zeros(),
            c: Vec3::zeros(),
        }
    }
}

impl Triangle {
    /// Creates a new triangle
    #[must_use]
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit plane normal by the right-hand rule over (b - a, c - a).
    /// Degenerate triangles fall back to the world up axis.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        normalize_or((self.b - self.a).cross(&(self.c - self.a)), Vec3::y())
    }

    /// Centroid (average of the three vertices)
    #[must_use]
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }
}

/// A sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    #[must_use]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// A capsule: a segment from `base` to `tip` swept by a sphere of `radius`
///
/// `tip` and `base` are the outer extremes, not the core segment
/// endpoints; see [`core`](Self::core).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Outer extreme of the capsule's top cap
    pub tip: Vec3,
    /// Outer extreme of the capsule's bottom cap
    pub base: Vec3,
    /// Radius of the swept sphere
    pub radius: f32,
}

impl Capsule {
    /// Creates a new capsule
    #[must_use]
    pub const fn new(tip: Vec3, base: Vec3, radius: f32) -> Self {
        Self { tip, base, radius }
    }

    /// Unit axis from base to tip. Zero-length capsules fall back to the
    /// world up axis.
    #[must_use]
    pub fn axis(&self) -> Vec3 {
        normalize_or(self.tip - self.base, Vec3::y())
    }

    /// Core segment: the sphere-center track, inset from both extremes by
    /// the radius
    #[must_use]
    pub fn core(&self) -> Line {
        let offset = self.axis() * self.radius;
        Line::new(self.base + offset, self.tip - offset)
    }

    /// This capsule shifted by `offset`
    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            tip: self.tip + offset,
            base: self.base + offset,
            radius: self.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_corners_order_independent() {
        let box_a = Aabb::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(box_a.min(), Vec3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(box_a.max(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(box_a.center(), Vec3::zeros());
    }

    #[test]
    fn test_triangle_normal_right_handed() {
        let tri = Triangle::new(
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        assert_relative_eq!(tri.normal(), Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_normal_is_finite() {
        let tri = Triangle::default();
        let n = tri.normal();
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_capsule_core_inset_by_radius() {
        let capsule = Capsule::new(Vec3::new(0.0, 0.8, 0.0), Vec3::new(0.0, -0.8, 0.0), 0.4);
        let core = capsule.core();
        assert_relative_eq!(core.a, Vec3::new(0.0, -0.4, 0.0), epsilon = 1e-6);
        assert_relative_eq!(core.b, Vec3::new(0.0, 0.4, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_capsule_translated_keeps_radius() {
        let capsule = Capsule::new(Vec3::new(0.0, 0.8, 0.0), Vec3::new(0.0, -0.8, 0.0), 0.4);
        let moved = capsule.translated(Vec3::new(5.0, 1.0, -2.0));
        assert_relative_eq!(moved.tip, Vec3::new(5.0, 1.8, -2.0));
        assert_relative_eq!(moved.base, Vec3::new(5.0, 0.2, -2.0));
        assert_relative_eq!(moved.radius, 0.4);
    }
}
