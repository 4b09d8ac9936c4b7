//! Stateless intersection predicates over the collision primitives
//!
//! These are the broad-phase building blocks: slab tests against boxes,
//! box/box overlap, and bounding-box derivation for triangles and capsules.
//! All functions tolerate boxes given with unordered corners.

use crate::foundation::math::Vec3;
use crate::physics::collision::primitives::{Aabb, Capsule, Line, Ray, Triangle};

/// Result of a ray/box intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayBoxHit {
    /// Entry point on the box surface
    pub point: Vec3,
    /// Axis-aligned surface normal at the entry point, opposing the ray
    pub normal: Vec3,
    /// Ray parameter of the entry point, in multiples of the ray direction
    pub t: f32,
}

/// Slab test of a ray against a box.
///
/// Returns `None` when the ray's line misses the box or the box lies
/// entirely behind the origin. A negative `t` with a hit means the origin
/// is inside the box.
pub fn ray_vs_aabb(ray: &Ray, aabb: &Aabb) -> Option<RayBoxHit> {
    let mut t_near = (aabb.a - ray.origin).component_div(&ray.direction);
    let mut t_far = (aabb.b - ray.origin).component_div(&ray.direction);

    if t_near.x > t_far.x {
        std::mem::swap(&mut t_near.x, &mut t_far.x);
    }
    if t_near.y > t_far.y {
        std::mem::swap(&mut t_near.y, &mut t_far.y);
    }
    if t_near.z > t_far.z {
        std::mem::swap(&mut t_near.z, &mut t_far.z);
    }

    let t_hit_near = t_near.x.max(t_near.y).max(t_near.z);
    let t_hit_far = t_far.x.min(t_far.y).min(t_far.z);

    if t_hit_near > t_hit_far || t_hit_far < 0.0 {
        return None;
    }

    let normal = if t_hit_near == t_near.x {
        if ray.direction.x < 0.0 {
            Vec3::x()
        } else {
            -Vec3::x()
        }
    } else if t_hit_near == t_near.y {
        if ray.direction.y < 0.0 {
            Vec3::y()
        } else {
            -Vec3::y()
        }
    } else if ray.direction.z < 0.0 {
        Vec3::z()
    } else {
        -Vec3::z()
    };

    Some(RayBoxHit {
        point: ray.point_at(t_hit_near),
        normal,
        t: t_hit_near,
    })
}

/// Whether a segment crosses the box surface within its extent
pub fn line_vs_aabb(line: &Line, aabb: &Aabb) -> bool {
    ray_vs_aabb(&Ray::new(line.a, line.direction()), aabb)
        .map_or(false, |hit| (0.0..=1.0).contains(&hit.t))
}

/// Whether any of the triangle's three edges crosses the box surface
pub fn triangle_vs_aabb(triangle: &Triangle, aabb: &Aabb) -> bool {
    line_vs_aabb(&Line::new(triangle.a, triangle.b), aabb)
        || line_vs_aabb(&Line::new(triangle.b, triangle.c), aabb)
        || line_vs_aabb(&Line::new(triangle.c, triangle.a), aabb)
}

/// Inclusive interval-overlap test on all three axes. Symmetric, and
/// boxes that merely touch count as intersecting.
pub fn aabb_vs_aabb(first: &Aabb, second: &Aabb) -> bool {
    let (min_a, max_a) = (first.min(), first.max());
    let (min_b, max_b) = (second.min(), second.max());

    min_a.x <= max_b.x
        && max_a.x >= min_b.x
        && min_a.y <= max_b.y
        && max_a.y >= min_b.y
        && min_a.z <= max_b.z
        && max_a.z >= min_b.z
}

/// Tight bounding box of a triangle
pub fn triangle_aabb(triangle: &Triangle) -> Aabb {
    Aabb::new(
        triangle.a.inf(&triangle.b).inf(&triangle.c),
        triangle.a.sup(&triangle.b).sup(&triangle.c),
    )
}

/// Bounding box of a capsule: the tip/base extremes padded by the radius
pub fn capsule_aabb(capsule: &Capsule) -> Aabb {
    let padding = Vec3::repeat(capsule.radius);
    Aabb::new(
        capsule.tip.inf(&capsule.base) - padding,
        capsule.tip.sup(&capsule.base) + padding,
    )
}

/// Volume of a box; one cubic unit is the octree's subdivision floor
pub fn aabb_volume(aabb: &Aabb) -> f32 {
    let extent = aabb.max() - aabb.min();
    extent.x * extent.y * extent.z
}
