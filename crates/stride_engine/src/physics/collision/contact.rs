//! Narrow-phase contact tests
//!
//! Closest-point penetration tests between spheres, capsules, and
//! triangles. The capsule tests reduce to a representative sphere on the
//! capsule's core segment and delegate to the sphere test, so every
//! triangle contact reports the same normal convention.
//!
//! Contact normals are the triangle's plane normal, not the direction from
//! the closest feature. Edge and corner hits therefore push along the face
//! normal as well, which keeps the character resolver from catching on
//! triangle seams inside flat meshes.

use crate::foundation::math::Vec3;
use crate::physics::collision::primitives::{Capsule, Line, Sphere, Triangle};

/// Penetration reported by a narrow-phase test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit direction to push the penetrating shape along
    pub normal: Vec3,
    /// Penetration depth along the normal
    pub depth: f32,
}

/// Closest point to `point` on a segment. Zero-length segments yield the
/// segment start, never NaN.
#[must_use]
pub fn closest_point_on_segment(segment: &Line, point: Vec3) -> Vec3 {
    let ab = segment.direction();
    let length_sq = ab.magnitude_squared();
    if length_sq <= f32::EPSILON {
        return segment.a;
    }
    let t = ((point - segment.a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    segment.a + ab * t
}

/// Closest point to `point` on a triangle.
///
/// Returns `point` unchanged when it projects inside the face; otherwise
/// the nearest point on the closest of the three edges.
#[must_use]
pub fn closest_point_on_triangle(triangle: &Triangle, point: Vec3) -> Vec3 {
    let normal = triangle.normal();
    let c0 = (point - triangle.a).cross(&(triangle.b - triangle.a));
    let c1 = (point - triangle.b).cross(&(triangle.c - triangle.b));
    let c2 = (point - triangle.c).cross(&(triangle.a - triangle.c));
    let inside =
        c0.dot(&normal) <= 0.0 && c1.dot(&normal) <= 0.0 && c2.dot(&normal) <= 0.0;
    if inside {
        return point;
    }

    let mut best = closest_point_on_segment(&Line::new(triangle.a, triangle.b), point);
    let mut best_dist_sq = (point - best).magnitude_squared();

    let candidate = closest_point_on_segment(&Line::new(triangle.b, triangle.c), point);
    let dist_sq = (point - candidate).magnitude_squared();
    if dist_sq < best_dist_sq {
        best = candidate;
        best_dist_sq = dist_sq;
    }

    let candidate = closest_point_on_segment(&Line::new(triangle.c, triangle.a), point);
    let dist_sq = (point - candidate).magnitude_squared();
    if dist_sq < best_dist_sq {
        best = candidate;
    }

    best
}

/// Whether two spheres overlap (strictly; touching does not count)
#[must_use]
pub fn sphere_vs_sphere(first: &Sphere, second: &Sphere) -> bool {
    let combined = first.radius + second.radius;
    (second.center - first.center).magnitude_squared() < combined * combined
}

/// Sphere/triangle penetration test.
///
/// The center is projected onto the triangle plane and tested against the
/// three edge half-spaces. A projection inside the face collides whenever
/// the plane distance is within the radius; otherwise the nearest edge
/// point must lie strictly within the radius.
#[must_use]
pub fn sphere_vs_triangle(sphere: &Sphere, triangle: &Triangle) -> Option<Contact> {
    let normal = triangle.normal();
    let distance = (sphere.center - triangle.a).dot(&normal);
    if distance.abs() > sphere.radius {
        return None;
    }

    let projected = sphere.center - normal * distance;

    let c0 = (projected - triangle.a).cross(&(triangle.b - triangle.a));
    let c1 = (projected - triangle.b).cross(&(triangle.c - triangle.b));
    let c2 = (projected - triangle.c).cross(&(triangle.a - triangle.c));
    let inside =
        c0.dot(&normal) <= 0.0 && c1.dot(&normal) <= 0.0 && c2.dot(&normal) <= 0.0;

    let penetration = if inside {
        sphere.center - projected
    } else {
        let mut best = sphere.center
            - closest_point_on_segment(&Line::new(triangle.a, triangle.b), sphere.center);
        let mut best_dist_sq = best.magnitude_squared();

        let candidate = sphere.center
            - closest_point_on_segment(&Line::new(triangle.b, triangle.c), sphere.center);
        let dist_sq = candidate.magnitude_squared();
        if dist_sq < best_dist_sq {
            best = candidate;
            best_dist_sq = dist_sq;
        }

        let candidate = sphere.center
            - closest_point_on_segment(&Line::new(triangle.c, triangle.a), sphere.center);
        let dist_sq = candidate.magnitude_squared();
        if dist_sq < best_dist_sq {
            best = candidate;
            best_dist_sq = dist_sq;
        }

        if best_dist_sq >= sphere.radius * sphere.radius {
            return None;
        }
        best
    };

    Some(Contact {
        normal,
        depth: sphere.radius - penetration.magnitude(),
    })
}

/// Capsule/triangle penetration test.
///
/// Picks a representative sphere center on the capsule's core segment:
/// where the capsule line crosses the triangle plane (clamped back onto the
/// triangle and the core), or the closer core endpoint when the axis runs
/// parallel to the plane. Delegates to [`sphere_vs_triangle`].
#[must_use]
pub fn capsule_vs_triangle(capsule: &Capsule, triangle: &Triangle) -> Option<Contact> {
    let core = capsule.core();
    let axis = capsule.axis();
    let normal = triangle.normal();
    let alignment = normal.dot(&axis).abs();

    let center = if alignment <= f32::EPSILON {
        let toward_a = closest_point_on_triangle(triangle, core.a);
        let toward_b = closest_point_on_triangle(triangle, core.b);
        let on_core_a = closest_point_on_segment(&core, toward_a);
        let on_core_b = closest_point_on_segment(&core, toward_b);

        if (on_core_a - toward_a).magnitude_squared()
            < (on_core_b - toward_b).magnitude_squared()
        {
            on_core_a
        } else {
            on_core_b
        }
    } else {
        let t = normal.dot(&(triangle.a - capsule.base)) / alignment;
        let line_plane_intersection = capsule.base + axis * t;
        let reference = closest_point_on_triangle(triangle, line_plane_intersection);
        closest_point_on_segment(&core, reference)
    };

    sphere_vs_triangle(&Sphere::new(center, capsule.radius), triangle)
}

/// Whether a capsule overlaps a sphere
#[must_use]
pub fn capsule_vs_sphere(capsule: &Capsule, sphere: &Sphere) -> bool {
    let on_core = closest_point_on_segment(&capsule.core(), sphere.center);
    sphere_vs_sphere(&Sphere::new(on_core, capsule.radius), sphere)
}

/// Whether two capsules overlap.
///
/// Chooses the core endpoint of the first capsule nearest the second's
/// core, clamps it onto the second core, and finishes with a sphere test.
#[must_use]
pub fn capsule_vs_capsule(first: &Capsule, second: &Capsule) -> bool {
    let core_a = first.core();
    let core_b = second.core();

    let d0 = (core_b.a - core_a.a).magnitude_squared();
    let d1 = (core_b.b - core_a.a).magnitude_squared();
    let d2 = (core_b.a - core_a.b).magnitude_squared();
    let d3 = (core_b.b - core_a.b).magnitude_squared();

    let best_a = if d2 < d0 || d2 < d1 || d3 < d0 || d3 < d1 {
        core_a.b
    } else {
        core_a.a
    };
    let best_b = closest_point_on_segment(&core_b, best_a);

    sphere_vs_sphere(
        &Sphere::new(best_a, first.radius),
        &Sphere::new(best_b, second.radius),
    )
}
