//! Collision detection building blocks
//!
//! # Module Organization
//!
//! - [`primitives`] - Plain geometric value types (segments, rays, boxes,
//!   triangles, spheres, capsules)
//! - [`intersect`] - Stateless broad-phase predicates over those types
//! - [`registry`] - Stable-id storage for static world triangles
//! - [`contact`] - Narrow-phase penetration tests

pub mod contact;
pub mod intersect;
pub mod primitives;
pub mod registry;

// Re-export commonly used types
pub use contact::{
    capsule_vs_capsule, capsule_vs_sphere, capsule_vs_triangle, sphere_vs_sphere,
    sphere_vs_triangle, Contact,
};
pub use intersect::{
    aabb_volume, aabb_vs_aabb, capsule_aabb, line_vs_aabb, ray_vs_aabb, triangle_aabb,
    triangle_vs_aabb, RayBoxHit,
};
pub use primitives::{Aabb, Capsule, Line, Ray, Sphere, Triangle};
pub use registry::{TriangleId, TriangleRegistry};
