//! Triangle registry assigning stable ids to static world geometry

use crate::physics::collision::intersect::triangle_aabb;
use crate::physics::collision::primitives::{Aabb, Triangle};

/// Stable identifier of a registered triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleId(usize);

impl TriangleId {
    /// Index into the registry's backing storage
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Append-only store of world triangles.
///
/// Ids are assigned in registration order and never reused; triangles are
/// immutable once registered. The spatial index stores ids only and reads
/// geometry back through a registry reference, so several independent
/// worlds can coexist.
#[derive(Debug, Default, Clone)]
pub struct TriangleRegistry {
    triangles: Vec<Triangle>,
}

impl TriangleRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a triangle and return its id
    pub fn register(&mut self, triangle: Triangle) -> TriangleId {
        let id = TriangleId(self.triangles.len());
        self.triangles.push(triangle);
        id
    }

    /// Copy out the triangle for `id`.
    ///
    /// An out-of-range id is a logic error: debug builds panic, release
    /// builds log a warning and substitute the degenerate default triangle.
    #[must_use]
    pub fn get(&self, id: TriangleId) -> Triangle {
        debug_assert!(
            id.index() < self.triangles.len(),
            "triangle id {} out of range",
            id.index()
        );
        self.triangles.get(id.index()).copied().unwrap_or_else(|| {
            log::warn!(
                "triangle id {} out of range ({} registered), substituting degenerate triangle",
                id.index(),
                self.triangles.len()
            );
            Triangle::default()
        })
    }

    /// Bounding box of the triangle for `id`
    #[must_use]
    pub fn aabb_of(&self, id: TriangleId) -> Aabb {
        triangle_aabb(&self.get(id))
    }

    /// Number of registered triangles
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the registry holds no triangles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
