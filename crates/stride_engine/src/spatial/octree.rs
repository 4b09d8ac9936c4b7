//! Sparse octree spatial index over registered triangles
//!
//! Nodes live in a flat arena; a node's 8 children occupy one contiguous
//! block addressed by the index of the first, and node 0 is the root.
//! Subdivision is lazy: inserting into a crowded node only marks it dirty,
//! and the node is materialized (split, triangles pushed down) the next
//! time a query visits it, or eagerly by [`Octree::materialize_all`].
//!
//! The tree stores [`TriangleId`]s only. Geometry is read back through a
//! [`TriangleRegistry`] reference passed into the operations that need it,
//! so one registry can back several trees and tests can build small
//! isolated worlds.

use crate::foundation::math::Vec3;
use crate::physics::collision::intersect::{aabb_volume, aabb_vs_aabb};
use crate::physics::collision::primitives::Aabb;
use crate::physics::collision::registry::{TriangleId, TriangleRegistry};
use serde::{Deserialize, Serialize};

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Triangles a node may hold before subdividing on its next visit
    pub max_elements_per_node: usize,

    /// Volume floor in cubic units; nodes at or below it never subdivide
    pub min_node_volume: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_elements_per_node: 8,
            min_node_volume: 1.0,
        }
    }
}

/// Errors from octree construction
#[derive(thiserror::Error, Debug)]
pub enum OctreeError {
    /// The root region must span a positive volume on every axis
    #[error("octree region has zero volume: {0:?}")]
    DegenerateRegion(Aabb),
}

/// Single node in the octree arena
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// Region of space this node covers
    pub region: Aabb,

    /// Triangles stored directly on this node
    pub elements: Vec<TriangleId>,

    /// Arena index of the first of 8 contiguous children; 0 means no
    /// children, since the root can never be a child
    pub first_child: usize,

    /// Whether this node must split and rebalance before the next read
    pub dirty: bool,
}

impl OctreeNode {
    fn new(region: Aabb) -> Self {
        Self {
            region,
            elements: Vec::new(),
            first_child: 0,
            dirty: false,
        }
    }

    /// Whether this node currently has no children
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.first_child == 0
    }
}

/// Sparse spatial index mapping regions to the triangles overlapping them
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    config: OctreeConfig,
}

impl Octree {
    /// Arena index of the root node
    pub const ROOT: usize = 0;

    /// Create a tree covering `region`.
    ///
    /// # Errors
    ///
    /// Returns [`OctreeError::DegenerateRegion`] when the region has zero
    /// volume, since such a region could never subdivide meaningfully.
    pub fn new(region: Aabb, config: OctreeConfig) -> Result<Self, OctreeError> {
        if aabb_volume(&region) <= 0.0 {
            return Err(OctreeError::DegenerateRegion(region));
        }
        Ok(Self {
            nodes: vec![OctreeNode::new(region)],
            config,
        })
    }

    /// Region covered by the whole tree
    #[must_use]
    pub fn region(&self) -> Aabb {
        self.nodes[Self::ROOT].region
    }

    /// Configuration the tree was built with
    #[must_use]
    pub const fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Number of allocated nodes; subdivision only ever grows this
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Read access to a node by arena index
    #[must_use]
    pub fn node(&self, node_id: usize) -> Option<&OctreeNode> {
        self.nodes.get(node_id)
    }

    /// Insert a triangle id at the root
    pub fn insert(&mut self, triangle: TriangleId) {
        self.insert_at(Self::ROOT, triangle);
    }

    /// Insert a triangle id directly into a node.
    ///
    /// The node is marked dirty when it already has children, or when it
    /// outgrew its capacity and still spans more than the volume floor.
    /// An out-of-range node id is a logic error: debug builds panic,
    /// release builds log and drop the insert.
    pub fn insert_at(&mut self, node_id: usize, triangle: TriangleId) {
        debug_assert!(
            node_id < self.nodes.len(),
            "octree node id {node_id} out of range"
        );
        let Some(node) = self.nodes.get_mut(node_id) else {
            log::error!(
                "octree node id {} out of range ({} nodes), dropping insert of triangle {}",
                node_id,
                self.nodes.len(),
                triangle.index()
            );
            return;
        };

        node.elements.push(triangle);
        let over_capacity = node.elements.len() > self.config.max_elements_per_node
            && aabb_volume(&node.region) > self.config.min_node_volume;
        if node.first_child != 0 || over_capacity {
            node.dirty = true;
        }
    }

    /// Collect the ids of all triangles whose nodes overlap `region`,
    /// starting from the root. See [`query_region_from`](Self::query_region_from).
    pub fn query_region(
        &mut self,
        region: &Aabb,
        registry: &TriangleRegistry,
        visited: &mut usize,
    ) -> Vec<TriangleId> {
        self.query_region_from(Self::ROOT, region, registry, visited)
    }

    /// Collect the ids of all triangles whose nodes overlap `region`,
    /// starting from an arbitrary subtree.
    ///
    /// Dirty nodes encountered on the way are materialized, so the tree
    /// subdivides exactly where queries land. `visited` counts every node
    /// popped from the traversal stack, including ones whose region was
    /// then rejected. The result is not deduplicated: a triangle spanning
    /// several visited leaves appears once per leaf.
    pub fn query_region_from(
        &mut self,
        node_id: usize,
        region: &Aabb,
        registry: &TriangleRegistry,
        visited: &mut usize,
    ) -> Vec<TriangleId> {
        let mut output = Vec::new();
        debug_assert!(
            node_id < self.nodes.len(),
            "octree node id {node_id} out of range"
        );
        if node_id >= self.nodes.len() {
            log::error!(
                "octree node id {} out of range ({} nodes), returning no candidates",
                node_id,
                self.nodes.len()
            );
            return output;
        }

        let visited_before = *visited;
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            *visited += 1;
            if !aabb_vs_aabb(region, &self.nodes[current].region) {
                continue;
            }
            if self.nodes[current].dirty {
                self.materialize(current, registry);
            }

            let first_child = self.nodes[current].first_child;
            if first_child != 0 {
                stack.extend(first_child..first_child + 8);
            } else {
                output.extend_from_slice(&self.nodes[current].elements);
            }
        }

        log::trace!(
            "octree query from node {} visited {} nodes, returned {} candidates",
            node_id,
            *visited - visited_before,
            output.len()
        );
        output
    }

    /// Materialize every dirty node in the tree.
    ///
    /// Children are always appended after their parent, so a single
    /// forward sweep over the growing arena settles everything; afterwards
    /// no node is dirty. Worth running once after world load, before
    /// queries start paying the subdivision cost mid-frame.
    pub fn materialize_all(&mut self, registry: &TriangleRegistry) {
        let mut node_id = 0;
        while node_id < self.nodes.len() {
            if self.nodes[node_id].dirty {
                self.materialize(node_id, registry);
            }
            node_id += 1;
        }
        log::debug!(
            "octree materialized, {} nodes over {} triangles",
            self.nodes.len(),
            registry.len()
        );
    }

    /// The one place lazy subdivision happens: give the node children if
    /// it has none, push its triangles down, clear the flag.
    fn materialize(&mut self, node_id: usize, registry: &TriangleRegistry) {
        if self.nodes[node_id].first_child == 0 {
            self.split(node_id);
        }
        self.redistribute(node_id, registry);
        self.nodes[node_id].dirty = false;
    }

    /// Allocate the 8 children of a node as one block at the arena's end.
    ///
    /// Octant `i` spans the box between the parent midpoint and the corner
    /// built by taking `region.a` on axis x/y/z when bit 2/1/0 of `i` is
    /// set, `region.b` otherwise. The children exactly partition the
    /// parent.
    fn split(&mut self, node_id: usize) {
        let region = self.nodes[node_id].region;
        self.nodes[node_id].first_child = self.nodes.len();

        let midpoint = region.center();
        for octant in 0..8 {
            let corner = Vec3::new(
                if octant & 4 != 0 { region.a.x } else { region.b.x },
                if octant & 2 != 0 { region.a.y } else { region.b.y },
                if octant & 1 != 0 { region.a.z } else { region.b.z },
            );
            self.nodes.push(OctreeNode::new(Aabb::new(midpoint, corner)));
        }
    }

    /// Move a node's triangles into every child whose region overlaps the
    /// triangle's bounding box; ids may land in several children. A
    /// receiving child is queued to subdivide on its next visit whenever
    /// it has children or sits above the volume floor, regardless of how
    /// few elements it holds.
    fn redistribute(&mut self, node_id: usize, registry: &TriangleRegistry) {
        let elements = std::mem::take(&mut self.nodes[node_id].elements);
        let first_child = self.nodes[node_id].first_child;

        for triangle in elements {
            let bounds = registry.aabb_of(triangle);
            for child_id in first_child..first_child + 8 {
                let child = &mut self.nodes[child_id];
                if aabb_vs_aabb(&bounds, &child.region) {
                    child.elements.push(triangle);
                    if child.first_child != 0
                        || aabb_volume(&child.region) > self.config.min_node_volume
                    {
                        child.dirty = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::primitives::Triangle;
    use approx::assert_relative_eq;

    fn cube_region(half_extent: f32) -> Aabb {
        Aabb::new(Vec3::repeat(-half_extent), Vec3::repeat(half_extent))
    }

    /// Small triangle whose AABB sits inside a 0.2-side box at `center`.
    fn small_triangle(center: Vec3) -> Triangle {
        Triangle::new(
            center + Vec3::new(-0.1, 0.0, -0.1),
            center + Vec3::new(0.1, 0.0, -0.1),
            center + Vec3::new(0.0, 0.1, 0.1),
        )
    }

    #[test]
    fn test_new_rejects_degenerate_region() {
        let flat = Aabb::new(Vec3::zeros(), Vec3::new(4.0, 0.0, 4.0));
        let result = Octree::new(flat, OctreeConfig::default());
        assert!(matches!(result, Err(OctreeError::DegenerateRegion(_))));
    }

    #[test]
    fn test_insert_then_query_finds_triangle() {
        let mut registry = TriangleRegistry::new();
        let mut octree = Octree::new(cube_region(4.0), OctreeConfig::default()).unwrap();

        let id = registry.register(small_triangle(Vec3::new(1.0, 1.0, 1.0)));
        octree.insert(id);

        let mut visited = 0;
        let query = Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.5, 1.5, 1.5));
        let found = octree.query_region(&query, &registry, &mut visited);
        assert!(found.contains(&id));
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_split_children_partition_parent() {
        let region = Aabb::new(Vec3::new(-2.0, -4.0, -6.0), Vec3::new(2.0, 4.0, 6.0));
        let mut octree = Octree::new(region, OctreeConfig::default()).unwrap();
        octree.split(Octree::ROOT);

        let first_child = octree.nodes[Octree::ROOT].first_child;
        assert_eq!(first_child, 1);
        assert_eq!(octree.node_count(), 9);

        let midpoint = region.center();
        let parent_volume = aabb_volume(&region);
        for octant in 0..8 {
            let child = &octree.nodes[first_child + octant];
            assert_relative_eq!(child.region.a, midpoint);
            let corner = child.region.b;
            assert_relative_eq!(corner.x, if octant & 4 != 0 { region.a.x } else { region.b.x });
            assert_relative_eq!(corner.y, if octant & 2 != 0 { region.a.y } else { region.b.y });
            assert_relative_eq!(corner.z, if octant & 1 != 0 { region.a.z } else { region.b.z });
            assert_relative_eq!(aabb_volume(&child.region), parent_volume / 8.0);
        }
    }

    #[test]
    fn test_insert_marks_dirty_only_over_capacity() {
        let mut registry = TriangleRegistry::new();
        let mut octree = Octree::new(cube_region(4.0), OctreeConfig::default()).unwrap();

        for i in 0..8u8 {
            let id = registry.register(small_triangle(Vec3::new(f32::from(i) * 0.01, 0.0, 0.0)));
            octree.insert(id);
        }
        assert!(!octree.nodes[Octree::ROOT].dirty);

        let id = registry.register(small_triangle(Vec3::zeros()));
        octree.insert(id);
        assert!(octree.nodes[Octree::ROOT].dirty);
    }

    #[test]
    fn test_volume_floor_prevents_subdivision() {
        let mut registry = TriangleRegistry::new();
        let mut octree = Octree::new(cube_region(0.5), OctreeConfig::default()).unwrap();

        let mut ids = Vec::new();
        for _ in 0..20 {
            let id = registry.register(small_triangle(Vec3::zeros()));
            octree.insert(id);
            ids.push(id);
        }
        assert!(!octree.nodes[Octree::ROOT].dirty);

        let mut visited = 0;
        let found = octree.query_region(&cube_region(0.5), &registry, &mut visited);
        assert_eq!(found, ids);
        assert_eq!(octree.node_count(), 1);
    }

    #[test]
    fn test_query_materializes_only_along_its_path() {
        let mut registry = TriangleRegistry::new();
        let config = OctreeConfig {
            max_elements_per_node: 1,
            min_node_volume: 1.0,
        };
        let mut octree = Octree::new(cube_region(4.0), config).unwrap();

        let near = registry.register(small_triangle(Vec3::repeat(-3.0)));
        let far = registry.register(small_triangle(Vec3::repeat(3.0)));
        octree.insert(near);
        octree.insert(far);
        assert!(octree.nodes[Octree::ROOT].dirty);

        let mut visited = 0;
        let query = Aabb::new(Vec3::repeat(-3.05), Vec3::repeat(-2.95));
        let found = octree.query_region(&query, &registry, &mut visited);
        assert!(found.contains(&near));
        assert!(!found.contains(&far));
        assert!(visited >= 9);
    }

    #[test]
    fn test_query_is_idempotent_once_settled() {
        let mut registry = TriangleRegistry::new();
        let mut octree = Octree::new(cube_region(4.0), OctreeConfig::default()).unwrap();

        for i in 0..9u8 {
            let id = registry.register(small_triangle(Vec3::new(
                -2.0 + f32::from(i) * 0.5,
                0.0,
                2.0,
            )));
            octree.insert(id);
        }

        let query = cube_region(4.0);
        let mut visited = 0;
        let first = octree.query_region(&query, &registry, &mut visited);
        let mut visited_again = 0;
        let second = octree.query_region(&query, &registry, &mut visited_again);
        assert_eq!(first, second);
        assert_eq!(visited, visited_again);
    }

    #[test]
    fn test_materialize_all_clears_every_dirty_flag() {
        let mut registry = TriangleRegistry::new();
        let mut octree = Octree::new(cube_region(4.0), OctreeConfig::default()).unwrap();

        for i in 0..12u8 {
            let id = registry.register(small_triangle(Vec3::new(
                -3.0 + f32::from(i) * 0.5,
                0.0,
                0.0,
            )));
            octree.insert(id);
        }
        assert!(octree.nodes[Octree::ROOT].dirty);

        octree.materialize_all(&registry);
        assert!(octree.nodes.iter().all(|node| !node.dirty));
        assert!(octree.node_count() > 1);
    }

    #[test]
    fn test_duplicates_allowed_across_leaves() {
        let mut registry = TriangleRegistry::new();
        let config = OctreeConfig {
            max_elements_per_node: 1,
            min_node_volume: 1.0,
        };
        let mut octree = Octree::new(cube_region(1.0), config).unwrap();

        // Two triangles straddling the center land in every octant.
        let first = registry.register(small_triangle(Vec3::zeros()));
        let second = registry.register(small_triangle(Vec3::zeros()));
        octree.insert(first);
        octree.insert(second);

        let mut visited = 0;
        let found = octree.query_region(&cube_region(1.0), &registry, &mut visited);
        assert_eq!(found.iter().filter(|id| **id == first).count(), 8);
        assert_eq!(found.iter().filter(|id| **id == second).count(), 8);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_insert_at_bad_node_panics_in_debug() {
        let mut registry = TriangleRegistry::new();
        let mut octree = Octree::new(cube_region(4.0), OctreeConfig::default()).unwrap();
        let id = registry.register(small_triangle(Vec3::zeros()));
        octree.insert_at(99, id);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_query_from_bad_node_panics_in_debug() {
        let registry = TriangleRegistry::new();
        let mut octree = Octree::new(cube_region(4.0), OctreeConfig::default()).unwrap();
        let mut visited = 0;
        let _ = octree.query_region_from(99, &cube_region(1.0), &registry, &mut visited);
    }
}
