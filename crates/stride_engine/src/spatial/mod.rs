//! Spatial indexing for static world geometry

mod octree;

pub use octree::{Octree, OctreeConfig, OctreeError, OctreeNode};
