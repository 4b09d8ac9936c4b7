//! Physics world facade
//!
//! Bundles the triangle registry, the octree, and the character controller
//! behind one type so callers load geometry, tick the simulation, and read
//! back positions without wiring the pieces themselves.

use crate::config::SimulationConfig;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::character::{CharacterController, MoveIntent};
use crate::physics::collision::{Aabb, Triangle, TriangleId, TriangleRegistry};
use crate::spatial::{Octree, OctreeError};

/// Owns all simulation state for one world
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    registry: TriangleRegistry,
    octree: Octree,
    character: CharacterController,
    tick_seconds: f32,
}

impl PhysicsWorld {
    /// Build an empty world from `config`: an octree covering the cube of
    /// half extent `world_half_extent` around the origin, and a character
    /// at the spawn position.
    ///
    /// # Errors
    ///
    /// Returns [`OctreeError::DegenerateRegion`] when the configured world
    /// extent spans no volume.
    pub fn new(config: &SimulationConfig) -> Result<Self, OctreeError> {
        let half = Vec3::repeat(config.world_half_extent);
        let octree = Octree::new(Aabb::new(-half, half), config.octree.clone())?;

        Ok(Self {
            registry: TriangleRegistry::new(),
            octree,
            character: CharacterController::new(config.spawn_position, config.character.clone()),
            tick_seconds: 1.0 / config.tick_rate.max(1) as f32,
        })
    }

    /// Register a single triangle and index it
    pub fn add_triangle(&mut self, triangle: Triangle) -> TriangleId {
        let id = self.registry.register(triangle);
        self.octree.insert(id);
        id
    }

    /// Register a batch of triangles, returning their ids in order
    pub fn add_mesh(&mut self, triangles: impl IntoIterator<Item = Triangle>) -> Vec<TriangleId> {
        let ids: Vec<TriangleId> = triangles
            .into_iter()
            .map(|triangle| self.add_triangle(triangle))
            .collect();
        log::info!("added mesh with {} triangles", ids.len());
        ids
    }

    /// Register a batch of triangles placed through `transform`
    pub fn add_mesh_transformed(
        &mut self,
        triangles: impl IntoIterator<Item = Triangle>,
        transform: &Transform,
    ) -> Vec<TriangleId> {
        self.add_mesh(triangles.into_iter().map(|triangle| {
            Triangle::new(
                transform.transform_point(triangle.a),
                transform.transform_point(triangle.b),
                transform.transform_point(triangle.c),
            )
        }))
    }

    /// Subdivide everything the loaded geometry made dirty, so the first
    /// simulation ticks don't pay for it. Call once after world load.
    pub fn precompute(&mut self) {
        self.octree.materialize_all(&self.registry);
    }

    /// Advance the character one fixed tick
    pub fn step(&mut self, intent: &MoveIntent) {
        self.character
            .step(intent, &mut self.octree, &self.registry, self.tick_seconds);
    }

    /// The character being simulated
    #[must_use]
    pub const fn character(&self) -> &CharacterController {
        &self.character
    }

    /// The registered world geometry
    #[must_use]
    pub const fn registry(&self) -> &TriangleRegistry {
        &self.registry
    }

    /// The spatial index over the world geometry
    #[must_use]
    pub const fn octree(&self) -> &Octree {
        &self.octree
    }

    /// Seconds simulated per tick
    #[must_use]
    pub const fn tick_seconds(&self) -> f32 {
        self.tick_seconds
    }
}
