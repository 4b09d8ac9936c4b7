//! # Stride Engine
//!
//! The movement and collision core of a real-time simulation: a sparse,
//! lazily subdivided octree over static world triangles plus a capsule
//! character controller that queries it every physics tick.
//!
//! ## Features
//!
//! - **Sparse octree**: Arena-backed spatial index, subdivided on demand
//! - **Narrow phase**: Closest-point capsule/sphere/triangle contact tests
//! - **Character controller**: Fixed-tick movement with iterative
//!   penetration resolution, gravity, and buffered jumping
//! - **Configurable**: Tuning constants load from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stride_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SimulationConfig::default();
//!     let mut world = PhysicsWorld::new(&config)?;
//!
//!     world.add_mesh([
//!         Triangle::new(
//!             Vec3::new(-50.0, 0.0, -50.0),
//!             Vec3::new(-50.0, 0.0, 50.0),
//!             Vec3::new(50.0, 0.0, -50.0),
//!         ),
//!     ]);
//!     world.precompute();
//!
//!     let mut clock = FixedTimestep::new(config.tick_rate);
//!     loop {
//!         let intent = MoveIntent::default();
//!         for _ in 0..clock.advance(0.016) {
//!             world.step(&intent);
//!         }
//!         let _render_pos = world.character().blended_position(clock.alpha());
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SimulationConfig},
        foundation::{
            math::{Transform, Vec3},
            time::FixedTimestep,
        },
        physics::{
            character::{CharacterController, CharacterTuning, MoveIntent},
            collision::{Aabb, Capsule, Contact, Sphere, Triangle, TriangleId, TriangleRegistry},
            world::PhysicsWorld,
        },
        spatial::{Octree, OctreeConfig, OctreeError},
    };
}
