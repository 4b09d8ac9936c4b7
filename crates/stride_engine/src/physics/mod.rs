//! Physics module for collision detection and character movement
//!
//! Provides collision detection over spatially indexed triangles and a
//! capsule character controller with iterative penetration resolution.

pub mod character;
pub mod collision;
pub mod world;

pub use character::{CharacterController, CharacterTuning, MoveIntent};
pub use collision::{Aabb, Capsule, Contact, Sphere, Triangle, TriangleId, TriangleRegistry};
pub use world::PhysicsWorld;
