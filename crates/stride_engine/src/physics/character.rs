//! Capsule character controller
//!
//! Owns the player capsule's position and vertical state and advances it
//! one fixed tick at a time from a [`MoveIntent`] snapshot. Each grounded
//! tick builds a candidate movement vector, asks the octree for triangles
//! near the moved capsule, and resolves penetrations deepest-first,
//! re-testing every contact against the accumulated pose so earlier
//! corrections are visible to later ones.

use crate::foundation::math::{normalize_or, Vec3};
use crate::physics::collision::{
    capsule_aabb, capsule_vs_triangle, Capsule, TriangleId, TriangleRegistry,
};
use crate::spatial::Octree;
use serde::{Deserialize, Serialize};

/// Input snapshot driving one simulation tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveIntent {
    /// Move along the facing direction
    pub forward: bool,
    /// Move against the facing direction
    pub back: bool,
    /// Strafe left
    pub left: bool,
    /// Strafe right
    pub right: bool,
    /// Ascend (flying mode only)
    pub up: bool,
    /// Descend (flying mode only)
    pub down: bool,
    /// Jump is held this tick
    pub jump: bool,
    /// Noclip flight: direct movement, no gravity or collision
    pub flying: bool,
    /// Camera facing direction; need not be normalized or horizontal
    pub facing: Vec3,
}

impl Default for MoveIntent {
    fn default() -> Self {
        Self {
            forward: false,
            back: false,
            left: false,
            right: false,
            up: false,
            down: false,
            jump: false,
            flying: false,
            facing: -Vec3::z(),
        }
    }
}

/// Movement constants for the character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTuning {
    /// Grounded movement speed in units per second
    pub walk_speed: f32,
    /// Flying movement speed in units per second
    pub fly_speed: f32,
    /// Downward acceleration in units per second squared
    pub gravity: f32,
    /// Most negative vertical velocity gravity may reach
    pub terminal_velocity: f32,
    /// Vertical velocity gained by a jump
    pub jump_speed: f32,
    /// Seconds a mid-air jump press stays buffered before it is consumed
    pub jump_grace: f32,
    /// Capsule tip offset from the character position
    pub capsule_tip: Vec3,
    /// Capsule base offset from the character position
    pub capsule_base: Vec3,
    /// Capsule radius
    pub capsule_radius: f32,
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self {
            walk_speed: 12.0,
            fly_speed: 24.0,
            gravity: 36.0,
            terminal_velocity: -240.0,
            jump_speed: 18.0,
            jump_grace: 0.2,
            capsule_tip: Vec3::new(0.0, 0.8, 0.0),
            capsule_base: Vec3::new(0.0, -0.8, 0.0),
            capsule_radius: 0.4,
        }
    }
}

/// Character state advanced once per fixed tick
#[derive(Debug, Clone)]
pub struct CharacterController {
    tuning: CharacterTuning,
    position: Vec3,
    previous_position: Vec3,
    y_velocity: f32,
    grounded: bool,
    jumped: bool,
    jump_timer: f32,
}

impl CharacterController {
    /// Creates a controller at `position`
    #[must_use]
    pub const fn new(position: Vec3, tuning: CharacterTuning) -> Self {
        Self {
            tuning,
            position,
            previous_position: position,
            y_velocity: 0.0,
            grounded: false,
            jumped: false,
            jump_timer: 0.0,
        }
    }

    /// Position committed by the most recent tick
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Position committed by the tick before the most recent one
    #[must_use]
    pub const fn previous_position(&self) -> Vec3 {
        self.previous_position
    }

    /// Position interpolated between the last two ticks for display.
    /// `alpha` is the fraction of the current tick already elapsed.
    #[must_use]
    pub fn blended_position(&self, alpha: f32) -> Vec3 {
        self.previous_position.lerp(&self.position, alpha)
    }

    /// Whether the last tick resolved a floor contact
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Current vertical velocity in units per second
    #[must_use]
    pub const fn vertical_velocity(&self) -> f32 {
        self.y_velocity
    }

    /// Movement constants in use
    #[must_use]
    pub const fn tuning(&self) -> &CharacterTuning {
        &self.tuning
    }

    /// The capsule at the current committed position
    #[must_use]
    pub fn capsule(&self) -> Capsule {
        self.capsule_at(self.position)
    }

    /// Advance one tick of `dt` seconds.
    ///
    /// Flying intents translate the capsule directly and leave vertical
    /// state untouched. Grounded intents integrate gravity and jumping
    /// into a candidate movement vector, resolve it against nearby
    /// triangles, and commit the result; see [`MoveIntent`] for the
    /// input fields.
    pub fn step(
        &mut self,
        intent: &MoveIntent,
        octree: &mut Octree,
        registry: &TriangleRegistry,
        dt: f32,
    ) {
        self.previous_position = self.position;
        if intent.flying {
            self.fly(intent, dt);
        } else {
            self.walk(intent, octree, registry, dt);
        }
    }

    /// Noclip movement: sum the intent directions, normalize, scale, go.
    fn fly(&mut self, intent: &MoveIntent, dt: f32) {
        let facing = normalize_or(intent.facing, -Vec3::z());
        let strafe = normalize_or(intent.facing.cross(&Vec3::y()), Vec3::x());

        let mut direction = Vec3::zeros();
        if intent.forward {
            direction += facing;
        }
        if intent.back {
            direction -= facing;
        }
        if intent.right {
            direction += strafe;
        }
        if intent.left {
            direction -= strafe;
        }
        if intent.up {
            direction += Vec3::y();
        }
        if intent.down {
            direction -= Vec3::y();
        }

        self.position += normalize_or(direction, Vec3::zeros()) * (self.tuning.fly_speed * dt);
    }

    fn walk(
        &mut self,
        intent: &MoveIntent,
        octree: &mut Octree,
        registry: &TriangleRegistry,
        dt: f32,
    ) {
        // Forward/back follow the horizontal projection of the facing
        // direction so looking down does not slow the walk.
        let flat_facing = normalize_or(
            Vec3::new(intent.facing.x, 0.0, intent.facing.z),
            -Vec3::z(),
        );
        let strafe = normalize_or(intent.facing.cross(&Vec3::y()), Vec3::x());

        let mut direction = Vec3::zeros();
        if intent.forward {
            direction += flat_facing;
        }
        if intent.back {
            direction -= flat_facing;
        }
        if intent.right {
            direction += strafe;
        }
        if intent.left {
            direction -= strafe;
        }
        let mut movement = normalize_or(direction, Vec3::zeros()) * (self.tuning.walk_speed * dt);

        // A grounded press jumps immediately. A mid-air press is buffered:
        // it fires on the grounded tick that follows, unless it stays
        // unanswered past the grace window and latches as consumed.
        if intent.jump && !self.jumped {
            if self.grounded {
                self.jump_timer = 0.0;
                self.jumped = true;
                self.y_velocity += self.tuning.jump_speed;
            } else if self.jump_timer > self.tuning.jump_grace {
                self.jumped = true;
            } else {
                self.jump_timer += dt;
            }
        }
        if !intent.jump {
            self.jumped = false;
            self.jump_timer = 0.0;
        }

        if self.y_velocity > self.tuning.terminal_velocity {
            self.y_velocity -= self.tuning.gravity * dt;
        }

        self.grounded = false;
        movement.y += self.y_velocity * dt;

        let movement = self.resolve_collisions(movement, octree, registry);
        self.position += movement;
        if self.grounded {
            self.y_velocity = 0.0;
        }
    }

    /// Push the candidate movement out of every triangle it penetrates.
    ///
    /// Contacts are gathered once against the candidate pose, sorted by
    /// depth with the deepest first, then re-tested one at a time against
    /// the pose accumulated so far; a contact another correction already
    /// separated resolves to nothing. Floor contacts (normal pointing
    /// upward) set the grounded flag; wall and ceiling contacts never do.
    fn resolve_collisions(
        &mut self,
        movement: Vec3,
        octree: &mut Octree,
        registry: &TriangleRegistry,
    ) -> Vec3 {
        let mut resolved = movement;
        let mut capsule = self.capsule_at(self.position + resolved);

        let mut visited = 0;
        let candidates = octree.query_region(&capsule_aabb(&capsule), registry, &mut visited);

        let mut contacts: Vec<(f32, TriangleId)> = Vec::new();
        for id in &candidates {
            if let Some(contact) = capsule_vs_triangle(&capsule, &registry.get(*id)) {
                contacts.push((contact.depth, *id));
            }
        }
        contacts.sort_by(|a, b| b.0.total_cmp(&a.0));

        log::trace!(
            "collision pass: visited {} nodes, {} candidates, {} contacts",
            visited,
            candidates.len(),
            contacts.len()
        );

        for (_, id) in contacts {
            if let Some(contact) = capsule_vs_triangle(&capsule, &registry.get(id)) {
                if contact.normal.y > 0.0 {
                    self.grounded = true;
                }
                resolved += contact.normal * contact.depth;
                capsule = self.capsule_at(self.position + resolved);
            }
        }
        resolved
    }

    fn capsule_at(&self, position: Vec3) -> Capsule {
        Capsule::new(
            self.tuning.capsule_tip + position,
            self.tuning.capsule_base + position,
            self.tuning.capsule_radius,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::{Aabb, Triangle};
    use crate::spatial::OctreeConfig;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn world_octree() -> Octree {
        let region = Aabb::new(Vec3::repeat(-64.0), Vec3::repeat(64.0));
        Octree::new(region, OctreeConfig::default()).unwrap()
    }

    /// Flat floor at y = 0 spanning +-50, both triangles facing up.
    fn floor_world() -> (Octree, TriangleRegistry) {
        let mut registry = TriangleRegistry::new();
        let mut octree = world_octree();
        let quad = [
            Triangle::new(
                Vec3::new(-50.0, 0.0, -50.0),
                Vec3::new(-50.0, 0.0, 50.0),
                Vec3::new(50.0, 0.0, -50.0),
            ),
            Triangle::new(
                Vec3::new(50.0, 0.0, 50.0),
                Vec3::new(50.0, 0.0, -50.0),
                Vec3::new(-50.0, 0.0, 50.0),
            ),
        ];
        for triangle in quad {
            let id = registry.register(triangle);
            octree.insert(id);
        }
        (octree, registry)
    }

    /// Wall in the z = -0.5 plane facing +z, spanning +-10.
    fn wall_world() -> (Octree, TriangleRegistry) {
        let mut registry = TriangleRegistry::new();
        let mut octree = world_octree();
        let quad = [
            Triangle::new(
                Vec3::new(-10.0, -10.0, -0.5),
                Vec3::new(10.0, -10.0, -0.5),
                Vec3::new(-10.0, 10.0, -0.5),
            ),
            Triangle::new(
                Vec3::new(10.0, 10.0, -0.5),
                Vec3::new(-10.0, 10.0, -0.5),
                Vec3::new(10.0, -10.0, -0.5),
            ),
        ];
        for triangle in quad {
            let id = registry.register(triangle);
            octree.insert(id);
        }
        (octree, registry)
    }

    #[test]
    fn test_falls_and_settles_on_floor() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 1.0, 0.0), CharacterTuning::default());

        let intent = MoveIntent::default();
        for _ in 0..120 {
            character.step(&intent, &mut octree, &registry, DT);
            // The lowest capsule point never passes through the floor.
            assert!(character.position().y >= 0.8 - 1e-3);
        }

        assert!(character.is_grounded());
        assert_relative_eq!(character.position().y, 0.8, epsilon = 1e-3);
        assert_relative_eq!(character.vertical_velocity(), 0.0);
    }

    #[test]
    fn test_grounded_jump_fires_once_per_press() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 1.0, 0.0), CharacterTuning::default());

        let idle = MoveIntent::default();
        for _ in 0..60 {
            character.step(&idle, &mut octree, &registry, DT);
        }
        assert!(character.is_grounded());

        let jump = MoveIntent {
            jump: true,
            ..MoveIntent::default()
        };
        character.step(&jump, &mut octree, &registry, DT);
        let after_press = character.vertical_velocity();
        assert!(after_press > 0.0);
        assert!(!character.is_grounded());

        // Still held: the latch blocks a second impulse, gravity just drains.
        character.step(&jump, &mut octree, &registry, DT);
        assert!(character.vertical_velocity() < after_press);
    }

    #[test]
    fn test_jump_release_rearms_the_latch() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 1.0, 0.0), CharacterTuning::default());

        let idle = MoveIntent::default();
        let jump = MoveIntent {
            jump: true,
            ..MoveIntent::default()
        };

        for _ in 0..60 {
            character.step(&idle, &mut octree, &registry, DT);
        }
        character.step(&jump, &mut octree, &registry, DT);
        assert!(character.vertical_velocity() > 0.0);

        // Release in the air, fall back down, press again on the ground.
        let mut ticks = 0;
        while !character.is_grounded() {
            character.step(&idle, &mut octree, &registry, DT);
            ticks += 1;
            assert!(ticks < 600, "never landed");
        }
        character.step(&jump, &mut octree, &registry, DT);
        assert!(character.vertical_velocity() > 0.0);
    }

    #[test]
    fn test_jump_pressed_during_fall_fires_on_touchdown() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 1.0, 0.0), CharacterTuning::default());

        // Hold jump the whole short fall; the press stays inside the
        // grace window until touchdown.
        let jump = MoveIntent {
            jump: true,
            ..MoveIntent::default()
        };
        let mut ticks = 0;
        while !character.is_grounded() {
            character.step(&jump, &mut octree, &registry, DT);
            ticks += 1;
            assert!(ticks < 30, "never landed");
        }

        character.step(&jump, &mut octree, &registry, DT);
        assert!(character.vertical_velocity() > 0.0);
    }

    #[test]
    fn test_jump_buffer_expires_after_grace_window() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 3.0, 0.0), CharacterTuning::default());

        // This fall is longer than the grace window, so the held press
        // latches as consumed before touchdown and never fires.
        let jump = MoveIntent {
            jump: true,
            ..MoveIntent::default()
        };
        for _ in 0..60 {
            character.step(&jump, &mut octree, &registry, DT);
        }

        assert!(character.is_grounded());
        assert_relative_eq!(character.position().y, 0.8, epsilon = 1e-3);
        assert_relative_eq!(character.vertical_velocity(), 0.0);
    }

    #[test]
    fn test_walk_follows_horizontal_projection_of_facing() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 1.0, 0.0), CharacterTuning::default());

        let idle = MoveIntent::default();
        for _ in 0..60 {
            character.step(&idle, &mut octree, &registry, DT);
        }

        // Looking steeply down while walking forward still moves at full
        // speed along -z.
        let forward = MoveIntent {
            forward: true,
            facing: Vec3::new(0.0, -0.9, -0.5),
            ..MoveIntent::default()
        };
        for _ in 0..30 {
            character.step(&forward, &mut octree, &registry, DT);
        }

        let expected_z = -character.tuning().walk_speed * DT * 30.0;
        assert_relative_eq!(character.position().x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(character.position().z, expected_z, epsilon = 1e-3);
        assert!(character.is_grounded());
        assert_relative_eq!(character.position().y, 0.8, epsilon = 1e-3);
    }

    #[test]
    fn test_strafe_is_perpendicular_to_facing() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 1.0, 0.0), CharacterTuning::default());

        let idle = MoveIntent::default();
        for _ in 0..60 {
            character.step(&idle, &mut octree, &registry, DT);
        }

        // Facing -z, strafing right heads along +x.
        let strafe = MoveIntent {
            right: true,
            ..MoveIntent::default()
        };
        for _ in 0..30 {
            character.step(&strafe, &mut octree, &registry, DT);
        }

        let expected_x = character.tuning().walk_speed * DT * 30.0;
        assert_relative_eq!(character.position().x, expected_x, epsilon = 1e-3);
        assert_relative_eq!(character.position().z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_wall_contact_blocks_without_grounding() {
        let (mut octree, registry) = wall_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 5.0, 0.0), CharacterTuning::default());

        // Walk into the wall while falling: the push-back is horizontal,
        // so it blocks movement but never reads as floor contact.
        let forward = MoveIntent {
            forward: true,
            ..MoveIntent::default()
        };
        for _ in 0..10 {
            character.step(&forward, &mut octree, &registry, DT);
            assert!(!character.is_grounded());
        }

        assert_relative_eq!(character.position().z, -0.1, epsilon = 1e-3);
        assert!(character.position().y < 5.0);
    }

    #[test]
    fn test_flying_skips_gravity_and_collision() {
        let (mut octree, registry) = floor_world();
        // Start embedded in the floor plane; flight must not resolve it.
        let mut character =
            CharacterController::new(Vec3::new(0.0, 0.0, 0.0), CharacterTuning::default());

        let fly = MoveIntent {
            flying: true,
            forward: true,
            ..MoveIntent::default()
        };
        for _ in 0..10 {
            character.step(&fly, &mut octree, &registry, DT);
        }

        let expected_z = -character.tuning().fly_speed * DT * 10.0;
        assert_relative_eq!(character.position().z, expected_z, epsilon = 1e-3);
        assert_relative_eq!(character.position().y, 0.0);
        assert!(!character.is_grounded());
        assert_relative_eq!(character.vertical_velocity(), 0.0);
    }

    #[test]
    fn test_blended_position_interpolates_between_ticks() {
        let (mut octree, registry) = floor_world();
        let mut character =
            CharacterController::new(Vec3::new(0.0, 10.0, 0.0), CharacterTuning::default());

        let fly = MoveIntent {
            flying: true,
            up: true,
            ..MoveIntent::default()
        };
        character.step(&fly, &mut octree, &registry, DT);

        let previous = character.previous_position();
        let current = character.position();
        assert_relative_eq!(character.blended_position(0.0), previous);
        assert_relative_eq!(character.blended_position(0.5), (previous + current) / 2.0);
    }
}
