use glam::Vec3;
use shapestage_collision::CollisionWorld;

use crate::state::{CharacterState, Stance};

/// Default ground speed in world units per second.
pub const DEFAULT_SPEED: f32 = 10.0;

/// Constant-speed forward motion along the character's heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locomotion {
    pub speed: f32,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
        }
    }
}

impl Locomotion {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Position after `dt` seconds.
    ///
    /// Only a running character moves. A step whose destination collides is
    /// dropped entirely and the character stays where it was.
    pub fn step(&self, dt: f32, state: &CharacterState, collisions: &CollisionWorld) -> Vec3 {
        if state.stance != Stance::Running || dt <= 0.0 {
            return state.position;
        }
        let candidate = state.position + state.forward() * self.speed * dt;
        if collisions.would_collide(candidate.x, candidate.z) {
            tracing::trace!(?candidate, "step blocked");
            return state.position;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> CharacterState {
        CharacterState {
            stance: Stance::Running,
            ..CharacterState::default()
        }
    }

    #[test]
    fn idle_character_does_not_move() {
        let world = CollisionWorld::new(1.0);
        let pos = Locomotion::default().step(0.5, &CharacterState::default(), &world);
        assert_eq!(pos, Vec3::ZERO);
    }

    #[test]
    fn running_moves_along_heading() {
        let world = CollisionWorld::new(1.0);
        let pos = Locomotion::default().step(0.5, &running(), &world);
        assert!((pos - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);

        let turned = CharacterState {
            heading: std::f32::consts::FRAC_PI_2,
            ..running()
        };
        let pos = Locomotion::new(2.0).step(1.0, &turned, &world);
        assert!((pos - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn colliding_step_is_vetoed() {
        let mut world = CollisionWorld::new(1.0);
        world.add(Vec3::new(0.0, 0.0, 6.0), 1.0).unwrap();

        // 5 units ahead is exactly at the touching distance of 2.
        let start = CharacterState {
            position: Vec3::new(0.0, 0.0, -1.0),
            ..running()
        };
        let pos = Locomotion::default().step(0.5, &start, &world);
        assert_eq!(pos, start.position);

        let pos = Locomotion::default().step(0.1, &start, &world);
        assert!((pos.z - 0.0).abs() < 1e-5);
    }

    #[test]
    fn step_preserves_height() {
        let world = CollisionWorld::new(1.0);
        let start = CharacterState {
            position: Vec3::new(0.0, 3.0, 0.0),
            ..running()
        };
        let pos = Locomotion::default().step(0.1, &start, &world);
        assert_eq!(pos.y, 3.0);
    }
}
