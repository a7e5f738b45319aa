use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::grid::GridIndex;

/// Default broadphase cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f32 = 8.0;

/// A static circular obstacle on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Center in the XZ plane (`x` = world X, `y` = world Z).
    pub center: Vec2,
    pub radius: f32,
}

/// Index of a collider inside its `CollisionWorld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub usize);

/// Errors from collider registration.
#[derive(Debug, thiserror::Error)]
pub enum CollisionError {
    #[error("collider radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),
    #[error("collider center must be finite, got {0}")]
    InvalidCenter(Vec3),
    #[error("grid cell size must be finite and positive, got {0}")]
    InvalidCellSize(f32),
}

/// Append-only set of static colliders tested against a circular character.
///
/// Colliders are never moved or removed once added.
#[derive(Debug, Clone)]
pub struct CollisionWorld {
    character_radius: f32,
    colliders: Vec<Collider>,
    grid: GridIndex,
}

impl CollisionWorld {
    pub fn new(character_radius: f32) -> Self {
        Self {
            character_radius,
            colliders: Vec::new(),
            grid: GridIndex::new(DEFAULT_CELL_SIZE),
        }
    }

    pub fn with_cell_size(character_radius: f32, cell_size: f32) -> Result<Self, CollisionError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(CollisionError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            character_radius,
            colliders: Vec::new(),
            grid: GridIndex::new(cell_size),
        })
    }

    pub fn character_radius(&self) -> f32 {
        self.character_radius
    }

    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    /// Register an obstacle centered at `position` (its y is ignored).
    pub fn add(&mut self, position: Vec3, radius: f32) -> Result<ColliderId, CollisionError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(CollisionError::InvalidRadius(radius));
        }
        if !position.is_finite() {
            return Err(CollisionError::InvalidCenter(position));
        }
        let slot = self.colliders.len();
        let collider = Collider {
            center: Vec2::new(position.x, position.z),
            radius,
        };
        self.grid
            .insert(slot, collider.center, radius + self.character_radius);
        self.colliders.push(collider);
        tracing::debug!(slot, ?position, radius, "collider added");
        Ok(ColliderId(slot))
    }

    /// True if a character centered at `(x, z)` would touch or overlap any
    /// collider. Touching counts as colliding.
    pub fn would_collide(&self, x: f32, z: f32) -> bool {
        let point = Vec2::new(x, z);
        self.grid.candidates(point).any(|slot| {
            let c = &self.colliders[slot];
            point.distance(c.center) <= c.radius + self.character_radius
        })
    }

    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id.0)
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(world: &CollisionWorld, x: f32, z: f32) -> bool {
        let p = Vec2::new(x, z);
        world
            .colliders()
            .iter()
            .any(|c| p.distance(c.center) <= c.radius + world.character_radius())
    }

    #[test]
    fn empty_world_never_collides() {
        let world = CollisionWorld::new(1.0);
        assert!(!world.would_collide(0.0, 0.0));
        assert!(world.is_empty());
    }

    #[test]
    fn touching_counts_as_colliding() {
        let mut world = CollisionWorld::new(1.0);
        world.add(Vec3::ZERO, 2.0).unwrap();
        assert!(world.would_collide(3.0, 0.0));
        assert!(world.would_collide(0.0, -3.0));
        assert!(!world.would_collide(3.001, 0.0));
        assert!(!world.would_collide(0.0, 3.5));
    }

    #[test]
    fn height_is_ignored() {
        let mut world = CollisionWorld::new(0.5);
        world.add(Vec3::new(10.0, 50.0, 10.0), 1.0).unwrap();
        assert!(world.would_collide(10.0, 11.4));
    }

    #[test]
    fn grid_matches_linear_scan() {
        let mut world = CollisionWorld::with_cell_size(0.75, 3.0).unwrap();
        let centers = [
            (0.0, 0.0, 1.0),
            (5.0, -2.0, 0.5),
            (-7.5, 4.0, 2.5),
            (12.0, 12.0, 6.0),
            (-3.0, -9.0, 0.0),
            (30.0, -30.0, 40.0),
        ];
        for (x, z, r) in centers {
            world.add(Vec3::new(x, 0.0, z), r).unwrap();
        }
        let mut x = -20.0_f32;
        while x <= 20.0 {
            let mut z = -20.0_f32;
            while z <= 20.0 {
                assert_eq!(
                    world.would_collide(x, z),
                    brute_force(&world, x, z),
                    "mismatch at ({x}, {z})"
                );
                z += 0.25;
            }
            x += 0.25;
        }
    }

    #[test]
    fn rejects_invalid_colliders() {
        let mut world = CollisionWorld::new(1.0);
        assert!(matches!(
            world.add(Vec3::ZERO, -1.0),
            Err(CollisionError::InvalidRadius(_))
        ));
        assert!(matches!(
            world.add(Vec3::new(f32::NAN, 0.0, 0.0), 1.0),
            Err(CollisionError::InvalidCenter(_))
        ));
        assert!(world.is_empty());
    }

    #[test]
    fn huge_collider_is_added_without_filling_the_grid() {
        let started = std::time::Instant::now();
        let mut world = CollisionWorld::new(1.0);
        world.add(Vec3::ZERO, 1.0e6).unwrap();
        world.add(Vec3::new(5.0e6, 0.0, 0.0), 4000.0).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!(world.would_collide(999_000.0, 0.0));
        assert!(world.would_collide(5.0e6, 4000.5));
        assert!(!world.would_collide(2.0e6, 2.0e6));
    }

    #[test]
    fn rejects_bad_cell_size() {
        for size in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                CollisionWorld::with_cell_size(1.0, size),
                Err(CollisionError::InvalidCellSize(_))
            ));
        }
    }

    #[test]
    fn ids_index_colliders() {
        let mut world = CollisionWorld::new(1.0);
        let a = world.add(Vec3::new(1.0, 0.0, 2.0), 3.0).unwrap();
        let b = world.add(Vec3::new(-4.0, 0.0, 0.0), 1.0).unwrap();
        assert_ne!(a, b);
        assert_eq!(world.get(a).unwrap().center, Vec2::new(1.0, 2.0));
        assert_eq!(world.len(), 2);
    }
}
