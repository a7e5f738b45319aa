//! Collision: static circular obstacles and planar point-in-range queries.
//!
//! # Invariants
//! - Colliders are appended once and never moved or removed.
//! - `would_collide` is inclusive: touching the combined radius collides.
//! - The grid broadphase never changes a query's answer, only its cost.

mod grid;
mod world;

pub use grid::CellCoord;
pub use world::{Collider, ColliderId, CollisionError, CollisionWorld, DEFAULT_CELL_SIZE};
