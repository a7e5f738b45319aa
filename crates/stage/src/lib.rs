//! Stage: the per-frame driver.
//!
//! One `Stage::frame` call applies finished background work, feeds queued
//! input through the character's state machine, moves the character under
//! the collision veto, advances animation, follows with the camera, and
//! renders.
//!
//! # Invariants
//! - The scene, registry, colliders and character are touched only from
//!   the thread that calls `frame`.
//! - Reconciles happen at startup and after confirmed creates and deletes,
//!   never on a timer.

mod config;
mod stage;
mod timer;

pub use config::{ConfigError, ConfigOverrides, ObstacleConfig, StageConfig};
pub use stage::Stage;
pub use timer::{FrameStats, FrameTimer};
