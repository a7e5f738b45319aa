//! Character: stance machine, animation mixer and locomotion.
//!
//! The reducer in [`state`] is pure; [`Character`] wires it to a mixer and
//! the collision world.
//!
//! # Invariants
//! - Exactly one stance is active; running and dancing never overlap.
//! - Overlay clips (jump, punch, wave) never change the stance.
//! - A step that would collide is dropped whole, never shortened.

mod controller;
mod locomotion;
pub mod mixer;
pub mod state;

pub use controller::{Character, CharacterConfig};
pub use locomotion::{DEFAULT_SPEED, Locomotion};
pub use mixer::{AnimationMixer, ClipNames, LoopMode};
pub use state::{
    CharacterState, ClipCommand, ClipRole, RevivalPolicy, Rules, Stance, Transition,
    clip_finished, transition,
};
