//! Input: key codes, action bindings, and the edge queue the simulation
//! drains once per frame.
//!
//! # Invariants
//! - Only discrete key edges are delivered; nothing polls key state.
//! - Edges are processed in arrival order.

pub mod action;
mod bindings;
mod queue;

pub use action::{Action, ActionEdge, Phase};
pub use bindings::{InputBindings, KeyCode};
pub use queue::{DEFAULT_QUEUE_CAPACITY, InputQueue, KeyEdge};
