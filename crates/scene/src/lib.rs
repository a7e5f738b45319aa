//! Scene: the live render-object arena and the registry that keeps it in
//! step with the remote shape store.
//!
//! # Invariants
//! - After a successful reconcile, registered ids equal the snapshot's ids
//!   (minus records rejected by validation).
//! - At most one render object per id; none for an absent id.
//! - A failed fetch leaves both the registry and the scene untouched.
//! - Reconciling the same snapshot twice mutates the scene once.

mod arena;
mod graph;
mod registry;

pub use arena::{Arena, NodeHandle};
pub use graph::{RenderObject, ResourceStats, SceneEvent, SceneGraph, Visual};
pub use registry::{ReconcileReport, SceneRegistry};
