//! Shared types: shape records as the remote store speaks them, the typed
//! shape union they are validated into, and spatial transforms.
//!
//! # Invariants
//! - Untyped parameter blobs never leave this crate: consumers see `ShapeSpec`.
//! - Validation failures name the offending field.

mod shape;
mod types;

pub use shape::{
    DEFAULT_SPHERE_RADIUS, DEFAULT_TORUS_RADIUS, DEFAULT_TORUS_TUBE, ShapeDraft, ShapeEntity,
    ShapeKind, ShapeRecord, ShapeSpec, ValidationError,
};
pub use types::{ShapeId, Transform};
