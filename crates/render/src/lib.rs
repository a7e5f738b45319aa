//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - A renderer only reads the scene graph; it never mutates it.
//! - The view is derived from the followed target each frame.
//!
//! Rasterization is an external collaborator. [`DebugTextRenderer`] stands
//! in for it in the CLI and in tests.

mod renderer;

pub use renderer::{CameraConfig, DebugTextRenderer, RenderView, Renderer};
