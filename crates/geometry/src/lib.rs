//! Geometry factory: maps a validated shape entity to a procedural geometry
//! descriptor and the vertical offset that rests it on the ground plane.
//!
//! # Invariants
//! - `build` is pure and never fails on a validated entity.
//! - Every shape's lowest point sits at or just above y = 0 before the
//!   entity's stored y bias is added.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shapestage_common::{ShapeEntity, ShapeSpec, Transform};

/// Clearance left between a rounded shape and the ground plane.
pub const GROUND_CLEARANCE: f32 = 0.3;

/// Edge length of the box used for kinds this client does not understand.
pub const FALLBACK_BOX_SIZE: f32 = 2.0;

/// Default procedural shape color (`0xaa33bb`).
pub const DEFAULT_SHAPE_COLOR: u32 = 0xaa33bb;

/// Procedural geometry description handed to the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GeometryDescriptor {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl GeometryDescriptor {
    /// Number of vertices the tessellated geometry holds.
    pub fn vertex_count(&self) -> u32 {
        match *self {
            Self::Box { .. } => 24,
            Self::Sphere {
                width_segments,
                height_segments,
                ..
            } => (width_segments + 1) * (height_segments + 1),
            Self::Torus {
                radial_segments,
                tubular_segments,
                ..
            } => (radial_segments + 1) * (tubular_segments + 1),
        }
    }

    /// Number of triangle indices the tessellated geometry holds.
    ///
    /// Sphere poles collapse to a single triangle per quad.
    pub fn index_count(&self) -> u32 {
        match *self {
            Self::Box { .. } => 36,
            Self::Sphere {
                width_segments,
                height_segments,
                ..
            } => 6 * width_segments * height_segments.saturating_sub(1),
            Self::Torus {
                radial_segments,
                tubular_segments,
                ..
            } => 6 * radial_segments * tubular_segments,
        }
    }

    /// Half extents of the local-space bounding box.
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => Vec3::new(width, height, depth) * 0.5,
            Self::Sphere { radius, .. } => Vec3::splat(radius),
            // Torus ring lies in the local XY plane.
            Self::Torus { radius, tube, .. } => Vec3::new(radius + tube, radius + tube, tube),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Torus { .. } => "torus",
        }
    }
}

/// Surface material for procedural shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// 0xRRGGBB color.
    pub color: u32,
    pub cast_shadow: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: DEFAULT_SHAPE_COLOR,
            cast_shadow: true,
        }
    }
}

impl Material {
    /// Linear RGBA in `[0, 1]`.
    pub fn base_color(&self) -> [f32; 4] {
        let channel = |shift: u32| ((self.color >> shift) & 0xff) as f32 / 255.0;
        [channel(16), channel(8), channel(0), 1.0]
    }
}

/// Output of the factory for one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltShape {
    pub descriptor: GeometryDescriptor,
    /// Added to the entity's stored y so the shape rests on the ground.
    pub ground_offset: f32,
}

/// Build the geometry descriptor and ground offset for `entity`.
pub fn build(entity: &ShapeEntity) -> BuiltShape {
    match entity.spec {
        ShapeSpec::Box {
            width,
            height,
            depth,
        } => BuiltShape {
            descriptor: GeometryDescriptor::Box {
                width,
                height,
                depth,
            },
            ground_offset: 0.0,
        },
        ShapeSpec::Sphere {
            radius,
            width_segments,
            height_segments,
        } => BuiltShape {
            descriptor: GeometryDescriptor::Sphere {
                radius,
                width_segments,
                height_segments,
            },
            ground_offset: radius + GROUND_CLEARANCE,
        },
        ShapeSpec::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => BuiltShape {
            descriptor: GeometryDescriptor::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            },
            ground_offset: radius + tube + GROUND_CLEARANCE,
        },
        ShapeSpec::Unknown { .. } => BuiltShape {
            descriptor: GeometryDescriptor::Box {
                width: FALLBACK_BOX_SIZE,
                height: FALLBACK_BOX_SIZE,
                depth: FALLBACK_BOX_SIZE,
            },
            ground_offset: 0.0,
        },
    }
}

/// World transform for `entity` once anchored by `built`.
pub fn placement(entity: &ShapeEntity, built: &BuiltShape) -> Transform {
    Transform::from_position(entity.position + Vec3::Y * built.ground_offset)
}
