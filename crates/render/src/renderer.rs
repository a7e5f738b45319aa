use glam::Vec3;
use serde::{Deserialize, Serialize};
use shapestage_scene::{SceneGraph, Visual};
use std::fmt::Write;

/// Follow-camera settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position relative to the followed target.
    pub offset: Vec3,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(-30.0, 35.0, 30.0),
            fov_degrees: 45.0,
        }
    }
}

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::following(Vec3::ZERO, &CameraConfig::default())
    }
}

impl RenderView {
    /// View looking at `target` from `target + camera.offset`.
    pub fn following(target: Vec3, camera: &CameraConfig) -> Self {
        Self {
            eye: target + camera.offset,
            target,
            fov_degrees: camera.fov_degrees,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view, then produces output.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable listing of the scene. Objects are sorted by
/// label so output is stable across runs.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> String {
        let mut out = String::new();
        let stats = scene.live_resources();
        let _ = writeln!(
            out,
            "=== Scene ({} objects, {} geometries, {} materials) ===",
            scene.len(),
            stats.geometries,
            stats.materials
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        let mut objects: Vec<_> = scene.iter().map(|(_, object)| object).collect();
        objects.sort_by(|a, b| a.label.cmp(&b.label));
        for object in objects {
            let p = object.transform.position;
            let detail = match &object.visual {
                Visual::Procedural {
                    geometry, material, ..
                } => format!(
                    "{} verts, {} indices, color #{:06x}",
                    geometry.vertex_count(),
                    geometry.index_count(),
                    material.color
                ),
                Visual::Model { source, mesh_count } => {
                    format!("model {source}, {mesh_count} meshes")
                }
            };
            let _ = writeln!(
                out,
                "  {} pos=({:.2}, {:.2}, {:.2}) {}",
                object.label, p.x, p.y, p.z, detail
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapestage_common::{ShapeId, Transform};
    use shapestage_geometry::{GeometryDescriptor, Material};
    use shapestage_scene::RenderObject;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneGraph::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("0 objects"));
        assert!(output.contains("fov=45"));
    }

    #[test]
    fn debug_renderer_lists_objects() {
        let mut scene = SceneGraph::new();
        scene.insert(RenderObject::procedural(
            ShapeId(7),
            GeometryDescriptor::Box {
                width: 2.0,
                height: 2.0,
                depth: 2.0,
            },
            Material::default(),
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
        ));
        scene.insert(RenderObject::model("character", "Xbot.glb", 2));

        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("2 objects, 3 geometries"));
        assert!(output.contains("pos=(1.00, 2.00, 3.00) 24 verts, 36 indices, color #aa33bb"));
        assert!(output.contains("model Xbot.glb, 2 meshes"));
    }

    #[test]
    fn follow_view_applies_offset() {
        let view = RenderView::following(Vec3::new(5.0, 0.0, 5.0), &CameraConfig::default());
        assert_eq!(view.eye, Vec3::new(-25.0, 35.0, 35.0));
        assert_eq!(view.target, Vec3::new(5.0, 0.0, 5.0));
    }

    #[test]
    fn camera_config_from_yaml() {
        let camera: CameraConfig = serde_yaml::from_str("fov_degrees: 60\n").unwrap();
        assert_eq!(camera.fov_degrees, 60.0);
        assert_eq!(camera.offset, Vec3::new(-30.0, 35.0, 30.0));
    }
}
