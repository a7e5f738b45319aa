use std::path::Path;

use crate::{AssetLoadError, AssetLoader, ClipInfo, LoadedModel};

/// Reads node, mesh and animation metadata from `.gltf` or `.glb` files.
/// Buffers are never resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfMetadataLoader;

impl GltfMetadataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse metadata from in-memory bytes.
    pub fn parse(&self, bytes: &[u8]) -> Result<ModelMetadata, AssetLoadError> {
        let document = gltf::Gltf::from_slice(bytes)?;

        let nodes = document
            .nodes()
            .map(|node| {
                node.name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("node{}", node.index()))
            })
            .collect();

        let clips = document
            .animations()
            .map(|anim| {
                let name = anim
                    .name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("animation{}", anim.index()));
                // The clip ends where its longest input track ends.
                let duration = anim
                    .channels()
                    .filter_map(|channel| channel.sampler().input().max())
                    .filter_map(|max| max.as_array()?.first()?.as_f64())
                    .fold(0.0f64, f64::max);
                ClipInfo {
                    name,
                    duration: duration as f32,
                }
            })
            .collect();

        Ok(ModelMetadata {
            nodes,
            mesh_count: document.meshes().len(),
            clips,
        })
    }
}

/// Parsed metadata before it is tied to a source path.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub nodes: Vec<String>,
    pub mesh_count: usize,
    pub clips: Vec<ClipInfo>,
}

impl AssetLoader for GltfMetadataLoader {
    fn load(&self, path: &Path) -> Result<LoadedModel, AssetLoadError> {
        let bytes = std::fs::read(path).map_err(|source| AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = self.parse(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            nodes = doc.nodes.len(),
            clips = doc.clips.len(),
            "model metadata loaded"
        );
        Ok(LoadedModel {
            source: path.to_path_buf(),
            nodes: doc.nodes,
            mesh_count: doc.mesh_count,
            clips: doc.clips,
        })
    }
}
