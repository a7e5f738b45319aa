//! Model loading: the `AssetLoader` seam, a glTF metadata loader, and
//! background load jobs that report back over a channel.
//!
//! Only metadata is read: node names, mesh count and animation clips with
//! their durations. Vertex data stays with the rasterizer.

mod jobs;
mod metadata;

pub use jobs::{AssetJobs, LoadResult};
pub use metadata::{GltfMetadataLoader, ModelMetadata};

use std::path::{Path, PathBuf};

/// One animation clip of a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub name: String,
    /// Seconds.
    pub duration: f32,
}

/// Metadata of a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub source: PathBuf,
    pub nodes: Vec<String>,
    pub mesh_count: usize,
    pub clips: Vec<ClipInfo>,
}

impl LoadedModel {
    pub fn clip(&self, name: &str) -> Option<&ClipInfo> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// `(name, duration)` pairs, the shape animation mixers take.
    pub fn clip_durations(&self) -> impl Iterator<Item = (String, f32)> + '_ {
        self.clips.iter().map(|c| (c.name.clone(), c.duration))
    }
}

/// Errors from model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
}

/// Loads model metadata from a path.
pub trait AssetLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<LoadedModel, AssetLoadError>;
}
