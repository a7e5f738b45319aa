use serde::{Deserialize, Serialize};
use shapestage_common::{ShapeId, Transform};
use shapestage_geometry::{GeometryDescriptor, Material};

use crate::arena::{Arena, NodeHandle};

/// What a render object draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Visual {
    /// Procedural geometry owned by a remote shape entity.
    Procedural {
        owner: ShapeId,
        geometry: GeometryDescriptor,
        material: Material,
    },
    /// A loaded model instance (character or obstacle).
    Model { source: String, mesh_count: usize },
}

/// A live instance in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderObject {
    pub label: String,
    pub transform: Transform,
    pub visual: Visual,
}

impl RenderObject {
    pub fn procedural(
        owner: ShapeId,
        geometry: GeometryDescriptor,
        material: Material,
        transform: Transform,
    ) -> Self {
        Self {
            label: format!("shape {owner} ({})", geometry.label()),
            transform,
            visual: Visual::Procedural {
                owner,
                geometry,
                material,
            },
        }
    }

    pub fn model(label: impl Into<String>, source: impl Into<String>, mesh_count: usize) -> Self {
        Self {
            label: label.into(),
            transform: Transform::default(),
            visual: Visual::Model {
                source: source.into(),
                mesh_count,
            },
        }
    }

    /// Geometry and material buffers this object holds on the backend.
    fn resources(&self) -> ResourceStats {
        match &self.visual {
            Visual::Procedural { .. } => ResourceStats {
                geometries: 1,
                materials: 1,
            },
            Visual::Model { mesh_count, .. } => ResourceStats {
                geometries: *mesh_count,
                materials: *mesh_count,
            },
        }
    }
}

/// Every structural change to the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    Inserted { handle: NodeHandle, label: String },
    Removed { handle: NodeHandle, label: String },
}

/// Counts of backend resources currently held by live objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStats {
    pub geometries: usize,
    pub materials: usize,
}

/// Live scene: an arena of render objects plus a log of structural changes.
///
/// Removing an object releases its geometry and material resources.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Arena<RenderObject>,
    live: ResourceStats,
    released: ResourceStats,
    mutations: u64,
    events: Vec<SceneEvent>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: RenderObject) -> NodeHandle {
        let res = object.resources();
        self.live.geometries += res.geometries;
        self.live.materials += res.materials;
        let label = object.label.clone();
        let handle = self.nodes.insert(object);
        self.mutations += 1;
        self.events.push(SceneEvent::Inserted { handle, label });
        handle
    }

    /// Detach an object and release its resources.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<RenderObject> {
        let object = self.nodes.remove(handle)?;
        let res = object.resources();
        self.live.geometries -= res.geometries;
        self.live.materials -= res.materials;
        self.released.geometries += res.geometries;
        self.released.materials += res.materials;
        self.mutations += 1;
        self.events.push(SceneEvent::Removed {
            handle,
            label: object.label.clone(),
        });
        Some(object)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&RenderObject> {
        self.nodes.get(handle)
    }

    /// Mutable access for transform updates. Not a structural mutation.
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut RenderObject> {
        self.nodes.get_mut(handle)
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &RenderObject)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total inserts and removals since creation.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    pub fn live_resources(&self) -> ResourceStats {
        self.live
    }

    pub fn released_resources(&self) -> ResourceStats {
        self.released
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remove every object, releasing all resources. Slot order.
    pub fn clear(&mut self) {
        for handle in self.nodes.handles() {
            self.remove(handle);
        }
    }
}
