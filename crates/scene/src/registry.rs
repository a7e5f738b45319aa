use std::collections::{BTreeMap, BTreeSet};

use shapestage_common::{ShapeEntity, ShapeId, ShapeRecord, ValidationError};
use shapestage_geometry::Material;

use crate::arena::NodeHandle;
use crate::graph::{RenderObject, SceneGraph};

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Number of records in the snapshot.
    pub snapshot_len: usize,
    pub added: Vec<ShapeId>,
    pub removed: Vec<ShapeId>,
    /// Records newly rejected by validation during this pass.
    pub rejected: Vec<(ShapeId, ValidationError)>,
}

impl ReconcileReport {
    /// True when the pass changed nothing in the scene.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Status line shown to the user after a successful pass.
    pub fn status(&self) -> String {
        format!("loaded {} shapes", self.snapshot_len)
    }
}

/// Maps remote shape ids to the scene nodes that render them.
///
/// After every successful reconcile the registered id set equals the
/// snapshot's id set minus records rejected by validation.
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    nodes: BTreeMap<ShapeId, NodeHandle>,
    rejected: BTreeMap<ShapeId, ValidationError>,
    material: Material,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose new shapes use `material`.
    pub fn with_material(material: Material) -> Self {
        Self {
            material,
            ..Self::default()
        }
    }

    /// Make the registry (and `graph`) match `snapshot`.
    ///
    /// Objects whose id is in both the registry and the snapshot are left
    /// untouched; shape records are immutable so there is no update path.
    pub fn reconcile(&mut self, graph: &mut SceneGraph, snapshot: &[ShapeRecord]) -> ReconcileReport {
        let _span = tracing::info_span!("reconcile", snapshot = snapshot.len()).entered();
        let mut report = ReconcileReport {
            snapshot_len: snapshot.len(),
            ..ReconcileReport::default()
        };

        let ids: BTreeSet<ShapeId> = snapshot.iter().map(|r| r.id).collect();

        let stale: Vec<ShapeId> = self
            .nodes
            .keys()
            .filter(|id| !ids.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(handle) = self.nodes.remove(&id) {
                graph.remove(handle);
                tracing::debug!(%id, %handle, "shape removed");
                report.removed.push(id);
            }
        }
        self.rejected.retain(|id, _| ids.contains(id));

        for record in snapshot {
            if self.nodes.contains_key(&record.id) || self.rejected.contains_key(&record.id) {
                continue;
            }
            match ShapeEntity::try_from_record(record) {
                Ok(entity) => {
                    let built = shapestage_geometry::build(&entity);
                    let transform = shapestage_geometry::placement(&entity, &built);
                    let handle = graph.insert(RenderObject::procedural(
                        entity.id,
                        built.descriptor,
                        self.material,
                        transform,
                    ));
                    self.nodes.insert(entity.id, handle);
                    tracing::debug!(id = %entity.id, %handle, kind = %record.kind, "shape added");
                    report.added.push(entity.id);
                }
                Err(err) => {
                    tracing::warn!(id = %record.id, error = %err, "skipping invalid shape");
                    self.rejected.insert(record.id, err.clone());
                    report.rejected.push((record.id, err));
                }
            }
        }

        tracing::info!(
            added = report.added.len(),
            removed = report.removed.len(),
            rejected = report.rejected.len(),
            total = self.nodes.len(),
            "reconcile complete"
        );
        report
    }

    /// Reconcile against a fetch result. On error nothing changes and the
    /// error is handed back for status reporting.
    pub fn apply_fetch<E>(
        &mut self,
        graph: &mut SceneGraph,
        fetched: Result<Vec<ShapeRecord>, E>,
    ) -> Result<ReconcileReport, E>
    where
        E: std::fmt::Display,
    {
        match fetched {
            Ok(snapshot) => Ok(self.reconcile(graph, &snapshot)),
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed; scene left unchanged");
                Err(err)
            }
        }
    }

    /// Remove every registered shape from `graph`.
    pub fn clear(&mut self, graph: &mut SceneGraph) {
        for (_, handle) in std::mem::take(&mut self.nodes) {
            graph.remove(handle);
        }
        self.rejected.clear();
    }

    pub fn handle(&self, id: ShapeId) -> Option<NodeHandle> {
        self.nodes.get(&id).copied()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn rejected(&self) -> &BTreeMap<ShapeId, ValidationError> {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
