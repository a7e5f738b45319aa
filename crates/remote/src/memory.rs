use shapestage_common::{ShapeDraft, ShapeId, ShapeKind, ShapeRecord};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StoreError;
use crate::store::ShapeStore;

/// In-process `ShapeStore` applying the same create rules as the REST
/// service. Clones share one table.
#[derive(Debug, Clone)]
pub struct MemoryShapeStore {
    inner: Arc<Mutex<Table>>,
}

#[derive(Debug)]
struct Table {
    shapes: BTreeMap<ShapeId, ShapeRecord>,
    next_id: i64,
    fail_next_list: Option<String>,
}

impl Default for MemoryShapeStore {
    fn default() -> Self {
        Self::with_next_id(1)
    }
}

impl MemoryShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start id assignment at `next_id`.
    pub fn with_next_id(next_id: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Table {
                shapes: BTreeMap::new(),
                next_id,
                fail_next_list: None,
            })),
        }
    }

    /// Store a record verbatim, bypassing create validation.
    pub fn insert_record(&self, record: ShapeRecord) {
        let mut table = self.table();
        table.next_id = table.next_id.max(record.id.0 + 1);
        table.shapes.insert(record.id, record);
    }

    /// Make the next `list` call fail with a 503 carrying `message`.
    pub fn fail_next_list(&self, message: impl Into<String>) {
        self.table().fail_next_list = Some(message.into());
    }

    pub fn records(&self) -> Vec<ShapeRecord> {
        self.table().shapes.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table().shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().shapes.is_empty()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ShapeStore for MemoryShapeStore {
    async fn list(&self) -> Result<Vec<ShapeRecord>, StoreError> {
        let mut table = self.table();
        if let Some(body) = table.fail_next_list.take() {
            return Err(StoreError::Status { status: 503, body });
        }
        Ok(table.shapes.values().cloned().collect())
    }

    async fn create(&self, draft: &ShapeDraft) -> Result<ShapeRecord, StoreError> {
        check_draft(draft).map_err(|msg| StoreError::Rejected(msg.to_string()))?;
        let params_json = serde_json::to_string(&draft.params)?;
        let mut table = self.table();
        let id = ShapeId(table.next_id);
        table.next_id += 1;
        let record = ShapeRecord {
            id,
            kind: draft.kind,
            x: draft.x,
            y: draft.y,
            z: draft.z,
            params_json,
            created_at: timestamp(),
        };
        table.shapes.insert(id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: ShapeId) -> Result<(), StoreError> {
        match self.table().shapes.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}

/// Server-side create rules: a known type and the required keys present.
/// Values are not inspected.
pub fn check_draft(draft: &ShapeDraft) -> Result<(), &'static str> {
    let has = |key: &str| draft.params.get(key).is_some();
    match draft.kind {
        ShapeKind::Box if !(has("width") && has("height") && has("depth")) => {
            Err("Box requires width/height/depth")
        }
        ShapeKind::Sphere if !has("radius") => Err("Sphere requires radius"),
        ShapeKind::Torus if !(has("radius") && has("tube")) => {
            Err("Torus requires radius and tube")
        }
        ShapeKind::Unknown(_) => Err("Unknown shape type"),
        _ => Ok(()),
    }
}

fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    secs.to_string()
}
