use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use shapestage_assets::{AssetJobs, AssetLoader, LoadResult};
use shapestage_character::{Character, CharacterState};
use shapestage_collision::CollisionWorld;
use shapestage_common::{ShapeDraft, ShapeId, Transform};
use shapestage_input::{InputQueue, KeyEdge};
use shapestage_remote::{ShapeStore, StoreError, SyncOutcome, SyncRequest, SyncWorker};
use shapestage_render::{RenderView, Renderer};
use shapestage_scene::{NodeHandle, RenderObject, SceneGraph, SceneRegistry};

use crate::config::StageConfig;
use crate::timer::{FrameStats, FrameTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKey {
    Character,
    Obstacle(usize),
}

/// Owns the scene and the character and advances them one frame at a time.
///
/// Store calls and model loads run elsewhere; their results are applied at
/// the start of [`Stage::frame`], so the scene is only touched from here.
pub struct Stage<R: Renderer> {
    config: StageConfig,
    renderer: R,
    scene: SceneGraph,
    registry: SceneRegistry,
    collisions: CollisionWorld,
    character: Character,
    character_node: Option<NodeHandle>,
    input: InputQueue,
    sync: SyncWorker,
    assets: AssetJobs<AssetKey>,
    status: String,
    timer: FrameTimer,
    frames: u64,
}

impl<R: Renderer> Stage<R> {
    pub fn new<S>(
        config: StageConfig,
        store: S,
        loader: Arc<dyn AssetLoader>,
        renderer: R,
    ) -> Result<Self, StoreError>
    where
        S: ShapeStore + 'static,
    {
        let sync = SyncWorker::spawn(store)?;
        let character = Character::new(&config.character, config.clips.clone());
        let collisions = CollisionWorld::new(config.character.radius);
        Ok(Self {
            renderer,
            scene: SceneGraph::new(),
            registry: SceneRegistry::new(),
            collisions,
            character,
            character_node: None,
            input: InputQueue::new(),
            sync,
            assets: AssetJobs::new(loader),
            status: "loading".into(),
            timer: FrameTimer::default(),
            frames: 0,
            config,
        })
    }

    /// Fetch the initial snapshot and start loading models.
    pub fn start(&mut self) {
        tracing::info!(
            base_url = %self.config.remote.base_url,
            obstacles = self.config.obstacles.len(),
            "stage starting"
        );
        self.request_refresh();
        if let Some(model) = &self.config.character.model {
            self.assets.request(AssetKey::Character, model);
        }
        for (index, obstacle) in self.config.obstacles.iter().enumerate() {
            self.assets
                .request(AssetKey::Obstacle(index), &obstacle.model);
        }
    }

    /// Queue a key edge for the next frame.
    pub fn push_key(&mut self, edge: KeyEdge) {
        self.input.push(edge);
    }

    /// Ask the store to create a shape. The scene changes once the store
    /// confirms and the follow-up fetch lands.
    pub fn create_shape(&mut self, draft: ShapeDraft) -> Result<(), StoreError> {
        self.sync.submit(SyncRequest::Create(draft))
    }

    pub fn delete_shape(&mut self, id: ShapeId) -> Result<(), StoreError> {
        self.sync.submit(SyncRequest::Delete(id))
    }

    /// Advance the simulation by `dt` seconds and render.
    pub fn frame(&mut self, dt: f32) -> R::Output {
        let _span = tracing::info_span!("frame", n = self.frames).entered();
        let started = Instant::now();

        self.apply_background();

        for edge in self.input.drain() {
            let edge = self.config.bindings.resolve(&edge);
            self.character.handle(edge);
        }

        let position = self.character.update(dt, &self.collisions);
        let heading = self.character.state().heading;
        if let Some(object) = self
            .character_node
            .and_then(|handle| self.scene.get_mut(handle))
        {
            object.transform = Transform::from_position_heading(position, heading);
        }

        let view = RenderView::following(position, &self.config.camera);
        let output = self.renderer.render(&self.scene, &view);

        self.timer.record(started.elapsed());
        self.frames += 1;
        tracing::trace!(objects = self.scene.len(), ?position, "frame done");
        output
    }

    /// Apply background results until the sync worker and every model load
    /// are done, or `timeout` passes. Returns whether everything settled.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.apply_background();
            if self.sync.is_idle() && self.assets.pending() == 0 {
                // Outcomes sent before the worker went idle are queued now.
                if self.apply_background() == 0 {
                    return true;
                }
                continue;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    /// "loaded N shapes" after the last successful fetch, or the last error.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.timer.stats()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn collisions(&self) -> &CollisionWorld {
        &self.collisions
    }

    pub fn character(&self) -> &CharacterState {
        self.character.state()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Stop the sync worker and release every scene resource.
    pub fn shutdown(&mut self) {
        self.sync.shutdown();
        self.registry.clear(&mut self.scene);
        self.scene.clear();
        self.character_node = None;
        tracing::info!(
            released = self.scene.released_resources().geometries,
            "stage shut down"
        );
    }

    fn request_refresh(&mut self) {
        if let Err(err) = self.sync.submit(SyncRequest::Refresh) {
            self.status = err.to_string();
        }
    }

    /// Apply finished store calls and model loads. Returns how many were
    /// applied.
    fn apply_background(&mut self) -> usize {
        let outcomes = self.sync.drain();
        let loads = self.assets.drain();
        let applied = outcomes.len() + loads.len();
        for outcome in outcomes {
            self.apply_outcome(outcome);
        }
        for load in loads {
            self.apply_load(load);
        }
        for event in self.scene.drain_events() {
            tracing::debug!(?event, "scene changed");
        }
        applied
    }

    fn apply_outcome(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Fetched(result) => {
                match self.registry.apply_fetch(&mut self.scene, result) {
                    Ok(report) => {
                        if !report.is_noop() {
                            tracing::info!(
                                added = report.added.len(),
                                removed = report.removed.len(),
                                "scene reconciled"
                            );
                        }
                        self.status = report.status();
                    }
                    Err(err) => self.status = err.to_string(),
                }
            }
            SyncOutcome::Created(Ok(record)) => {
                tracing::info!(id = %record.id, kind = %record.kind, "shape created");
                self.request_refresh();
            }
            SyncOutcome::Created(Err(err)) => {
                tracing::warn!(error = %err, "create failed");
                self.status = format!("create failed: {err}");
            }
            SyncOutcome::Deleted { id, result: Ok(()) } => {
                tracing::info!(%id, "shape deleted");
                self.request_refresh();
            }
            SyncOutcome::Deleted {
                id,
                result: Err(err),
            } => {
                tracing::warn!(%id, error = %err, "delete failed");
                self.status = format!("delete {id} failed: {err}");
            }
        }
    }

    fn apply_load(&mut self, load: LoadResult<AssetKey>) {
        let LoadResult { key, path, result } = load;
        let model = match result {
            Ok(model) => model,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "model load failed");
                return;
            }
        };
        let source = path.display().to_string();
        match key {
            AssetKey::Character => {
                self.character.load_clips(model.clip_durations());
                let state = self.character.state();
                let mut object = RenderObject::model("character", source, model.mesh_count);
                object.transform = Transform::from_position_heading(state.position, state.heading);
                if let Some(old) = self.character_node.replace(self.scene.insert(object)) {
                    self.scene.remove(old);
                }
            }
            AssetKey::Obstacle(index) => {
                let Some(obstacle) = self.config.obstacles.get(index) else {
                    return;
                };
                let (position, radius) = (obstacle.position, obstacle.radius);
                let mut object =
                    RenderObject::model(format!("obstacle {index}"), source, model.mesh_count);
                object.transform = Transform::from_position(position);
                self.scene.insert(object);
                if let Err(err) = self.collisions.add(position, radius) {
                    tracing::warn!(index, error = %err, "obstacle has no collider");
                }
            }
        }
    }
}
