use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::{AssetLoadError, AssetLoader, LoadedModel};

/// Outcome of one background load, tagged with the caller's key.
#[derive(Debug)]
pub struct LoadResult<K> {
    pub key: K,
    pub path: PathBuf,
    pub result: Result<LoadedModel, AssetLoadError>,
}

/// Runs each load on its own thread; results are collected with
/// [`AssetJobs::drain`] from the owning thread.
pub struct AssetJobs<K> {
    loader: Arc<dyn AssetLoader>,
    tx: mpsc::Sender<LoadResult<K>>,
    rx: mpsc::Receiver<LoadResult<K>>,
    pending: usize,
}

impl<K: Send + 'static> AssetJobs<K> {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            loader,
            tx,
            rx,
            pending: 0,
        }
    }

    /// Start loading `path`. The result arrives tagged with `key`.
    pub fn request(&mut self, key: K, path: impl Into<PathBuf>) {
        let path = path.into();
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let job_path = path.clone();
        self.pending += 1;
        tracing::debug!(path = %path.display(), "asset load requested");

        // The key moves into the thread, so a failed spawn cannot report it.
        let spawned = thread::Builder::new()
            .name("asset-load".into())
            .spawn(move || {
                let result = loader.load(&job_path);
                let _ = tx.send(LoadResult {
                    key,
                    path: job_path,
                    result,
                });
            });
        if let Err(err) = spawned {
            self.pending -= 1;
            tracing::warn!(path = %path.display(), %err, "failed to spawn asset load thread");
        }
    }

    /// Collect every finished load without blocking.
    pub fn drain(&mut self) -> Vec<LoadResult<K>> {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        self.pending = self.pending.saturating_sub(results.len());
        results
    }

    /// Block until every requested load has reported.
    pub fn wait_all(&mut self) -> Vec<LoadResult<K>> {
        let mut results = Vec::new();
        while self.pending > 0 {
            match self.rx.recv() {
                Ok(result) => {
                    self.pending -= 1;
                    results.push(result);
                }
                Err(_) => break,
            }
        }
        results
    }

    /// Loads requested but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClipInfo, GltfMetadataLoader};
    use std::path::Path;

    struct FixedLoader;

    impl AssetLoader for FixedLoader {
        fn load(&self, path: &Path) -> Result<LoadedModel, AssetLoadError> {
            Ok(LoadedModel {
                source: path.to_path_buf(),
                nodes: vec!["Root".into()],
                mesh_count: 1,
                clips: vec![ClipInfo {
                    name: "Wave".into(),
                    duration: 1.0,
                }],
            })
        }
    }

    #[test]
    fn results_come_back_tagged() {
        let mut jobs = AssetJobs::new(Arc::new(FixedLoader));
        jobs.request(1u32, "a.gltf");
        jobs.request(2u32, "b.gltf");
        assert_eq!(jobs.pending(), 2);

        let mut results = jobs.wait_all();
        results.sort_by_key(|r| r.key);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].path, PathBuf::from("a.gltf"));
        assert!(results[1].result.is_ok());
        assert_eq!(jobs.pending(), 0);
        assert!(jobs.drain().is_empty());
    }

    #[test]
    fn failures_are_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut jobs = AssetJobs::new(Arc::new(GltfMetadataLoader));
        jobs.request("tree", dir.path().join("tree.glb"));
        let results = jobs.wait_all();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "tree");
        assert!(matches!(
            results[0].result,
            Err(AssetLoadError::Io { .. })
        ));
    }
}
