use shapestage_common::{ShapeDraft, ShapeId, ShapeRecord};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::StoreError;
use crate::store::ShapeStore;

/// Work the sync worker performs against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    /// Fetch the full snapshot.
    Refresh,
    Create(ShapeDraft),
    Delete(ShapeId),
}

/// Completed store call, delivered back to the simulation thread.
#[derive(Debug)]
pub enum SyncOutcome {
    Fetched(Result<Vec<ShapeRecord>, StoreError>),
    Created(Result<ShapeRecord, StoreError>),
    Deleted {
        id: ShapeId,
        result: Result<(), StoreError>,
    },
}

enum Command {
    Request(SyncRequest),
    Shutdown,
}

/// Dedicated thread that runs store calls one at a time on a
/// current-thread runtime. Results are collected with [`SyncWorker::drain`].
pub struct SyncWorker {
    tx: mpsc::Sender<Command>,
    rx: mpsc::Receiver<SyncOutcome>,
    outstanding: Arc<AtomicUsize>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SyncWorker {
    pub fn spawn<S>(store: S) -> Result<Self, StoreError>
    where
        S: ShapeStore + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StoreError::Worker)?;
        let (tx, command_rx) = mpsc::channel::<Command>();
        let (outcome_tx, rx) = mpsc::channel::<SyncOutcome>();
        let outstanding = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&outstanding);

        let handle = thread::Builder::new()
            .name("shape-sync".into())
            .spawn(move || {
                let mut queue = VecDeque::new();
                loop {
                    if queue.is_empty() {
                        match command_rx.recv() {
                            Ok(Command::Request(request)) => queue.push_back(request),
                            Ok(Command::Shutdown) | Err(_) => break,
                        }
                    }
                    let mut shutdown = false;
                    while let Ok(command) = command_rx.try_recv() {
                        match command {
                            Command::Request(request) => queue.push_back(request),
                            Command::Shutdown => {
                                shutdown = true;
                                break;
                            }
                        }
                    }
                    if shutdown {
                        break;
                    }

                    let dropped = coalesce_refreshes(&mut queue);
                    if dropped > 0 {
                        counter.fetch_sub(dropped, Ordering::AcqRel);
                        tracing::debug!(dropped, "superseded refreshes dropped");
                    }

                    let Some(request) = queue.pop_front() else {
                        continue;
                    };
                    let outcome = runtime.block_on(execute(&store, request));
                    let sent = outcome_tx.send(outcome);
                    counter.fetch_sub(1, Ordering::AcqRel);
                    if sent.is_err() {
                        break;
                    }
                }
                tracing::debug!(abandoned = queue.len(), "sync worker stopped");
            })
            .map_err(StoreError::Worker)?;

        Ok(Self {
            tx,
            rx,
            outstanding,
            handle: Some(handle),
        })
    }

    /// Queue a request behind any already pending.
    pub fn submit(&self, request: SyncRequest) -> Result<(), StoreError> {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        self.tx.send(Command::Request(request)).map_err(|_| {
            self.outstanding.fetch_sub(1, Ordering::AcqRel);
            StoreError::WorkerGone
        })
    }

    /// Collect finished outcomes without blocking.
    pub fn drain(&self) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            outcomes.push(outcome);
        }
        outcomes
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SyncOutcome> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// True when nothing is queued or in flight. Outcomes may still be
    /// waiting in the channel.
    pub fn is_idle(&self) -> bool {
        self.outstanding.load(Ordering::Acquire) == 0
    }

    /// Stop the worker after the in-flight request and join it. Queued
    /// requests are abandoned.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.tx.send(Command::Shutdown);
        if handle.join().is_err() {
            tracing::warn!("sync worker thread panicked");
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn execute<S: ShapeStore>(store: &S, request: SyncRequest) -> SyncOutcome {
    match request {
        SyncRequest::Refresh => SyncOutcome::Fetched(store.list().await),
        SyncRequest::Create(draft) => SyncOutcome::Created(store.create(&draft).await),
        SyncRequest::Delete(id) => SyncOutcome::Deleted {
            id,
            result: store.delete(id).await,
        },
    }
}

/// Keep only the last queued refresh. Returns how many were dropped.
fn coalesce_refreshes(queue: &mut VecDeque<SyncRequest>) -> usize {
    let Some(last) = queue.iter().rposition(|r| *r == SyncRequest::Refresh) else {
        return 0;
    };
    let before = queue.len();
    let mut index = 0;
    queue.retain(|r| {
        let keep = *r != SyncRequest::Refresh || index == last;
        index += 1;
        keep
    });
    before - queue.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryShapeStore;
    use glam::Vec3;
    use shapestage_common::ShapeSpec;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn coalesce_keeps_last_refresh_and_mutations() {
        let draft = ShapeDraft::from_spec(Vec3::ZERO, &ShapeSpec::sphere(1.0));
        let mut queue = VecDeque::from(vec![
            SyncRequest::Refresh,
            SyncRequest::Create(draft.clone()),
            SyncRequest::Refresh,
            SyncRequest::Delete(ShapeId(2)),
            SyncRequest::Refresh,
        ]);
        assert_eq!(coalesce_refreshes(&mut queue), 2);
        assert_eq!(
            Vec::from(queue),
            vec![
                SyncRequest::Create(draft),
                SyncRequest::Delete(ShapeId(2)),
                SyncRequest::Refresh,
            ]
        );

        let mut none = VecDeque::from(vec![SyncRequest::Delete(ShapeId(1))]);
        assert_eq!(coalesce_refreshes(&mut none), 0);
    }

    #[test]
    fn requests_complete_in_order() {
        let store = MemoryShapeStore::with_next_id(7);
        let mut worker = SyncWorker::spawn(store.clone()).unwrap();
        let draft = ShapeDraft::from_spec(Vec3::new(10.0, 0.0, 0.0), &ShapeSpec::sphere(5.0));
        worker.submit(SyncRequest::Create(draft)).unwrap();
        worker.submit(SyncRequest::Delete(ShapeId(99))).unwrap();

        match worker.recv_timeout(WAIT) {
            Some(SyncOutcome::Created(Ok(record))) => assert_eq!(record.id, ShapeId(7)),
            other => panic!("unexpected outcome: {other:?}"),
        }
        match worker.recv_timeout(WAIT) {
            Some(SyncOutcome::Deleted { id, result }) => {
                assert_eq!(id, ShapeId(99));
                assert!(matches!(result, Err(StoreError::NotFound(_))));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(store.len(), 1);
        worker.shutdown();
        assert!(worker.submit(SyncRequest::Refresh).is_err());
    }

    #[test]
    fn refresh_reports_fetch_failure() {
        let store = MemoryShapeStore::new();
        store.fail_next_list("down");
        let worker = SyncWorker::spawn(store).unwrap();
        worker.submit(SyncRequest::Refresh).unwrap();
        match worker.recv_timeout(WAIT) {
            Some(SyncOutcome::Fetched(Err(StoreError::Status { status, body }))) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn worker_goes_idle_after_work() {
        let worker = SyncWorker::spawn(MemoryShapeStore::new()).unwrap();
        for _ in 0..5 {
            worker.submit(SyncRequest::Refresh).unwrap();
        }
        let deadline = std::time::Instant::now() + WAIT;
        while !worker.is_idle() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(worker.is_idle());
        let fetched = worker.drain().len();
        assert!((1..=5).contains(&fetched));
    }
}
