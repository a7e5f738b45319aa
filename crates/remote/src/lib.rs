//! Remote shape store: the `ShapeStore` seam, its REST and in-memory
//! implementations, and the worker that serializes calls off the
//! simulation thread.
//!
//! # Invariants
//! - At most one store call is in flight per worker.
//! - Outcomes are only observed by whoever drains the worker.

mod error;
mod memory;
mod store;
mod worker;

pub use error::{FetchError, StoreError};
pub use memory::{MemoryShapeStore, check_draft};
pub use store::{HttpShapeStore, RemoteConfig, ShapeStore};
pub use worker::{SyncOutcome, SyncRequest, SyncWorker};
