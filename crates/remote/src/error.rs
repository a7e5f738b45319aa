use shapestage_common::ShapeId;

/// Errors from talking to a shape store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode store response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("shape {0} not found")]
    NotFound(ShapeId),
    #[error("shape rejected: {0}")]
    Rejected(String),
    #[error("sync worker failed to start: {0}")]
    Worker(std::io::Error),
    #[error("sync worker is not running")]
    WorkerGone,
}

/// A failed list call. Kept as a separate name for the reconcile path.
pub type FetchError = StoreError;
