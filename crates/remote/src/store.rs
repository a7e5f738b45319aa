use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shapestage_common::{ShapeDraft, ShapeId, ShapeRecord};
use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

/// Where the remote store lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            timeout_ms: 10_000,
        }
    }
}

/// The remote entity store.
///
/// `list` returns every record ordered by id. `create` answers with the
/// stored record including its assigned id.
pub trait ShapeStore: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<ShapeRecord>, StoreError>> + Send;

    fn create(
        &self,
        draft: &ShapeDraft,
    ) -> impl Future<Output = Result<ShapeRecord, StoreError>> + Send;

    fn delete(&self, id: ShapeId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// `ShapeStore` over the REST API (`/api/shapes`).
#[derive(Debug, Clone)]
pub struct HttpShapeStore {
    client: Client,
    base_url: String,
}

impl HttpShapeStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

impl ShapeStore for HttpShapeStore {
    async fn list(&self) -> Result<Vec<ShapeRecord>, StoreError> {
        let response = self.client.get(self.url("/api/shapes")).send().await?;
        parse_response(response).await
    }

    async fn create(&self, draft: &ShapeDraft) -> Result<ShapeRecord, StoreError> {
        let response = self
            .client
            .post(self.url("/api/shapes"))
            .json(draft)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(body.trim().trim_matches('"').to_string()));
        }
        parse_response(response).await
    }

    async fn delete(&self, id: ShapeId) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/shapes/{}", id.0)))
            .send()
            .await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id));
        }
        if !status.is_success() {
            let body = read_body(response).await;
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

async fn parse_response<T>(response: reqwest::Response) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        let body = read_body(response).await;
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unavailable>".to_string())
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(
            join_url("http://127.0.0.1:5000/", "/api/shapes"),
            "http://127.0.0.1:5000/api/shapes"
        );
        assert_eq!(
            join_url("http://h", "api/shapes/7"),
            "http://h/api/shapes/7"
        );
    }

    #[test]
    fn remote_config_defaults() {
        let config: RemoteConfig = serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.timeout_ms, 500);
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let store = HttpShapeStore::new(&RemoteConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout_ms: 2_000,
        })
        .unwrap();
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
