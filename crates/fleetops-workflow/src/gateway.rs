//! Persistence collaborator traits and backend error decoding
//!
//! The engine's only contract with the backend: pass a validated payload,
//! get back the persisted record or a typed error body
//! `{message: string | string[] | object}`. Failures surface unmodified as
//! `WorkflowError::Backend`; nothing here retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleetops_types::{Payload, RecordId, RecordKind, ReferenceItem, ReferenceKey, WorkflowResult};
use serde_json::Value;

/// Listing-screen filter: free search plus a date window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub started: Option<DateTime<Utc>>,
    pub ended: Option<DateTime<Utc>>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_window(mut self, started: DateTime<Utc>, ended: DateTime<Utc>) -> Self {
        self.started = Some(started);
        self.ended = Some(ended);
        self
    }
}

/// Record endpoints, keyed by record kind.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn list(&self, kind: RecordKind, filter: &ListFilter) -> WorkflowResult<Vec<Payload>>;
    async fn get(&self, kind: RecordKind, id: RecordId) -> WorkflowResult<Option<Payload>>;
    async fn create(&self, kind: RecordKind, payload: Payload) -> WorkflowResult<Payload>;
    async fn update(
        &self,
        kind: RecordKind,
        id: RecordId,
        payload: Payload,
    ) -> WorkflowResult<Payload>;
    /// Partial write: status moves, assignments, and discriminator swaps.
    async fn patch(&self, kind: RecordKind, id: RecordId, patch: Payload) -> WorkflowResult<()>;
    async fn delete(&self, kind: RecordKind, id: RecordId) -> WorkflowResult<()>;
}

/// Read-only lookup endpoints, one list per key.
#[async_trait]
pub trait ReferenceGateway: Send + Sync {
    async fn fetch(&self, key: ReferenceKey) -> WorkflowResult<Vec<ReferenceItem>>;
}

/// Flatten a backend error body into its display string. The `message`
/// member may be a plain string, an array of `{error}` objects, or an
/// object whose values are joined.
pub fn backend_message(body: &Value) -> String {
    let Some(message) = body.get("message") else {
        return "backend offline".to_string();
    };
    match message {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string())
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .values()
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
