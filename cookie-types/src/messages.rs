//! Messages for the store's `/get` endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{RemoteId, WireError};

/// Batched lookup request: `{"id": ["<hex64>", ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    /// Remote ids to look up
    pub id: Vec<RemoteId>,
}

impl GetRequest {
    /// Create a request for the given ids.
    pub fn new(ids: Vec<RemoteId>) -> Self {
        Self { id: ids }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }
}

/// Store response: `{"code": 0, "message": "...", "data": {"<id>": {...}}}`.
///
/// `code != 0` signals an application-level failure described by `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    /// Application status (0 = success)
    pub code: i64,
    /// Human-readable status
    #[serde(default)]
    pub message: Option<String>,
    /// Records found, keyed by remote id
    #[serde(default)]
    pub data: Option<HashMap<String, StoredRecord>>,
}

impl GetResponse {
    /// A successful response carrying `records`.
    pub fn ok(records: HashMap<String, StoredRecord>) -> Self {
        Self {
            code: 0,
            message: Some("ok".into()),
            data: Some(records),
        }
    }

    /// A failed response.
    pub fn error(code: i64, message: &str) -> Self {
        Self {
            code,
            message: Some(message.to_string()),
            data: None,
        }
    }

    /// Whether the store reported success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// The status message, or an empty string.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Take the records, empty when the store sent none.
    pub fn into_records(self) -> HashMap<String, StoredRecord> {
        self.data.unwrap_or_default()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        serde_json::from_str(json).map_err(WireError::Deserialization)
    }
}

/// One stored record: the envelope JSON and its last update time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Envelope JSON (see [`crate::Envelope`])
    pub data: String,
    /// Last update, Unix epoch milliseconds
    #[serde(default)]
    pub update: i64,
}
