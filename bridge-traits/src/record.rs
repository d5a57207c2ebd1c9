//! Destination Record Store Abstraction
//!
//! The sync engine writes one record per discovered media file into an
//! external task/record store. It only needs two capabilities from that store:
//! an existence oracle keyed by link and a write sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Identifier assigned by the store to a created record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-agnostic description of a record to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    /// Record title (the media file name)
    pub title: String,

    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Link value used for existence checks
    pub link: String,

    /// Media-type tag, e.g. `Photo` or `Video`
    pub media_tag: String,

    /// Original upload time of the media file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_timestamp: Option<DateTime<Utc>>,

    /// Tags to attach
    #[serde(default)]
    pub tags: Vec<String>,

    /// Store-specific custom field values keyed by field identifier
    #[serde(default)]
    pub custom_fields: BTreeMap<String, serde_json::Value>,

    /// Container (project/space) to create the record in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Destination store contract
///
/// # Example
///
/// ```ignore
/// use bridge_traits::record::RecordStore;
///
/// async fn ensure(store: &dyn RecordStore, payload: RecordPayload) -> Result<()> {
///     if !store.exists_by_link(&payload.link).await? {
///         store.create_record(payload).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Verify the store is reachable and credentials are accepted
    ///
    /// Called once before any traversal; a failure aborts the run.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Whether a record carrying this link value already exists
    async fn exists_by_link(&self, link: &str) -> Result<bool>;

    /// Create a record and return its identifier
    async fn create_record(&self, payload: RecordPayload) -> Result<RecordId>;
}
