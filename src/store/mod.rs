//! Status record store.
//!
//! The lookup handler only needs a single point read, so the store is a
//! narrow trait. [`DynamoStatusStore`] is the production implementation;
//! tests substitute an in-memory store.

mod dynamo;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use dynamo::{attribute_to_json, create_dynamodb_client, DynamoStatusStore};

/// A status record exactly as stored, keyed by attribute name.
pub type StatusRecord = Map<String, Value>;

/// Read access to status records.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Fetch the record whose `key_attribute` equals `id`.
    ///
    /// Returns `Ok(None)` when the lookup succeeded but no record exists.
    async fn get_record(
        &self,
        key_attribute: &str,
        id: &str,
    ) -> Result<Option<StatusRecord>, StoreError>;

    /// Name of the backing table, for diagnostics.
    fn table(&self) -> &str;
}
