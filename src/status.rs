//! Status lookup.
//!
//! Reads a single status record by identifier and returns it unmodified.
//! The name of the identifier parameter doubles as the table's key
//! attribute, so one handler serves both the `pic_id` and the legacy
//! `cat_id` deployments.

use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::event::QueryParams;
use crate::response::{format_response, Envelope};
use crate::store::{StatusRecord, StatusStore};

/// Default identifier parameter and key attribute.
pub const DEFAULT_STATUS_KEY: &str = "pic_id";

/// Looks up status records.
#[derive(Clone)]
pub struct StatusLookup {
    store: Arc<dyn StatusStore>,
    key_attribute: String,
}

impl StatusLookup {
    /// Create a lookup reading `store` by `key_attribute`.
    pub fn new(store: Arc<dyn StatusStore>, key_attribute: impl Into<String>) -> Self {
        Self {
            store,
            key_attribute: key_attribute.into(),
        }
    }

    /// Fetch the record for `id`.
    ///
    /// Makes at most one store call; an absent or empty `id` makes none.
    pub async fn lookup(&self, id: Option<&str>) -> Result<StatusRecord, ApiError> {
        let id = id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::MissingParameter {
                param: self.key_attribute.clone(),
            })?;

        let record = self
            .store
            .get_record(&self.key_attribute, id)
            .await
            .map_err(|e| {
                error!(
                    table = self.store.table(),
                    key = %self.key_attribute,
                    id,
                    error = %e,
                    "DynamoDB get_item failed"
                );
                ApiError::StoreRead(e)
            })?;

        match record {
            Some(record) => {
                debug!(key = %self.key_attribute, id, fields = record.len(), "Status found");
                Ok(record)
            }
            None => Err(ApiError::NotFound {
                param: self.key_attribute.clone(),
                id: id.to_string(),
            }),
        }
    }

    /// Run the handler against request query parameters.
    pub async fn handle(&self, params: &QueryParams) -> Envelope {
        match self.lookup(params.get(&self.key_attribute)).await {
            Ok(record) => format_response(StatusCode::OK, &Value::Object(record)),
            Err(e) => e.into(),
        }
    }
}
