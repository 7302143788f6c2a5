//! DynamoDB-backed status store.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::{StatusRecord, StatusStore};
use crate::error::StoreError;

/// Status store reading single items from a DynamoDB table.
///
/// The client is built once at startup and shared; `Client` is cheap to
/// clone and safe for concurrent use.
#[derive(Clone)]
pub struct DynamoStatusStore {
    client: Client,
    table: String,
}

impl DynamoStatusStore {
    /// Create a store for the given table.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl StatusStore for DynamoStatusStore {
    async fn get_record(
        &self,
        key_attribute: &str,
        id: &str,
    ) -> Result<Option<StatusRecord>, StoreError> {
        debug!(table = %self.table, key = key_attribute, id, "GetItem");

        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(key_attribute, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                match e {
                    SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
                        StoreError::Connection(message)
                    }
                    _ => StoreError::Service(message),
                }
            })?;

        Ok(output.item().map(|item| {
            item.iter()
                .map(|(name, value)| (name.clone(), attribute_to_json(value)))
                .collect()
        }))
    }

    fn table(&self) -> &str {
        &self.table
    }
}

/// Convert a DynamoDB attribute value into plain JSON.
///
/// Numbers become JSON numbers when they fit an `i64`, `u64` or finite `f64`
/// and stay strings otherwise. Binary values are base64 encoded.
pub fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(blob) => Value::String(BASE64.encode(blob.as_ref())),
        AttributeValue::L(items) => Value::Array(items.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        AttributeValue::Ss(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(items) => Value::Array(items.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::Bs(items) => Value::Array(
            items
                .iter()
                .map(|blob| Value::String(BASE64.encode(blob.as_ref())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::Number(u.into());
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

/// Create a DynamoDB client from shared SDK configuration.
///
/// Pass an endpoint to target DynamoDB Local or another compatible service.
pub fn create_dynamodb_client(sdk_config: &SdkConfig, endpoint_url: Option<&str>) -> Client {
    let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

    if let Some(endpoint) = endpoint_url {
        builder = builder.endpoint_url(endpoint);
    }

    Client::from_conf(builder.build())
}
