//! Test utilities for integration tests.
//!
//! This module provides in-memory implementations of the status store and
//! upload signer, plus helpers for driving the router.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower::ServiceExt;

use pic_gateway::error::{StorageError, StoreError};
use pic_gateway::store::{StatusRecord, StatusStore};
use pic_gateway::{
    create_router, AppState, RouterConfig, StatusLookup, UploadAuthorizer, UploadPolicy,
    UploadSigner,
};

pub const TEST_TABLE: &str = "test-status";
pub const TEST_BUCKET: &str = "test-uploads";

// =============================================================================
// Mock Status Store
// =============================================================================

/// A mock status store serving pre-configured records.
///
/// Clones share request tracking, so a test can keep one handle and give
/// another to the router.
#[derive(Clone)]
pub struct MockStatusStore {
    key_attribute: String,
    records: HashMap<String, StatusRecord>,
    fail: bool,
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockStatusStore {
    /// Create an empty store keyed by `key_attribute`.
    pub fn new(key_attribute: impl Into<String>) -> Self {
        Self {
            key_attribute: key_attribute.into(),
            records: HashMap::new(),
            fail: false,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a record. The key attribute is added to the record as well, the
    /// way DynamoDB returns it.
    pub fn with_record(mut self, id: impl Into<String>, fields: Value) -> Self {
        let id = id.into();
        let mut record = match fields {
            Value::Object(map) => map,
            other => panic!("record fields must be an object, got {other}"),
        };
        record.insert(self.key_attribute.clone(), Value::String(id.clone()));
        self.records.insert(id, record);
        self
    }

    /// Make every lookup fail like an unreachable table.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<(String, String)> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl StatusStore for MockStatusStore {
    async fn get_record(
        &self,
        key_attribute: &str,
        id: &str,
    ) -> Result<Option<StatusRecord>, StoreError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .write()
            .await
            .push((key_attribute.to_string(), id.to_string()));

        if self.fail {
            return Err(StoreError::Service(
                "ResourceNotFoundException: Requested resource not found".to_string(),
            ));
        }

        if key_attribute != self.key_attribute {
            return Ok(None);
        }

        Ok(self.records.get(id).cloned())
    }

    fn table(&self) -> &str {
        TEST_TABLE
    }
}

// =============================================================================
// Mock Upload Signer
// =============================================================================

/// A mock upload signer returning deterministic URLs.
#[derive(Clone, Default)]
pub struct MockUploadSigner {
    fail: bool,
    requests: Arc<RwLock<Vec<(String, String, Duration)>>>,
}

impl MockUploadSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every signing request fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn get_requests(&self) -> Vec<(String, String, Duration)> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl UploadSigner for MockUploadSigner {
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.requests
            .write()
            .await
            .push((bucket.to_string(), key.to_string(), expires_in));

        if self.fail {
            return Err(StorageError::Presign(
                "no credentials in the provider chain".to_string(),
            ));
        }

        Ok(format!(
            "https://mock-storage.local/{}/{}?X-Amz-Expires={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Build a router over the given mocks with the default upload policy.
pub fn test_router(store: MockStatusStore, signer: MockUploadSigner) -> Router {
    test_router_with_policy(store, signer, UploadPolicy::new(TEST_BUCKET))
}

/// Build a router over the given mocks and upload policy.
///
/// The lookup uses the store's own key attribute.
pub fn test_router_with_policy(
    store: MockStatusStore,
    signer: MockUploadSigner,
    policy: UploadPolicy,
) -> Router {
    let key_attribute = store.key_attribute.clone();
    let state = AppState::new(
        StatusLookup::new(Arc::new(store), key_attribute),
        UploadAuthorizer::new(Arc::new(signer), policy),
    );
    create_router(state, RouterConfig::default().with_tracing(false))
}

/// Send a GET request and return status, headers and the parsed JSON body.
pub async fn get_json(router: Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "body of {} is not JSON ({}): {:?}",
            uri,
            e,
            String::from_utf8_lossy(&body)
        )
    });

    (status, headers, json)
}

/// Assert the fixed header set every handler response carries.
pub fn assert_envelope_headers(headers: &HeaderMap) {
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
}

/// Check that `s` is entirely lowercase hexadecimal.
pub fn is_lower_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}
