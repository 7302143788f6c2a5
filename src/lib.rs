//! # pic-gateway
//!
//! Two small request handlers for an image processing pipeline:
//!
//! - **Status lookup**: reads one processing-status record from DynamoDB by
//!   identifier and returns it verbatim.
//! - **Upload authorization**: validates an image filename and returns a
//!   time-limited pre-signed S3 `PUT` URL for a fresh, unique object key.
//!
//! Every response, success or failure, goes through one formatter that sets
//! `Content-Type: application/json` and `Access-Control-Allow-Origin: *`.
//!
//! ## Architecture
//!
//! - [`status`] / [`upload`] - The two handlers, independent of transport
//! - [`store`] - Status record store trait and DynamoDB implementation
//! - [`storage`] - Upload signer trait and S3 implementation
//! - [`response`] - Response envelope and error mapping
//! - [`event`] - Query parameters and gateway proxy events
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pic_gateway::{
//!     create_dynamodb_client, create_router, create_s3_client, AppState, DynamoStatusStore,
//!     RouterConfig, S3UploadSigner, StatusLookup, UploadAuthorizer, UploadPolicy,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
//!
//!     let store = DynamoStatusStore::new(create_dynamodb_client(&sdk_config, None), "pic-status");
//!     let signer = S3UploadSigner::new(create_s3_client(&sdk_config, None));
//!
//!     let state = AppState::new(
//!         StatusLookup::new(Arc::new(store), "pic_id"),
//!         UploadAuthorizer::new(Arc::new(signer), UploadPolicy::new("pic-uploads")),
//!     );
//!     let router = create_router(state, RouterConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod response;
pub mod server;
pub mod status;
pub mod storage;
pub mod store;
pub mod upload;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, HandlerConfig, HandlerKind, InvokeConfig, ServeConfig};
pub use error::{ApiError, EventError, StorageError, StoreError};
pub use event::{ProxyEvent, QueryParams};
pub use response::{format_response, Envelope};
pub use server::{create_router, AppState, RouterConfig};
pub use status::{StatusLookup, DEFAULT_STATUS_KEY};
pub use storage::{create_s3_client, S3UploadSigner, UploadSigner};
pub use store::{create_dynamodb_client, DynamoStatusStore, StatusRecord, StatusStore};
pub use upload::{
    generate_object_key, UploadAuthorizer, UploadGrant, UploadPolicy, DEFAULT_ALLOWED_EXTENSIONS,
    DEFAULT_URL_EXPIRY_SECS,
};
