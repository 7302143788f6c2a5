//! HTTP request handlers for pic-gateway.
//!
//! These are thin axum adapters: they decode the query string, run the
//! corresponding core handler and return its [`Envelope`].
//!
//! # Endpoints
//!
//! - `GET /status?<key>=<id>` - Look up a status record
//! - `GET /upload?filename=<name>` - Issue a pre-signed upload URL
//! - `GET /health` - Health check endpoint

use axum::extract::{RawQuery, State};
use http::StatusCode;
use serde_json::json;

use crate::event::QueryParams;
use crate::response::{format_response, Envelope};
use crate::status::StatusLookup;
use crate::upload::UploadAuthorizer;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// Both handlers hold their collaborators behind `Arc`, so cloning the state
/// per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Status lookup handler
    pub status: StatusLookup,

    /// Upload authorization handler
    pub upload: UploadAuthorizer,
}

impl AppState {
    /// Create a new application state from the two handlers.
    pub fn new(status: StatusLookup, upload: UploadAuthorizer) -> Self {
        Self { status, upload }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle status lookup requests.
///
/// # Endpoint
///
/// `GET /status?pic_id=<id>` (the parameter name follows the configured key
/// attribute)
///
/// # Response
///
/// `200 OK` with the stored record as the JSON body:
/// ```json
/// {
///   "pic_id": "whiskers",
///   "status": "processing",
///   "last_update": "2025-06-25T09:14:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Identifier missing or empty
/// - `404 Not Found`: No record for the identifier
/// - `500 Internal Server Error`: Store lookup failed
pub async fn status_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Envelope {
    let params = QueryParams::parse(query.as_deref());
    state.status.handle(&params).await
}

/// Handle upload authorization requests.
///
/// # Endpoint
///
/// `GET /upload?filename=<name>`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "upload_url": "https://bucket.s3.amazonaws.com/4f0c...e1.jpg?X-Amz-...",
///   "object_key": "4f0c9a7b2d6e4f1a8b3c5d7e9f0a1b2c.jpg",
///   "expires_in": 600
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Filename has no extension, or the extension is not
///   in the allow-list
/// - `500 Internal Server Error`: The URL could not be signed
pub async fn upload_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Envelope {
    let params = QueryParams::parse(query.as_deref());
    state.upload.handle(&params).await
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
///
/// Carries the same headers as the other handlers.
pub async fn health_handler() -> Envelope {
    format_response(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}
