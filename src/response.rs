//! Response envelope shared by every handler.
//!
//! A handler result is reduced to an [`Envelope`]: a status code, a fixed
//! header set and a JSON body already serialized to text. The same value is
//! rendered two ways:
//!
//! - as an HTTP response by the axum server (via [`IntoResponse`])
//! - as a gateway proxy response (`{"statusCode", "headers", "body"}`) by the
//!   `invoke` command (via [`Serialize`])

use std::collections::BTreeMap;

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ApiError;

/// `Content-Type` value of every envelope.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// `Access-Control-Allow-Origin` value of every envelope.
pub const ALLOW_ANY_ORIGIN: &str = "*";

/// Transport envelope for a handler response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Numeric HTTP status code
    pub status_code: u16,

    /// Response headers
    pub headers: BTreeMap<String, String>,

    /// Serialized JSON body
    pub body: String,
}

impl Envelope {
    /// Status code as an [`http::StatusCode`].
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Parse the body back into a JSON value.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Wrap a status code and a JSON body into an [`Envelope`].
///
/// The header set is fixed: `Content-Type: application/json` and
/// `Access-Control-Allow-Origin: *`.
pub fn format_response(status: StatusCode, body: &Value) -> Envelope {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
    headers.insert(
        "Access-Control-Allow-Origin".to_string(),
        ALLOW_ANY_ORIGIN.to_string(),
    );

    Envelope {
        status_code: status.as_u16(),
        headers,
        // Display on Value cannot fail: object keys are always strings
        body: body.to_string(),
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, value);
            }
        }

        response
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Body of a failed store lookup.
pub const STORE_READ_ERROR: &str = "Internal error reading data";

/// Body of a failed upload URL request.
pub const UPLOAD_SIGNING_ERROR: &str = "Failed to generate upload URL";

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter { .. }
            | ApiError::MissingExtension
            | ApiError::DisallowedExtension { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::StoreRead(_) | ApiError::UploadSigning(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body returned to the caller.
    ///
    /// Dependency failures get a fixed message; the underlying error is
    /// never exposed.
    pub fn body(&self) -> Value {
        match self {
            ApiError::MissingParameter { .. }
            | ApiError::MissingExtension
            | ApiError::NotFound { .. } => json!({ "error": self.to_string() }),
            ApiError::DisallowedExtension { allowed, .. } => json!({
                "error": format!("Only {} uploads are allowed", allowed.join(" or ")),
                "allowed_extensions": allowed,
            }),
            ApiError::StoreRead(_) => json!({ "error": STORE_READ_ERROR }),
            ApiError::UploadSigning(_) => json!({ "error": UPLOAD_SIGNING_ERROR }),
        }
    }
}

/// Render an error through the response formatter.
///
/// Client errors are logged here. Dependency failures are logged at the call
/// site, where the table, bucket and key are known.
impl From<ApiError> for Envelope {
    fn from(err: ApiError) -> Self {
        let status = err.status();

        match &err {
            ApiError::NotFound { .. } => {
                debug!(status = status.as_u16(), "Not found: {}", err);
            }
            _ if status.is_client_error() => {
                warn!(status = status.as_u16(), "Client error: {}", err);
            }
            _ => {}
        }

        format_response(status, &err.body())
    }
}
