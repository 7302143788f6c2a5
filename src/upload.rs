//! Upload authorization.
//!
//! Turns a client-supplied filename into a pre-signed `PUT` URL for a fresh,
//! collision-free object key:
//!
//! ```text
//! filename ──► base name ──► extension ──► allow-list ──► <uuid hex><ext> ──► presign
//!              (after /)     (lower-cased)                                      │
//!                                                                               ▼
//!                                             {upload_url, object_key, expires_in}
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::event::QueryParams;
use crate::response::{format_response, Envelope};
use crate::storage::UploadSigner;

/// Query parameter carrying the filename.
pub const FILENAME_PARAM: &str = "filename";

/// Default lifetime of an upload URL (10 minutes).
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 600;

/// Longest lifetime S3 accepts for a pre-signed URL (7 days).
pub const MAX_URL_EXPIRY_SECS: u64 = 7 * 24 * 3600;

/// Extensions accepted when none are configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".png"];

// =============================================================================
// Policy
// =============================================================================

/// Where uploads go, how long grants last, and which extensions are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    bucket: String,
    expiry_secs: u64,
    allowed_extensions: BTreeSet<String>,
}

impl UploadPolicy {
    /// Create a policy for `bucket` with the default expiry and allow-list.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            expiry_secs: DEFAULT_URL_EXPIRY_SECS,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
        }
    }

    /// Set the upload URL lifetime in seconds.
    pub fn with_expiry_secs(mut self, seconds: u64) -> Self {
        self.expiry_secs = seconds;
        self
    }

    /// Replace the allow-list. Entries are normalized, so `JPG`, `.jpg` and
    /// `.JPG` are the same extension.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }

    /// The allow-list, sorted.
    pub fn allowed_extensions(&self) -> Vec<String> {
        self.allowed_extensions.iter().cloned().collect()
    }

    /// Check whether an already-normalized extension is allowed.
    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(extension)
    }

    /// Validate a raw filename and return its normalized extension.
    ///
    /// Path components are dropped rather than rejected: only the text after
    /// the final `/` is considered.
    pub fn validate_filename(&self, filename: &str) -> Result<String, ApiError> {
        let extension = extract_extension(base_name(filename)).ok_or(ApiError::MissingExtension)?;

        if !self.allows(&extension) {
            return Err(ApiError::DisallowedExtension {
                extension,
                allowed: self.allowed_extensions(),
            });
        }

        Ok(extension)
    }
}

/// Text after the final `/`, or the whole input if there is none.
pub fn base_name(filename: &str) -> &str {
    filename.rsplit('/').next().unwrap_or(filename)
}

/// Extension of a base name: the text after the last `.`, lower-cased and
/// prefixed with `.`. Returns `None` when there is no `.` at all.
///
/// A trailing dot yields `"."`, which no allow-list entry matches.
pub fn extract_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
}

/// Lower-case an extension and make sure it starts with `.`.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Derive a fresh object key: 32 lowercase hex digits of a random v4 UUID
/// followed by the extension.
pub fn generate_object_key(extension: &str) -> String {
    format!("{}{}", Uuid::new_v4().simple(), extension)
}

// =============================================================================
// Grant
// =============================================================================

/// A time-limited authorization to upload one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadGrant {
    /// Pre-signed `PUT` URL
    pub upload_url: String,

    /// Key the client must upload to
    pub object_key: String,

    /// Seconds until `upload_url` expires
    pub expires_in: u64,
}

impl UploadGrant {
    /// Response body: `{upload_url, object_key, expires_in}`.
    pub fn to_json(&self) -> Value {
        json!({
            "upload_url": self.upload_url,
            "object_key": self.object_key,
            "expires_in": self.expires_in,
        })
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Issues [`UploadGrant`]s.
#[derive(Clone)]
pub struct UploadAuthorizer {
    signer: Arc<dyn UploadSigner>,
    policy: UploadPolicy,
}

impl UploadAuthorizer {
    pub fn new(signer: Arc<dyn UploadSigner>, policy: UploadPolicy) -> Self {
        Self { signer, policy }
    }

    /// Validate `filename` and issue a grant for a new object key.
    ///
    /// An absent filename is treated as empty and fails the extension check.
    pub async fn authorize(&self, filename: Option<&str>) -> Result<UploadGrant, ApiError> {
        let extension = self.policy.validate_filename(filename.unwrap_or(""))?;
        let object_key = generate_object_key(&extension);

        let upload_url = self
            .signer
            .presign_put(self.policy.bucket(), &object_key, self.policy.expiry())
            .await
            .map_err(|e| {
                error!(
                    bucket = self.policy.bucket(),
                    object_key = %object_key,
                    error = %e,
                    "Failed to generate presigned URL"
                );
                ApiError::UploadSigning(e)
            })?;

        info!(
            bucket = self.policy.bucket(),
            object_key = %object_key,
            expires_in = self.policy.expiry_secs(),
            "Issued upload URL"
        );

        Ok(UploadGrant {
            upload_url,
            object_key,
            expires_in: self.policy.expiry_secs(),
        })
    }

    /// Run the handler against request query parameters.
    pub async fn handle(&self, params: &QueryParams) -> Envelope {
        match self.authorize(params.get(FILENAME_PARAM)).await {
            Ok(grant) => format_response(StatusCode::OK, &grant.to_json()),
            Err(e) => e.into(),
        }
    }
}
