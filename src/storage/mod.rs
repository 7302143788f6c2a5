//! Object storage signing.
//!
//! The upload handler never touches object data; it only asks storage for a
//! time-limited write authorization. [`S3UploadSigner`] issues pre-signed
//! `PutObject` URLs.

mod s3;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;

pub use s3::{create_s3_client, S3UploadSigner};

/// Issues signed write authorizations for single objects.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    /// Return a URL that permits one `PUT` of `key` into `bucket` until
    /// `expires_in` has elapsed.
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
