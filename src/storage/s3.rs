use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use super::UploadSigner;
use crate::error::StorageError;

/// S3-backed implementation of [`UploadSigner`].
///
/// Signing happens locally with the client's credentials; no request is
/// sent to S3 until the caller uses the URL.
#[derive(Clone)]
pub struct S3UploadSigner {
    client: Client,
}

impl S3UploadSigner {
    /// Create a signer using the given S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UploadSigner for S3UploadSigner {
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning =
            PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::InvalidExpiry {
                seconds: expires_in.as_secs(),
                message: e.to_string(),
            })?;

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }
}

/// Create an S3 client from shared SDK configuration.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(&sdk_config, Some("http://localhost:9000"));
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint.
pub fn create_s3_client(sdk_config: &SdkConfig, endpoint_url: Option<&str>) -> Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

    // S3-compatible services generally need path-style addressing
    if let Some(endpoint) = endpoint_url {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    Client::from_conf(builder.build())
}
