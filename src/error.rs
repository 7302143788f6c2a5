use thiserror::Error;

/// Errors from the status key-value store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store rejected or failed the request (throttling, missing table, auth)
    #[error("DynamoDB error: {0}")]
    Service(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Errors from the object storage service.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Requested expiry cannot be expressed as a presigning configuration
    #[error("Invalid presign expiry of {seconds}s: {message}")]
    InvalidExpiry { seconds: u64, message: String },

    /// The SDK failed to build or sign the request
    #[error("Presign error: {0}")]
    Presign(String),
}

/// Errors raised while handling a request.
///
/// Every variant maps to exactly one HTTP status and one JSON error body;
/// see `crate::response` for the rendering.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required query parameter was absent or empty
    #[error("Missing required query parameter '{param}'.")]
    MissingParameter { param: String },

    /// The upload filename has no `.`
    #[error("filename query param must include an extension")]
    MissingExtension,

    /// The upload filename has an extension outside the allow-list
    #[error("extension '{extension}' is not allowed")]
    DisallowedExtension {
        extension: String,
        /// Sorted allow-list echoed back to the caller
        allowed: Vec<String>,
    },

    /// The store holds no record for the identifier
    #[error("No status found for {param} '{id}'.")]
    NotFound { param: String, id: String },

    /// The store lookup itself failed
    #[error("status lookup failed: {0}")]
    StoreRead(#[source] StoreError),

    /// Generating the signed upload URL failed
    #[error("upload URL generation failed: {0}")]
    UploadSigning(#[source] StorageError),
}

/// Errors reading a gateway proxy event for the `invoke` command.
#[derive(Debug, Error)]
pub enum EventError {
    /// The event is not valid JSON or has the wrong shape
    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The event could not be read from its file or stdin
    #[error("Failed to read event: {0}")]
    Read(#[from] std::io::Error),
}
