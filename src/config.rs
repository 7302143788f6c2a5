//! Configuration management for pic-gateway.
//!
//! Configuration comes from command-line arguments via clap, with every
//! option also readable from the environment. The table, bucket and expiry
//! variables keep the names the deployed handlers already use.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use pic_gateway::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! if let Command::Serve(config) = cli.command {
//!     println!("Listening on {}", config.bind_address());
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `TABLE_NAME` - DynamoDB table holding status records (required by the status handler)
//! - `BUCKET_NAME` - S3 bucket receiving uploads (required by the upload handler)
//! - `URL_EXPIRY_SECONDS` - Upload URL lifetime (default: 600)
//! - `ALLOWED_EXTENSIONS` - Comma-separated upload extensions (default: .jpg,.png)
//! - `STATUS_KEY_ATTRIBUTE` - Identifier parameter / key attribute (default: pic_id)
//! - `AWS_REGION` - AWS region (default: us-east-1)
//! - `DYNAMODB_ENDPOINT` - Custom DynamoDB endpoint (DynamoDB Local)
//! - `S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `PICGW_HOST` - Server bind address (default: 0.0.0.0)
//! - `PICGW_PORT` - Server port (default: 3000)

use std::path::PathBuf;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::status::DEFAULT_STATUS_KEY;
use crate::upload::{
    normalize_extension, UploadPolicy, DEFAULT_URL_EXPIRY_SECS, MAX_URL_EXPIRY_SECS,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

// =============================================================================
// CLI Arguments
// =============================================================================

/// pic-gateway - status lookup and image upload authorization.
#[derive(Parser, Debug, Clone)]
#[command(name = "pic-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeConfig),

    /// Run one handler against a gateway proxy event and print the response.
    Invoke(InvokeConfig),

    /// Check that the table and bucket are reachable.
    Check(CheckConfig),
}

/// Options shared by every command that builds the handlers.
///
/// The table and bucket are optional at parse time so that `invoke` can run
/// one handler with only that handler's settings; `serve` and `check`
/// require both through [`HandlerConfig::validate`].
#[derive(Args, Debug, Clone)]
pub struct HandlerConfig {
    // =========================================================================
    // Status Lookup
    // =========================================================================
    /// DynamoDB table holding status records.
    #[arg(long, env = "TABLE_NAME")]
    pub table_name: Option<String>,

    /// Identifier query parameter, also used as the table's key attribute.
    #[arg(long, default_value = DEFAULT_STATUS_KEY, env = "STATUS_KEY_ATTRIBUTE")]
    pub status_key: String,

    /// Custom DynamoDB endpoint URL (e.g. DynamoDB Local).
    #[arg(long, env = "DYNAMODB_ENDPOINT")]
    pub dynamodb_endpoint: Option<String>,

    // =========================================================================
    // Upload Authorization
    // =========================================================================
    /// S3 bucket receiving uploads.
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// Lifetime of issued upload URLs in seconds.
    #[arg(long, default_value_t = DEFAULT_URL_EXPIRY_SECS, env = "URL_EXPIRY_SECONDS")]
    pub url_expiry_seconds: u64,

    /// Accepted upload extensions (comma-separated, case-insensitive).
    #[arg(
        long,
        env = "ALLOWED_EXTENSIONS",
        value_delimiter = ',',
        default_values = [".jpg", ".png"]
    )]
    pub allowed_extensions: Vec<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    // =========================================================================
    // AWS
    // =========================================================================
    /// AWS region.
    #[arg(long, default_value = DEFAULT_REGION, env = "AWS_REGION")]
    pub region: String,
}

impl HandlerConfig {
    /// Validate the settings of both handlers.
    pub fn validate(&self) -> Result<(), String> {
        self.validate_status()?;
        self.validate_upload()
    }

    /// Validate only the settings the given handler reads.
    pub fn validate_for(&self, kind: HandlerKind) -> Result<(), String> {
        match kind {
            HandlerKind::Status => self.validate_status(),
            HandlerKind::Upload => self.validate_upload(),
        }
    }

    fn validate_status(&self) -> Result<(), String> {
        if self.table().trim().is_empty() {
            return Err("Table name is required. Set --table-name or TABLE_NAME".to_string());
        }

        if self.status_key.trim().is_empty() {
            return Err("status_key must not be empty".to_string());
        }

        Ok(())
    }

    fn validate_upload(&self) -> Result<(), String> {
        if self.bucket().trim().is_empty() {
            return Err("Bucket name is required. Set --bucket-name or BUCKET_NAME".to_string());
        }

        if self.url_expiry_seconds == 0 || self.url_expiry_seconds > MAX_URL_EXPIRY_SECS {
            return Err(format!(
                "url_expiry_seconds must be between 1 and {}",
                MAX_URL_EXPIRY_SECS
            ));
        }

        let extensions: Vec<String> = self
            .allowed_extensions
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| normalize_extension(e))
            .collect();

        if extensions.is_empty() {
            return Err("allowed_extensions must list at least one extension".to_string());
        }

        // Filenames are matched on the text after their last dot only
        if let Some(bad) = extensions
            .iter()
            .find(|e| e.len() < 2 || e[1..].contains('.'))
        {
            return Err(format!(
                "allowed extension '{}' must be a single suffix such as .jpg",
                bad
            ));
        }

        Ok(())
    }

    /// Status table name, empty when unset.
    pub fn table(&self) -> &str {
        self.table_name.as_deref().unwrap_or_default()
    }

    /// Upload bucket name, empty when unset.
    pub fn bucket(&self) -> &str {
        self.bucket_name.as_deref().unwrap_or_default()
    }

    /// Build the upload policy described by this configuration.
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.bucket())
            .with_expiry_secs(self.url_expiry_seconds)
            .with_allowed_extensions(
                self.allowed_extensions
                    .iter()
                    .filter(|e| !e.trim().is_empty()),
            )
    }

    /// Load shared AWS configuration (credentials chain, region).
    pub async fn sdk_config(&self) -> SdkConfig {
        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .load()
            .await
    }
}

/// Options for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PICGW_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PICGW_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub handlers: HandlerConfig,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.handlers.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which handler `invoke` runs.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Status lookup
    Status,
    /// Upload authorization
    Upload,
}

impl HandlerKind {
    /// Infer the handler from a request path, accepting the legacy route
    /// names and any stage prefix (e.g. `/prod/status`).
    pub fn from_path(path: &str) -> Option<Self> {
        let last = path.trim_end_matches('/').rsplit('/').next()?;
        match last {
            "status" | "cat_status" => Some(HandlerKind::Status),
            "upload" | "s3_upload" => Some(HandlerKind::Upload),
            _ => None,
        }
    }
}

/// Options for the `invoke` command.
#[derive(Args, Debug, Clone)]
pub struct InvokeConfig {
    /// Handler to run. Inferred from the event path when omitted.
    #[arg(long, value_enum)]
    pub handler: Option<HandlerKind>,

    /// File containing the proxy event JSON. Reads stdin when omitted.
    #[arg(long)]
    pub event: Option<PathBuf>,

    #[command(flatten)]
    pub handlers: HandlerConfig,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Options for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub handlers: HandlerConfig,

    /// Also look up this identifier in the table.
    #[arg(long)]
    pub test_id: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
