//! pic-gateway - status lookup and image upload authorization.
//!
//! This binary starts the HTTP server, runs a single handler invocation, or
//! checks connectivity to the table and bucket.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pic_gateway::{
    config::{CheckConfig, Cli, Command, HandlerConfig, HandlerKind, InvokeConfig, ServeConfig},
    create_dynamodb_client, create_router, create_s3_client, AppState, DynamoStatusStore,
    ProxyEvent, RouterConfig, S3UploadSigner, StatusLookup, UploadAuthorizer, UploadSigner,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config).await,
        Command::Invoke(config) => run_invoke(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let handlers = &config.handlers;
    let policy = handlers.upload_policy();

    info!("pic-gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Table: {} (key: {})", handlers.table(), handlers.status_key);
    if let Some(ref endpoint) = handlers.dynamodb_endpoint {
        info!("  DynamoDB endpoint: {}", endpoint);
    }
    info!("  Bucket: {}", policy.bucket());
    if let Some(ref endpoint) = handlers.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  Region: {}", handlers.region);
    info!(
        "  Uploads: {} (URLs valid {}s)",
        policy.allowed_extensions().join(", "),
        policy.expiry_secs()
    );

    let state = build_state(handlers).await;

    let router_config = RouterConfig::default().with_tracing(!config.no_tracing);
    let router = create_router(state, router_config);

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl 'http://{}/status?{}=<id>'",
        addr, handlers.status_key
    );
    info!("    curl 'http://{}/upload?filename=mycat.jpg'", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Build both handlers with clients created once for the whole process.
async fn build_state(handlers: &HandlerConfig) -> AppState {
    let sdk_config = handlers.sdk_config().await;

    AppState::new(
        build_status_lookup(handlers, &sdk_config),
        build_upload_authorizer(handlers, &sdk_config),
    )
}

fn build_status_lookup(handlers: &HandlerConfig, sdk_config: &aws_config::SdkConfig) -> StatusLookup {
    let client = create_dynamodb_client(sdk_config, handlers.dynamodb_endpoint.as_deref());
    let store = DynamoStatusStore::new(client, handlers.table());
    StatusLookup::new(Arc::new(store), &handlers.status_key)
}

fn build_upload_authorizer(
    handlers: &HandlerConfig,
    sdk_config: &aws_config::SdkConfig,
) -> UploadAuthorizer {
    let client = create_s3_client(sdk_config, handlers.s3_endpoint.as_deref());
    UploadAuthorizer::new(
        Arc::new(S3UploadSigner::new(client)),
        handlers.upload_policy(),
    )
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so `invoke` can print its response on stdout.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pic_gateway=debug,tower_http=debug"
    } else {
        "pic_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Invoke Command
// =============================================================================

async fn run_invoke(config: InvokeConfig) -> ExitCode {
    init_logging(config.verbose);

    let raw = match &config.event {
        Some(path) => tokio::fs::read_to_string(path).await,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map(|_| buf)
        }
    };

    let event = match raw
        .map_err(pic_gateway::EventError::from)
        .and_then(|json| ProxyEvent::from_json(&json))
    {
        Ok(event) => event,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let kind = match config
        .handler
        .or_else(|| event.request_path().and_then(HandlerKind::from_path))
    {
        Some(kind) => kind,
        None => {
            error!("Cannot tell which handler to run: pass --handler status|upload");
            return ExitCode::FAILURE;
        }
    };

    // Only the chosen handler's settings are required
    if let Err(e) = config.handlers.validate_for(kind) {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let sdk_config = config.handlers.sdk_config().await;
    let params = event.query();

    let envelope = match kind {
        HandlerKind::Status => {
            build_status_lookup(&config.handlers, &sdk_config)
                .handle(&params)
                .await
        }
        HandlerKind::Upload => {
            build_upload_authorizer(&config.handlers, &sdk_config)
                .handle(&params)
                .await
        }
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("pic-gateway Configuration Check");
    println!("═══════════════════════════════");
    println!();

    if let Err(e) = config.handlers.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let handlers = &config.handlers;
    let policy = handlers.upload_policy();

    println!("✓ Table: {} (key: {})", handlers.table(), handlers.status_key);
    println!("✓ Bucket: {}", policy.bucket());
    println!("✓ Region: {}", handlers.region);
    println!(
        "✓ Uploads: {} (URLs valid {}s)",
        policy.allowed_extensions().join(", "),
        policy.expiry_secs()
    );
    println!();

    let sdk_config = handlers.sdk_config().await;

    // DynamoDB table
    print!("Testing DynamoDB table... ");
    let dynamodb = create_dynamodb_client(&sdk_config, handlers.dynamodb_endpoint.as_deref());
    match dynamodb
        .describe_table()
        .table_name(handlers.table())
        .send()
        .await
    {
        Ok(output) => {
            println!("✓ success");
            let keys: Vec<&str> = output
                .table()
                .map(|table| {
                    table
                        .key_schema()
                        .iter()
                        .map(|k| k.attribute_name())
                        .collect()
                })
                .unwrap_or_default();
            if !keys.is_empty() && !keys.contains(&handlers.status_key.as_str()) {
                println!(
                    "  ! Table keys are [{}], not '{}'",
                    keys.join(", "),
                    handlers.status_key
                );
                warn!(keys = ?keys, status_key = %handlers.status_key, "Key attribute mismatch");
            }
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", aws_sdk_dynamodb::error::DisplayErrorContext(&e));
            println!();
            println!("Please check:");
            println!("  - Your AWS credentials are configured correctly");
            println!("  - The table '{}' exists and is accessible", handlers.table());
            return ExitCode::FAILURE;
        }
    }

    // S3 bucket
    print!("Testing S3 bucket... ");
    let s3 = create_s3_client(&sdk_config, handlers.s3_endpoint.as_deref());
    match s3.head_bucket().bucket(policy.bucket()).send().await {
        Ok(_) => println!("✓ success"),
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", aws_sdk_s3::error::DisplayErrorContext(&e));
            println!();
            println!("Please check:");
            println!("  - Your AWS credentials are configured correctly");
            println!("  - The bucket '{}' exists and is accessible", policy.bucket());
            if handlers.s3_endpoint.is_some() {
                println!("  - The S3 endpoint is correct and reachable");
            }
            return ExitCode::FAILURE;
        }
    }

    // Signing only needs credentials, but fails early if there are none
    print!("Testing upload URL signing... ");
    let signer = S3UploadSigner::new(s3);
    match signer
        .presign_put(policy.bucket(), "check.jpg", policy.expiry())
        .await
    {
        Ok(_) => println!("✓ success"),
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Some(ref id) = config.test_id {
        println!();
        print!("Looking up '{}'... ", id);

        let store = DynamoStatusStore::new(dynamodb, handlers.table());
        let lookup = StatusLookup::new(Arc::new(store), &handlers.status_key);

        match lookup.lookup(Some(id)).await {
            Ok(record) => {
                println!("✓ found ({} fields)", record.len());
                for (name, value) in &record {
                    println!("  {}: {}", name, value);
                }
            }
            Err(e) => {
                println!("✗ {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("═══════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
