//! Router configuration for pic-gateway.
//!
//! # Route Structure
//!
//! ```text
//! /health        - Health check
//! /status        - Status lookup
//! /cat_status    - Status lookup (legacy path)
//! /upload        - Upload authorization
//! /s3_upload     - Upload authorization (legacy path)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pic_gateway::server::{create_router, AppState, RouterConfig};
//!
//! let state = AppState::new(status_lookup, upload_authorizer);
//! let router = create_router(state, RouterConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, status_handler, upload_handler, AppState};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Whether to also mount the legacy `/cat_status` and `/s3_upload` paths
    pub legacy_routes: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enable_tracing: true,
            legacy_routes: true,
        }
    }
}

impl RouterConfig {
    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Enable or disable the legacy route aliases.
    pub fn with_legacy_routes(mut self, enabled: bool) -> Self {
        self.legacy_routes = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/upload", get(upload_handler));

    if config.legacy_routes {
        router = router
            .route("/cat_status", get(status_handler))
            .route("/s3_upload", get(upload_handler));
    }

    let router = router.with_state(state);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
