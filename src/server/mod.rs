//! HTTP server layer for pic-gateway.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                           │
//! │        GET /status?pic_id=…       GET /upload?filename=…     │
//! │                                                              │
//! │  ┌─────────────────────────┐  ┌────────────────────────────┐ │
//! │  │        handlers         │  │          routes            │ │
//! │  │ (query → core handler)  │  │ (router, tracing layer)    │ │
//! │  └─────────────────────────┘  └────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{health_handler, status_handler, upload_handler, AppState};
pub use routes::{create_router, RouterConfig};
