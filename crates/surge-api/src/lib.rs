//! surge-api — HTTP surface of the compute service.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/compute` | Square a number, recording the request |
//! | GET | `/metrics` | Rolling one-minute request count |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use surge_metrics::RequestLog;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub log: Arc<RequestLog>,
}

/// Build the compute service router.
pub fn build_router(log: Arc<RequestLog>) -> Router {
    let state = ApiState { log };

    Router::new()
        .route("/compute", post(handlers::compute))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}
