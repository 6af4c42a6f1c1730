//! Wire types for the compute service HTTP surface.
//!
//! These are the JSON bodies shared between the API handlers and the
//! monitor's metrics client. The shapes are part of the external
//! interface and must stay stable.

use serde::{Deserialize, Serialize};

/// `POST /compute` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub number: f64,
}

/// `POST /compute` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub result: f64,
}

/// `GET /metrics` response body.
///
/// `rpm` is the count of requests served in the sliding sixty-second
/// window ending at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub rpm: u64,
}

/// JSON error body returned for client errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
