//! Compute service handlers.
//!
//! `/compute` records a timestamp per served request; `/metrics` reads
//! the rolling count back out. Invalid input is rejected before the
//! timestamp is recorded.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::debug;

use surge_core::types::{ComputeResponse, ErrorResponse, MetricsResponse};

use crate::ApiState;

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
}

/// POST /compute
pub async fn compute(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let number = match body.get("number").and_then(serde_json::Value::as_f64) {
        Some(n) => n,
        None => {
            return error_response("missing or non-numeric \"number\"", StatusCode::BAD_REQUEST)
                .into_response();
        }
    };

    state.log.record().await;
    debug!(number, "compute request served");

    Json(ComputeResponse {
        result: number * number,
    })
    .into_response()
}

/// GET /metrics
pub async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    Json(MetricsResponse {
        rpm: state.log.rpm().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use surge_metrics::RequestLog;

    fn test_state() -> ApiState {
        ApiState {
            log: Arc::new(RequestLog::default()),
        }
    }

    #[tokio::test]
    async fn compute_valid_number_is_ok() {
        let state = test_state();
        let resp = compute(State(state.clone()), Json(json!({"number": 4.0}))).await;
        let resp = resp.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.log.len().await, 1);
    }

    #[tokio::test]
    async fn compute_missing_number_is_rejected() {
        let state = test_state();
        let resp = compute(State(state.clone()), Json(json!({}))).await;
        let resp = resp.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        // No timestamp recorded on the failure path.
        assert!(state.log.is_empty().await);
    }

    #[tokio::test]
    async fn compute_non_numeric_number_is_rejected() {
        let state = test_state();

        for bad in [json!({"number": "five"}), json!({"number": true}), json!({"number": null})] {
            let resp = compute(State(state.clone()), Json(bad)).await;
            let resp = resp.into_response();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
        assert!(state.log.is_empty().await);
    }

    #[tokio::test]
    async fn compute_integer_number_is_accepted() {
        let state = test_state();
        let resp = compute(State(state.clone()), Json(json!({"number": 12}))).await;
        let resp = resp.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.log.len().await, 1);
    }

    #[tokio::test]
    async fn metrics_empty_log_is_zero() {
        let state = test_state();
        let resp = metrics(State(state)).await;
        let resp = resp.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_reflects_recorded_requests() {
        let state = test_state();
        state.log.record().await;
        state.log.record().await;

        let resp = metrics(State(state)).await;
        let resp = resp.into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: MetricsResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.rpm, 2);
    }
}
