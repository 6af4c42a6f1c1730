//! Metrics fetching.
//!
//! The production source issues a bounded-timeout HTTP GET against the
//! compute service's metrics endpoint over a raw http1 connection and
//! parses the `{"rpm": N}` body.

use std::time::Duration;

use http_body_util::BodyExt;
use thiserror::Error;
use tracing::debug;

use surge_core::types::MetricsResponse;

use crate::BoxFuture;

/// Errors from a single metrics fetch. All variants are treated the
/// same by the monitor: log, hold, retry next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("http handshake failed: {0}")]
    Handshake(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status: {0}")]
    Status(http::StatusCode),

    #[error("body read failed: {0}")]
    Body(String),

    #[error("malformed metrics body: {0}")]
    Parse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of the current request rate.
///
/// Injected into the monitor so tests can substitute a stub.
pub trait MetricsSource: Send + Sync {
    fn fetch_rpm(&self) -> BoxFuture<Result<u64, FetchError>>;
}

/// Fetches the request rate from the compute service over HTTP.
pub struct HttpMetricsSource {
    /// Compute service address (host:port).
    addr: String,
    /// Metrics endpoint path.
    endpoint: String,
    /// Bound on the whole fetch, connect included.
    timeout: Duration,
}

impl HttpMetricsSource {
    pub fn new(addr: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl MetricsSource for HttpMetricsSource {
    fn fetch_rpm(&self) -> BoxFuture<Result<u64, FetchError>> {
        let addr = self.addr.clone();
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        Box::pin(async move { fetch_once(&addr, &endpoint, timeout).await })
    }
}

/// Perform one GET against `http://{addr}{path}` and parse the rpm body.
async fn fetch_once(addr: &str, path: &str, timeout: Duration) -> Result<u64, FetchError> {
    let uri = format!("http://{addr}{path}");

    let fetch = async {
        let stream = tokio::net::TcpStream::connect(addr)
            .await
            .map_err(|e| FetchError::Connect(e.to_string()))?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| FetchError::Handshake(e.to_string()))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(&uri)
            .header("host", addr)
            .header("user-agent", "surge-monitor/0.1")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?
            .to_bytes();

        let metrics: MetricsResponse =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        debug!(rpm = metrics.rpm, %uri, "metrics fetched");
        Ok(metrics.rpm)
    };

    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}
