//! Monitor-against-service integration tests.
//!
//! Runs the compute service on a real socket and drives the monitor's
//! HTTP metrics source and poll loop against it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use surge_api::build_router;
use surge_metrics::RequestLog;
use surge_monitor::{
    BoxFuture, HttpMetricsSource, InstanceLauncher, MetricsSource, MigrationMonitor,
};

struct CountingLauncher {
    calls: Arc<AtomicUsize>,
}

impl InstanceLauncher for CountingLauncher {
    fn launch(&self) -> BoxFuture<anyhow::Result<()>> {
        let calls = self.calls.clone();
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Serve the router on an ephemeral port; returns the bound address.
async fn spawn_service(log: Arc<RequestLog>) -> std::net::SocketAddr {
    let router = build_router(log);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn source_fetches_rpm_over_http() {
    let log = Arc::new(RequestLog::default());
    let addr = spawn_service(log.clone()).await;

    log.record().await;
    log.record().await;

    let source = HttpMetricsSource::new(addr.to_string(), "/metrics", Duration::from_secs(5));
    let rpm = source.fetch_rpm().await.unwrap();
    assert_eq!(rpm, 2);
}

#[tokio::test]
async fn monitor_triggers_once_against_live_service() {
    let log = Arc::new(RequestLog::default());
    let addr = spawn_service(log.clone()).await;

    // Push the rate above the threshold.
    for _ in 0..5 {
        log.record().await;
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let source = HttpMetricsSource::new(addr.to_string(), "/metrics", Duration::from_secs(5));
    let monitor = MigrationMonitor::new(
        Box::new(source),
        Box::new(CountingLauncher {
            calls: calls.clone(),
        }),
        3,
        Duration::from_millis(10),
    );

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    monitor.run(shutdown_rx).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn monitor_holds_below_threshold_against_live_service() {
    let log = Arc::new(RequestLog::default());
    let addr = spawn_service(log.clone()).await;

    log.record().await;

    let calls = Arc::new(AtomicUsize::new(0));
    let source = HttpMetricsSource::new(addr.to_string(), "/metrics", Duration::from_secs(5));
    let monitor = MigrationMonitor::new(
        Box::new(source),
        Box::new(CountingLauncher {
            calls: calls.clone(),
        }),
        100,
        Duration::from_millis(10),
    );

    // A few ticks, then shut the loop down ourselves.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn monitor_survives_unreachable_service() {
    // Nothing is listening here.
    let calls = Arc::new(AtomicUsize::new(0));
    let source = HttpMetricsSource::new("127.0.0.1:1", "/metrics", Duration::from_millis(200));
    let monitor = MigrationMonitor::new(
        Box::new(source),
        Box::new(CountingLauncher {
            calls: calls.clone(),
        }),
        100,
        Duration::from_millis(10),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
