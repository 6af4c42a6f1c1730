//! Sliding-window request log.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

/// Default window width for the requests-per-minute count.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Records one epoch-second timestamp per served request and counts how
/// many fall inside the window ending now.
///
/// Appends and counts take the same mutex, so a count observes every
/// append that completed before it. Entries older than the window are
/// pruned on append; they can never affect a count, which only considers
/// in-window entries.
pub struct RequestLog {
    /// Timestamps in arrival order.
    timestamps: Mutex<Vec<u64>>,
    /// Window width for counts and pruning.
    window: Duration,
}

impl RequestLog {
    pub fn new(window: Duration) -> Self {
        Self {
            timestamps: Mutex::new(Vec::new()),
            window,
        }
    }

    /// Record a request at the current time.
    pub async fn record(&self) {
        self.record_at(epoch_secs()).await;
    }

    /// Record a request at an explicit timestamp (epoch seconds).
    pub async fn record_at(&self, ts: u64) {
        let window = self.window.as_secs();
        let mut timestamps = self.timestamps.lock().await;
        timestamps.retain(|&t| ts.saturating_sub(t) < window);
        timestamps.push(ts);
    }

    /// Requests recorded within the window ending at the current time.
    pub async fn rpm(&self) -> u64 {
        self.rpm_at(epoch_secs()).await
    }

    /// Requests recorded within the window ending at `now`.
    pub async fn rpm_at(&self, now: u64) -> u64 {
        let window = self.window.as_secs();
        let timestamps = self.timestamps.lock().await;
        timestamps
            .iter()
            .filter(|&&t| now.saturating_sub(t) < window)
            .count() as u64
    }

    /// Entries currently retained.
    pub async fn len(&self) -> usize {
        self.timestamps.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.timestamps.lock().await.is_empty()
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
