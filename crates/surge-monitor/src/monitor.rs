//! The migration monitor loop.
//!
//! Polls once per interval, compares the fetched rate against the
//! threshold, and launches the burst instance on the first crossing.
//! One-shot: after a trigger the monitor exits and never re-arms.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::launcher::InstanceLauncher;
use crate::source::MetricsSource;

/// Decision for a single fetched rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateDecision {
    /// Load crossed the threshold; start the burst instance.
    Trigger,
    /// Stay put.
    Hold,
}

/// Outcome of one poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The launcher was invoked; the loop is done.
    Triggered,
    /// Rate at or below threshold.
    Held,
    /// Metrics fetch failed; treated as "do not migrate".
    FetchFailed,
}

/// Watches the compute service's request rate and performs the one-shot
/// scale-up when it crosses the threshold.
pub struct MigrationMonitor {
    source: Box<dyn MetricsSource>,
    launcher: Box<dyn InstanceLauncher>,
    rpm_threshold: u64,
    poll_interval: Duration,
}

impl MigrationMonitor {
    pub fn new(
        source: Box<dyn MetricsSource>,
        launcher: Box<dyn InstanceLauncher>,
        rpm_threshold: u64,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            launcher,
            rpm_threshold,
            poll_interval,
        }
    }

    /// Threshold rule: migrate only when the rate is strictly above the
    /// threshold.
    pub fn evaluate(&self, rpm: u64) -> MigrateDecision {
        if rpm > self.rpm_threshold {
            MigrateDecision::Trigger
        } else {
            MigrateDecision::Hold
        }
    }

    /// One poll tick: fetch the rate, evaluate, launch on `Trigger`.
    ///
    /// Fetch failures are swallowed into `TickOutcome::FetchFailed`; a
    /// launcher failure is the only error this returns.
    pub async fn tick(&self) -> anyhow::Result<TickOutcome> {
        let rpm = match self.source.fetch_rpm().await {
            Ok(rpm) => rpm,
            Err(e) => {
                warn!(error = %e, "metrics fetch failed; holding");
                return Ok(TickOutcome::FetchFailed);
            }
        };

        debug!(rpm, threshold = self.rpm_threshold, "polled request rate");

        match self.evaluate(rpm) {
            MigrateDecision::Hold => Ok(TickOutcome::Held),
            MigrateDecision::Trigger => {
                info!(
                    rpm,
                    threshold = self.rpm_threshold,
                    "threshold crossed; starting burst instance"
                );
                self.launcher.launch().await?;
                Ok(TickOutcome::Triggered)
            }
        }
    }

    /// Run until the first trigger or shutdown.
    ///
    /// Polls immediately on start, then once per interval. A launcher
    /// failure is surfaced to the caller; the loop still terminates
    /// without re-arming either way.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            threshold = self.rpm_threshold,
            "migration monitor started"
        );

        loop {
            match self.tick().await {
                Ok(TickOutcome::Triggered) => {
                    info!("migration triggered; monitor exiting");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "burst instance launch failed; monitor exiting");
                    return Err(e);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => {
                    info!("migration monitor shutting down");
                    return Ok(());
                }
            }
        }
    }
}
