//! surge-monitor — threshold-triggered migration.
//!
//! Polls the compute service's metrics endpoint on a fixed interval and
//! starts the burst instance exactly once when the request rate crosses
//! the configured threshold, then stops. Fetch failures are logged and
//! treated as "do not migrate"; the loop simply tries again next tick.
//!
//! ```text
//! MigrationMonitor
//!   ├── tick() ← fetch rpm, evaluate threshold, launch on Trigger
//!   └── run()  ← poll loop, exits after first trigger or shutdown
//!
//! Capabilities (injected)
//!   ├── MetricsSource   → HttpMetricsSource (GET /metrics)
//!   └── InstanceLauncher → AwsCliLauncher (aws ec2 start-instances)
//! ```

pub mod launcher;
pub mod monitor;
pub mod source;

pub use launcher::{AwsCliLauncher, InstanceLauncher};
pub use monitor::{MigrateDecision, MigrationMonitor, TickOutcome};
pub use source::{FetchError, HttpMetricsSource, MetricsSource};

/// Boxed future returned by the capability traits.
pub type BoxFuture<T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send>>;
