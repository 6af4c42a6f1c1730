//! Instance launch capability.
//!
//! The scale-up action is an opaque external command. It is modelled as
//! a trait so the monitor can be exercised against a stub; the
//! production implementation shells out to the AWS CLI.

use anyhow::Context;
use tokio::process::Command;
use tracing::info;

use crate::BoxFuture;

/// Starts the burst instance.
///
/// Injected into the monitor so tests can substitute a stub.
pub trait InstanceLauncher: Send + Sync {
    fn launch(&self) -> BoxFuture<anyhow::Result<()>>;
}

/// Launches a named EC2 instance through the AWS CLI.
pub struct AwsCliLauncher {
    instance_id: String,
    region: String,
}

impl AwsCliLauncher {
    pub fn new(instance_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            region: region.into(),
        }
    }

    /// Arguments passed to `aws`.
    fn command_args(&self) -> Vec<String> {
        vec![
            "ec2".to_string(),
            "start-instances".to_string(),
            "--instance-ids".to_string(),
            self.instance_id.clone(),
            "--region".to_string(),
            self.region.clone(),
        ]
    }
}

impl InstanceLauncher for AwsCliLauncher {
    fn launch(&self) -> BoxFuture<anyhow::Result<()>> {
        let args = self.command_args();
        let instance_id = self.instance_id.clone();
        let region = self.region.clone();

        Box::pin(async move {
            info!(%instance_id, %region, "starting burst instance");

            let status = Command::new("aws")
                .args(&args)
                .status()
                .await
                .context("failed to spawn aws cli")?;

            if !status.success() {
                anyhow::bail!("aws ec2 start-instances exited with {status}");
            }

            info!(%instance_id, "burst instance start requested");
            Ok(())
        })
    }
}
