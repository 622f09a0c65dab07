//! One-time host installation step.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ConfigError, Result, RuntimeError};

/// Runs the configured setup command with the operator's terminal attached.
#[derive(Debug, Clone)]
pub struct SetupRunner {
    argv: Vec<String>,
}

impl SetupRunner {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Run to completion. A non-zero exit is a failure.
    pub async fn run(&self) -> Result<()> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| ConfigError::missing("setup.command"))?;

        debug!(%program, ?args, "running setup");
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(RuntimeError::Other(format!("setup exited with {status}")).into());
        }
        info!("setup completed");
        Ok(())
    }
}
