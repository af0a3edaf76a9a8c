//! Screen lock via an external command

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{HostError, HostResult, ScreenLock};

/// Locks the screen by running a configured command
/// (e.g. `loginctl lock-sessions` or `swaylock -f`).
pub struct CommandLock {
    program: String,
    args: Vec<String>,
}

impl CommandLock {
    /// Build from a whitespace-separated command line.
    /// Returns None for an empty command.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl ScreenLock for CommandLock {
    async fn lock(&self) -> HostResult<()> {
        debug!(program = %self.program, "Running screen lock command");

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .await?;

        if !status.success() {
            return Err(HostError::LockFailed(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        info!(program = %self.program, "Screen locked");
        Ok(())
    }
}
