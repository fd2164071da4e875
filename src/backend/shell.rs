//! Shell backend - runs commands through `sh -c` with separate stdout/stderr capture

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use eyre::WrapErr;
use tokio::process::Command;

use super::{ShellBackend, ShellOutput};

/// Configuration for the system shell backend
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Shell program invoked with `-c <command>`
    pub program: String,
    /// Timeout in milliseconds (default: 120000)
    pub timeout_ms: u64,
    /// Working directory; inherits the agent's when unset
    pub working_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            timeout_ms: 120_000,
            working_dir: None,
        }
    }
}

impl ShellConfig {
    /// Set the timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Shell backend backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    config: ShellConfig,
}

impl SystemShell {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ShellBackend for SystemShell {
    async fn run(&self, command: &str) -> eyre::Result<ShellOutput> {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("-c").arg(command);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let child = cmd
            .spawn()
            .wrap_err_with(|| format!("Failed to spawn {}", self.config.program))?;

        let timeout = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output.wrap_err("Failed to collect command output")?;
                log::debug!("Shell command exited with {:?}: {}", output.status.code(), command);
                Ok(ShellOutput {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
            // kill_on_drop reaps the child once the timed-out future is dropped
            Err(_) => Ok(ShellOutput {
                success: false,
                stdout: String::new(),
                stderr: format!("Command timed out after {}ms", self.config.timeout_ms),
            }),
        }
    }
}
