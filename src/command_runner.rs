//! Command execution boundary.
//!
//! All external tools go through a [`CommandRunner`]. Production code uses
//! [`SystemRunner`], which spawns real processes; tests substitute a runner that
//! records invocations and fakes their results, so every stage can be exercised
//! without touching the host OS.

use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{ProvisionError, Result};
use crate::tool_traits::ToolArgs;

/// Output from a tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Standard output (empty for interactive tools).
    pub stdout: String,
    /// Standard error (empty for interactive tools).
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the tool exited successfully (exit code 0).
    pub success: bool,
}

impl ToolOutput {
    /// Successful run with no output.
    pub fn ok() -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            ..Self::default()
        }
    }

    /// Failed run with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code: Some(code),
            success: false,
            ..Self::default()
        }
    }

    /// Check if the tool succeeded and return an error if not.
    pub fn ensure_success(&self, program: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            let code = self.exit_code.unwrap_or(-1);
            Err(ProvisionError::command(
                program,
                format!("exit code {}: {}", code, self.stderr.trim()),
            ))
        }
    }
}

/// Capability to run external tools.
///
/// `Err` means the tool could not be run at all (not found, spawn failure). A tool
/// that ran and exited non-zero is `Ok` with `success == false`; callers decide
/// whether that is fatal or worth a retry.
pub trait CommandRunner {
    fn run(&self, tool: &dyn ToolArgs) -> Result<ToolOutput>;
}

/// Run a tool and turn a non-zero exit into an error.
pub fn run_checked(runner: &dyn CommandRunner, tool: &dyn ToolArgs) -> Result<ToolOutput> {
    let output = runner.run(tool)?;
    output.ensure_success(tool.program())?;
    Ok(output)
}

/// Spawns real processes on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, tool: &dyn ToolArgs) -> Result<ToolOutput> {
        let program = tool.program();
        let cli_args = tool.to_cli_args();

        info!("run: {} args={:?}", program, cli_args);

        let mut cmd = Command::new(program);
        cmd.args(&cli_args);

        if tool.is_interactive() {
            // The tool owns the terminal until it exits
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| ProvisionError::command(program, format!("failed to spawn: {e}")))?;

            debug!("{} exited with {:?}", program, status.code());
            return Ok(ToolOutput {
                exit_code: status.code(),
                success: status.success(),
                ..ToolOutput::default()
            });
        }

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProvisionError::command(program, format!("failed to spawn: {e}")))?;

        let result = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };

        if result.success {
            debug!("{} executed successfully", program);
        } else {
            warn!(
                "{} failed with exit code {}",
                program,
                result.exit_code.unwrap_or(-1)
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_traits::{ChownArgs, SubstituteArgs};

    #[test]
    fn test_tool_output_ensure_success_ok() {
        assert!(ToolOutput::ok().ensure_success("sed").is_ok());
    }

    #[test]
    fn test_tool_output_ensure_success_err() {
        let output = ToolOutput::failed(4, "sed: can't read /nope: No such file\n");
        let err = output.ensure_success("sed").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sed"));
        assert!(msg.contains("exit code 4"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_signal_termination_reports_minus_one() {
        let output = ToolOutput {
            exit_code: None,
            success: false,
            ..ToolOutput::default()
        };
        assert!(output.ensure_success("reboot").unwrap_err().to_string().contains("-1"));
    }

    #[test]
    fn test_system_runner_runs_sed_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("keyboard");
        std::fs::write(&file, "XKBMODEL=\"pc105\"\nXKBLAYOUT=\"gb\"\n").unwrap();

        let args = SubstituteArgs::new(&file, "pc105", "pc104");
        run_checked(&SystemRunner, &args).unwrap();

        let contents = std::fs::read_to_string(&file).unwrap();
        assert!(contents.contains("XKBMODEL=\"pc104\""));
    }

    #[test]
    fn test_system_runner_reports_failure_without_error() {
        let args = ChownArgs::root("/this/path/does/not/exist/12345");
        let output = SystemRunner.run(&args).unwrap();
        assert!(!output.success);
        assert!(run_checked(&SystemRunner, &args).is_err());
    }
}
