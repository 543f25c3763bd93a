//! Shell-based launcher for generated docker commands.

use std::process::Command;

use navy_common::config::NavyConfig;
use navy_core::launcher::ProcessLauncher;

/// Runs container commands as `<program> <tokens...>` through `sh -c`.
///
/// Tokens are joined with single spaces and handed to the shell unchanged,
/// so quoting inside a token (such as `-e="K=V"`) is interpreted by the
/// shell.
#[derive(Debug, Clone)]
pub struct DockerLauncher {
    program: String,
}

impl DockerLauncher {
    /// Creates a launcher for the docker program configured in `config`.
    #[must_use]
    pub fn new(config: &NavyConfig) -> Self {
        Self::with_program(&config.docker_program)
    }

    /// Creates a launcher invoking `program`.
    ///
    /// The program is resolved on `PATH` when possible; otherwise the name
    /// is left for the shell to resolve.
    #[must_use]
    pub fn with_program(program: &str) -> Self {
        let program = match which::which(program) {
            Ok(path) => path.display().to_string(),
            Err(e) => {
                tracing::debug!(%program, error = %e, "program not found on PATH");
                program.to_string()
            }
        };
        Self { program }
    }

    /// The program commands are prefixed with.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The shell line `command` runs as.
    #[must_use]
    pub fn command_line(&self, command: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(command.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ProcessLauncher for DockerLauncher {
    fn launch(&self, command: &[String]) -> bool {
        let line = self.command_line(command);
        tracing::info!(command = %line, "launching");

        let output = match Command::new("sh").arg("-c").arg(&line).output() {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(command = %line, error = %e, "failed to spawn shell");
                return false;
            }
        };

        if output.status.success() {
            tracing::debug!(command = %line, "launch succeeded");
            true
        } else {
            tracing::error!(
                command = %line,
                code = output.status.code().unwrap_or(-1),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "launch failed"
            );
            false
        }
    }
}
