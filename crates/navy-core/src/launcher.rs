//! Execution of generated container commands.

/// Runs one container command to completion.
///
/// Ordinary process failures are reported as `false`, never as a panic or
/// error. Implementations may log.
pub trait ProcessLauncher {
    /// Runs `command` synchronously and reports whether it succeeded.
    fn launch(&self, command: &[String]) -> bool;
}

impl<F> ProcessLauncher for F
where
    F: Fn(&[String]) -> bool,
{
    fn launch(&self, command: &[String]) -> bool {
        self(command)
    }
}
