use std::process::{Command, Stdio};

use crate::video::domain::command_runner::{CommandLine, CommandRunner};

/// Runs commands as child processes of the current process, blocking
/// until they exit.
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(line: &CommandLine) -> Command {
        let mut command = Command::new(line.program());
        command.args(line.arguments());
        command
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, line: &CommandLine) -> Result<i32, Box<dyn std::error::Error>> {
        log::debug!("Running: {line}");
        let status = Self::command(line)
            .status()
            .map_err(|e| format!("failed to start `{}`: {e}", line.program().to_string_lossy()))?;
        Ok(status.code().unwrap_or(-1))
    }

    fn probe(&self, line: &CommandLine) -> bool {
        Self::command(line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_reports_exit_code() {
        let runner = SystemCommandRunner::new();
        assert_eq!(runner.run(&CommandLine::new("true")).unwrap(), 0);
        assert_eq!(
            runner
                .run(&CommandLine::new("sh").args(["-c", "exit 3"]))
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_arguments_are_not_shell_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a b; touch injected");
        let runner = SystemCommandRunner::new();
        let code = runner
            .run(&CommandLine::new("touch").arg(target.as_os_str()))
            .unwrap();
        assert_eq!(code, 0);
        assert!(target.exists());
        assert!(!dir.path().join("injected").exists());
    }

    #[test]
    fn test_run_missing_program_is_error() {
        let runner = SystemCommandRunner::new();
        assert!(runner
            .run(&CommandLine::new("definitely-not-a-real-program-4711"))
            .is_err());
    }

    #[test]
    fn test_probe() {
        let runner = SystemCommandRunner::new();
        assert!(runner.probe(&CommandLine::new("true")));
        assert!(!runner.probe(&CommandLine::new("false")));
        assert!(!runner.probe(&CommandLine::new("definitely-not-a-real-program-4711")));
    }
}
