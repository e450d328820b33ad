use std::ffi::{OsStr, OsString};
use std::fmt;

/// An external program invocation: a program name plus an argument vector.
///
/// Arguments are passed to the program verbatim and never go through a
/// shell. `Display` renders a shell-quoted line for diagnostics only, so
/// users can copy it into a terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(value: &OsStr) -> String {
    let text = value.to_string_lossy();
    let safe = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:%=+,@".contains(c));
    if safe {
        text.into_owned()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}

/// Runs external programs synchronously.
pub trait CommandRunner: Send {
    /// Runs the command to completion with inherited stdio and returns its
    /// exit code. A process killed by a signal reports `-1`. Failing to
    /// spawn the program is an `Err`.
    fn run(&self, command: &CommandLine) -> Result<i32, Box<dyn std::error::Error>>;

    /// Runs the command with its output discarded and reports whether it
    /// exited with status zero.
    fn probe(&self, command: &CommandLine) -> bool {
        matches!(self.run(command), Ok(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_arguments() {
        let cmd = CommandLine::new("ffmpeg").arg("-y").args(["-i", "in.mp4"]);
        assert_eq!(cmd.program(), "ffmpeg");
        assert_eq!(cmd.arguments().len(), 3);
        assert_eq!(cmd.arguments()[2], "in.mp4");
    }

    #[test]
    fn test_display_leaves_plain_arguments_unquoted() {
        let cmd = CommandLine::new("ffmpeg").args(["-y", "-i", "/tmp/frames/%012d.jpg"]);
        assert_eq!(cmd.to_string(), "ffmpeg -y -i /tmp/frames/%012d.jpg");
    }

    #[test]
    fn test_display_quotes_spaces_and_quotes() {
        let cmd = CommandLine::new("ffmpeg").args(["my video.mp4", "it's.mp4", ""]);
        assert_eq!(
            cmd.to_string(),
            r"ffmpeg 'my video.mp4' 'it'\''s.mp4' ''"
        );
    }

    struct FixedRunner(i32);

    impl CommandRunner for FixedRunner {
        fn run(&self, _command: &CommandLine) -> Result<i32, Box<dyn std::error::Error>> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_default_probe_checks_exit_status() {
        let cmd = CommandLine::new("ffmpeg").arg("-version");
        assert!(FixedRunner(0).probe(&cmd));
        assert!(!FixedRunner(1).probe(&cmd));
    }
}
