//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::core::errors::ConfigureError;

/// Builder for a blocking subprocess call.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Execute the command and wait for completion. Stdin is empty.
    ///
    /// A program that cannot be started is a `CommandFailed`; the exit
    /// status is left to the caller.
    pub fn exec(&self) -> Result<Output, ConfigureError> {
        let child = self.build_command().spawn().map_err(|e| ConfigureError::CommandFailed {
            message: format!("failed to run `{}`: {}", self.program.display(), e),
            command: self.display_command(),
            stderr: String::new(),
        })?;

        child.wait_with_output().map_err(|e| {
            ConfigureError::io(format!("failed to wait for `{}`", self.display_command()), e)
        })
    }

    /// Execute and require a zero exit status.
    pub fn exec_and_check(&self, error_msg: &str) -> Result<Output, ConfigureError> {
        let output = self.exec()?;
        if !output.status.success() {
            return Err(self.failure(
                format!("{} (exit code {:?})", error_msg, output.status.code()),
                &output,
            ));
        }
        Ok(output)
    }

    /// Execute and require clean output.
    ///
    /// Any text on stderr is a failure, and so is empty stdout unless
    /// `empty_stdout_fine` is set.
    pub fn exec_strict(
        &self,
        error_msg: &str,
        empty_stdout_fine: bool,
    ) -> Result<Output, ConfigureError> {
        let output = self.exec()?;
        let stderr_empty = output.stderr.iter().all(u8::is_ascii_whitespace);
        let stdout_ok = empty_stdout_fine || !output.stdout.is_empty();

        if !output.status.success() || !stderr_empty || !stdout_ok {
            return Err(self.failure(error_msg.to_string(), &output));
        }
        Ok(output)
    }

    fn failure(&self, message: String, output: &Output) -> ConfigureError {
        ConfigureError::CommandFailed {
            message,
            command: self.display_command(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("gcc").args(["-E", "-xc++", "-", "-v"]);
        assert_eq!(pb.display_command(), "gcc -E -xc++ - -v");
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_stdin_is_empty() {
        let output = ProcessBuilder::new("cat").exec().unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_and_check_reports_exit_code() {
        let err = ProcessBuilder::new("sh")
            .args(["-c", "echo broken >&2; exit 3"])
            .exec_and_check("compiler probe failed")
            .unwrap_err();

        match err {
            ConfigureError::CommandFailed {
                message, stderr, ..
            } => {
                assert!(message.contains("compiler probe failed"));
                assert!(message.contains("Some(3)"));
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_strict_rejects_stderr_and_empty_stdout() {
        let noisy = ProcessBuilder::new("sh").args(["-c", "echo out; echo warn >&2"]);
        assert!(noisy.exec_strict("noisy", false).is_err());

        let silent = ProcessBuilder::new("true");
        assert!(silent.exec_strict("silent", false).is_err());
        assert!(silent.exec_strict("silent", true).is_ok());
    }

    #[test]
    fn test_spawn_failure_is_command_failed() {
        let err = ProcessBuilder::new("/definitely/not/a/real/binary")
            .arg("-v")
            .exec()
            .unwrap_err();
        match err {
            ConfigureError::CommandFailed {
                message, command, ..
            } => {
                assert!(message.contains("failed to run `/definitely/not/a/real/binary`"));
                assert_eq!(command, "/definitely/not/a/real/binary -v");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
