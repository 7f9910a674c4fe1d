use crate::runner::{CommandRunner, Invocation};
use std::collections::BTreeMap;
use std::io;

/// Argument used to probe a command when no override is configured.
pub const DEFAULT_VERSION_ARG: &str = "--version";

/// The probe argument for `command`: its configured override, or `--version`.
pub fn version_arg<'a>(overrides: &'a BTreeMap<String, String>, command: &str) -> &'a str {
    overrides
        .get(command)
        .map(String::as_str)
        .unwrap_or(DEFAULT_VERSION_ARG)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The command ran and exited with status zero.
    Installed,
    /// The command ran but exited nonzero (or was killed, with no code).
    ExitedWithError(Option<i32>),
    /// The command could not be started.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: ProbeStatus,
    pub message: String,
}

impl ProbeResult {
    pub fn installed(&self) -> bool {
        self.status == ProbeStatus::Installed
    }
}

/// Run `command version_arg` and classify the result.
///
/// Never fails: a missing binary is reported as [`ProbeStatus::NotFound`].
pub fn probe(runner: &dyn CommandRunner, command: &str, version_arg: &str) -> ProbeResult {
    let invocation = Invocation::new(command, [version_arg]).captured();

    let result = match runner.run(&invocation) {
        Ok(output) if output.success() => {
            let first_line = output.stdout.lines().next().map(str::trim).unwrap_or("");
            let message = if first_line.is_empty() {
                format!("{command} is installed")
            } else {
                format!("{command} is installed: {first_line}")
            };
            ProbeResult {
                status: ProbeStatus::Installed,
                message,
            }
        }
        Ok(output) => ProbeResult {
            status: ProbeStatus::ExitedWithError(output.code),
            message: match output.code {
                Some(code) => format!("{command} is installed but returned error code {code}"),
                None => format!("{command} is installed but was terminated by a signal"),
            },
        },
        Err(error) => {
            if error.kind() != io::ErrorKind::NotFound {
                tracing::debug!(%command, %error, "probe could not start command");
            }
            ProbeResult {
                status: ProbeStatus::NotFound,
                message: format!("{command} is not installed"),
            }
        }
    };

    tracing::debug!(%command, %version_arg, status = ?result.status, "probe");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, RecordingRunner, SystemRunner};

    #[test]
    fn test_probe_nonexistent_binary() {
        let result = probe(&SystemRunner, "nonexistent-binary-xyz", DEFAULT_VERSION_ARG);
        assert!(!result.installed());
        assert_eq!(result.status, ProbeStatus::NotFound);
        assert_eq!(result.message, "nonexistent-binary-xyz is not installed");
    }

    #[test]
    fn test_probe_uses_first_stdout_line() {
        let runner = RecordingRunner::new().respond(
            "g++",
            CommandOutput::exited(0).with_stdout("g++ (GCC) 14.2.1\nCopyright (C) 2024\n"),
        );
        let result = probe(&runner, "g++", DEFAULT_VERSION_ARG);

        assert!(result.installed());
        assert_eq!(result.message, "g++ is installed: g++ (GCC) 14.2.1");
        assert_eq!(runner.calls()[0].argv(), ["g++", "--version"]);
    }

    #[test]
    fn test_probe_with_empty_output() {
        let runner = RecordingRunner::new().respond("smartctl", CommandOutput::exited(0));
        let result = probe(&runner, "smartctl", DEFAULT_VERSION_ARG);
        assert!(result.installed());
        assert_eq!(result.message, "smartctl is installed");
    }

    #[test]
    fn test_probe_nonzero_exit_is_not_installed() {
        let runner = RecordingRunner::new().respond("openssl", CommandOutput::exited(2));
        let result = probe(&runner, "openssl", "version");

        assert!(!result.installed());
        assert_eq!(result.status, ProbeStatus::ExitedWithError(Some(2)));
        assert_eq!(result.message, "openssl is installed but returned error code 2");
        assert_eq!(runner.calls()[0].argv(), ["openssl", "version"]);
    }

    #[test]
    fn test_probe_real_commands() {
        assert!(probe(&SystemRunner, "true", DEFAULT_VERSION_ARG).installed());

        let result = probe(&SystemRunner, "false", DEFAULT_VERSION_ARG);
        assert_eq!(result.status, ProbeStatus::ExitedWithError(Some(1)));
    }
}
