use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::process::{Command, Stdio};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Capture stdout/stderr instead of passing them through to the terminal.
    pub capture: bool,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            capture: false,
        }
    }

    pub fn captured(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Prefix the invocation with a privilege-escalation program such as `sudo`.
    ///
    /// An empty `elevate` leaves the invocation unchanged.
    pub fn elevated(self, elevate: &str) -> Self {
        if elevate.trim().is_empty() {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: elevate.to_string(),
            args,
            capture: self.capture,
        }
    }

    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs child processes: probes, package-manager calls and the compiler.
/// Calls block until the child exits.
pub trait CommandRunner {
    /// Run the invocation to completion.
    ///
    /// Returns `Err` only when the process could not be started; an
    /// `ErrorKind::NotFound` error means the program does not exist.
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        tracing::debug!(command = %invocation, capture = invocation.capture, "spawning");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);

        let output = if invocation.capture {
            let output = command.stdin(Stdio::null()).output()?;
            CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        } else {
            let status = command.status()?;
            CommandOutput {
                code: status.code(),
                ..CommandOutput::default()
            }
        };

        tracing::debug!(command = %invocation, code = ?output.code, "finished");
        Ok(output)
    }
}

/// A scripted runner that records every invocation.
///
/// Responses are matched by program name and consumed in order. A program
/// with no scripted response is reported as not found.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    responses: RefCell<Vec<(String, VecDeque<ScriptedResponse>)>>,
    calls: RefCell<Vec<Invocation>>,
}

#[derive(Debug, Clone)]
enum ScriptedResponse {
    Output(CommandOutput),
    NotFound,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an output for the next call to `program`.
    pub fn respond(self, program: &str, output: CommandOutput) -> Self {
        self.push(program, ScriptedResponse::Output(output));
        self
    }

    /// Queue a "no such program" failure for the next call to `program`.
    pub fn missing(self, program: &str) -> Self {
        self.push(program, ScriptedResponse::NotFound);
        self
    }

    fn push(&self, program: &str, response: ScriptedResponse) {
        let mut responses = self.responses.borrow_mut();
        match responses.iter_mut().find(|(name, _)| name == program) {
            Some((_, queue)) => queue.push_back(response),
            None => responses.push((program.to_string(), VecDeque::from([response]))),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());

        let response = self
            .responses
            .borrow_mut()
            .iter_mut()
            .find(|(name, _)| *name == invocation.program)
            .and_then(|(_, queue)| queue.pop_front());

        match response {
            Some(ScriptedResponse::Output(output)) => Ok(output),
            Some(ScriptedResponse::NotFound) | None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: command not found", invocation.program),
            )),
        }
    }
}
