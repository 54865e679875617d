use std::fmt;
use std::process::{ExitStatus, Stdio};

use crate::error::ExecError;

/// An external command: an argument vector, or a line handed to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    Argv { program: String, args: Vec<String> },
    Shell(String),
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Argv {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn shell(line: impl Into<String>) -> Self {
        Self::Shell(line.into())
    }

    /// Executable that will be spawned.
    pub fn program(&self) -> &str {
        match self {
            Self::Argv { program, .. } => program,
            Self::Shell(_) => SHELL,
        }
    }

    /// Arguments after the program name; empty for shell lines.
    pub fn args(&self) -> &[String] {
        match self {
            Self::Argv { args, .. } => args,
            Self::Shell(_) => &[],
        }
    }

    fn to_command(&self) -> tokio::process::Command {
        match self {
            Self::Argv { program, args } => {
                let mut cmd = tokio::process::Command::new(program);
                cmd.args(args);
                cmd
            }
            Self::Shell(line) => {
                let mut cmd = tokio::process::Command::new(SHELL);
                cmd.arg(SHELL_FLAG).arg(line);
                cmd
            }
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argv { program, args } => {
                f.write_str(program)?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Self::Shell(line) => f.write_str(line),
        }
    }
}

#[cfg(not(windows))]
const SHELL: &str = "sh";
#[cfg(not(windows))]
const SHELL_FLAG: &str = "-c";
#[cfg(windows)]
const SHELL: &str = "cmd";
#[cfg(windows)]
const SHELL_FLAG: &str = "/C";

/// Exit status and, when captured, the text a command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Abstraction over process execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
/// A non-zero exit is not an error at this level; it is reported in
/// [`CommandOutput::code`].
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` to completion. With `capture`, stdout and stderr are
    /// collected; otherwise they stream to the terminal and come back empty.
    async fn execute(&self, command: &CommandSpec, capture: bool)
    -> Result<CommandOutput, ExecError>;
}

/// Executor backed by `tokio::process`.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn execute(
        &self,
        command: &CommandSpec,
        capture: bool,
    ) -> Result<CommandOutput, ExecError> {
        let (stdout, stderr) = if capture {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };

        let mut cmd = command.to_command();
        cmd.stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            let program = command.program().to_owned();
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecError::NotFound { program, source: e }
            } else {
                ExecError::Spawn { program, source: e }
            }
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::Spawn {
                program: command.program().to_owned(),
                source: e,
            })?;

        Ok(CommandOutput {
            code: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
