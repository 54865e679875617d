use crate::error::RunError;
use crate::executor::{CommandExecutor, CommandOutput, CommandSpec, RealExecutor};

/// Message used when a failed command printed nothing at all.
const GENERIC_FAILURE: &str = "Command failed.";

/// Runs commands and turns non-zero exits into halting errors on request.
pub struct CommandRunner<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl CommandRunner<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for CommandRunner<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> CommandRunner<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Run `command` to completion.
    ///
    /// With `check`, a non-zero exit becomes [`RunError::Failed`] carrying the
    /// child's code and its best diagnostic; the caller is expected to stop
    /// and exit with [`RunError::exit_code`]. Without `check`, the failing
    /// output is returned as-is. A missing executable is always an error.
    pub async fn run(
        &self,
        command: &CommandSpec,
        check: bool,
        capture: bool,
    ) -> Result<CommandOutput, RunError> {
        tracing::debug!(%command, check, capture, "running command");

        let output = self.executor.execute(command, capture).await?;

        if !output.success() {
            tracing::debug!(%command, code = output.code, "command exited with failure");
            if check {
                return Err(RunError::Failed {
                    command: command.to_string(),
                    code: output.code,
                    diagnostic: diagnostic(&output).to_owned(),
                });
            }
        }

        Ok(output)
    }
}

/// Most informative text for a failed command: stderr, else stdout, else
/// a generic message.
fn diagnostic(output: &CommandOutput) -> &str {
    [output.stderr.trim_end(), output.stdout.trim_end()]
        .into_iter()
        .find(|text| !text.trim().is_empty())
        .unwrap_or(GENERIC_FAILURE)
}
