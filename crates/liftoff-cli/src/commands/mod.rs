mod deploy;
mod env;
mod pipeline;
mod url;

use liftoff_cloud::{GcloudClient, RunError};
use liftoff_core::{DeployConfig, EnvMapping};
use std::io::Write;

use deploy::Interrupted;

pub use deploy::deploy;
pub use env::env;
pub use url::url;

/// Exit code conventionally used after SIGINT.
const INTERRUPTED_EXIT_CODE: u8 = 130;

pub(crate) fn gcloud_client(config: &DeployConfig) -> GcloudClient {
    GcloudClient::new().with_program(config.gcloud.bin.as_str())
}

/// Required keys that are absent or empty in `env`.
pub(crate) fn missing_required_keys<'a>(env: &EnvMapping, required: &'a [String]) -> Vec<&'a str> {
    required
        .iter()
        .filter(|key| !env.is_set(key))
        .map(String::as_str)
        .collect()
}

/// Print a warning for each missing required key. Missing keys never stop
/// a deploy; the service fails at request time instead.
pub(crate) fn warn_missing_keys(
    out: &mut impl Write,
    env: &EnvMapping,
    config: &DeployConfig,
) -> std::io::Result<()> {
    for key in missing_required_keys(env, &config.env.required_keys) {
        tracing::warn!(key, "required env var missing");
        writeln!(
            out,
            "Warning: {key} not set in {}. Requests that need it will fail until it is set.",
            config.env.file.display()
        )?;
    }
    Ok(())
}

/// Process exit code for a failed command.
///
/// A failing external command passes its own code through; an interrupt is
/// 130; every other failure is 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(run) = cause.downcast_ref::<RunError>() {
            return run.exit_code();
        }
        if cause.is::<Interrupted>() {
            return INTERRUPTED_EXIT_CODE;
        }
    }
    1
}

/// Output of the failing external command, if the error came from one.
pub fn diagnostic(err: &anyhow::Error) -> Option<&str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<RunError>())
        .and_then(RunError::diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftoff_cloud::{CloudBuildError, ExecError};

    fn failed(code: i32) -> RunError {
        RunError::Failed {
            command: "gcloud builds submit".to_owned(),
            code,
            diagnostic: "ERROR: build failed".to_owned(),
        }
    }

    #[test]
    fn exit_code_walks_to_run_error() {
        let err = anyhow::Error::new(CloudBuildError::Submit { source: failed(3) });
        assert_eq!(exit_code(&err), 3);
        assert_eq!(diagnostic(&err), Some("ERROR: build failed"));
    }

    #[test]
    fn exit_code_survives_context() {
        let err = anyhow::Error::new(failed(42)).context("while deploying");
        assert_eq!(exit_code(&err), 42);
    }

    #[test]
    fn exit_code_missing_executable_is_one() {
        let err = anyhow::Error::new(RunError::from(ExecError::NotFound {
            program: "gcloud".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }));
        assert_eq!(exit_code(&err), 1);
        assert!(diagnostic(&err).is_none());
    }

    #[test]
    fn exit_code_interrupted() {
        let err = anyhow::Error::new(Interrupted);
        assert_eq!(exit_code(&err), 130);
    }

    #[test]
    fn exit_code_other_errors_are_one() {
        let err = anyhow::anyhow!("no environment variables found in .env.local");
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn missing_required_keys_reports_absent_and_empty() {
        let env = EnvMapping::parse("PRESENT=x\nEMPTY=\n");
        let required = vec![
            "PRESENT".to_owned(),
            "EMPTY".to_owned(),
            "ABSENT".to_owned(),
        ];

        assert_eq!(missing_required_keys(&env, &required), vec!["EMPTY", "ABSENT"]);
    }
}
