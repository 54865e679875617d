use crate::error::RunError;
use crate::executor::{CommandExecutor, CommandSpec, RealExecutor};
use crate::runner::CommandRunner;
use liftoff_core::CloudRunConfig;
use std::path::{Path, PathBuf};

/// Default gcloud executable, resolved through PATH.
const GCLOUD: &str = "gcloud";

/// GCP operations client, parameterized over the executor for testability.
pub struct GcloudClient<E: CommandExecutor = RealExecutor> {
    runner: CommandRunner<E>,
    program: String,
}

impl GcloudClient<RealExecutor> {
    pub fn new() -> Self {
        Self::with_executor(RealExecutor)
    }
}

impl Default for GcloudClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> GcloudClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            runner: CommandRunner::with_executor(executor),
            program: GCLOUD.to_owned(),
        }
    }

    /// Use a different gcloud executable (absolute path or PATH name).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, args: Vec<String>) -> CommandSpec {
        CommandSpec::new(self.program.as_str(), args)
    }

    // ── Cloud Build ──

    /// Upload `source_dir` and build `image_tag` in Cloud Build.
    ///
    /// Output streams to the terminal; the build can take minutes.
    pub async fn submit_build(
        &self,
        source_dir: &Path,
        project_id: &str,
        image_tag: &str,
    ) -> Result<(), CloudBuildError> {
        let source = source_dir
            .to_str()
            .ok_or_else(|| CloudBuildError::InvalidPath(source_dir.to_path_buf()))?;

        let cmd = self.command(args([
            "builds",
            "submit",
            "--tag",
            image_tag,
            "--project",
            project_id,
            source,
        ]));

        self.runner
            .run(&cmd, true, false)
            .await
            .map(|_| ())
            .map_err(|e| CloudBuildError::Submit { source: e })
    }

    // ── Cloud Run Deploy ──

    pub async fn deploy_service(
        &self,
        service_name: &str,
        image_tag: &str,
        project_id: &str,
        region: &str,
        config: &CloudRunConfig,
        env_vars_file: &Path,
    ) -> Result<(), DeployError> {
        let env_vars_file = env_vars_file
            .to_str()
            .ok_or_else(|| DeployError::InvalidPath(env_vars_file.to_path_buf()))?;

        let port = config.port.to_string();
        let timeout = config.timeout.to_string();
        let min = config.min_instances.to_string();
        let max = config.max_instances.to_string();

        let mut cmd = vec![
            "run",
            "deploy",
            service_name,
            "--image",
            image_tag,
            "--project",
            project_id,
            "--region",
            region,
            "--platform",
            "managed",
        ];

        if config.allow_unauthenticated {
            cmd.push("--allow-unauthenticated");
        } else {
            cmd.push("--no-allow-unauthenticated");
        }

        cmd.extend([
            "--port",
            port.as_str(),
            "--memory",
            config.memory.as_str(),
            "--timeout",
            timeout.as_str(),
            "--min-instances",
            min.as_str(),
            "--max-instances",
            max.as_str(),
            "--env-vars-file",
            env_vars_file,
        ]);

        let cmd_owned: Vec<String> = cmd.iter().map(|s| (*s).to_owned()).collect();

        self.runner
            .run(&self.command(cmd_owned), true, false)
            .await
            .map(|_| ())
            .map_err(|e| DeployError::Deploy { source: e })
    }

    /// Live URL of the service, or `None` when gcloud printed nothing.
    pub async fn service_url(
        &self,
        service_name: &str,
        project_id: &str,
        region: &str,
    ) -> Result<Option<String>, DeployError> {
        let cmd = self.command(args([
            "run",
            "services",
            "describe",
            service_name,
            "--project",
            project_id,
            "--region",
            region,
            "--format",
            "value(status.url)",
        ]));

        let output = self
            .runner
            .run(&cmd, true, true)
            .await
            .map_err(|e| DeployError::Describe { source: e })?;

        let url = output.stdout.trim();
        Ok((!url.is_empty()).then(|| url.to_owned()))
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum CloudBuildError {
    #[error("source path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("cloud build submission failed")]
    Submit { source: RunError },
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("env vars file path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("cloud run deployment failed")]
    Deploy { source: RunError },

    #[error("failed to describe cloud run service")]
    Describe { source: RunError },
}
