use liftoff_cloud::{CommandExecutor, GcloudClient};
use liftoff_core::{DeployConfig, EnvVarsFile, parse_env_file};
use std::io::Write;
use std::path::Path;

/// Where the deployed service can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Endpoint {
    /// URL reported by Cloud Run after the deploy.
    Live(String),
    /// Cloud Run reported nothing; the configured URL is shown unconfirmed.
    Expected(String),
}

impl Endpoint {
    pub(crate) fn url(&self) -> &str {
        match self {
            Self::Live(url) | Self::Expected(url) => url,
        }
    }
}

/// Run the deploy pipeline: load env → build → deploy → describe.
///
/// The rendered env vars file lives in `temp_dir` for the duration of the
/// build, deploy and describe steps and is removed on every exit path,
/// including when this future is dropped before completion.
pub(crate) async fn run<E: CommandExecutor>(
    client: &GcloudClient<E>,
    config: &DeployConfig,
    project_dir: &Path,
    temp_dir: &Path,
    out: &mut impl Write,
) -> anyhow::Result<Endpoint> {
    let project = &config.project;
    let env_path = config.env_file_path(project_dir);

    writeln!(out, "Project: {}", project.gcp_project_id)?;
    writeln!(out, "Target URL: {}", project.expected_url)?;
    writeln!(out, "Reading env from {}...", config.env.file.display())?;

    let env = parse_env_file(&env_path)?;
    if env.is_empty() {
        anyhow::bail!("no environment variables found in {}", env_path.display());
    }

    super::warn_missing_keys(out, &env, config)?;

    let env_file = EnvVarsFile::create_in(&env, temp_dir)?;
    let image_tag = config.image_tag();

    // Build
    writeln!(
        out,
        "\n[1/3] Building image in Google Cloud Build (this may take a few minutes)..."
    )?;
    out.flush()?;
    client
        .submit_build(
            &config.source_dir(project_dir),
            &project.gcp_project_id,
            &image_tag,
        )
        .await?;

    // Deploy
    writeln!(out, "\n[2/3] Deploying to Cloud Run...")?;
    out.flush()?;
    client
        .deploy_service(
            &project.service_name,
            &image_tag,
            &project.gcp_project_id,
            &project.region,
            &config.cloud_run,
            env_file.path(),
        )
        .await?;

    // Describe
    writeln!(out, "\n[3/3] Service URL:")?;
    out.flush()?;
    let endpoint = match client
        .service_url(&project.service_name, &project.gcp_project_id, &project.region)
        .await?
    {
        Some(url) => {
            writeln!(out, "  {url}")?;
            writeln!(out, "\nDeployment successful.")?;
            Endpoint::Live(url)
        }
        None => {
            writeln!(out, "  {}", project.expected_url)?;
            writeln!(
                out,
                "\nDeployment finished. Verify the service in the Cloud Run console."
            )?;
            Endpoint::Expected(project.expected_url.clone())
        }
    };

    env_file.close()?;
    Ok(endpoint)
}
