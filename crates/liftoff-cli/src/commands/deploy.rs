use super::pipeline;
use anyhow::Context;
use liftoff_core::DeployConfig;
use std::path::PathBuf;

/// The deploy was cancelled with Ctrl-C.
#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Execute the full deploy pipeline.
///
/// Ctrl-C drops the in-flight pipeline, which kills the running gcloud
/// process and removes the rendered env vars file before exiting.
pub async fn deploy() -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let config = DeployConfig::load(&project_dir)?;
    let client = super::gcloud_client(&config);
    let temp_dir = std::env::temp_dir();
    let mut stdout = std::io::stdout();

    tokio::select! {
        result = pipeline::run(&client, &config, &project_dir, &temp_dir, &mut stdout) => {
            let endpoint = result?;
            tracing::debug!(url = endpoint.url(), "deploy finished");
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            Err(Interrupted.into())
        }
    }
}
