use liftoff_core::DeployConfig;
use std::path::Path;

/// Print the live service URL, falling back to the configured one.
pub async fn url() -> anyhow::Result<()> {
    let config = DeployConfig::load(Path::new("."))?;
    let project = &config.project;

    let client = super::gcloud_client(&config);
    let url = client
        .service_url(&project.service_name, &project.gcp_project_id, &project.region)
        .await?;

    match url {
        Some(url) => println!("{url}"),
        None => {
            println!("{}", project.expected_url);
            eprintln!(
                "Cloud Run returned no URL for '{}'; showing the expected URL.",
                project.service_name
            );
        }
    }
    Ok(())
}
