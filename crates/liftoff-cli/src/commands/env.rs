use liftoff_core::{DeployConfig, parse_env_file};
use std::path::Path;

/// List parsed env keys without revealing their values.
pub async fn env() -> anyhow::Result<()> {
    let project_dir = Path::new(".");
    let config = DeployConfig::load(project_dir)?;
    let env_path = config.env_file_path(project_dir);

    let env = parse_env_file(&env_path)?;
    if env.is_empty() {
        anyhow::bail!("no environment variables found in {}", env_path.display());
    }

    for (key, value) in env.iter() {
        println!("{key}={}", mask_value(value));
    }

    super::warn_missing_keys(&mut std::io::stdout(), &env, &config)?;
    Ok(())
}

/// Describe a value by its length only.
fn mask_value(value: &str) -> String {
    match value.chars().count() {
        0 => "(empty)".to_owned(),
        n => format!("*** ({n} chars)"),
    }
}
