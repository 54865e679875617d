use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Config ──
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Env file ──
    #[error("failed to read env file {path}")]
    EnvFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("rendered env vars are not valid YAML")]
    EnvVarsRender { source: yaml_rust::ScanError },

    #[error("env var {key} would not reach Cloud Run as a string")]
    EnvVarsRetyped { key: String },

    #[error("failed to write env vars file in {dir}")]
    EnvVarsWrite {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove env vars file {path}")]
    EnvVarsRemove {
        path: PathBuf,
        source: std::io::Error,
    },
}
