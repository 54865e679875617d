use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the optional settings file looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "liftoff.toml";

/// liftoff.toml configuration
///
/// Every field has a default, so a project without `liftoff.toml` deploys
/// with the built-in settings. The value is never mutated after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub env: EnvConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub cloud_run: CloudRunConfig,
    #[serde(default)]
    pub gcloud: GcloudConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// GCP project ID
    #[serde(default = "default_project_id")]
    pub gcp_project_id: String,
    /// GCP region (defaults to us-central1)
    #[serde(default = "default_region")]
    pub region: String,
    /// Cloud Run service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Container image tag (defaults to gcr.io/<project>/<service>:latest)
    pub image: Option<String>,
    /// URL printed when the describe step returns nothing
    #[serde(default = "default_expected_url")]
    pub expected_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Dotenv-style file holding the service's environment variables
    #[serde(default = "default_env_file")]
    pub file: PathBuf,
    /// Keys that trigger a warning when missing or empty
    #[serde(default = "default_required_keys")]
    pub required_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Source directory uploaded to Cloud Build
    #[serde(default = "default_source")]
    pub source: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudRunConfig {
    /// Port the application listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Memory allocation
    #[serde(default = "default_memory")]
    pub memory: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    /// Minimum instances
    #[serde(default)]
    pub min_instances: u32,
    /// Maximum instances
    #[serde(default = "default_max_instances")]
    pub max_instances: u32,
    /// Pass --allow-unauthenticated
    #[serde(default = "default_allow_unauthenticated")]
    pub allow_unauthenticated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcloudConfig {
    /// gcloud executable, looked up on PATH unless it contains a separator
    #[serde(default = "default_gcloud_bin")]
    pub bin: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            gcp_project_id: default_project_id(),
            region: default_region(),
            service_name: default_service_name(),
            image: None,
            expected_url: default_expected_url(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            file: default_env_file(),
            required_keys: default_required_keys(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
        }
    }
}

impl Default for CloudRunConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            memory: default_memory(),
            timeout: default_timeout(),
            min_instances: 0,
            max_instances: default_max_instances(),
            allow_unauthenticated: default_allow_unauthenticated(),
        }
    }
}

impl Default for GcloudConfig {
    fn default() -> Self {
        Self {
            bin: default_gcloud_bin(),
        }
    }
}

impl DeployConfig {
    /// Load from liftoff.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path.clone(),
                source: e,
            })?;
            tracing::debug!(path = %config_path.display(), "loaded deploy config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Container image the build produces and the deploy consumes.
    pub fn image_tag(&self) -> String {
        match &self.project.image {
            Some(image) => image.clone(),
            None => format!(
                "gcr.io/{project}/{service}:latest",
                project = self.project.gcp_project_id,
                service = self.project.service_name,
            ),
        }
    }

    /// Env file path resolved against the project directory.
    pub fn env_file_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.env.file)
    }

    /// Build source directory resolved against the project directory.
    pub fn source_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.build.source)
    }
}

fn default_project_id() -> String {
    "limitless-ai-483404".to_owned()
}

fn default_region() -> String {
    "us-central1".to_owned()
}

fn default_service_name() -> String {
    "openwork".to_owned()
}

fn default_expected_url() -> String {
    "https://openwork-217388700222.us-central1.run.app".to_owned()
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env.local")
}

fn default_required_keys() -> Vec<String> {
    vec!["GEMINI_API_KEY".to_owned()]
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_port() -> u16 {
    8080
}

fn default_memory() -> String {
    "1Gi".to_owned()
}

fn default_timeout() -> u32 {
    300
}

fn default_max_instances() -> u32 {
    10
}

fn default_allow_unauthenticated() -> bool {
    true
}

fn default_gcloud_bin() -> String {
    "gcloud".to_owned()
}
