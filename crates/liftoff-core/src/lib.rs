//! Core types and configuration for liftoff.
//!
//! This crate defines the `liftoff.toml` schema ([`DeployConfig`]),
//! the dotenv-style env file parser ([`EnvMapping`]), the scoped
//! `--env-vars-file` YAML file ([`EnvVarsFile`]), and shared error types.

pub mod config;
pub mod envfile;
pub mod error;

pub use config::{
    BuildConfig, CloudRunConfig, DeployConfig, EnvConfig, GcloudConfig, ProjectConfig,
};
pub use envfile::{EnvMapping, EnvVarsFile, parse_env_file};
pub use error::{Error, Result};
