pub mod client;
pub mod error;
pub mod executor;
pub mod runner;

pub use client::{CloudBuildError, DeployError, GcloudClient};
pub use error::{ExecError, RunError};
pub use executor::{CommandExecutor, CommandOutput, CommandSpec, RealExecutor};
pub use runner::CommandRunner;
