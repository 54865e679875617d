mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "liftoff",
    about = "Build on Cloud Build and deploy to Cloud Run from a local env file"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the image, deploy it to Cloud Run, and print the service URL (default)
    Deploy,
    /// Print the URL of the deployed Cloud Run service
    Url,
    /// List the variables parsed from the env file, values masked
    Env,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Deploy) {
        Commands::Deploy => commands::deploy().await,
        Commands::Url => commands::url().await,
        Commands::Env => commands::env().await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(diagnostic) = commands::diagnostic(&err) {
                eprintln!("{diagnostic}");
            }
            eprintln!("Error: {err:#}");
            ExitCode::from(commands::exit_code(&err))
        }
    }
}
