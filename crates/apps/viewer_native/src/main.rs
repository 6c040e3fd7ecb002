use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use viewer_native::{ViewerConfig, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries the HUD; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ViewerConfig::parse();
    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("terrain viewer failed: {err}");
            ExitCode::FAILURE
        }
    }
}
