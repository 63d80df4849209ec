use std::process::ExitCode;

use oauthgate_server::config::ServerConfig;
use oauthgate_server::error::StartupError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(report) = run().await {
        tracing::error!("{report}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run() -> oauthgate_core::Result<(), StartupError> {
    let config = ServerConfig::load().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!("Loaded configuration");

    oauthgate_server::serve(config).await
}
