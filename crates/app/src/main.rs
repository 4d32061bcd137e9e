mod browse;
mod cli;
mod config;
mod http;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::browse::BrowseError;
use crate::cli::{Cli, Mode, TokenArgs};
use crate::config::{AppConfig, ConfigError};
use crate::http::HttpError;
use crate::wiring::WiringError;
use keja_infra::auth::{TokenError, TokenKeys};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("browse error: {0}")]
    Browse(#[from] BrowseError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    config::load_dotenv()?;
    let config = AppConfig::from_env()?;

    match cli.mode {
        Mode::Serve => serve(config).await,
        Mode::Browse => {
            tokio::select! {
                _ = shutdown_signal() => {
                    info!("shutdown signal received");
                    Ok(())
                }
                res = browse::run(&config, &cli.browse) => Ok(res?),
            }
        }
        Mode::Token => print_token(&config, &cli.token),
    }
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    let state = wiring::build_state(config).await?;
    let addr = state.config.http_addr;
    info!(%addr, backend = state.store.backend(), "http server starting");
    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
        res = http::serve(addr, state) => {
            res?;
        }
    }
    Ok(())
}

fn print_token(config: &AppConfig, args: &TokenArgs) -> Result<(), AppError> {
    let secret = config.token_secret.as_deref().ok_or_else(|| {
        AppError::InvalidCli("token mode requires KEJA_TOKEN_SECRET".to_string())
    })?;
    let token = TokenKeys::from_secret(secret).issue(&args.subject, &args.role, args.ttl_secs)?;
    info!(subject = %args.subject, role = %args.role, ttl_secs = args.ttl_secs, "issued token");
    println!("{token}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
}
