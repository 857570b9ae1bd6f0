//! RPC endpoint resolution
//!
//! Priority, highest first:
//! 1. `--rpc-url` on the command line
//! 2. `ETH_RPC_URL` environment variable (a `.env` file is honoured)
//! 3. `web3.provider` from the merged config

use crate::{Error, Result};

/// Environment variable overriding the configured provider
pub const ETH_RPC_URL_ENV: &str = "ETH_RPC_URL";

/// Pick the provider URL and check that it parses
pub fn resolve_provider(cli_override: Option<&str>, configured: &str) -> Result<url::Url> {
    let env_override = std::env::var(ETH_RPC_URL_ENV).ok();
    choose_provider(cli_override, env_override.as_deref(), configured)
}

fn choose_provider(
    cli_override: Option<&str>,
    env_override: Option<&str>,
    configured: &str,
) -> Result<url::Url> {
    let raw = if let Some(url) = cli_override {
        tracing::debug!("Using RPC URL from command line");
        url
    } else if let Some(url) = env_override {
        tracing::debug!("Using {} for provider", ETH_RPC_URL_ENV);
        url
    } else {
        configured
    };

    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid provider URL {}: {}", raw, e)))
}
