//! Startup credential bootstrap for both venues.
//!
//! Kalshi's client is self-contained: `KalshiClient::production()`/`demo()`
//! read the RSA key pair straight from the environment. Polymarket's signed
//! trading path needs a wallet, an EIP-712 signer bound to it, and L2
//! HMAC credentials assembled from three more environment variables — there
//! is no single constructor for that chain, so this module is the one place
//! that does it.

use std::sync::Arc;

use algo_trade_core::AppConfig;
use algo_trade_kalshi::KalshiClient;
use algo_trade_polymarket::arbitrage::{ApiCredentials, Wallet, WalletConfig, WalletSigner};
use algo_trade_polymarket::PolymarketClient;
use anyhow::{Context, Result};

/// Builds the Kalshi REST client. Always demo when `config.dry_run`, so a
/// dry run never touches production credentials even if they happen to be
/// present in the environment.
pub fn kalshi_client(config: &AppConfig) -> Result<KalshiClient> {
    let client = if config.dry_run {
        KalshiClient::demo()
    } else {
        KalshiClient::production()
    }
    .context("constructing kalshi client")?
    .with_base_url(config.kalshi.base_url.clone());
    Ok(client)
}

/// Builds the Polymarket REST client. In a dry run, trading credentials are
/// skipped entirely — the client stays read-only, which matches there being
/// nothing to sign in dry-run mode.
pub fn polymarket_client(config: &AppConfig) -> Result<PolymarketClient> {
    let client = PolymarketClient::new().with_base_url(config.polymarket.base_url.clone());
    if config.dry_run {
        return Ok(client);
    }

    let wallet = Wallet::from_env(WalletConfig::mainnet())
        .context("loading polymarket signer private key from environment")?;
    let signer = Arc::new(WalletSigner::mainnet(Arc::new(wallet)));
    let creds = polymarket_api_credentials()?;
    Ok(client.with_trading(signer, &creds))
}

fn polymarket_api_credentials() -> Result<ApiCredentials> {
    let api_key = std::env::var("POLYMARKET_API_KEY")
        .context("POLYMARKET_API_KEY not set")?;
    let secret = std::env::var("POLYMARKET_API_SECRET")
        .context("POLYMARKET_API_SECRET not set")?;
    let passphrase = std::env::var("POLYMARKET_API_PASSPHRASE")
        .context("POLYMARKET_API_PASSPHRASE not set")?;
    Ok(ApiCredentials {
        api_key,
        secret,
        passphrase,
    })
}
