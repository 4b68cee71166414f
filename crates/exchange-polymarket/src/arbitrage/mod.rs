//! Onchain-venue plumbing: L2 book types, CLOB authentication, and
//! EIP-712 order signing for Polymarket's CTF Exchange.
//!
//! Cross-venue concerns (scanning, guards, two-phase execution, position
//! tracking, reconciliation) live in the `arbitrage-cross` crate, which
//! consumes this module's types and the [`crate::client::PolymarketClient`]
//! / [`crate::websocket::PolymarketWebSocket`] as its onchain-venue
//! collaborator.
//!
//! # Modules
//!
//! - [`types`]: `L2OrderBook` and the order-side/position shapes it's built from
//! - [`orderbook`]: order-book walking for fill simulation
//! - [`clob_auth`]: L1 (EIP-712) and L2 (HMAC-SHA256) CLOB authentication
//! - [`eip712`]: CTF Exchange order construction and signing
//! - [`signer`]: secure wallet holding the signer's private key
//! - [`wallet_signer`]: binds a wallet to EIP-712 order signing
//! - [`rate_limiter`]: governor-based CLOB rate limiting

pub mod clob_auth;
pub mod eip712;
pub mod orderbook;
pub mod rate_limiter;
pub mod signer;
pub mod types;
pub mod wallet_signer;

pub use clob_auth::{sign_clob_auth, ApiCredentials, ClobAuthError, L1Headers, L2Auth, L2Headers};
pub use orderbook::{depth_at_price, price_impact, simulate_fill};
pub use rate_limiter::{ClobRateLimiter, RateLimiterConfig};
pub use signer::{Wallet, WalletConfig, WalletError};
pub use types::{FillSimulation, L2OrderBook, OrderType, Side};
pub use wallet_signer::WalletSigner;
