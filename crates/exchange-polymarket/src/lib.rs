//! Onchain-venue (Polymarket-style) integration for the cross-venue
//! arbitrage engine.
//!
//! This crate provides:
//! - REST client with rate limiting and signed order submission for the CLOB
//! - Gamma API client for 15-minute market discovery
//! - Models for markets, tokens, and prices
//! - WebSocket client maintaining live L2 books per token, normalized to
//!   the engine's cross-venue quote shape
//! - L1/L2 CLOB authentication and EIP-712 order signing
//!
//! # Example
//!
//! ```no_run
//! use algo_trade_polymarket::{GammaClient, PolymarketClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gamma = GammaClient::new();
//!     let markets = gamma.get_all_current_15min_markets().await;
//!     println!("Discovered {} 15-min markets", markets.len());
//!
//!     let client = PolymarketClient::new();
//!     let btc_markets = client.discover_btc_markets().await?;
//!     println!("Found {} BTC markets", btc_markets.len());
//!
//!     Ok(())
//! }
//! ```

pub mod arbitrage;
pub mod client;
pub mod gamma;
pub mod models;
pub mod websocket;

// Re-export main types
pub use arbitrage::{L2OrderBook, Side, WalletSigner};
pub use client::PolymarketClient;
pub use gamma::GammaClient;
pub use models::{Coin, GammaEvent, GammaMarket, Market, MarketFilter, Price, Token};
pub use websocket::{BookEvent, PolymarketWebSocket, WebSocketConfig, WebSocketError};
