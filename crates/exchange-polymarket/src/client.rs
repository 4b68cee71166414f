//! Polymarket CLOB REST client with rate limiting.
//!
//! Provides typed access to Polymarket API endpoints with automatic
//! rate limiting using the governor crate.

use crate::arbitrage::clob_auth::{ApiCredentials, L2Auth};
use crate::arbitrage::types::Side;
use crate::arbitrage::wallet_signer::WalletSigner;
use crate::models::{
    Market, MarketFilter, MarketsResponse, OrderResult, OrderStatusResponse, Price, RawMarket,
};
use anyhow::{anyhow, Result};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default Polymarket CLOB API base URL.
pub const POLYMARKET_CLOB_URL: &str = "https://clob.polymarket.com";

/// Order time-in-force for the onchain venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClobOrderType {
    /// Fill-or-Kill: fills entirely at submission or is canceled.
    Fok,
    /// Good-til-Cancelled: rests on the book until filled or cancelled.
    Gtc,
}

impl ClobOrderType {
    fn as_api_str(self) -> &'static str {
        match self {
            Self::Fok => "FOK",
            Self::Gtc => "GTC",
        }
    }
}

/// Polymarket CLOB REST client.
pub struct PolymarketClient {
    /// HTTP client
    http: Client,
    /// Base URL for API
    base_url: String,
    /// Rate limiter (requests per minute)
    rate_limiter: Arc<RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
    /// Order signer, present only when the client is authenticated for trading.
    signer: Option<Arc<WalletSigner>>,
    /// L2 (HMAC) auth headers generator, present only when authenticated.
    l2_auth: Option<L2Auth>,
}

impl PolymarketClient {
    /// Creates a new client with default settings.
    ///
    /// Rate limited to 60 requests per minute by default. Read-only: order
    /// submission requires [`PolymarketClient::with_trading`].
    pub fn new() -> Self {
        Self::with_rate_limit(nonzero!(60u32))
    }

    /// Creates a new client with custom rate limit.
    pub fn with_rate_limit(requests_per_minute: NonZeroU32) -> Self {
        let quota = Quota::per_minute(requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            http: Client::new(),
            base_url: POLYMARKET_CLOB_URL.to_string(),
            rate_limiter,
            signer: None,
            l2_auth: None,
        }
    }

    /// Attaches an order signer and L2 credentials, enabling authenticated
    /// trading endpoints.
    #[must_use]
    pub fn with_trading(mut self, signer: Arc<WalletSigner>, creds: &ApiCredentials) -> Self {
        let address = signer.address().to_string();
        self.l2_auth = Some(L2Auth::new(creds, address));
        self.signer = Some(signer);
        self
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for rate limit and makes a GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self.http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("API error {}: {}", status, text));
        }

        let body = response.json::<T>().await?;
        Ok(body)
    }

    /// Waits for rate limit and makes an L2-authenticated request.
    async fn authenticated<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &str,
    ) -> Result<T> {
        let l2_auth = self
            .l2_auth
            .as_ref()
            .ok_or_else(|| anyhow!("client is not configured for trading (no L2 credentials)"))?;

        self.rate_limiter.until_ready().await;

        let headers = l2_auth.headers(method.as_str(), path, body)?;
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(method, &url)
            .header("Accept", "application/json")
            .header("POLY_ADDRESS", headers.address)
            .header("POLY_SIGNATURE", headers.signature)
            .header("POLY_TIMESTAMP", headers.timestamp)
            .header("POLY_API_KEY", headers.api_key)
            .header("POLY_PASSPHRASE", headers.passphrase);

        if !body.is_empty() {
            request = request
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("API error {}: {}", status, text));
        }

        Ok(response.json::<T>().await?)
    }

    /// Gets a list of markets, optionally filtered.
    ///
    /// # Arguments
    /// * `filter` - Optional filter criteria
    /// * `cursor` - Optional pagination cursor
    ///
    /// # Returns
    /// A tuple of (markets, next_cursor)
    pub async fn get_markets(
        &self,
        filter: Option<&MarketFilter>,
        cursor: Option<&str>,
    ) -> Result<(Vec<Market>, Option<String>)> {
        let mut path = "/markets".to_string();
        let mut params = Vec::new();

        if let Some(f) = filter {
            if f.active_only {
                params.push("active=true".to_string());
            }
            if let Some(ref query) = f.query {
                params.push(format!("tag_slug={}", urlencoding::encode(query)));
            }
        }

        if let Some(c) = cursor {
            params.push(format!("next_cursor={}", c));
        }

        if !params.is_empty() {
            path = format!("{}?{}", path, params.join("&"));
        }

        let response: MarketsResponse = self.get(&path).await?;

        let markets: Vec<Market> = response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(Market::from)
            .collect();

        // Apply additional client-side filtering
        let markets = if let Some(f) = filter {
            markets
                .into_iter()
                .filter(|m| {
                    if let Some(min_liq) = f.min_liquidity {
                        m.has_sufficient_liquidity(min_liq)
                    } else {
                        true
                    }
                })
                .collect()
        } else {
            markets
        };

        Ok((markets, response.next_cursor))
    }

    /// Gets a specific market by condition ID.
    pub async fn get_market(&self, condition_id: &str) -> Result<Market> {
        let path = format!("/markets/{}", condition_id);
        let raw: RawMarket = self.get(&path).await?;
        Ok(Market::from(raw))
    }

    /// Gets current prices for a list of token IDs.
    pub async fn get_prices(&self, token_ids: &[String]) -> Result<HashMap<String, Price>> {
        if token_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = token_ids.join(",");
        let path = format!("/prices?token_ids={}", ids);

        // The API might return an array or object depending on endpoint version
        // We handle both cases
        let response: serde_json::Value = self.get(&path).await?;

        let mut prices = HashMap::new();

        if let Some(arr) = response.as_array() {
            for item in arr {
                if let Ok(price) = serde_json::from_value::<Price>(item.clone()) {
                    prices.insert(price.token_id.clone(), price);
                }
            }
        } else if let Some(obj) = response.as_object() {
            for (token_id, value) in obj {
                if let Ok(price) = serde_json::from_value::<PriceValue>(value.clone()) {
                    prices.insert(token_id.clone(), Price {
                        token_id: token_id.clone(),
                        bid: price.bid.and_then(|v| Decimal::try_from(v).ok()),
                        ask: price.ask.and_then(|v| Decimal::try_from(v).ok()),
                        last: price.last.and_then(|v| Decimal::try_from(v).ok()),
                        spread: price.spread.and_then(|v| Decimal::try_from(v).ok()),
                    });
                }
            }
        }

        Ok(prices)
    }

    /// Discovers BTC-related markets.
    ///
    /// Fetches markets and filters for those related to Bitcoin.
    pub async fn discover_btc_markets(&self) -> Result<Vec<Market>> {
        let filter = MarketFilter::btc_markets();
        let (markets, _) = self.get_markets(Some(&filter), None).await?;

        // Additional client-side filtering to ensure BTC relevance
        let btc_markets: Vec<Market> = markets
            .into_iter()
            .filter(|m| m.is_btc_related())
            .collect();

        Ok(btc_markets)
    }

    /// Discovers active, tradeable BTC markets with sufficient liquidity.
    pub async fn discover_tradeable_btc_markets(
        &self,
        min_liquidity: Decimal,
    ) -> Result<Vec<Market>> {
        let btc_markets = self.discover_btc_markets().await?;

        let tradeable: Vec<Market> = btc_markets
            .into_iter()
            .filter(|m| m.is_tradeable() && m.has_sufficient_liquidity(min_liquidity))
            .collect();

        Ok(tradeable)
    }

    // =========================================================================
    // Order Endpoints (require `with_trading`)
    // =========================================================================

    /// Builds, signs, and submits a CTF Exchange order.
    ///
    /// # Errors
    /// Returns an error if the client has no signer/credentials, signing
    /// fails, or the API rejects the order.
    pub async fn submit_order(
        &self,
        token_id: &str,
        side: Side,
        price: Decimal,
        size: Decimal,
        order_type: ClobOrderType,
        nonce: u64,
        expiration_secs: u64,
    ) -> Result<OrderResult> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| anyhow!("client is not configured for trading (no signer)"))?;

        let (order, signature) =
            signer.build_and_sign_order(token_id, side, price, size, nonce, expiration_secs)?;

        let side_str = match side {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };

        let payload = serde_json::json!({
            "order": {
                "salt": order.salt.to_string(),
                "maker": format!("0x{}", hex::encode(order.maker)),
                "signer": format!("0x{}", hex::encode(order.signer)),
                "taker": format!("0x{}", hex::encode(order.taker)),
                "tokenId": order.token_id,
                "makerAmount": order.maker_amount.to_string(),
                "takerAmount": order.taker_amount.to_string(),
                "expiration": order.expiration.to_string(),
                "nonce": order.nonce.to_string(),
                "feeRateBps": order.fee_rate_bps.to_string(),
                "side": side_str,
                "signatureType": order.signature_type,
                "signature": signature,
            },
            "owner": self.l2_auth.as_ref().map(L2Auth::api_key).unwrap_or_default(),
            "orderType": order_type.as_api_str(),
        });

        let body = serde_json::to_string(&payload)?;
        self.authenticated(reqwest::Method::POST, "/order", &body).await
    }

    /// Cancels a resting order by id.
    ///
    /// # Errors
    /// Returns an error if the client has no credentials or the API call fails.
    pub async fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let path = format!("/order/{}", order_id);
        let response: serde_json::Value =
            self.authenticated(reqwest::Method::DELETE, &path, "").await?;
        Ok(response
            .get("canceled")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true))
    }

    /// Fetches the current status of a previously submitted order.
    ///
    /// # Errors
    /// Returns an error if the client has no credentials or the order is not found.
    pub async fn get_order_status(&self, order_id: &str) -> Result<OrderStatusResponse> {
        let path = format!("/data/order/{}", order_id);
        self.authenticated(reqwest::Method::GET, &path, "").await
    }
}

impl Default for PolymarketClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal price value for parsing API responses.
#[derive(Debug, serde::Deserialize)]
struct PriceValue {
    bid: Option<f64>,
    ask: Option<f64>,
    last: Option<f64>,
    spread: Option<f64>,
}
