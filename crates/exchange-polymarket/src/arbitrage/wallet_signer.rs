//! EIP-712 order signing bound to a [`Wallet`].
//!
//! Bridges a [`Wallet`]'s private key with [`eip712::build_order`]/
//! `sign_order` so the REST client can sign Polymarket CTF Exchange orders
//! without touching key material directly.

use rust_decimal::Decimal;
use std::sync::Arc;

use super::eip712::{self, Eip712Config, Eip712Error, SIDE_BUY, SIDE_SELL};
use super::signer::Wallet;
use super::types::Side;

/// A wallet-backed order signer using EIP-712 typed data signing. All
/// signing happens locally via k256; the private key never leaves this
/// process.
pub struct WalletSigner {
    wallet: Arc<Wallet>,
    config: Eip712Config,
}

impl WalletSigner {
    #[must_use]
    pub fn new(wallet: Arc<Wallet>, config: Eip712Config) -> Self {
        Self { wallet, config }
    }

    /// Signer for Polygon mainnet standard markets.
    #[must_use]
    pub fn mainnet(wallet: Arc<Wallet>) -> Self {
        Self::new(wallet, Eip712Config::default())
    }

    /// Signer for neg-risk markets (different exchange contract address).
    #[must_use]
    pub fn neg_risk(wallet: Arc<Wallet>) -> Self {
        Self::new(
            wallet,
            Eip712Config {
                neg_risk: true,
                ..Default::default()
            },
        )
    }

    #[must_use]
    pub fn address(&self) -> &str {
        self.wallet.address()
    }

    /// Signs a CTF Exchange order and returns the hex-encoded signature.
    pub fn sign_order(
        &self,
        token_id: &str,
        side: Side,
        price: Decimal,
        size: Decimal,
        nonce: u64,
        expiration_secs: u64,
    ) -> Result<String, Eip712Error> {
        let eip712_side = match side {
            Side::Buy => SIDE_BUY,
            Side::Sell => SIDE_SELL,
        };

        let order = eip712::build_order(&eip712::BuildOrderParams {
            maker_address: self.wallet.address(),
            token_id,
            side: eip712_side,
            price,
            size,
            expiration_secs,
            nonce,
            fee_rate_bps: 0,
        })?;

        eip712::sign_order(&order, &self.config, self.wallet.expose_private_key())
    }

    /// Builds the full CTF Exchange order struct and signs it, returning both
    /// so the caller can serialize the order fields into the submission body
    /// alongside the signature.
    pub fn build_and_sign_order(
        &self,
        token_id: &str,
        side: Side,
        price: Decimal,
        size: Decimal,
        nonce: u64,
        expiration_secs: u64,
    ) -> Result<(eip712::Eip712Order, String), Eip712Error> {
        let eip712_side = match side {
            Side::Buy => SIDE_BUY,
            Side::Sell => SIDE_SELL,
        };

        let order = eip712::build_order(&eip712::BuildOrderParams {
            maker_address: self.wallet.address(),
            token_id,
            side: eip712_side,
            price,
            size,
            expiration_secs,
            nonce,
            fee_rate_bps: 0,
        })?;

        let signature = eip712::sign_order(&order, &self.config, self.wallet.expose_private_key())?;
        Ok((order, signature))
    }
}

impl std::fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSigner")
            .field("address", &self.wallet.address())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_wallet() -> Arc<Wallet> {
        let wallet = Wallet::from_private_key(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            137,
        )
        .unwrap();
        Arc::new(wallet)
    }

    #[test]
    fn wallet_signer_address_matches_wallet() {
        let wallet = test_wallet();
        let signer = WalletSigner::mainnet(wallet.clone());
        assert_eq!(signer.address(), wallet.address());
    }

    #[test]
    fn wallet_signer_produces_real_signature() {
        let wallet = test_wallet();
        let signer = WalletSigner::mainnet(wallet);

        let sig = signer
            .sign_order("12345", Side::Buy, dec!(0.50), dec!(100), 0, 1700000000)
            .unwrap();

        assert!(sig.starts_with("0x"));
        assert_eq!(sig.len(), 132);
    }

    #[test]
    fn wallet_signer_sell_side() {
        let wallet = test_wallet();
        let signer = WalletSigner::mainnet(wallet);

        let sig = signer
            .sign_order("12345", Side::Sell, dec!(0.60), dec!(50), 0, 1700000000)
            .unwrap();

        assert!(sig.starts_with("0x"));
        assert_eq!(sig.len(), 132);
    }

    #[test]
    fn wallet_signer_neg_risk_differs_from_mainnet() {
        let wallet = test_wallet();
        let signer_std = WalletSigner::mainnet(wallet.clone());
        let signer_neg = WalletSigner::neg_risk(wallet);

        let sig_std = signer_std
            .sign_order("12345", Side::Buy, dec!(0.50), dec!(100), 0, 1700000000)
            .unwrap();
        let sig_neg = signer_neg
            .sign_order("12345", Side::Buy, dec!(0.50), dec!(100), 0, 1700000000)
            .unwrap();

        assert_ne!(sig_std, sig_neg);
    }

    #[test]
    fn wallet_signer_build_and_sign_order_matches_sign_order() {
        let wallet = test_wallet();
        let signer = WalletSigner::mainnet(wallet);

        let (order, sig) = signer
            .build_and_sign_order("12345", Side::Buy, dec!(0.50), dec!(100), 0, 1700000000)
            .unwrap();

        assert_eq!(order.token_id, "12345");
        assert_eq!(order.side, SIDE_BUY);
        assert!(sig.starts_with("0x"));
    }

    #[test]
    fn wallet_signer_debug_does_not_leak_private_key() {
        let wallet = test_wallet();
        let signer = WalletSigner::mainnet(wallet);
        let debug = format!("{:?}", signer);
        assert!(debug.contains("WalletSigner"));
        assert!(debug.contains("0x"));
        assert!(!debug.contains("ac0974bec39a17e"));
    }
}
