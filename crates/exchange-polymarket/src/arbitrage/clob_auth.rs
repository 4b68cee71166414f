//! CLOB authentication for Polymarket API.
//!
//! Implements both L1 (EIP-712 ClobAuth signing) and L2 (HMAC-SHA256)
//! authentication schemes used by the Polymarket CLOB.
//!
//! # Authentication Flow
//!
//! 1. **L1 Auth**: Sign a ClobAuth EIP-712 message with private key
//! 2. **Derive API Key**: `GET /auth/derive-api-key` with L1 headers
//!    (or `POST /auth/api-key` to create new)
//! 3. **L2 Auth**: Use derived `apiKey`, `secret`, `passphrase` for HMAC-SHA256
//! 4. **Subsequent requests**: Use L2 headers for all authenticated endpoints

use base64::{
    engine::general_purpose::{STANDARD as BASE64_STANDARD, URL_SAFE as BASE64_URL_SAFE},
    Engine,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::eip712::{
    self, clob_auth_type_hash, compute_clob_auth_domain_separator, compute_signing_hash,
    Eip712Error, CLOB_AUTH_MESSAGE, POLYGON_CHAIN_ID,
};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Errors
// =============================================================================

/// Errors from CLOB authentication.
#[derive(Debug, Error)]
pub enum ClobAuthError {
    /// EIP-712 signing failed.
    #[error("EIP-712 signing failed: {0}")]
    SigningFailed(#[from] Eip712Error),

    /// HMAC computation failed.
    #[error("HMAC computation failed: {0}")]
    HmacFailed(String),

    /// Base64 decode failed.
    #[error("Base64 decode failed: {0}")]
    Base64Failed(String),

    /// API key derivation failed.
    #[error("API key derivation failed: {0}")]
    DerivationFailed(String),
}

// =============================================================================
// L1 Authentication (EIP-712 ClobAuth)
// =============================================================================

/// Headers for L1 (EIP-712) authenticated requests.
#[derive(Debug, Clone)]
pub struct L1Headers {
    /// POLY_ADDRESS header - the signer's Ethereum address.
    pub address: String,
    /// POLY_SIGNATURE header - the EIP-712 ClobAuth signature.
    pub signature: String,
    /// POLY_TIMESTAMP header - Unix timestamp string.
    pub timestamp: String,
    /// POLY_NONCE header - request nonce.
    pub nonce: String,
}

/// Signs a ClobAuth EIP-712 message for L1 authentication.
///
/// The ClobAuth struct has:
/// - `address`: Signer's address
/// - `timestamp`: Unix timestamp string
/// - `nonce`: Nonce value
/// - `message`: Attestation message
pub fn sign_clob_auth(
    address: &str,
    private_key_hex: &str,
    nonce: u64,
) -> Result<L1Headers, ClobAuthError> {
    let timestamp = Utc::now().timestamp().to_string();

    let domain_separator = compute_clob_auth_domain_separator(POLYGON_CHAIN_ID);

    // Compute the ClobAuth struct hash
    let struct_hash = compute_clob_auth_struct_hash(address, &timestamp, nonce)?;

    // Compute the signing hash
    let signing_hash = compute_signing_hash(&domain_separator, &struct_hash);

    // Sign it
    let signature = eip712::sign_hash(&signing_hash, private_key_hex)?;

    Ok(L1Headers {
        address: address.to_string(),
        signature,
        timestamp,
        nonce: nonce.to_string(),
    })
}

/// Computes the ClobAuth struct hash.
///
/// `hash(CLOB_AUTH_TYPEHASH || address || hash(timestamp) || nonce || hash(message))`
fn compute_clob_auth_struct_hash(
    address: &str,
    timestamp: &str,
    nonce: u64,
) -> Result<[u8; 32], ClobAuthError> {
    use sha3::{Digest, Keccak256};

    let addr_bytes = eip712::parse_address(address)?;

    let mut encoded = Vec::with_capacity(5 * 32);

    // Type hash
    encoded.extend_from_slice(&clob_auth_type_hash());

    // address (left-padded to 32 bytes)
    let mut addr_padded = [0u8; 32];
    addr_padded[12..32].copy_from_slice(&addr_bytes);
    encoded.extend_from_slice(&addr_padded);

    // hash(timestamp) - string type hashed per EIP-712
    let ts_hash = Keccak256::digest(timestamp.as_bytes());
    encoded.extend_from_slice(&ts_hash);

    // nonce (uint256)
    let mut nonce_bytes = [0u8; 32];
    nonce_bytes[24..32].copy_from_slice(&nonce.to_be_bytes());
    encoded.extend_from_slice(&nonce_bytes);

    // hash(message) - string type hashed per EIP-712
    let msg_hash = Keccak256::digest(CLOB_AUTH_MESSAGE.as_bytes());
    encoded.extend_from_slice(&msg_hash);

    let result = Keccak256::digest(&encoded);
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    Ok(out)
}

// =============================================================================
// L2 Authentication (HMAC-SHA256)
// =============================================================================

/// API credentials returned from the CLOB auth endpoint.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCredentials {
    /// The API key identifier.
    pub api_key: String,
    /// Base64-encoded HMAC secret.
    pub secret: String,
    /// Passphrase for the API key.
    pub passphrase: String,
}

/// L2 authentication using HMAC-SHA256.
///
/// After deriving API credentials via L1 auth, all subsequent requests
/// use L2 auth with HMAC-SHA256 signatures.
#[derive(Debug, Clone)]
pub struct L2Auth {
    api_key: String,
    secret: String,
    passphrase: String,
    address: String,
}

/// Headers for L2 (HMAC) authenticated requests.
#[derive(Debug, Clone)]
pub struct L2Headers {
    /// POLY_ADDRESS header.
    pub address: String,
    /// POLY_SIGNATURE header - HMAC-SHA256 signature.
    pub signature: String,
    /// POLY_TIMESTAMP header - Unix timestamp.
    pub timestamp: String,
    /// POLY_API_KEY header.
    pub api_key: String,
    /// POLY_PASSPHRASE header.
    pub passphrase: String,
}

impl L2Auth {
    /// Creates a new L2 auth instance from API credentials.
    #[must_use]
    pub fn new(creds: &ApiCredentials, address: String) -> Self {
        Self {
            api_key: creds.api_key.clone(),
            secret: creds.secret.clone(),
            passphrase: creds.passphrase.clone(),
            address,
        }
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the passphrase.
    #[must_use]
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Generates L2 auth headers for an HTTP request.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, DELETE)
    /// * `path` - Request path (e.g., "/order")
    /// * `body` - Request body (empty string for GET/DELETE)
    pub fn headers(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<L2Headers, ClobAuthError> {
        let timestamp = Utc::now().timestamp().to_string();

        let signature = self.compute_hmac(&timestamp, method, path, body)?;

        Ok(L2Headers {
            address: self.address.clone(),
            signature,
            timestamp,
            api_key: self.api_key.clone(),
            passphrase: self.passphrase.clone(),
        })
    }

    /// Computes the HMAC-SHA256 signature.
    ///
    /// Message format: `{timestamp}{method}{path}{body}`
    /// Key: base64-decoded secret
    ///
    /// Uses URL-safe base64 (with `-` and `_` instead of `+` and `/`) to match
    /// the Polymarket Python/TypeScript reference clients.
    fn compute_hmac(
        &self,
        timestamp: &str,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<String, ClobAuthError> {
        // Decode the base64 secret (try URL-safe first, then standard for robustness)
        let secret_bytes = BASE64_URL_SAFE
            .decode(&self.secret)
            .or_else(|_| BASE64_STANDARD.decode(&self.secret))
            .map_err(|e| ClobAuthError::Base64Failed(format!("Invalid secret: {}", e)))?;

        // Build the message (empty body is simply not appended, matching Python client)
        let mut message = format!("{}{}{}", timestamp, method, path);
        if !body.is_empty() {
            message.push_str(body);
        }

        // Compute HMAC-SHA256
        let mut mac = HmacSha256::new_from_slice(&secret_bytes)
            .map_err(|e| ClobAuthError::HmacFailed(format!("Invalid key length: {}", e)))?;
        mac.update(message.as_bytes());
        let result = mac.finalize();

        // URL-safe base64 encode the result (matches Python's urlsafe_b64encode)
        Ok(BASE64_URL_SAFE.encode(result.into_bytes()))
    }
}

// =============================================================================
// Tests
// =============================================================================
