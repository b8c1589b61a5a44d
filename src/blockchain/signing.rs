// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing key loading for the node account.
//!
//! `PRIVATE_KEY` may hold a raw hex scalar (with or without `0x`) or a
//! PEM-encoded secp256k1 key in SEC1 or PKCS#8 form.

use alloy::{network::EthereumWallet, signers::local::PrivateKeySigner};
use k256::SecretKey;

use super::client::ChainError;

/// Parse a private key from PEM format to hex string.
///
/// Returns the 32-byte scalar as 64 hex characters, no `0x` prefix.
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, ChainError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex-encoded private key.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
    let trimmed = private_key_hex.trim();
    let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))
}

/// Create a signer from whatever form the configured key takes.
pub fn signer_from_config(raw: &str) -> Result<PrivateKeySigner, ChainError> {
    if raw.trim_start().starts_with("-----BEGIN") {
        let hex_key = pem_to_hex(raw.as_bytes())?;
        signer_from_hex(&hex_key)
    } else {
        signer_from_hex(raw)
    }
}

pub fn wallet_from_signer(signer: PrivateKeySigner) -> EthereumWallet {
    EthereumWallet::from(signer)
}
