// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! immutable [`AppConfig`] loaded once at startup. Nothing reads the
//! environment after `AppConfig::from_env` returns.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `DATA_DIR` | Directory for the credential database | `./data` |
//! | `UPLOAD_DIR` | Scratch directory for received uploads | `./uploads` |
//! | `MAX_UPLOAD_BYTES` | Upload size limit | `52428800` |
//! | `JWT_SECRET` | Token signing secret | Required |
//! | `JWT_EXPIRES_IN` | Token lifetime (`1h`, `30m`, `3600`) | `1h` |
//! | `PASSWORD_HASH_COST` | Password hash cost factor | `12` |
//! | `RPC_URL` / `API_URL` | Node JSON-RPC endpoint | `http://127.0.0.1:8545` |
//! | `PRIVATE_KEY` | Service account signing key (hex or PEM) | Required |
//! | `CONTRACT_ADDRESS` | Deployed contract address | Required |
//! | `CONTRACT_ABI_PATH` | Contract ABI JSON | `contracts/Storage.json` |
//! | `IPFS_API_URL` | IPFS HTTP API base URL | `http://127.0.0.1:5001/api/v0` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Optional TLS certificate and key | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const UPLOAD_DIR_ENV: &str = "UPLOAD_DIR";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRES_IN_ENV: &str = "JWT_EXPIRES_IN";
pub const PASSWORD_HASH_COST_ENV: &str = "PASSWORD_HASH_COST";
pub const RPC_URL_ENV: &str = "RPC_URL";
/// Legacy name for the RPC endpoint, still honoured when `RPC_URL` is unset.
pub const API_URL_ENV: &str = "API_URL";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";
pub const CONTRACT_ABI_PATH_ENV: &str = "CONTRACT_ABI_PATH";
pub const IPFS_API_URL_ENV: &str = "IPFS_API_URL";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SALT_ROUNDS: u32 = 12;
pub const DEFAULT_TOKEN_EXPIRY: &str = "1h";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_ABI_PATH: &str = "contracts/Storage.json";
pub const DEFAULT_IPFS_API_URL: &str = "http://127.0.0.1:5001/api/v0";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Errors raised while loading configuration. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not defined")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Auth Service options.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Token signing secret.
    pub jwt_secret: String,
    /// Cost factor handed to the password hasher.
    pub salt_rounds: u32,
    /// Lifetime of issued tokens.
    pub token_expiry: Duration,
}

/// Chain Client options. Presence of the key and address is checked again
/// when the client is built.
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub contract_address: Option<String>,
    pub abi_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub ipfs_api_url: String,
    pub log_json: bool,
    pub tls: Option<TlsSettings>,
    pub auth: AuthSettings,
    pub chain: ChainSettings,
}

impl AppConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;

        let expiry_raw = get(JWT_EXPIRES_IN_ENV).unwrap_or_else(|| DEFAULT_TOKEN_EXPIRY.to_string());
        let token_expiry = parse_duration(&expiry_raw).map_err(|reason| ConfigError::Invalid {
            name: JWT_EXPIRES_IN_ENV,
            reason,
        })?;

        let salt_rounds = match get(PASSWORD_HASH_COST_ENV) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: PASSWORD_HASH_COST_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_SALT_ROUNDS,
        };

        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match get(MAX_UPLOAD_BYTES_ENV) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| ConfigError::Invalid {
                name: MAX_UPLOAD_BYTES_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsSettings {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            data_dir: get(DATA_DIR_ENV).unwrap_or_else(|| "./data".to_string()).into(),
            upload_dir: get(UPLOAD_DIR_ENV)
                .unwrap_or_else(|| "./uploads".to_string())
                .into(),
            max_upload_bytes,
            ipfs_api_url: get(IPFS_API_URL_ENV).unwrap_or_else(|| DEFAULT_IPFS_API_URL.to_string()),
            log_json: get(LOG_FORMAT_ENV)
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            tls,
            auth: AuthSettings {
                jwt_secret,
                salt_rounds,
                token_expiry,
            },
            chain: ChainSettings {
                rpc_url: get(RPC_URL_ENV)
                    .or_else(|| get(API_URL_ENV))
                    .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
                private_key: get(PRIVATE_KEY_ENV),
                contract_address: get(CONTRACT_ADDRESS_ENV),
                abi_path: get(CONTRACT_ABI_PATH_ENV)
                    .unwrap_or_else(|| DEFAULT_ABI_PATH.to_string())
                    .into(),
            },
        })
    }

    /// Path of the embedded credential database.
    pub fn user_db_path(&self) -> PathBuf {
        self.data_dir.join("users.redb")
    }
}

/// Parse a duration string such as `1h`, `30m`, `45s`, `7d` or a bare number
/// of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("empty duration".to_string());
    }

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("`{value}` does not start with a number"))?;

    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(format!("unknown duration unit `{other}`")),
    };

    let secs = amount
        .checked_mul(multiplier)
        .ok_or_else(|| format!("`{value}` overflows"))?;
    if secs == 0 {
        return Err("duration must be positive".to_string());
    }

    Ok(Duration::from_secs(secs))
}
