// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction Orchestrator: contract reads and writes, status polling and
//! metadata retrieval.
//!
//! Every write goes estimate gas, then gas price, then signed send. Node
//! failures are logged with the operation name and leave this module as
//! [`OrchestratorError::Internal`]; decoder outcomes the caller can act on
//! pass through unchanged.

use std::sync::Arc;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use super::backend::{ContractBackend, SendOptions};
use super::cache::ReceiptCache;
use super::client::ChainError;
use super::metadata::{decode_metadata, MetadataError, MetadataRecord};
use super::numeric::{normalize_receipt, to_decimal_string};
use crate::error::ApiError;

pub const METHOD_STORE: &str = "store";
pub const METHOD_RETRIEVE: &str = "retrieve";
pub const METHOD_STORE_CID: &str = "storeCID";
pub const METHOD_METADATA_COUNT: &str = "getMetadataCount";
pub const METHOD_GET_METADATA: &str = "getMetadata";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Pending,
    Confirmed,
}

/// Result of a transaction status lookup.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionStatus {
    pub status: TransactionState,
    pub message: String,
    /// Receipt with every integer as a decimal string; `null` while pending
    #[schema(value_type = Option<Object>)]
    pub receipt: Option<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    pub logs: Vec<serde_json::Value>,
}

impl TransactionStatus {
    pub fn pending() -> Self {
        Self {
            status: TransactionState::Pending,
            message: "Transaction is pending".to_string(),
            receipt: None,
            logs: Vec::new(),
        }
    }

    /// Wrap a raw receipt, converting its integers to decimal strings.
    pub fn confirmed(receipt: serde_json::Value) -> Self {
        let receipt = normalize_receipt(receipt);
        let logs = receipt
            .get("logs")
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default();
        Self {
            status: TransactionState::Confirmed,
            message: "Transaction confirmed".to_string(),
            receipt: Some(receipt),
            logs,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("{0}")]
    NotFound(String),

    #[error("Incomplete metadata: {0}")]
    IncompleteMetadata(&'static str),

    /// Nothing has been stored yet. Reported with `success: true`.
    #[error("No metadata stored yet")]
    EmptyMetadata,

    #[error("{message}: {detail}")]
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl OrchestratorError {
    pub fn error_code(&self) -> &'static str {
        match self {
            OrchestratorError::NotFound(_) => "not_found",
            OrchestratorError::IncompleteMetadata(_) => "incomplete_metadata",
            OrchestratorError::EmptyMetadata => "empty_metadata",
            OrchestratorError::Internal { .. } => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            OrchestratorError::NotFound(_) | OrchestratorError::IncompleteMetadata(_) => {
                StatusCode::NOT_FOUND
            }
            OrchestratorError::EmptyMetadata | OrchestratorError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<MetadataError> for OrchestratorError {
    fn from(e: MetadataError) -> Self {
        match e {
            MetadataError::NotFound => OrchestratorError::NotFound("Metadata not found".to_string()),
            MetadataError::Incomplete(what) => OrchestratorError::IncompleteMetadata(what),
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        let status = e.status_code();
        let code = e.error_code();
        match e {
            OrchestratorError::NotFound(message) => ApiError::new(status, message).with_code(code),
            OrchestratorError::IncompleteMetadata(_) => {
                ApiError::new(status, "Incomplete metadata").with_code(code)
            }
            OrchestratorError::EmptyMetadata => ApiError::new(status, "No metadata stored yet")
                .with_code(code)
                .with_success(true),
            OrchestratorError::Internal { message, .. } => {
                ApiError::new(status, message).with_code(code)
            }
        }
    }
}

pub struct TransactionOrchestrator {
    chain: Arc<dyn ContractBackend>,
    receipts: ReceiptCache,
}

impl TransactionOrchestrator {
    /// Bind to a backend. The account and contract address must be set.
    pub fn new(chain: Arc<dyn ContractBackend>) -> Result<Self, ChainError> {
        Self::with_cache(chain, ReceiptCache::default())
    }

    pub fn with_cache(
        chain: Arc<dyn ContractBackend>,
        receipts: ReceiptCache,
    ) -> Result<Self, ChainError> {
        if chain.account() == Address::ZERO {
            return Err(ChainError::MissingConfig("PRIVATE_KEY"));
        }
        if chain.contract_address() == Address::ZERO {
            return Err(ChainError::MissingConfig("CONTRACT_ADDRESS"));
        }
        Ok(Self { chain, receipts })
    }

    pub fn chain(&self) -> &Arc<dyn ContractBackend> {
        &self.chain
    }

    /// Store an integer in the contract. Returns the transaction hash.
    pub async fn store_value(&self, value: U256) -> Result<String, OrchestratorError> {
        let hash = self
            .submit(METHOD_STORE, vec![DynSolValue::Uint(value, 256)])
            .await
            .map_err(|e| internal("storeValue", "Failed to store value", e))?;
        tracing::info!(tx_hash = %hash, %value, "Value stored");
        Ok(hash)
    }

    /// Read the stored integer as a decimal string.
    pub async fn retrieve_value(&self) -> Result<String, OrchestratorError> {
        let output = self
            .chain
            .call(METHOD_RETRIEVE, &[])
            .await
            .map_err(|e| internal("retrieveValue", "Failed to retrieve value", e))?;

        output.first().and_then(to_decimal_string).ok_or_else(|| {
            internal(
                "retrieveValue",
                "Failed to retrieve value",
                format!("unexpected return value {:?}", output.first()),
            )
        })
    }

    /// Look up a transaction. No receipt yet is `pending`, not an error.
    pub async fn get_transaction_status(
        &self,
        tx_hash: &str,
    ) -> Result<TransactionStatus, OrchestratorError> {
        if let Some(cached) = self.receipts.get(tx_hash) {
            return Ok(cached);
        }

        let receipt = self
            .chain
            .transaction_receipt(tx_hash)
            .await
            .map_err(|e| internal("getTransactionStatus", "Failed to get transaction status", e))?;

        let Some(receipt) = receipt else {
            tracing::debug!(%tx_hash, "Transaction pending");
            return Ok(TransactionStatus::pending());
        };

        let status = TransactionStatus::confirmed(receipt);
        self.receipts.put(tx_hash, &status);
        Ok(status)
    }

    /// Anchor a content identifier in the contract.
    pub async fn store_cid(&self, cid: &str) -> Result<String, OrchestratorError> {
        let hash = self
            .submit(METHOD_STORE_CID, vec![DynSolValue::String(cid.to_string())])
            .await
            .map_err(|e| internal("storeCID", "Failed to store CID", e))?;
        tracing::info!(tx_hash = %hash, %cid, "CID stored");
        Ok(hash)
    }

    /// Index of the most recent metadata entry.
    pub async fn get_latest_metadata_index(&self) -> Result<u64, OrchestratorError> {
        const FAILURE: &str = "Failed to get latest metadata index";

        let output = self
            .chain
            .call(METHOD_METADATA_COUNT, &[])
            .await
            .map_err(|e| internal("getLatestMetadataIndex", FAILURE, e))?;

        let count = match output.first() {
            Some(DynSolValue::Uint(count, _)) => *count,
            other => {
                return Err(internal(
                    "getLatestMetadataIndex",
                    FAILURE,
                    format!("non-numeric metadata count {other:?}"),
                ))
            }
        };

        if count.is_zero() {
            return Err(OrchestratorError::EmptyMetadata);
        }

        u64::try_from(count - U256::from(1u8)).map_err(|_| {
            internal(
                "getLatestMetadataIndex",
                FAILURE,
                format!("metadata count {count} out of range"),
            )
        })
    }

    pub async fn retrieve_metadata(&self, index: u64) -> Result<MetadataRecord, OrchestratorError> {
        let output = self
            .chain
            .call(METHOD_GET_METADATA, &[DynSolValue::Uint(U256::from(index), 256)])
            .await
            .map_err(|e| internal("retrieveMetadata", "Failed to retrieve metadata", e))?;

        decode_metadata(&output).map_err(|e| {
            tracing::warn!(index, error = %e, "Metadata decode failed");
            OrchestratorError::from(e)
        })
    }

    /// Estimate gas, fetch gas price, then send the signed write.
    async fn submit(&self, method: &str, args: Vec<DynSolValue>) -> Result<String, ChainError> {
        let from = self.chain.account();
        let gas = self.chain.estimate_gas(method, &args, from).await?;
        let gas_price = self.chain.gas_price().await?;

        let options = SendOptions {
            from,
            gas: gas.to_string(),
            gas_price: gas_price.to_string(),
        };
        tracing::debug!(method, gas = %options.gas, gas_price = %options.gas_price, "Sending transaction");

        self.chain
            .send(method, &args, &options)
            .await?
            .ok_or(ChainError::MissingTransactionHash)
    }
}

fn internal(
    operation: &'static str,
    message: &'static str,
    detail: impl std::fmt::Display,
) -> OrchestratorError {
    tracing::error!(operation, error = %detail, "{message}");
    OrchestratorError::Internal {
        message,
        detail: detail.to_string(),
    }
}
