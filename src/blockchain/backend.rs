// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The seam between the orchestrator and a node.
//!
//! [`ChainClient`](super::ChainClient) implements [`ContractBackend`] against
//! a real JSON-RPC endpoint; tests substitute a scripted backend.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes},
};
use async_trait::async_trait;

use super::client::ChainError;

/// Decoded return values of a contract call.
///
/// Values are reachable by position and, when the ABI names them, by name.
#[derive(Debug, Clone, Default)]
pub struct CallOutput {
    positional: Vec<DynSolValue>,
    named: HashMap<String, DynSolValue>,
}

impl CallOutput {
    pub fn positional(values: Vec<DynSolValue>) -> Self {
        Self {
            positional: values,
            named: HashMap::new(),
        }
    }

    /// Pair values with their ABI names. Empty names are skipped.
    pub fn with_names<I, S>(values: Vec<DynSolValue>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let named = names
            .into_iter()
            .map(Into::into)
            .zip(values.iter().cloned())
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self {
            positional: values,
            named,
        }
    }

    /// Named-only output, as some ABIs decode structs.
    pub fn named_only<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, DynSolValue)>,
    {
        Self {
            positional: Vec::new(),
            named: fields.into_iter().collect(),
        }
    }

    pub fn from_parts(positional: Vec<DynSolValue>, named: HashMap<String, DynSolValue>) -> Self {
        Self { positional, named }
    }

    pub fn named(&self, name: &str) -> Option<&DynSolValue> {
        self.named.get(name)
    }

    pub fn at(&self, index: usize) -> Option<&DynSolValue> {
        self.positional.get(index)
    }

    /// Look up a field by name, falling back to its position.
    pub fn field(&self, name: &str, index: usize) -> Option<&DynSolValue> {
        match self.named(name) {
            Some(value) => Some(value),
            None => self.at(index),
        }
    }

    pub fn first(&self) -> Option<&DynSolValue> {
        self.at(0)
    }
}

/// Parameters for a signed write. Gas values travel as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    pub from: Address,
    pub gas: String,
    pub gas_price: String,
}

/// Contract and node operations the orchestrator relies on.
#[async_trait]
pub trait ContractBackend: Send + Sync {
    /// The signing account every write is sent from.
    fn account(&self) -> Address;

    fn contract_address(&self) -> Address;

    /// Read-only contract call.
    async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<CallOutput, ChainError>;

    async fn estimate_gas(
        &self,
        method: &str,
        args: &[DynSolValue],
        from: Address,
    ) -> Result<u64, ChainError>;

    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Signed write. `None` when the node hands back no hash.
    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        options: &SendOptions,
    ) -> Result<Option<String>, ChainError>;

    /// Receipt as JSON-RPC returns it, or `None` while pending.
    async fn transaction_receipt(&self, hash: &str)
        -> Result<Option<serde_json::Value>, ChainError>;

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError>;

    async fn block_number(&self) -> Result<u64, ChainError>;
}

/// Check in the background that code is deployed at the contract address.
///
/// Only logs; calls are never gated on the outcome.
pub fn spawn_code_check(backend: Arc<dyn ContractBackend>) -> tokio::task::JoinHandle<bool> {
    tokio::spawn(async move {
        let address = backend.contract_address();
        match backend.code_at(address).await {
            Ok(code) if code.is_empty() => {
                tracing::warn!(%address, "No contract code found at configured address");
                false
            }
            Ok(code) => {
                tracing::info!(%address, code_bytes = code.len(), "Contract code present");
                true
            }
            Err(e) => {
                tracing::warn!(%address, error = %e, "Failed to check contract code");
                false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockChain;
    use alloy::primitives::U256;

    #[test]
    fn named_field_wins_over_position() {
        let output = CallOutput::with_names(
            vec![
                DynSolValue::String("positional".into()),
                DynSolValue::Uint(U256::from(1), 256),
            ],
            ["cid", ""],
        );

        assert_eq!(
            output.field("cid", 1),
            Some(&DynSolValue::String("positional".into()))
        );
        // Unnamed output falls back to its index.
        assert_eq!(
            output.field("timestamp", 1),
            Some(&DynSolValue::Uint(U256::from(1), 256))
        );
        assert!(output.field("uploader", 2).is_none());
    }

    #[tokio::test]
    async fn code_check_reports_missing_code() {
        let chain = Arc::new(MockChain::new());
        assert!(!spawn_code_check(chain.clone()).await.unwrap());

        chain.set_code(vec![0x60, 0x80]);
        assert!(spawn_code_check(chain).await.unwrap());
    }
}
