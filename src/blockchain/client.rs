// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain Client: one node connection, one signing account, one contract.

use std::path::Path;
use std::str::FromStr;

use alloy::{
    contract::{ContractInstance, Interface},
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxHash},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use super::backend::{CallOutput, ContractBackend, SendOptions};
use super::signing;
use crate::config::ChainSettings;

/// HTTP provider with the recommended fillers plus the local wallet.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Handle to the deployed contract, bound to a single signing account.
#[derive(Debug)]
pub struct ChainClient {
    account: Address,
    contract: ContractInstance<SigningProvider, Ethereum>,
}

impl ChainClient {
    /// Build the client from settings.
    ///
    /// Fails when the ABI file is missing or empty, or when the signing key
    /// or contract address is not configured. The node is not contacted.
    pub fn new(settings: &ChainSettings) -> Result<Self, ChainError> {
        let abi = load_abi(&settings.abi_path)?;

        let private_key = configured(settings.private_key.as_deref())
            .ok_or(ChainError::MissingConfig("PRIVATE_KEY"))?;
        let contract_address = configured(settings.contract_address.as_deref())
            .ok_or(ChainError::MissingConfig("CONTRACT_ADDRESS"))?;

        let address = Address::from_str(contract_address)
            .map_err(|e| ChainError::InvalidAddress(e.to_string()))?;

        let signer = signing::signer_from_config(private_key)?;
        let account = signer.address();

        let url: url::Url = settings
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(signing::wallet_from_signer(signer))
            .connect_http(url);

        tracing::info!(
            %account,
            contract = %address,
            rpc_url = %settings.rpc_url,
            "Chain client initialized"
        );

        Ok(Self {
            account,
            contract: ContractInstance::new(address, provider, Interface::new(abi)),
        })
    }

    pub fn abi(&self) -> &JsonAbi {
        self.contract.abi()
    }

    fn provider(&self) -> &SigningProvider {
        self.contract.provider()
    }
}

#[async_trait]
impl ContractBackend for ChainClient {
    fn account(&self) -> Address {
        self.account
    }

    fn contract_address(&self) -> Address {
        *self.contract.address()
    }

    async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<CallOutput, ChainError> {
        let values = self
            .contract
            .function(method, args)
            .map_err(|e| ChainError::Contract(e.to_string()))?
            .call()
            .await
            .map_err(|e| ChainError::Rpc(format!("{method} call failed: {e}")))?;

        Ok(shape_output(self.abi(), method, values))
    }

    async fn estimate_gas(
        &self,
        method: &str,
        args: &[DynSolValue],
        from: Address,
    ) -> Result<u64, ChainError> {
        self.contract
            .function(method, args)
            .map_err(|e| ChainError::Contract(e.to_string()))?
            .from(from)
            .estimate_gas()
            .await
            .map_err(|e| ChainError::Rpc(format!("Gas estimation failed: {e}")))
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider()
            .get_gas_price()
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get gas price: {e}")))
    }

    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        options: &SendOptions,
    ) -> Result<Option<String>, ChainError> {
        let gas = options
            .gas
            .parse::<u64>()
            .map_err(|e| ChainError::InvalidSendOption(format!("gas {:?}: {e}", options.gas)))?;
        let gas_price = options.gas_price.parse::<u128>().map_err(|e| {
            ChainError::InvalidSendOption(format!("gasPrice {:?}: {e}", options.gas_price))
        })?;

        let pending = self
            .contract
            .function(method, args)
            .map_err(|e| ChainError::Contract(e.to_string()))?
            .from(options.from)
            .gas(gas)
            .gas_price(gas_price)
            .send()
            .await
            .map_err(|e| ChainError::TransactionFailed(format!("Failed to send: {e}")))?;

        Ok(Some(pending.tx_hash().to_string()))
    }

    async fn transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<serde_json::Value>, ChainError> {
        let hash = TxHash::from_str(hash).map_err(|e| ChainError::InvalidHash(e.to_string()))?;

        let receipt = self
            .provider()
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get receipt: {e}")))?;

        receipt
            .map(|r| serde_json::to_value(r).map_err(|e| ChainError::Rpc(e.to_string())))
            .transpose()
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        self.provider()
            .get_code_at(address)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get code: {e}")))
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider()
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

fn configured(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Load a contract ABI from a bare JSON array or a build artifact with an
/// `abi` field.
pub fn load_abi(path: &Path) -> Result<JsonAbi, ChainError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ChainError::AbiNotFound(format!("{}: {e}", path.display())))?;
    if raw.trim().is_empty() {
        return Err(ChainError::EmptyAbi(path.display().to_string()));
    }

    let document: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| ChainError::InvalidAbi(e.to_string()))?;
    let abi_value = match document {
        serde_json::Value::Object(mut artifact) => artifact
            .remove("abi")
            .ok_or_else(|| ChainError::InvalidAbi("artifact has no `abi` field".to_string()))?,
        other => other,
    };
    if abi_value.as_array().is_some_and(Vec::is_empty) {
        return Err(ChainError::EmptyAbi(path.display().to_string()));
    }

    serde_json::from_value(abi_value).map_err(|e| ChainError::InvalidAbi(e.to_string()))
}

/// Attach ABI output names to decoded values.
///
/// A single struct output is flattened so its components are addressable
/// by name and position like plain multi-value returns.
fn shape_output(abi: &JsonAbi, method: &str, values: Vec<DynSolValue>) -> CallOutput {
    let Some(function) = abi.function(method).and_then(|overloads| overloads.first()) else {
        return CallOutput::positional(values);
    };

    if let ([param], [DynSolValue::Tuple(fields)]) = (function.outputs.as_slice(), values.as_slice()) {
        if !param.components.is_empty() {
            let names = param.components.iter().map(|c| c.name.clone());
            return CallOutput::with_names(fields.clone(), names);
        }
    }

    let names = function.outputs.iter().map(|p| p.name.clone());
    CallOutput::with_names(values, names)
}

/// Errors that can occur during chain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("{0} is not configured")]
    MissingConfig(&'static str),

    #[error("Contract ABI not found: {0}")]
    AbiNotFound(String),

    #[error("Contract ABI is empty: {0}")]
    EmptyAbi(String),

    #[error("Invalid contract ABI: {0}")]
    InvalidAbi(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("Invalid send option: {0}")]
    InvalidSendOption(String),

    #[error("Node returned no transaction hash")]
    MissingTransactionHash,

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl ChainError {
    /// Missing or empty ABI maps to the not-found kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChainError::AbiNotFound(_) | ChainError::EmptyAbi(_))
    }
}
