// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted in-process backend for orchestrator and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address, Bytes},
};
use async_trait::async_trait;

use super::backend::{CallOutput, ContractBackend, SendOptions};
use super::client::ChainError;

pub const MOCK_ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const MOCK_CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const MOCK_TX_HASH: &str =
    "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

/// One recorded write.
#[derive(Debug, Clone)]
pub struct SentCall {
    pub method: String,
    pub args: Vec<DynSolValue>,
    pub options: SendOptions,
}

#[derive(Default)]
struct Script {
    calls: HashMap<String, Result<CallOutput, String>>,
    gas: Option<Result<u64, String>>,
    gas_price: Option<Result<u128, String>>,
    send_hash: Option<Option<String>>,
    send_error: Option<String>,
    receipts: HashMap<String, serde_json::Value>,
    code: Vec<u8>,
    block_number: Option<u64>,
    sent: Vec<SentCall>,
    events: Vec<&'static str>,
    receipt_lookups: usize,
}

pub struct MockChain {
    account: Address,
    contract: Address,
    script: Mutex<Script>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::with_identity(MOCK_ACCOUNT, MOCK_CONTRACT)
    }

    pub fn with_identity(account: Address, contract: Address) -> Self {
        Self {
            account,
            contract,
            script: Mutex::new(Script::default()),
        }
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn on_call(&self, method: &str, output: CallOutput) {
        self.script().calls.insert(method.to_string(), Ok(output));
    }

    pub fn fail_call(&self, method: &str, error: &str) {
        self.script()
            .calls
            .insert(method.to_string(), Err(error.to_string()));
    }

    pub fn set_gas(&self, gas: Result<u64, &str>) {
        self.script().gas = Some(gas.map_err(str::to_string));
    }

    pub fn set_gas_price(&self, price: Result<u128, &str>) {
        self.script().gas_price = Some(price.map_err(str::to_string));
    }

    pub fn set_send_hash(&self, hash: Option<&str>) {
        self.script().send_hash = Some(hash.map(str::to_string));
    }

    pub fn fail_send(&self, error: &str) {
        self.script().send_error = Some(error.to_string());
    }

    pub fn set_receipt(&self, hash: &str, receipt: serde_json::Value) {
        self.script().receipts.insert(hash.to_lowercase(), receipt);
    }

    pub fn set_code(&self, code: Vec<u8>) {
        self.script().code = code;
    }

    pub fn set_block_number(&self, block: Option<u64>) {
        self.script().block_number = block;
    }

    pub fn sent(&self) -> Vec<SentCall> {
        self.script().sent.clone()
    }

    /// Order in which write-path node operations were issued.
    pub fn events(&self) -> Vec<&'static str> {
        self.script().events.clone()
    }

    pub fn receipt_lookups(&self) -> usize {
        self.script().receipt_lookups
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractBackend for MockChain {
    fn account(&self) -> Address {
        self.account
    }

    fn contract_address(&self) -> Address {
        self.contract
    }

    async fn call(&self, method: &str, _args: &[DynSolValue]) -> Result<CallOutput, ChainError> {
        match self.script().calls.get(method) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(e)) => Err(ChainError::Rpc(e.clone())),
            None => Err(ChainError::Contract(format!("unscripted call {method}"))),
        }
    }

    async fn estimate_gas(
        &self,
        _method: &str,
        _args: &[DynSolValue],
        _from: Address,
    ) -> Result<u64, ChainError> {
        let mut script = self.script();
        script.events.push("estimate_gas");
        script
            .gas
            .clone()
            .unwrap_or(Ok(21_000))
            .map_err(ChainError::Rpc)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        let mut script = self.script();
        script.events.push("gas_price");
        script
            .gas_price
            .clone()
            .unwrap_or(Ok(1_000_000_000))
            .map_err(ChainError::Rpc)
    }

    async fn send(
        &self,
        method: &str,
        args: &[DynSolValue],
        options: &SendOptions,
    ) -> Result<Option<String>, ChainError> {
        let mut script = self.script();
        script.events.push("send");
        if let Some(e) = script.send_error.clone() {
            return Err(ChainError::TransactionFailed(e));
        }
        script.sent.push(SentCall {
            method: method.to_string(),
            args: args.to_vec(),
            options: options.clone(),
        });
        Ok(script
            .send_hash
            .clone()
            .unwrap_or_else(|| Some(MOCK_TX_HASH.to_string())))
    }

    async fn transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<serde_json::Value>, ChainError> {
        let mut script = self.script();
        script.receipt_lookups += 1;
        Ok(script.receipts.get(&hash.to_lowercase()).cloned())
    }

    async fn code_at(&self, _address: Address) -> Result<Bytes, ChainError> {
        Ok(Bytes::from(self.script().code.clone()))
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.script()
            .block_number
            .ok_or_else(|| ChainError::Rpc("node unreachable".to_string()))
    }
}
