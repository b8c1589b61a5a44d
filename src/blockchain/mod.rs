// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration: the deployed storage contract and its node.
//!
//! - [`ChainClient`] holds the node connection, signing account and contract
//! - [`TransactionOrchestrator`] runs reads, gas-estimated writes and status
//!   polling on top of any [`ContractBackend`]
//! - [`metadata`] decodes `getMetadata` tuples
//! - [`numeric`] turns chain integers into decimal strings

pub mod backend;
pub mod cache;
pub mod client;
pub mod metadata;
pub mod numeric;
pub mod orchestrator;
pub mod signing;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::{spawn_code_check, CallOutput, ContractBackend, SendOptions};
pub use client::{ChainClient, ChainError};
pub use metadata::{decode_metadata, MetadataError, MetadataRecord};
pub use orchestrator::{
    OrchestratorError, TransactionOrchestrator, TransactionState, TransactionStatus,
};
