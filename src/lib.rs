// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CID Anchor - authenticated IPFS and smart contract broker
//!
//! Registers and authenticates users, pushes uploads to an IPFS node and
//! anchors the resulting content identifiers in a pre-deployed storage
//! contract signed by one service account.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Accounts, password hashing and bearer tokens
//! - `blockchain` - Contract client, transaction orchestration, metadata decoding
//! - `ipfs` - IPFS HTTP API bridge
//! - `storage` - Credential store (redb)

pub mod api;
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod ipfs;
pub mod logging;
pub mod state;
pub mod storage;
