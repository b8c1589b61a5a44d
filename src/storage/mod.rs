// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Storage
//!
//! User records live behind the [`UserStore`] trait so the Auth Service never
//! depends on a concrete backend.
//!
//! - [`UserDatabase`]: embedded redb file under `DATA_DIR`
//! - [`InMemoryUserStore`]: process-local map for tests
//!
//! ## Storage Layout
//!
//! ```text
//! DATA_DIR/
//!   users.redb      # users, users_by_email, sequences tables
//! ```

pub mod memory;
pub mod user_database;
pub mod users;

pub use memory::InMemoryUserStore;
pub use user_database::UserDatabase;
pub use users::{NewUser, SanitizedUser, StoreError, StoreResult, User, UserStore};
