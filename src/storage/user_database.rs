// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded credential database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized [`User`] (JSON bytes)
//! - `users_by_email`: email → user id (uniqueness index)
//! - `sequences`: name → last allocated value

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::users::{NewUser, StoreError, StoreResult, User, UserStore};

// =============================================================================
// Table Definitions
// =============================================================================

const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

const USERS_BY_EMAIL: TableDefinition<&str, u64> = TableDefinition::new("users_by_email");

const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const USER_ID_SEQUENCE: &str = "user_id";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UserDbError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("failed to create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("email already registered: {0}")]
    Duplicate(String),
}

impl From<UserDbError> for StoreError {
    fn from(e: UserDbError) -> Self {
        match e {
            UserDbError::Duplicate(email) => StoreError::Duplicate(email),
            UserDbError::Serde(e) => StoreError::Corrupt(e.to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

type UserDbResult<T> = Result<T, UserDbError>;

// =============================================================================
// UserDatabase
// =============================================================================

/// Persistent user store.
pub struct UserDatabase {
    db: Database,
}

impl UserDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_inner(path).map_err(StoreError::from)
    }

    fn open_inner(path: &Path) -> UserDbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "User database opened");
        Ok(Self { db })
    }

    fn get_by_id(&self, id: u64) -> UserDbResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_by_email(&self, email: &str) -> UserDbResult<Option<User>> {
        let id = {
            let read_txn = self.db.begin_read()?;
            let index = read_txn.open_table(USERS_BY_EMAIL)?;
            let found = index.get(email)?.map(|v| v.value());
            found
        };
        match id {
            Some(id) => self.get_by_id(id),
            None => Ok(None),
        }
    }

    fn insert(&self, new_user: NewUser) -> UserDbResult<u64> {
        let write_txn = self.db.begin_write()?;
        let id = {
            let mut index = write_txn.open_table(USERS_BY_EMAIL)?;
            if index.get(new_user.email.as_str())?.is_some() {
                return Err(UserDbError::Duplicate(new_user.email));
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let last = sequences
                .get(USER_ID_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0);
            let id = last + 1;
            sequences.insert(USER_ID_SEQUENCE, id)?;

            let user = User {
                id,
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
            };
            let json = serde_json::to_vec(&user)?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, json.as_slice())?;
            index.insert(user.email.as_str(), id)?;
            id
        };
        write_txn.commit()?;
        Ok(id)
    }
}

impl UserStore for UserDatabase {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.get_by_email(email)?)
    }

    fn find_by_id(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.get_by_id(id)?)
    }

    fn create(&self, user: NewUser) -> StoreResult<u64> {
        Ok(self.insert(user)?)
    }
}
