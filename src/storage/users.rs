// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User records and the credential store interface.
//!
//! ## Security
//!
//! - `User` carries the password hash and is never serialized outward
//! - Every outward-facing read goes through [`SanitizedUser`]

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity record as persisted by the credential store.
///
/// Deliberately not `Serialize` into API payloads; use [`SanitizedUser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key assigned by the store (starts at 1)
    pub id: u64,
    pub name: String,
    /// Unique across the store
    pub email: String,
    /// Opaque password hash (PHC string)
    pub password_hash: String,
}

/// Values needed to create a user. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User view returned to API clients (never includes the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SanitizedUser {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl From<User> for SanitizedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<&User> for SanitizedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Credential store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt user record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence interface for user records.
///
/// Lookups return `Ok(None)` for unknown users; errors are reserved for
/// backend failures.
pub trait UserStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    fn find_by_id(&self, id: u64) -> StoreResult<Option<User>>;

    /// Insert a user and return the assigned id.
    ///
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    fn create(&self, user: NewUser) -> StoreResult<u64>;

    /// Cheap liveness probe used by the readiness endpoint.
    fn health_check(&self) -> StoreResult<()> {
        self.find_by_id(0).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_user_drops_password_hash() {
        let user = User {
            id: 7,
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
        };

        let sanitized = SanitizedUser::from(&user);
        let json = serde_json::to_value(&sanitized).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "jane@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
