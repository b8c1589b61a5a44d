// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory credential store.
//!
//! Used by tests and local experiments; records are lost on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::users::{NewUser, StoreError, StoreResult, User, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<u64, User>,
    by_email: HashMap<String, u64>,
    next_id: u64,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
    creates: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `create` calls received, successful or not.
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("in-memory store lock poisoned".to_string())
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: u64) -> StoreResult<Option<User>> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.users.get(&id).cloned())
    }

    fn create(&self, user: NewUser) -> StoreResult<u64> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        if inner.by_email.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.by_email.insert(user.email.clone(), id);
        inner.users.insert(
            id,
            User {
                id,
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
            },
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_lookup() {
        let store = InMemoryUserStore::new();
        let id = store
            .create(NewUser {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password_hash: "h".to_string(),
            })
            .unwrap();

        assert_eq!(id, 1);
        assert_eq!(store.find_by_id(1).unwrap().unwrap().email, "bob@example.com");
        assert_eq!(store.find_by_email("bob@example.com").unwrap().unwrap().id, 1);
        assert_eq!(store.create_calls(), 1);
    }
}
