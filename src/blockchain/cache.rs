// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for confirmed transaction statuses.
//!
//! A mined receipt never changes, so repeated status polls for the same hash
//! are answered without another node round trip. Pending results are never
//! stored.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use super::orchestrator::{TransactionState, TransactionStatus};

/// Default number of receipts kept.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default time-to-live for a cached receipt.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct CacheEntry {
    status: TransactionStatus,
    inserted_at: Instant,
}

pub struct ReceiptCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ReceiptCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Cached status for a hash, `None` if absent or expired.
    pub fn get(&self, tx_hash: &str) -> Option<TransactionStatus> {
        let key = tx_hash.to_lowercase();
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.status.clone());
            }
            cache.pop(&key);
        }
        None
    }

    /// Store a confirmed status. Pending statuses are ignored.
    pub fn put(&self, tx_hash: &str, status: &TransactionStatus) {
        if status.status != TransactionState::Confirmed {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                tx_hash.to_lowercase(),
                CacheEntry {
                    status: status.clone(),
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReceiptCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
