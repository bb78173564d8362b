//! Deterministic mocks for the ambient environment.
//!
//! Reducer and service tests need an environment they can control: a clock
//! that never moves, storage that lives in memory, and storage that always
//! fails. Everything here is cheap to clone and safe to share across the
//! tasks a store spawns.

// Test infrastructure uses unwrap for simplicity.
#![allow(clippy::unwrap_used)]

use spinshop_core::environment::Clock;
use spinshop_core::storage::{KeyValueStore, StorageError};
use spinshop_core::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

/// A clock that always returns the same instant.
///
/// Sale records carry timestamps from the environment clock; pinning the
/// clock makes those records byte-for-byte predictable.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// A [`FixedClock`] frozen at 2025-01-01T00:00:00Z.
///
/// Most tests do not care about the instant itself, only that it never
/// changes; this is the conventional one.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    let time = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc);
    FixedClock::new(time)
}

/// An in-memory [`KeyValueStore`].
///
/// Backed by a `HashMap` behind a lock, so clones share contents. Tests can
/// seed state before wiring the store into an environment, and inspect what
/// the code under test persisted afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry directly, bypassing the async trait surface.
    ///
    /// Useful for arranging pre-existing state, such as a persisted cart
    /// from a previous session.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().unwrap().insert(key.into(), value.into());
    }

    /// Returns the raw value stored under `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Whether an entry exists under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().unwrap().contains_key(key)
    }

    /// The number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Wraps the store in an `Arc<dyn KeyValueStore>` for environments.
    #[must_use]
    pub fn shared(self) -> Arc<dyn KeyValueStore> {
        Arc::new(self)
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StorageError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.entries.read().unwrap().get(&key).cloned()) })
    }

    fn put(
        &self,
        key: &str,
        value: String,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            self.entries.write().unwrap().insert(key, value);
            Ok(())
        })
    }

    fn remove(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            self.entries.write().unwrap().remove(&key);
            Ok(())
        })
    }
}

/// A [`KeyValueStore`] where every operation fails.
///
/// Simulates a storage outage: reads and writes all return
/// [`StorageError::Io`]. Used to verify that persistence failures surface as
/// technical errors instead of corrupting state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

impl FailingStore {
    /// Creates a store that fails every operation.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Wraps the store in an `Arc<dyn KeyValueStore>` for environments.
    #[must_use]
    pub fn shared(self) -> Arc<dyn KeyValueStore> {
        Arc::new(self)
    }

    fn outage() -> StorageError {
        StorageError::Io("simulated storage outage".to_string())
    }
}

impl KeyValueStore for FailingStore {
    fn get(
        &self,
        _key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StorageError>> + Send + '_>> {
        Box::pin(async move { Err(Self::outage()) })
    }

    fn put(
        &self,
        _key: &str,
        _value: String,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(async move { Err(Self::outage()) })
    }

    fn remove(
        &self,
        _key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        Box::pin(async move { Err(Self::outage()) })
    }
}
