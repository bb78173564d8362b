//! Key-value storage trait and related types.
//!
//! This module defines the core abstraction for the shop's durable local
//! storage - a small string-keyed store holding the cart snapshot and the
//! sales ledger.
//!
//! # Design
//!
//! The `KeyValueStore` trait is deliberately minimal. It provides exactly
//! what the shop needs:
//!
//! - Read a value by key (absent keys are `None`, not an error)
//! - Write a value under a key, replacing any previous value
//! - Remove a key
//!
//! Values are strings; callers decide the encoding (in practice JSON).
//!
//! # Implementations
//!
//! - `JsonFileStore` (in `spinshop-storage` crate): durable single-file store
//! - `InMemoryStore` / `FailingStore` (in `spinshop-testing` crate): fast,
//!   deterministic testing
//!
//! # Dyn Compatibility
//!
//! This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to enable trait object usage (`Arc<dyn KeyValueStore>`). This
//! is required for the effect system where reducers create effects that
//! capture the store.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying I/O failed (file unreadable, disk full, ...).
    #[error("I/O error: {0}")]
    Io(String),

    /// Stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Durable string key-value storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be safely used in async contexts
/// and shared across threads.
///
/// # Semantics
///
/// - `get` on an absent key returns `Ok(None)`.
/// - `put` replaces atomically: readers never observe a half-written value.
/// - `remove` on an absent key is a no-op and returns `Ok(())`.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// - `Io`: the backing medium could not be read
    fn get(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StorageError>> + Send + '_>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// The write is durable when the returned future resolves `Ok`.
    ///
    /// # Errors
    ///
    /// - `Io`: the backing medium could not be written
    /// - `Serialization`: the store document could not be encoded
    fn put(
        &self,
        key: &str,
        value: String,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;

    /// Remove `key` and its value, if present.
    ///
    /// # Errors
    ///
    /// - `Io`: the backing medium could not be written
    /// - `Serialization`: the store document could not be encoded
    fn remove(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>>;
}
