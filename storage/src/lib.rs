//! # Spinshop Storage
//!
//! Durable local key-value storage backed by a single JSON file.
//!
//! This crate provides [`JsonFileStore`], the production implementation of
//! the `KeyValueStore` trait from `spinshop-core`. All entries live in one
//! JSON object on disk; every write rewrites the file through a temp-file
//! rename, so readers never observe a half-written document.
//!
//! The in-memory map is authoritative: reads come from memory, writes update
//! memory and then flush to disk while holding the store's lock. A file that
//! cannot be read at open time degrades to an empty store rather than
//! failing - a corrupt snapshot must not take the shop down.
//!
//! # Example
//!
//! ```ignore
//! use spinshop_storage::JsonFileStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = JsonFileStore::open("shop-data.json").await?;
//!     store.put("spinshop_cart", "[]".to_string()).await?;
//!     Ok(())
//! }
//! ```

use spinshop_core::storage::{KeyValueStore, StorageError};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Durable key-value store holding all entries in one JSON file.
///
/// Cloning is cheap and clones share the same underlying file and lock,
/// preserving the single-writer discipline.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open a store backed by the file at `path`, creating parent
    /// directories as needed.
    ///
    /// A missing file starts the store empty. An unreadable or malformed
    /// file is logged and also starts the store empty - the next write
    /// replaces it with a valid document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the parent directory cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        %error,
                        "Store file is malformed, starting empty"
                    );
                    HashMap::new()
                },
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "Store file is unreadable, starting empty"
                );
                HashMap::new()
            },
        };

        tracing::debug!(
            path = %path.display(),
            entry_count = entries.len(),
            "Opened store"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                entries: Mutex::new(entries),
            }),
        })
    }

    /// Convert into a shareable trait object for environment injection.
    #[must_use]
    pub fn shared(self) -> Arc<dyn KeyValueStore> {
        Arc::new(self)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Serialize the map and atomically replace the backing file.
    ///
    /// Called while holding the entries lock, so writes are serialized and
    /// each durable state corresponds to exactly one in-memory state.
    async fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let document = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.inner.path.with_extension("tmp");
        tokio::fs::write(&tmp, document)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.inner.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, StorageError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.inner.entries.lock().await.get(&key).cloned()) })
    }

    fn put(
        &self,
        key: &str,
        value: String,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self.inner.entries.lock().await;
            entries.insert(key.clone(), value);
            self.flush(&entries).await?;

            tracing::debug!(key, "Stored value");
            Ok(())
        })
    }

    fn remove(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), StorageError>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self.inner.entries.lock().await;
            if entries.remove(&key).is_none() {
                // Absent key: nothing to flush
                return Ok(());
            }
            self.flush(&entries).await?;

            tracing::debug!(key, "Removed value");
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("spinshop-store-{}.json", uuid::Uuid::new_v4()))
    }

    async fn cleanup(path: &Path) {
        let _ = tokio::fs::remove_file(path).await;
    }

    #[tokio::test]
    async fn roundtrips_values() {
        let path = temp_path();
        let store = JsonFileStore::open(&path).await.unwrap();

        assert_eq!(store.get("cart").await.unwrap(), None);

        store.put("cart", "[1,2]".to_string()).await.unwrap();
        assert_eq!(store.get("cart").await.unwrap(), Some("[1,2]".to_string()));

        store.remove("cart").await.unwrap();
        assert_eq!(store.get("cart").await.unwrap(), None);

        cleanup(&path).await;
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let path = temp_path();

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.put("cart", "[\"line\"]".to_string()).await.unwrap();
            store.put("sales", "[]".to_string()).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("cart").await.unwrap(),
            Some("[\"line\"]".to_string())
        );
        assert_eq!(reopened.get("sales").await.unwrap(), Some("[]".to_string()));

        cleanup(&path).await;
    }

    #[tokio::test]
    async fn malformed_file_starts_empty() {
        let path = temp_path();
        tokio::fs::write(&path, "{ not json at all").await.unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get("cart").await.unwrap(), None);

        // The next write replaces the malformed document with a valid one
        store.put("cart", "[]".to_string()).await.unwrap();
        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("cart").await.unwrap(), Some("[]".to_string()));

        cleanup(&path).await;
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("spinshop-store-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("data.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.put("key", "value".to_string()).await.unwrap();
        assert!(tokio::fs::try_exists(&path).await.unwrap());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn removing_absent_key_is_noop() {
        let path = temp_path();
        let store = JsonFileStore::open(&path).await.unwrap();

        store.remove("missing").await.unwrap();
        assert_eq!(store.get("missing").await.unwrap(), None);

        cleanup(&path).await;
    }

    #[tokio::test]
    async fn leaves_no_temp_file_behind() {
        let path = temp_path();
        let store = JsonFileStore::open(&path).await.unwrap();

        store.put("cart", "[]".to_string()).await.unwrap();

        let tmp = path.with_extension("tmp");
        assert!(!tokio::fs::try_exists(&tmp).await.unwrap());

        cleanup(&path).await;
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let path = temp_path();
        let store = JsonFileStore::open(&path).await.unwrap().shared();

        store.put("cart", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("cart").await.unwrap(), Some("[]".to_string()));

        cleanup(&path).await;
    }
}
