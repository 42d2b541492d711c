//! Local fallback cart.
//!
//! When the host's cart capability is unreachable, added items are appended
//! to a JSON array stored under one key in [`LocalStorage`]. Entries have the
//! `{ id, name, price, image }` payload shape with no quantity, so adding the
//! same product twice stores two entries. Nothing reads this collection back
//! into the shared store.

use std::sync::Arc;

use product_app_core::CartItemPayload;
use tokio::sync::Mutex;

use crate::storage::{LocalStorage, StorageError};

/// The fallback collection stored under one storage key.
pub struct FallbackCart {
    storage: Arc<dyn LocalStorage>,
    key: String,
    // Serializes read-modify-write within this process only
    write_lock: Mutex<()>,
}

impl FallbackCart {
    #[must_use]
    pub fn new(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Read the stored entries.
    ///
    /// An absent key or a value that is not a JSON array of entries reads as
    /// an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the underlying store cannot be read.
    pub async fn load(&self) -> Result<Vec<CartItemPayload>, StorageError> {
        let Some(raw) = self.storage.get_item(&self.key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<CartItemPayload>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Malformed fallback cart, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Append one entry and write the whole collection back.
    ///
    /// Returns the number of entries now stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or written.
    pub async fn append(&self, item: CartItemPayload) -> Result<usize, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        entries.push(item);

        let encoded = serde_json::to_string(&entries)?;
        self.storage.set_item(&self.key, &encoded).await?;
        Ok(entries.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use product_app_core::{Price, ProductId};

    use super::*;
    use crate::storage::MemoryStorage;

    fn shirt() -> CartItemPayload {
        CartItemPayload {
            id: ProductId::new(7),
            name: "Shirt".to_string(),
            price: Price::from_cents(1999),
            image: "shirt.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_absent_key_reads_empty() {
        let fallback = FallbackCart::new(Arc::new(MemoryStorage::new()), "cart");
        assert!(fallback.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_value_reads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        for raw in ["not json", r#"{"id": 7}"#, r#"[{"id": "x"}]"#] {
            storage.set_item("cart", raw).await.unwrap();
            let fallback = FallbackCart::new(storage.clone(), "cart");
            assert!(fallback.load().await.unwrap().is_empty(), "{raw} should read empty");
        }
    }

    #[tokio::test]
    async fn test_append_over_malformed_value_replaces_it() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("cart", "garbage").await.unwrap();
        let fallback = FallbackCart::new(storage.clone(), "cart");

        assert_eq!(fallback.append(shirt()).await.unwrap(), 1);
        assert_eq!(fallback.load().await.unwrap(), vec![shirt()]);
    }

    #[tokio::test]
    async fn test_repeated_append_duplicates_entries() {
        let storage = Arc::new(MemoryStorage::new());
        let fallback = FallbackCart::new(storage.clone(), "cart");

        fallback.append(shirt()).await.unwrap();
        fallback.append(shirt()).await.unwrap();

        assert_eq!(fallback.load().await.unwrap(), vec![shirt(), shirt()]);

        let raw = storage.get_item("cart").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": 7, "name": "Shirt", "price": 19.99, "image": "shirt.png"},
                {"id": 7, "name": "Shirt", "price": 19.99, "image": "shirt.png"}
            ])
        );
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let fallback = Arc::new(FallbackCart::new(Arc::new(MemoryStorage::new()), "cart"));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let fallback = fallback.clone();
                tokio::spawn(async move { fallback.append(shirt()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(fallback.load().await.unwrap().len(), 8);
    }
}
