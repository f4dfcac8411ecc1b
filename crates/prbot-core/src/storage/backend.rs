//! Key-value backend trait definition

use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;

/// Mutation applied by [`KeyValueStore::update`]. Receives the current value
/// (if any) and returns the value to store.
pub type UpdateFn = Box<dyn FnOnce(Option<Value>) -> BotResult<Value> + Send>;

/// Persisted get/set collaborator
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> BotResult<Option<Value>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: Value) -> BotResult<()>;

    /// Remove `key`, returning whether it existed
    async fn delete(&self, key: &str) -> BotResult<bool>;

    /// Read-modify-write of a single key.
    ///
    /// The default is three separate calls and may lose updates when several
    /// writers race. Backends override it to hold their own lock across the
    /// whole cycle.
    async fn update(&self, key: &str, f: UpdateFn) -> BotResult<Value> {
        let current = self.get(key).await?;
        let next = f(current)?;
        self.set(key, next.clone()).await?;
        Ok(next)
    }
}

/// Get a typed value from the store
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> BotResult<Option<T>> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| BotError::storage_for_key(format!("malformed record: {}", e), key)),
        None => Ok(None),
    }
}

/// Store a typed value
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> BotResult<()> {
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}

/// Typed read-modify-write through [`KeyValueStore::update`]. A missing key
/// starts from `T::default()`; an error from `f` aborts without writing.
pub async fn update_json<T, F>(store: &dyn KeyValueStore, key: &str, f: F) -> BotResult<T>
where
    T: Serialize + DeserializeOwned + Default + Send + 'static,
    F: FnOnce(&mut T) -> BotResult<()> + Send + 'static,
{
    let (record, ()) = update_json_with(store, key, f).await?;
    Ok(record)
}

/// Like [`update_json`], also returning what `f` computed from the record
pub async fn update_json_with<T, R, F>(
    store: &dyn KeyValueStore,
    key: &str,
    f: F,
) -> BotResult<(T, R)>
where
    T: Serialize + DeserializeOwned + Default + Send + 'static,
    R: Send + 'static,
    F: FnOnce(&mut T) -> BotResult<R> + Send + 'static,
{
    let owned_key = key.to_string();
    let (output_tx, mut output_rx) = oneshot::channel();
    let next = store
        .update(
            key,
            Box::new(move |current| {
                let mut record: T = match current {
                    Some(value) => serde_json::from_value(value).map_err(|e| {
                        BotError::storage_for_key(format!("malformed record: {}", e), owned_key)
                    })?,
                    None => T::default(),
                };
                let output = f(&mut record)?;
                let _ = output_tx.send(output);
                Ok(serde_json::to_value(&record)?)
            }),
        )
        .await?;

    let output = output_rx
        .try_recv()
        .map_err(|_| BotError::storage_for_key("store skipped the update", key))?;
    Ok((serde_json::from_value(next)?, output))
}
