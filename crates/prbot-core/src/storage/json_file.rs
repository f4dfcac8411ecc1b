//! Single-document JSON file backend

use super::backend::{KeyValueStore, UpdateFn};
use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Stores every key in one JSON object on disk.
///
/// Writes go to a sibling temp file and are renamed into place, so a crash
/// mid-write leaves the previous document intact. The internal lock makes
/// `update` atomic within one process; separate processes sharing the file
/// can still interleave.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> BotResult<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(BotError::io_with_path(
                    e.to_string(),
                    self.path.display().to_string(),
                ));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(BotError::storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> BotResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(document)?;
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = document.len(), "state file written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> BotResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> BotResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value);
        self.write_document(&document).await
    }

    async fn delete(&self, key: &str) -> BotResult<bool> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let existed = document.remove(key).is_some();
        if existed {
            self.write_document(&document).await?;
        }
        Ok(existed)
    }

    async fn update(&self, key: &str, f: UpdateFn) -> BotResult<Value> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let next = f(document.get(key).cloned())?;
        document.insert(key.to_string(), next.clone());
        self.write_document(&document).await?;
        Ok(next)
    }
}
