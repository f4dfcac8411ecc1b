//! Persisted key-value state
//!
//! The working-task registry and task status records live behind the
//! [`KeyValueStore`] trait so the bot can run against any document store.
//! Two backends ship with the crate:
//! - [`MemoryStore`] for tests and ephemeral runs
//! - [`JsonFileStore`], a single JSON document on disk that survives restarts

mod backend;
mod json_file;
mod memory;

#[cfg(test)]
mod tests;

pub use backend::{KeyValueStore, UpdateFn, get_json, set_json, update_json, update_json_with};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
