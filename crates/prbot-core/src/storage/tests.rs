//! Storage backend tests

#[cfg(test)]
mod tests {
    use crate::storage::{
        JsonFileStore, KeyValueStore, MemoryStore, get_json, set_json, update_json,
        update_json_with,
    };
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    #[tokio::test]
    async fn test_memory_get_set_delete() {
        let store = MemoryStore::new();
        assert!(store.get("missing").await.unwrap().is_none());

        store.set("k", json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.len().await, 1);

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let store = MemoryStore::new();
        set_json(&store, "counter", &Counter { hits: 3 }).await.unwrap();
        let loaded: Option<Counter> = get_json(&store, "counter").await.unwrap();
        assert_eq!(loaded, Some(Counter { hits: 3 }));

        let missing: Option<Counter> = get_json(&store, "nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_malformed_record_is_storage_error() {
        let store = MemoryStore::new();
        store.set("counter", json!("not an object")).await.unwrap();
        let result: Result<Option<Counter>, _> = get_json(&store, "counter").await;
        assert_eq!(result.unwrap_err().error_code(), "PRBOT_STORAGE");
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_writes() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                update_json::<Counter, _>(store.as_ref(), "counter", |c| {
                    c.hits += 1;
                    Ok(())
                })
                .await
                .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let counter: Counter = get_json(store.as_ref(), "counter").await.unwrap().unwrap();
        assert_eq!(counter.hits, 20);
    }

    #[tokio::test]
    async fn test_json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        {
            let store = JsonFileStore::new(&path);
            store.set("alpha", json!([1, 2, 3])).await.unwrap();
            store.set("beta", json!({"x": true})).await.unwrap();
        }

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("alpha").await.unwrap(), Some(json!([1, 2, 3])));
        assert!(reopened.delete("beta").await.unwrap());
        assert!(reopened.get("beta").await.unwrap().is_none());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_json_file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.get("anything").await.unwrap().is_none());
        assert!(!store.delete("anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_json_file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1,2]").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.get("k").await.is_err());
    }

    #[tokio::test]
    async fn test_json_file_store_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        for _ in 0..3 {
            update_json::<Counter, _>(&store, "counter", |c| {
                c.hits += 2;
                Ok(())
            })
            .await
            .unwrap();
        }
        let counter: Counter = get_json(&store, "counter").await.unwrap().unwrap();
        assert_eq!(counter.hits, 6);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_value_untouched() {
        let store = MemoryStore::new();
        set_json(&store, "counter", &Counter { hits: 1 }).await.unwrap();

        let result = update_json::<Counter, _>(&store, "counter", |c| {
            c.hits = 99;
            Err(crate::error::BotError::invalid_input("rejected"))
        })
        .await;

        assert!(result.is_err());
        let counter: Counter = get_json(&store, "counter").await.unwrap().unwrap();
        assert_eq!(counter.hits, 1);
    }

    #[tokio::test]
    async fn test_update_with_returns_closure_output() {
        let store = MemoryStore::new();
        set_json(&store, "counter", &Counter { hits: 4 }).await.unwrap();

        let (counter, previous) = update_json_with::<Counter, _, _>(&store, "counter", |c| {
            let previous = c.hits;
            c.hits += 1;
            Ok(previous)
        })
        .await
        .unwrap();

        assert_eq!(previous, 4);
        assert_eq!(counter.hits, 5);
        let stored: Counter = get_json(&store, "counter").await.unwrap().unwrap();
        assert_eq!(stored.hits, 5);
    }
}
