use jarvis_rs_memory::{HashingEmbedder, MemoryProvider, MemoryRecord, VectorMemoryProvider, record_id};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn records_survive_reopen() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("memory").join("records.jsonl");
    let embedder = Arc::new(HashingEmbedder::new(96));

    let store = VectorMemoryProvider::open(&path, embedder.clone())
        .await
        .expect("open");
    store
        .upsert(MemoryRecord::new("capital of France?", "Paris."))
        .await
        .expect("upsert");
    store
        .upsert(MemoryRecord::new("capital of Italy?", "Rome."))
        .await
        .expect("upsert");
    drop(store);

    let reopened = VectorMemoryProvider::open(&path, embedder)
        .await
        .expect("reopen");
    assert_eq!(reopened.count().await.expect("count"), 2);
    let ids: Vec<String> = reopened.records().into_iter().map(|r| r.id).collect();
    assert!(ids.contains(&record_id("capital of France?")));

    let matches = reopened.query("Rome", 1).await.expect("query");
    assert_eq!(matches[0].record.text, "Rome.");
}

#[tokio::test]
async fn persisted_file_has_one_line_per_record() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("records.jsonl");
    let store = VectorMemoryProvider::open(&path, Arc::new(HashingEmbedder::new(32)))
        .await
        .expect("open");
    for _ in 0..3 {
        store
            .upsert(MemoryRecord::new("same prompt", "same answer"))
            .await
            .expect("upsert");
    }
    let contents = std::fs::read_to_string(&path).expect("read");
    assert_eq!(contents.lines().count(), 1);
    assert!(!temp.path().join("records.jsonl.tmp").exists());
}

#[tokio::test]
async fn concurrent_saves_for_different_prompts_are_kept() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("records.jsonl");
    let store = Arc::new(
        VectorMemoryProvider::open(&path, Arc::new(HashingEmbedder::new(32)))
            .await
            .expect("open"),
    );
    let mut handles = Vec::new();
    for idx in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .upsert(MemoryRecord::new(&format!("prompt {idx}"), format!("answer {idx}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("upsert");
    }
    assert_eq!(store.count().await.expect("count"), 16);
    let contents = std::fs::read_to_string(&path).expect("read");
    assert_eq!(contents.lines().count(), 16);
}

#[tokio::test]
async fn failed_write_leaves_store_unchanged() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("mem.jsonl");
    let store = VectorMemoryProvider::open(&path, Arc::new(HashingEmbedder::new(32)))
        .await
        .expect("open");
    let blocker = temp.path().join("mem.jsonl.tmp");
    std::fs::create_dir(&blocker).expect("block temp file");

    let result = store
        .upsert(MemoryRecord::new("capital of France?", "Paris."))
        .await;
    assert!(result.is_err());
    assert_eq!(store.count().await.expect("count"), 0);
    assert!(store.query("Paris", 3).await.expect("query").is_empty());
    assert!(!path.exists());

    std::fs::remove_dir(&blocker).expect("unblock");
    store
        .upsert(MemoryRecord::new("capital of France?", "Paris."))
        .await
        .expect("upsert");
    assert_eq!(store.count().await.expect("count"), 1);
    let contents = std::fs::read_to_string(&path).expect("read");
    assert_eq!(contents.lines().count(), 1);
}
