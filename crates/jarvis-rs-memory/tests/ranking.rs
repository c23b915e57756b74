use jarvis_rs_memory::{MemoryProvider, MemoryRecord, VectorMemoryProvider};
use jarvis_rs_test_utils::FixedEmbedder;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn embedder() -> FixedEmbedder {
    FixedEmbedder::new(vec![0.0, 0.0, 1.0])
        .with("rust answer", vec![1.0, 0.0, 0.0])
        .with("python answer", vec![0.0, 1.0, 0.0])
        .with("mixed answer", vec![0.7, 0.7, 0.0])
        .with("rust question", vec![0.9, 0.1, 0.0])
}

#[tokio::test]
async fn query_orders_by_cosine_similarity() {
    let store = VectorMemoryProvider::in_memory(Arc::new(embedder()));
    for (prompt, text) in [
        ("p1", "python answer"),
        ("p2", "rust answer"),
        ("p3", "mixed answer"),
    ] {
        store
            .upsert(MemoryRecord::new(prompt, text))
            .await
            .expect("upsert");
    }

    let matches = store.query("rust question", 3).await.expect("query");
    let texts: Vec<&str> = matches.iter().map(|m| m.record.text.as_str()).collect();
    assert_eq!(texts, vec!["rust answer", "mixed answer", "python answer"]);
}

#[tokio::test]
async fn equal_scores_break_ties_by_id() {
    let store = VectorMemoryProvider::in_memory(Arc::new(FixedEmbedder::new(vec![1.0, 0.0])));
    let first = MemoryRecord::new("one", "same");
    let second = MemoryRecord::new("two", "same too");
    let mut expected = vec![first.id.clone(), second.id.clone()];
    expected.sort();
    store.upsert(first).await.expect("upsert");
    store.upsert(second).await.expect("upsert");

    let matches = store.query("anything", 2).await.expect("query");
    let ids: Vec<String> = matches.into_iter().map(|m| m.record.id).collect();
    assert_eq!(ids, expected);
}
