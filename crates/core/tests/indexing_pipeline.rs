//! Integration tests for the embedding ingestion pipeline
//!
//! Exercises the full ingest -> process_batch -> status flow against the
//! in-memory store with the deterministic hash embedder.

use artvector_core::{
    ArtVector, BatchProcessor, HashEmbedder, IngestRequest, MemoryStore, ObjectStore, RawRecord,
    ScopeFilter,
};
use serde_json::json;
use std::sync::Arc;

fn records(count: usize, prefix: &str) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let mut record = RawRecord::new();
            record.insert("ObjectID".to_string(), json!(format!("{}-{}", prefix, i)));
            record.insert("Title".to_string(), json!(format!("{} object {}", prefix, i)));
            record.insert("Medium".to_string(), json!("Bronze"));
            record
        })
        .collect()
}

fn ingest_request(name: &str, count: usize) -> IngestRequest {
    IngestRequest {
        name: name.to_string(),
        source_type: "json".to_string(),
        source_file: format!("{}.json", name),
        fields: None,
        records: records(count, name),
    }
}

fn service_over(store: Arc<MemoryStore>) -> ArtVector {
    ArtVector::new(store, Arc::new(HashEmbedder::new(32)))
}

#[tokio::test]
async fn test_500_objects_in_batches_of_128() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(Arc::clone(&store));

    let report = service.ingest(ingest_request("met", 500)).await.unwrap();
    assert_eq!(report.count, 500);

    let expected: [(u64, u64, bool); 4] = [
        (128, 372, false),
        (128, 244, false),
        (128, 116, false),
        (116, 0, true),
    ];
    for (embedded, remaining, done) in expected {
        let outcome = service.process_batch(128).await.unwrap();
        assert_eq!(outcome.embedded_this_batch, embedded);
        assert_eq!(outcome.remaining, remaining);
        assert_eq!(outcome.total, 500);
        assert_eq!(outcome.done, done);
    }

    let status = service.job_status().await.unwrap();
    assert_eq!(status.embedded, 500);
    assert_eq!(status.remaining, 0);
    assert_eq!(status.percent, 100.0);
}

#[tokio::test]
async fn test_no_object_embedded_twice() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(Arc::clone(&store));
    service.ingest(ingest_request("met", 20)).await.unwrap();

    let mut total_embedded = 0;
    loop {
        let outcome = service.process_batch(7).await.unwrap();
        total_embedded += outcome.embedded_this_batch;
        if outcome.done {
            break;
        }
    }
    assert_eq!(total_embedded, 20);

    // Extra calls after completion are no-ops
    let outcome = service.process_batch(7).await.unwrap();
    assert_eq!(outcome.embedded_this_batch, 0);
    assert!(outcome.done);

    // Every stored vector transitioned exactly once and stayed put
    let rows = store.fetch_embedded(&ScopeFilter::all()).await.unwrap();
    assert_eq!(rows.len(), 20);
}

#[tokio::test]
async fn test_concurrent_batches_never_double_embed() {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(service_over(Arc::clone(&store)));
    service.ingest(ingest_request("met", 60)).await.unwrap();

    // Several tasks drain the backlog concurrently; write-once semantics in
    // the store keep the sum of successful transitions exact
    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let mut embedded = 0;
            loop {
                let outcome = service.process_batch(16).await.unwrap();
                embedded += outcome.embedded_this_batch;
                if outcome.done {
                    break;
                }
            }
            embedded
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    assert_eq!(total, 60);
    assert_eq!(
        store.count_embedded(&ScopeFilter::all()).await.unwrap(),
        60
    );
}

#[tokio::test]
async fn test_job_status_invariant_at_every_step() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(Arc::clone(&store));
    service.ingest(ingest_request("met", 33)).await.unwrap();

    loop {
        let status = service.job_status().await.unwrap();
        assert_eq!(status.embedded + status.remaining, status.total);

        let outcome = service.process_batch(10).await.unwrap();
        if outcome.done {
            break;
        }
    }

    let status = service.job_status().await.unwrap();
    assert_eq!(status.embedded + status.remaining, status.total);
    assert_eq!(status.remaining, 0);
}

#[tokio::test]
async fn test_all_stored_vectors_unit_norm() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(Arc::clone(&store));
    service.ingest(ingest_request("met", 25)).await.unwrap();

    while !service.process_batch(8).await.unwrap().done {}

    for row in store.fetch_embedded(&ScopeFilter::all()).await.unwrap() {
        let norm: f32 = row.vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!(
            (norm - 1.0).abs() < 1e-5,
            "vector for {} has norm {}",
            row.uid,
            norm
        );
    }
}

#[tokio::test]
async fn test_restart_reproduces_state_from_store() {
    let store = Arc::new(MemoryStore::new());
    let service = service_over(Arc::clone(&store));
    service.ingest(ingest_request("met", 30)).await.unwrap();

    // Embed only part of the backlog, then "restart": throw the service
    // (and its in-memory caches) away and build a fresh one over the same
    // store
    service.process_batch(18).await.unwrap();
    let before: Vec<_> = store
        .fetch_embedded(&ScopeFilter::all())
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.uid, row.vector))
        .collect();
    drop(service);

    let revived = service_over(Arc::clone(&store));
    let status = revived.job_status().await.unwrap();
    assert_eq!(status.embedded, 18);
    assert_eq!(status.remaining, 12);

    let after: Vec<_> = store
        .fetch_embedded(&ScopeFilter::all())
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.uid, row.vector))
        .collect();
    assert_eq!(before, after);

    // The revived service picks up exactly where the old one stopped
    let outcome = revived.process_batch(128).await.unwrap();
    assert_eq!(outcome.embedded_this_batch, 12);
    assert!(outcome.done);
}

#[tokio::test]
async fn test_wrong_dimension_vectors_dead_letter() {
    use artvector_core::{EmbeddingError, EmbeddingProvider};
    use async_trait::async_trait;

    // A provider that produces a wrong-dimension vector for one specific
    // text and well-formed vectors for everything else
    struct GlitchyEmbedder {
        inner: HashEmbedder,
        poison: String,
    }

    #[async_trait]
    impl EmbeddingProvider for GlitchyEmbedder {
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.inner.embed(text).await
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let mut vectors = self.inner.embed_batch(texts).await?;
            for (text, vector) in texts.iter().zip(vectors.iter_mut()) {
                if text.contains(&self.poison) {
                    vector.push(0.0);
                }
            }
            Ok(vectors)
        }
    }

    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(GlitchyEmbedder {
        inner: HashEmbedder::new(8),
        poison: "object 2".to_string(),
    });
    let processor = BatchProcessor::new(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        provider,
    );

    let service = service_over(Arc::clone(&store));
    service.ingest(ingest_request("met", 4)).await.unwrap();

    let outcome = processor.process_batch(10).await.unwrap();
    // The poisoned object stays pending; the other three land
    assert_eq!(outcome.embedded_this_batch, 3);
    assert_eq!(outcome.remaining, 1);
    assert!(!outcome.done);
}
