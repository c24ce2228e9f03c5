//! Tests for retrieval ranking.

use super::{normalize, sample_chunk, sample_source};
use crate::store::SqliteIndex;
use crate::vector_index::VectorIndex;
use tempfile::TempDir;

fn store_with(temp: &TempDir, vectors: &[(&str, Vec<f32>)]) -> SqliteIndex {
    let dims = vectors.first().map(|(_, v)| v.len()).unwrap_or(3);
    let mut index = SqliteIndex::create(temp.path(), "test-model", dims, false).unwrap();

    let chunks: Vec<_> = vectors
        .iter()
        .enumerate()
        .map(|(i, (text, _))| sample_chunk(i as u32, 0, text))
        .collect();
    let embeddings: Vec<_> = vectors.iter().map(|(_, v)| normalize(v)).collect();

    index
        .insert_document(&sample_source("source1", chunks.len() as u32), &chunks, &embeddings)
        .unwrap();
    index
}

#[test]
fn test_relevant_query_ranks_first() {
    let temp = TempDir::new().unwrap();
    let index = store_with(
        &temp,
        &[
            ("Cooking recipes for pasta", vec![-0.3, -0.8, 0.4, -0.2]),
            ("Profiles are edited under Settings", vec![1.0, 0.5, 0.2, 0.1]),
        ],
    );

    let results = index.search(&normalize(&[0.9, 0.4, 0.3, 0.1]), 5).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, "Profiles are edited under Settings");
    assert!(results[0].score > 0.8, "score: {}", results[0].score);
    assert!(results[0].score > results[1].score);
}

#[test]
fn test_scores_are_ordered_descending() {
    let temp = TempDir::new().unwrap();
    let index = store_with(
        &temp,
        &[
            ("Text D", vec![-1.0, 0.0, 0.0]),
            ("Text B", vec![0.7, 0.7, 0.0]),
            ("Text A", vec![1.0, 0.0, 0.0]),
            ("Text C", vec![0.0, 1.0, 0.0]),
        ],
    );

    let results = index.search(&[1.0, 0.0, 0.0], 10).unwrap();

    let order: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(order, vec!["Text A", "Text B", "Text C", "Text D"]);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(results[0].score > 0.99);
}

#[test]
fn test_no_relevance_threshold() {
    let temp = TempDir::new().unwrap();
    let index = store_with(&temp, &[("Opposite content", vec![-1.0, 0.0, 0.0])]);

    let results = index.search(&[1.0, 0.0, 0.0], 4).unwrap();

    // Even a chunk pointing the other way is returned
    assert_eq!(results.len(), 1);
    assert!(results[0].score < -0.9);
}

#[test]
fn test_top_k_limit_respected() {
    let temp = TempDir::new().unwrap();
    let texts: Vec<String> = (0..10).map(|i| format!("Text {i}")).collect();
    let vectors: Vec<(&str, Vec<f32>)> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), vec![1.0, i as f32 / 10.0, 0.0]))
        .collect();
    let index = store_with(&temp, &vectors);

    let results = index.search(&[1.0, 0.0, 0.0], 4).unwrap();

    assert_eq!(results.len(), 4);
    let order: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(order, vec!["Text 0", "Text 1", "Text 2", "Text 3"]);
}

#[test]
fn test_fewer_chunks_than_k() {
    let temp = TempDir::new().unwrap();
    let index = store_with(&temp, &[("Only chunk", vec![0.0, 1.0, 0.0])]);

    assert_eq!(index.search(&[0.0, 1.0, 0.0], 4).unwrap().len(), 1);
}

#[test]
fn test_query_dimension_mismatch() {
    let temp = TempDir::new().unwrap();
    let index = store_with(&temp, &[("Only chunk", vec![0.0, 1.0, 0.0])]);

    assert!(index.search(&[1.0, 0.0], 4).is_err());
}
