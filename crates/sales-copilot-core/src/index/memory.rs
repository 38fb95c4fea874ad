//! In-memory [`CorpusIndex`] implementation for testing and small
//! corpora.
//!
//! Uses a `Vec` behind `std::sync::RwLock` for thread safety. Queries
//! are brute-force cosine distance over all stored vectors; ties keep
//! insertion order (stable sort).

use std::collections::HashSet;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_distance;
use crate::models::{IndexedDocument, RetrievalResult};

use super::CorpusIndex;

struct StoredRecord {
    doc: IndexedDocument,
    vector: Vec<f32>,
}

/// In-memory corpus index.
pub struct InMemoryIndex {
    name: String,
    records: RwLock<Vec<StoredRecord>>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CorpusIndex for InMemoryIndex {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn add(&self, docs: &[IndexedDocument], vectors: &[Vec<f32>]) -> Result<()> {
        if docs.len() != vectors.len() {
            bail!(
                "documents/vectors length mismatch: {} vs {}",
                docs.len(),
                vectors.len()
            );
        }

        let mut records = self.records.write().unwrap();

        // Validate the whole batch before storing anything, so a
        // duplicate id rejects the call without partial writes.
        let mut seen: HashSet<&str> = records.iter().map(|r| r.doc.id.as_str()).collect();
        for doc in docs {
            if !seen.insert(&doc.id) {
                bail!(
                    "document id '{}' already exists in collection '{}'",
                    doc.id,
                    self.name
                );
            }
        }

        for (doc, vector) in docs.iter().zip(vectors.iter()) {
            records.push(StoredRecord {
                doc: doc.clone(),
                vector: vector.clone(),
            });
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
        let records = self.records.read().unwrap();

        let mut results: Vec<RetrievalResult> = records
            .iter()
            .map(|r| RetrievalResult {
                document: r.doc.text.clone(),
                metadata: r.doc.metadata.clone(),
                distance: cosine_distance(embedding, &r.vector),
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().unwrap().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaseMetadata;

    fn doc(id: &str, text: &str) -> IndexedDocument {
        IndexedDocument {
            id: id.to_string(),
            text: text.to_string(),
            metadata: CaseMetadata {
                product: "TWS耳机".to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_query_returns_min_k_n() {
        let index = InMemoryIndex::new("dialogues");
        index
            .add(
                &[doc("doc_0", "a"), doc("doc_1", "b")],
                &[vec![1.0, 0.0], vec![0.0, 1.0]],
            )
            .await
            .unwrap();

        assert_eq!(index.query(&[1.0, 0.0], 1).await.unwrap().len(), 1);
        // k larger than corpus returns everything, not an error.
        assert_eq!(index.query(&[1.0, 0.0], 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_empty_corpus() {
        let index = InMemoryIndex::new("dialogues");
        assert!(index.query(&[1.0, 0.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_ordered_by_distance() {
        let index = InMemoryIndex::new("dialogues");
        index
            .add(
                &[doc("far", "far"), doc("near", "near")],
                &[vec![0.0, 1.0], vec![1.0, 0.1]],
            )
            .await
            .unwrap();

        let results = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].document, "near");
        assert!(results[0].distance <= results[1].distance);
    }

    #[tokio::test]
    async fn test_self_query_roundtrip() {
        let index = InMemoryIndex::new("dialogues");
        let vector = vec![0.3, -1.2, 0.7];
        index.add(&[doc("doc_0", "自查")], &[vector.clone()]).await.unwrap();

        let results = index.query(&vector, 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].distance.abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected_without_partial_write() {
        let index = InMemoryIndex::new("dialogues");
        index
            .add(&[doc("doc_0", "a")], &[vec![1.0, 0.0]])
            .await
            .unwrap();

        let err = index
            .add(
                &[doc("doc_1", "b"), doc("doc_0", "dup")],
                &[vec![0.0, 1.0], vec![1.0, 1.0]],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("doc_0"));

        // Nothing from the failed batch landed.
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_length_mismatch_rejected() {
        let index = InMemoryIndex::new("dialogues");
        let err = index.add(&[doc("doc_0", "a")], &[]).await.unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }
}
