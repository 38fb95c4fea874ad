//! Corpus index abstraction.
//!
//! The [`CorpusIndex`] trait defines the operations the retrieval
//! pipeline needs from a persisted, named collection of embedded
//! documents, enabling pluggable backends (SQLite, in-memory). One
//! interface serves both turn-level and conversation-level documents;
//! the granularity lives in the stored metadata, not the schema.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{IndexedDocument, RetrievalResult};

/// Abstract storage backend for the dialogue corpus.
///
/// A value of this trait represents one open collection. The similarity
/// metric is fixed at collection creation (cosine throughout this
/// system); changing metric requires a new collection.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add`](CorpusIndex::add) | Insert a batch of documents with their vectors |
/// | [`query`](CorpusIndex::query) | Nearest-neighbor search by cosine distance |
/// | [`count`](CorpusIndex::count) | Number of stored documents |
#[async_trait]
pub trait CorpusIndex: Send + Sync {
    /// Name of the collection this index serves.
    fn collection(&self) -> &str;

    /// Add documents and their embedding vectors.
    ///
    /// `docs` and `vectors` must have the same length. A duplicate id,
    /// whether already stored or repeated within the batch, is an
    /// error (no upsert semantics), and on any error nothing from the
    /// call is stored.
    async fn add(&self, docs: &[IndexedDocument], vectors: &[Vec<f32>]) -> Result<()>;

    /// Return up to `k` nearest neighbors of `embedding`, ordered by
    /// non-decreasing cosine distance. When the collection holds fewer
    /// than `k` documents, all of them are returned.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievalResult>>;

    /// Number of documents in the collection.
    async fn count(&self) -> Result<usize>;
}
