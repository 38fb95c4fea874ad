//! Retrieval engine: embed a live query, find its nearest historical
//! cases, and assemble the system prompt around them.
//!
//! Stateless — both operations borrow the index's query results for
//! the lifetime of one request and have no side effects.

use std::sync::Arc;

use tracing::debug;

use sales_copilot_core::embedding::Embedder;
use sales_copilot_core::index::CorpusIndex;
use sales_copilot_core::models::RetrievalResult;
use sales_copilot_core::prompt::{build_context, render_system_prompt};

use crate::error::{Error, Result};

/// Output of [`RetrievalEngine::build_prompt`]: the context-bearing
/// system prompt, the original query, and the raw results backing it.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub system_prompt: String,
    pub query: String,
    pub results: Vec<RetrievalResult>,
}

/// Embeds queries and turns corpus-index hits into prompts.
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn CorpusIndex>,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn CorpusIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve up to `k` similar cases, ordered by non-decreasing
    /// cosine distance. An empty or exhausted corpus yields fewer (or
    /// zero) results, never an error.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        if query.trim().is_empty() {
            return Err(Error::EmptyInput("query"));
        }
        if k < 1 {
            return Err(Error::InvalidArgument("k must be >= 1"));
        }

        let embedding = self
            .embedder
            .encode(query)
            .await
            .map_err(Error::Retrieval)?;

        let results = self
            .index
            .query(&embedding, k)
            .await
            .map_err(Error::Retrieval)?;

        debug!(
            collection = self.index.collection(),
            k,
            hits = results.len(),
            "retrieval complete"
        );
        Ok(results)
    }

    /// Retrieve similar cases and weave them into the system-prompt
    /// template. With no case data available the context section is
    /// empty and the template still renders.
    pub async fn build_prompt(&self, query: &str, k: usize) -> Result<BuiltPrompt> {
        let results = self.search(query, k).await?;
        let context = build_context(&results);

        Ok(BuiltPrompt {
            system_prompt: render_system_prompt(&context),
            query: query.to_string(),
            results,
        })
    }
}
