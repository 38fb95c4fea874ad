//! Application context: one fully-wired copilot instance.
//!
//! `SalesCopilot::init` performs all of the startup work (database,
//! schema, embedding probe, collection open) and fails fast if any
//! dependency is unusable. `SalesCopilot::global` memoizes one
//! instance for callers that want process-wide sharing.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::OnceCell;
use tracing::info;

use sales_copilot_core::embedding::Embedder;
use sales_copilot_core::index::CorpusIndex;
use sales_copilot_core::models::RetrievalResult;

use crate::config::Config;
use crate::db;
use crate::embedding::OllamaEmbedder;
use crate::error::{Error, Result};
use crate::generate::{Orchestrator, StreamEvent};
use crate::llm::GenerationClient;
use crate::retrieval::{BuiltPrompt, RetrievalEngine};
use crate::sqlite_index::SqliteIndex;

static GLOBAL: OnceCell<Arc<SalesCopilot>> = OnceCell::const_new();

/// Fully-initialized copilot: retrieval engine plus orchestrator,
/// sharing one corpus index and embedding provider.
pub struct SalesCopilot {
    engine: RetrievalEngine,
    orchestrator: Arc<Orchestrator>,
    top_k: usize,
}

impl SalesCopilot {
    /// Initialize every dependency or fail with [`Error::Init`].
    ///
    /// Opens the database, runs migrations, probes the embedding
    /// model, and opens the configured collection. Nothing is retried;
    /// a broken dependency at startup is fatal.
    pub async fn init(config: &Config) -> Result<Self> {
        let pool = db::connect(&config.db)
            .await
            .map_err(|e| Error::Init(format!("database: {e}")))?;
        db::run_migrations(&pool)
            .await
            .map_err(|e| Error::Init(format!("migrations: {e}")))?;

        let embedder = OllamaEmbedder::connect(&config.embedding)
            .await
            .map_err(|e| Error::Init(format!("embedding provider: {e}")))?;

        let index = SqliteIndex::open(pool, &config.retrieval.collection)
            .await
            .map_err(|e| Error::Init(format!("collection: {e}")))?;

        let client = GenerationClient::new(&config.llm)
            .map_err(|e| Error::Init(format!("generation client: {e}")))?;

        info!(
            collection = %config.retrieval.collection,
            top_k = config.retrieval.top_k,
            "copilot initialized"
        );

        Ok(Self::assemble(
            Arc::new(embedder),
            Arc::new(index),
            Orchestrator::new(client, &config.llm),
            config.retrieval.top_k,
        ))
    }

    /// Wire a copilot from pre-built components. Used by tests to
    /// swap in stub embedders or alternate index backends.
    pub fn assemble(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn CorpusIndex>,
        orchestrator: Orchestrator,
        top_k: usize,
    ) -> Self {
        Self {
            engine: RetrievalEngine::new(embedder, index),
            orchestrator: Arc::new(orchestrator),
            top_k,
        }
    }

    /// Process-wide shared instance, initialized on first call.
    pub async fn global(config: &Config) -> Result<Arc<Self>> {
        GLOBAL
            .get_or_try_init(|| async { Self::init(config).await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Default number of cases retrieved per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        self.engine.search(query, k).await
    }

    pub async fn build_prompt(&self, query: &str, k: usize) -> Result<BuiltPrompt> {
        self.engine.build_prompt(query, k).await
    }

    /// Retrieve context for `message` and produce the full advisory
    /// reply in one call.
    pub async fn generate(&self, message: &str) -> Result<String> {
        let prompt = self.engine.build_prompt(message, self.top_k).await?;
        self.orchestrator
            .generate(&prompt.system_prompt, message)
            .await
    }

    /// Streamed variant: retrieval happens up front, then the event
    /// stream carries the annotated cases, the reply, and completion.
    pub async fn generate_stream(
        &self,
        message: &str,
    ) -> Result<impl Stream<Item = StreamEvent>> {
        let prompt = self.engine.build_prompt(message, self.top_k).await?;
        Ok(Arc::clone(&self.orchestrator).generate_stream(prompt))
    }
}
