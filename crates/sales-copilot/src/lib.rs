//! # Sales Copilot
//!
//! **A retrieval-augmented copilot for cross-border wholesale
//! negotiation support.**
//!
//! Given a customer-service agent's question, the copilot retrieves
//! the most similar historical negotiation cases from a local SQLite
//! corpus and drives a two-stage generation pipeline over a local
//! Ollama instance: an analyst model breaks down the customer's
//! psychology and strategy, then a persona model drafts the reply in
//! a seasoned salesperson's voice.
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────┐
//! │  Query   │──▶│ Embedding  │──▶│  SQLite   │
//! │ (agent)  │   │ (Ollama)   │   │  corpus   │
//! └──────────┘   └────────────┘   └─────┬─────┘
//!                                       │ top-k cases
//!                                       ▼
//!                               ┌──────────────┐
//!                               │ System prompt │
//!                               └──────┬───────┘
//!                        ┌─────────────┴─────────────┐
//!                        ▼                           ▼
//!                 ┌────────────┐             ┌──────────────┐
//!                 │  Analyst   │             │   Persona    │
//!                 │ (strategy) │             │ (reply text) │
//!                 └─────┬──────┘             └──────┬───────┘
//!                       └───────────┬───────────────┘
//!                                   ▼
//!                        sectioned advisory reply
//! ```
//!
//! 1. [`retrieval::RetrievalEngine`] embeds the query and pulls the
//!    nearest cases from a [`sales_copilot_core::index::CorpusIndex`].
//! 2. The retrieved cases are rendered into a case-block system prompt
//!    ([`sales_copilot_core::prompt`]).
//! 3. [`generate::Orchestrator`] runs the analyst and persona models
//!    sequentially and merges their output, appending a price-reference
//!    block when the inbound message is price sensitive.
//! 4. [`app::SalesCopilot`] wires the whole pipeline from a TOML
//!    [`config::Config`] and exposes blocking and streaming entry
//!    points.
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`config`] | TOML configuration with validated defaults |
//! | [`db`] | SQLite pool and schema migrations |
//! | [`sqlite_index`] | SQLite-backed corpus index |
//! | [`embedding`] | Ollama embedding provider with retry |
//! | [`llm`] | Ollama chat client for both models |
//! | [`retrieval`] | Query embedding and prompt assembly |
//! | [`generate`] | Two-stage orchestration and event stream |
//! | [`app`] | Initialization and the shared application context |
//! | [`error`] | Request-pipeline error taxonomy |

pub mod app;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod generate;
pub mod llm;
pub mod retrieval;
pub mod sqlite_index;

pub use app::SalesCopilot;
pub use config::{load_config, Config};
pub use error::{Error, Result};
pub use generate::{AnnotatedCase, Orchestrator, StreamEvent};
pub use retrieval::{BuiltPrompt, RetrievalEngine};
pub use sqlite_index::SqliteIndex;
