//! # Sales Copilot Core
//!
//! Shared, I/O-free logic for Sales Copilot: dialogue data models, the
//! corpus index abstraction, pattern-based signal extraction, case
//! annotation rules, prompt assembly, and the embedding trait.
//!
//! This crate contains no tokio I/O, sqlx, or reqwest. SQLite and
//! Ollama integrations live in the `sales-copilot` app crate.

pub mod annotate;
pub mod embedding;
pub mod index;
pub mod models;
pub mod prompt;
pub mod signals;
