//! Error taxonomy for the request pipeline.
//!
//! Every failure class the caller can observe, each with a
//! human-readable message. The core never swallows or retries these;
//! the streaming path converts them into a terminal error event once
//! the output channel is open.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Embedding model or index unavailable at startup. Fatal, no retry.
    #[error("initialization failed: {0}")]
    Init(String),

    /// Index or embedding failure while serving a query.
    #[error("retrieval failed: {0}")]
    Retrieval(#[source] anyhow::Error),

    /// Generation service unreachable at the transport level.
    #[error("generation service unreachable: {0}")]
    Connection(String),

    /// Generation service reachable but returned a non-success status.
    #[error("generation service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Generation service replied with a body we cannot interpret.
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    /// Rejected before any downstream call was made.
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    /// Caller-supplied argument outside the accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
