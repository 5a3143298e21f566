//! Error types for mockexec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid work key: {0}")]
    InvalidKey(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("work key already queued or running: {0}")]
    DuplicateKey(String),

    #[error("record not locked for update: {0}")]
    NotLocked(String),

    #[error("unknown executor: {0}")]
    UnknownExecutor(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
