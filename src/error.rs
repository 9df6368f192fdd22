//! Error handling and custom error types
//!
//! Provides unified error handling across the pipeline using thiserror.
//! The `Fetch`, `Image`, and `Write` variants display only the underlying
//! message, since that message is surfaced verbatim in handler responses.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
