//! Image variant worker for the artfolio marketplace
//!
//! Listens for "object created" storage notifications and derives a fixed
//! set of smaller, web-optimized WebP copies of each uploaded image,
//! written back to the same bucket under deterministic keys.

pub mod error;
pub mod keys;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod transcode;

pub use error::{Error, Result};
