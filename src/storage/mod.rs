//! Storage integration for source fetches and variant writes
//!
//! Handles reading uploaded originals from S3-compatible object storage
//! and writing derived variants back under deterministic keys.

pub mod client;
pub mod mock;

pub use client::S3StorageClient;
pub use mock::MockStorageClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
        cache_control: &str,
    ) -> Result<()>;
}
