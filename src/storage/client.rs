use super::StorageService;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, Client as S3Client};

pub struct S3StorageClient {
    client: S3Client,
}

impl S3StorageClient {
    pub async fn new(
        access_key_id: String,
        secret_access_key: String,
        endpoint: Option<String>,
        region: String,
    ) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "artfolio-storage",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region));

        // Non-AWS endpoints (DigitalOcean Spaces, MinIO) need an override.
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;
        let client = S3Client::new(&config);

        Ok(Self { client })
    }
}

/// Prefer the service's own error message (e.g. "Access Denied") over the
/// SDK's wrapper formatting, since that message is surfaced to callers.
fn service_error_message<E>(err: SdkError<E>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err.message() {
        Some(message) => message.to_string(),
        None => err.to_string(),
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Error::Fetch(service_error_message(e)))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
        cache_control: &str,
    ) -> Result<()> {
        let body = ByteStream::from(data.to_vec());

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| Error::Write(service_error_message(e)))?;

        Ok(())
    }
}
