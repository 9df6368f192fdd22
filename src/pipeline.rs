//! Batch orchestration for storage notification events.

use crate::keys::{self, KeyClass};
use crate::models::{Config, HandlerResponse, RecordOutcome, ResponseBody, S3Event};
use crate::storage::{S3StorageClient, StorageService};
use crate::transcode::{plan_widths, VariantCodec, WebpTranscoder};
use crate::{Error, Result};
use tracing::{info, warn};

/// Content type set on every variant write.
pub const VARIANT_CONTENT_TYPE: &str = "image/webp";

/// Variants are immutable artifacts whose key encodes their exact width,
/// so they are safe to cache forever.
pub const VARIANT_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Processes notification batches: classifies each record's key, fetches
/// eligible sources, and writes resized WebP variants back to storage.
pub struct Pipeline {
    storage: Box<dyn StorageService>,
    codec: Box<dyn VariantCodec>,
}

/// Injectable service bundle used to construct [`Pipeline`] in
/// tests/harnesses.
pub struct PipelineServices {
    pub storage: Box<dyn StorageService>,
    pub codec: Box<dyn VariantCodec>,
}

/// Outcome of one record. Failures are ordinary values recovered at the
/// record boundary; they never abort the batch.
enum RecordResult {
    Skipped { key: String },
    Processed { key: String, variants: Vec<String> },
    Failed { key: String, error: String },
}

impl RecordResult {
    fn into_outcome(self) -> RecordOutcome {
        match self {
            RecordResult::Skipped { key } => RecordOutcome {
                message: format!("Skipped non-image file: {}", key),
                key,
                variants: None,
                error: None,
            },
            RecordResult::Processed { key, variants } => RecordOutcome {
                message: format!("Processed {} variant(s) for {}", variants.len(), key),
                key,
                variants: Some(variants),
                error: None,
            },
            RecordResult::Failed { key, error } => RecordOutcome {
                message: format!("Failed to process {}", key),
                key,
                variants: None,
                error: Some(error),
            },
        }
    }
}

impl Pipeline {
    /// Build a pipeline from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(services: PipelineServices) -> Self {
        Self {
            storage: services.storage,
            codec: services.codec,
        }
    }

    /// Construct a pipeline from environment configuration
    /// (`Config::from_env`).
    pub async fn from_env() -> Result<Self> {
        let config = Config::from_env()?;

        let storage = S3StorageClient::new(
            config.storage_access_key_id,
            config.storage_secret_access_key,
            config.storage_endpoint,
            config.storage_region,
        )
        .await?;

        Ok(Self::with_services(PipelineServices {
            storage: Box::new(storage),
            codec: Box::new(WebpTranscoder::new()),
        }))
    }

    /// Handle one notification batch and produce the structured response.
    pub async fn handle(&self, event: &S3Event) -> HandlerResponse {
        if event.records.is_empty() {
            info!("Notification batch contained no records");
            return HandlerResponse {
                status_code: 200,
                body: ResponseBody {
                    message: Some("No records to process".to_string()),
                    ..Default::default()
                },
            };
        }

        let mut results = Vec::with_capacity(event.records.len());
        for record in &event.records {
            results.push(
                self.process_record(&record.s3.bucket.name, &record.s3.object.key)
                    .await,
            );
        }

        if results.len() == 1 {
            return Self::single_record_response(results.remove(0));
        }

        // Multi-record batches isolate failures per record: each entry in
        // `results` mirrors the single-record body shapes.
        HandlerResponse {
            status_code: 200,
            body: ResponseBody {
                results: Some(results.into_iter().map(RecordResult::into_outcome).collect()),
                ..Default::default()
            },
        }
    }

    fn single_record_response(result: RecordResult) -> HandlerResponse {
        let status_code = match &result {
            RecordResult::Failed { .. } => 500,
            _ => 200,
        };
        let outcome = result.into_outcome();

        HandlerResponse {
            status_code,
            body: ResponseBody {
                message: Some(outcome.message),
                variants: outcome.variants,
                error: outcome.error,
                ..Default::default()
            },
        }
    }

    async fn process_record(&self, bucket: &str, raw_key: &str) -> RecordResult {
        let key = keys::decode_notification_key(raw_key);

        if keys::classify(&key) == KeyClass::Skip {
            info!("Skipping non-image object: {}", key);
            return RecordResult::Skipped { key };
        }

        match self.generate_variants(bucket, &key).await {
            Ok(variants) => {
                info!("Processed {} variant(s) for {}", variants.len(), key);
                RecordResult::Processed { key, variants }
            }
            Err(e) => {
                warn!("Failed to process {}: {}", key, e);
                RecordResult::Failed {
                    key,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn generate_variants(&self, bucket: &str, key: &str) -> Result<Vec<String>> {
        let data = self.fetch_source(bucket, key).await?;
        let meta = self.codec.metadata(&data).await?;

        let widths = plan_widths(meta.width);
        info!(
            "Source {} is {}x{}; planning {} variant(s)",
            key,
            meta.width,
            meta.height,
            widths.len()
        );

        let mut variants = Vec::with_capacity(widths.len());
        for width in widths {
            let encoded = self.codec.resize_encode(&data, width).await?;
            let variant = keys::variant_key(key, width);
            self.storage
                .put_object(
                    bucket,
                    &variant,
                    &encoded,
                    VARIANT_CONTENT_TYPE,
                    VARIANT_CACHE_CONTROL,
                )
                .await?;
            variants.push(variant);
        }

        Ok(variants)
    }

    async fn fetch_source(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let data = self.storage.get_object(bucket, key).await?;
        if data.is_empty() {
            return Err(Error::Fetch("Empty response body from S3".to_string()));
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{S3Bucket, S3Entity, S3EventRecord, S3Object};
    use crate::storage::MockStorageClient;
    use crate::transcode::MockVariantCodec;

    fn event_for(keys: &[&str]) -> S3Event {
        S3Event {
            records: keys
                .iter()
                .map(|key| S3EventRecord {
                    s3: S3Entity {
                        bucket: S3Bucket {
                            name: "artfolio-media".to_string(),
                        },
                        object: S3Object {
                            key: (*key).to_string(),
                        },
                    },
                })
                .collect(),
        }
    }

    fn build_pipeline(storage: MockStorageClient, codec: MockVariantCodec) -> Pipeline {
        Pipeline::with_services(PipelineServices {
            storage: Box::new(storage),
            codec: Box::new(codec),
        })
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let storage = MockStorageClient::new();
        let pipeline = build_pipeline(storage.clone(), MockVariantCodec::new());

        let response = pipeline.handle(&event_for(&[])).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body.message.as_deref(),
            Some("No records to process")
        );
        assert_eq!(storage.get_get_count(), 0);
    }

    #[tokio::test]
    async fn test_skipped_key_issues_no_storage_read() {
        let storage = MockStorageClient::new();
        let pipeline = build_pipeline(storage.clone(), MockVariantCodec::new());

        let response = pipeline.handle(&event_for(&["uploads/notes.txt"])).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body.message.as_deref(),
            Some("Skipped non-image file: uploads/notes.txt")
        );
        assert_eq!(storage.get_get_count(), 0);
        assert_eq!(storage.get_put_count(), 0);
    }

    #[tokio::test]
    async fn test_variant_write_skipped_for_generated_webp() {
        let storage = MockStorageClient::new();
        let pipeline = build_pipeline(storage.clone(), MockVariantCodec::new());

        let response = pipeline
            .handle(&event_for(&["uploads/photo/400w.webp"]))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(storage.get_get_count(), 0);
    }

    #[tokio::test]
    async fn test_single_record_success_lists_variants() {
        let storage =
            MockStorageClient::new().with_object("uploads/photo.jpg".to_string(), b"img".to_vec());
        let codec = MockVariantCodec::new().with_dimensions(1600, 1200);
        let pipeline = build_pipeline(storage.clone(), codec);

        let response = pipeline.handle(&event_for(&["uploads/photo.jpg"])).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body.message.as_deref(),
            Some("Processed 3 variant(s) for uploads/photo.jpg")
        );
        assert_eq!(
            response.body.variants,
            Some(vec![
                "uploads/photo/400w.webp".to_string(),
                "uploads/photo/800w.webp".to_string(),
                "uploads/photo/1200w.webp".to_string(),
            ])
        );
        assert_eq!(storage.get_put_count(), 3);
    }

    #[tokio::test]
    async fn test_single_record_small_source_yields_zero_variants() {
        let storage =
            MockStorageClient::new().with_object("uploads/tiny.png".to_string(), b"img".to_vec());
        let codec = MockVariantCodec::new().with_dimensions(300, 200);
        let pipeline = build_pipeline(storage.clone(), codec);

        let response = pipeline.handle(&event_for(&["uploads/tiny.png"])).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body.message.as_deref(),
            Some("Processed 0 variant(s) for uploads/tiny.png")
        );
        assert_eq!(response.body.variants, Some(Vec::new()));
        assert_eq!(storage.get_put_count(), 0);
    }

    #[tokio::test]
    async fn test_notification_key_is_decoded_before_use() {
        let storage = MockStorageClient::new()
            .with_object("uploads/my artwork(2).jpg".to_string(), b"img".to_vec());
        let codec = MockVariantCodec::new().with_dimensions(500, 500);
        let pipeline = build_pipeline(storage.clone(), codec);

        let response = pipeline
            .handle(&event_for(&["uploads/my+artwork%282%29.jpg"]))
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body.variants,
            Some(vec!["uploads/my artwork(2)/400w.webp".to_string()])
        );
    }

    #[tokio::test]
    async fn test_single_record_fetch_failure_propagates_verbatim() {
        let storage = MockStorageClient::new().with_get_failure("Access Denied".to_string());
        let pipeline = build_pipeline(storage, MockVariantCodec::new());

        let response = pipeline.handle(&event_for(&["uploads/photo.jpg"])).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body.message.as_deref(),
            Some("Failed to process uploads/photo.jpg")
        );
        assert_eq!(response.body.error.as_deref(), Some("Access Denied"));
    }

    #[tokio::test]
    async fn test_empty_body_is_a_distinct_failure() {
        let storage =
            MockStorageClient::new().with_object("uploads/empty.jpg".to_string(), Vec::new());
        let pipeline = build_pipeline(storage, MockVariantCodec::new());

        let response = pipeline.handle(&event_for(&["uploads/empty.jpg"])).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body.error.as_deref(),
            Some("Empty response body from S3")
        );
    }

    #[tokio::test]
    async fn test_write_failure_fails_record_but_keeps_earlier_variants() {
        let storage = MockStorageClient::new()
            .with_object("uploads/photo.jpg".to_string(), b"img".to_vec())
            .with_put_failure_after(2, "QuotaExceeded".to_string());
        let codec = MockVariantCodec::new().with_dimensions(1600, 1200);
        let pipeline = build_pipeline(storage.clone(), codec);

        let response = pipeline.handle(&event_for(&["uploads/photo.jpg"])).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body.message.as_deref(),
            Some("Failed to process uploads/photo.jpg")
        );
        assert_eq!(response.body.error.as_deref(), Some("QuotaExceeded"));

        // The two variants written before the failure are not rolled back.
        let puts = storage.get_puts();
        assert_eq!(puts.len(), 2);
        assert!(puts.contains_key("uploads/photo/400w.webp"));
        assert!(puts.contains_key("uploads/photo/800w.webp"));
    }

    #[tokio::test]
    async fn test_multi_record_batch_aggregates_results() {
        let storage = MockStorageClient::new()
            .with_object("uploads/wide.jpg".to_string(), b"img".to_vec())
            .with_object("uploads/notes.txt".to_string(), b"text".to_vec());
        let codec = MockVariantCodec::new().with_dimensions(2000, 1000);
        let pipeline = build_pipeline(storage.clone(), codec);

        let response = pipeline
            .handle(&event_for(&["uploads/wide.jpg", "uploads/notes.txt"]))
            .await;

        assert_eq!(response.status_code, 200);
        let results = response.body.results.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].key, "uploads/wide.jpg");
        assert_eq!(results[0].variants.as_ref().unwrap().len(), 3);
        assert_eq!(
            results[1].message,
            "Skipped non-image file: uploads/notes.txt"
        );
        // The skipped record never triggered a read.
        assert_eq!(storage.get_get_count(), 1);
    }

    #[tokio::test]
    async fn test_multi_record_batch_isolates_failures() {
        let storage =
            MockStorageClient::new().with_object("uploads/ok.jpg".to_string(), b"img".to_vec());
        let codec = MockVariantCodec::new().with_dimensions(500, 500);
        let pipeline = build_pipeline(storage, codec);

        let response = pipeline
            .handle(&event_for(&["uploads/ok.jpg", "uploads/missing.jpg"]))
            .await;

        assert_eq!(response.status_code, 200);
        let results = response.body.results.unwrap();
        assert_eq!(results[0].variants.as_ref().unwrap().len(), 1);
        assert_eq!(results[1].message, "Failed to process uploads/missing.jpg");
        assert!(results[1].error.as_ref().unwrap().contains("NoSuchKey"));
    }

    #[tokio::test]
    async fn test_variant_writes_carry_fixed_headers() {
        let storage =
            MockStorageClient::new().with_object("uploads/photo.jpg".to_string(), b"img".to_vec());
        let codec = MockVariantCodec::new().with_dimensions(800, 600);
        let pipeline = build_pipeline(storage.clone(), codec);

        pipeline.handle(&event_for(&["uploads/photo.jpg"])).await;

        let puts = storage.get_puts();
        assert_eq!(puts.len(), 2);
        for record in puts.values() {
            assert_eq!(record.content_type, VARIANT_CONTENT_TYPE);
            assert_eq!(record.cache_control, VARIANT_CACHE_CONTROL);
        }
    }

    #[tokio::test]
    async fn test_source_object_is_never_overwritten() {
        let storage =
            MockStorageClient::new().with_object("uploads/photo.jpg".to_string(), b"img".to_vec());
        let codec = MockVariantCodec::new().with_dimensions(800, 600);
        let pipeline = build_pipeline(storage.clone(), codec);

        pipeline.handle(&event_for(&["uploads/photo.jpg"])).await;

        assert_eq!(storage.get_objects()["uploads/photo.jpg"], b"img");
        assert!(!storage.get_puts().contains_key("uploads/photo.jpg"));
    }
}
