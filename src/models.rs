//! Data models and structures
//!
//! Defines the storage-notification event shape, the handler response
//! contract, and environment-driven configuration.

use serde::{Deserialize, Serialize};

/// Batch of "object created" notifications as delivered by S3-compatible
/// storage. Fields the pipeline does not use (size, etag, event name) are
/// ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key (`+` for space, percent-escapes otherwise).
    pub key: String,
}

/// Structured handler response: a status code plus a JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordOutcome>>,
}

/// Per-record entry in the `results` collection of a multi-record
/// response. Mirrors the single-record body shapes so both read the same.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordOutcome {
    pub key: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_access_key_id: String,
    pub storage_secret_access_key: String,
    pub storage_endpoint: Option<String>,
    pub storage_region: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            storage_access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| crate::Error::Config("STORAGE_ACCESS_KEY_ID not set".to_string()))?,
            storage_secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY").map_err(
                |_| crate::Error::Config("STORAGE_SECRET_ACCESS_KEY not set".to_string()),
            )?,
            storage_endpoint: std::env::var("STORAGE_ENDPOINT").ok(),
            storage_region: std::env::var("STORAGE_REGION")
                .unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}
