use super::StorageService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A single recorded `put_object` call, including the headers it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    pub data: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
}

#[derive(Clone)]
struct PutFailure {
    message: String,
    /// Number of puts that succeed before failures begin.
    after: usize,
}

#[derive(Clone)]
pub struct MockStorageClient {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    puts: Arc<Mutex<HashMap<String, PutRecord>>>,
    get_count: Arc<Mutex<usize>>,
    put_count: Arc<Mutex<usize>>,
    get_failure: Arc<Mutex<Option<String>>>,
    put_failure: Arc<Mutex<Option<PutFailure>>>,
}

impl MockStorageClient {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            puts: Arc::new(Mutex::new(HashMap::new())),
            get_count: Arc::new(Mutex::new(0)),
            put_count: Arc::new(Mutex::new(0)),
            get_failure: Arc::new(Mutex::new(None)),
            put_failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_object(self, key: String, data: Vec<u8>) -> Self {
        self.objects.lock().unwrap().insert(key, data);
        self
    }

    /// Every subsequent `get_object` fails with `message`.
    pub fn with_get_failure(self, message: String) -> Self {
        *self.get_failure.lock().unwrap() = Some(message);
        self
    }

    /// Every subsequent `put_object` fails with `message`.
    pub fn with_put_failure(self, message: String) -> Self {
        self.with_put_failure_after(0, message)
    }

    /// The first `after` puts succeed; later puts fail with `message`.
    pub fn with_put_failure_after(self, after: usize, message: String) -> Self {
        *self.put_failure.lock().unwrap() = Some(PutFailure { message, after });
        self
    }

    pub fn get_get_count(&self) -> usize {
        *self.get_count.lock().unwrap()
    }

    pub fn get_put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }

    pub fn get_puts(&self) -> HashMap<String, PutRecord> {
        self.puts.lock().unwrap().clone()
    }

    pub fn get_objects(&self) -> HashMap<String, Vec<u8>> {
        self.objects.lock().unwrap().clone()
    }
}

impl Default for MockStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageClient {
    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Vec<u8>> {
        let mut count = self.get_count.lock().unwrap();
        *count += 1;

        if let Some(message) = self.get_failure.lock().unwrap().as_ref() {
            return Err(Error::Fetch(message.clone()));
        }

        let objects = self.objects.lock().unwrap();
        match objects.get(key) {
            Some(data) => Ok(data.clone()),
            None => Err(Error::Fetch(format!("NoSuchKey: {}", key))),
        }
    }

    async fn put_object(
        &self,
        _bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
        cache_control: &str,
    ) -> Result<()> {
        let mut count = self.put_count.lock().unwrap();
        *count += 1;
        let attempt = *count;
        drop(count);

        if let Some(failure) = self.put_failure.lock().unwrap().as_ref() {
            if attempt > failure.after {
                return Err(Error::Write(failure.message.clone()));
            }
        }

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        self.puts.lock().unwrap().insert(
            key.to_string(),
            PutRecord {
                data: data.to_vec(),
                content_type: content_type.to_string(),
                cache_control: cache_control.to_string(),
            },
        );
        Ok(())
    }
}
