use super::{ImageMeta, VariantCodec};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockVariantCodec {
    meta: Arc<Mutex<ImageMeta>>,
    metadata_count: Arc<Mutex<usize>>,
    encode_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockVariantCodec {
    pub fn new() -> Self {
        Self {
            meta: Arc::new(Mutex::new(ImageMeta {
                width: 1600,
                height: 1200,
            })),
            metadata_count: Arc::new(Mutex::new(0)),
            encode_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_dimensions(self, width: u32, height: u32) -> Self {
        *self.meta.lock().unwrap() = ImageMeta { width, height };
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_metadata_count(&self) -> usize {
        *self.metadata_count.lock().unwrap()
    }

    pub fn get_encode_count(&self) -> usize {
        *self.encode_count.lock().unwrap()
    }

    fn check_failure(&self) -> Result<()> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Image(image::ImageError::IoError(
                std::io::Error::other("Mock codec failure"),
            )));
        }
        Ok(())
    }
}

impl Default for MockVariantCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VariantCodec for MockVariantCodec {
    async fn metadata(&self, _data: &[u8]) -> Result<ImageMeta> {
        self.check_failure()?;
        let mut count = self.metadata_count.lock().unwrap();
        *count += 1;

        Ok(*self.meta.lock().unwrap())
    }

    async fn resize_encode(&self, _data: &[u8], width: u32) -> Result<Vec<u8>> {
        self.check_failure()?;
        let mut count = self.encode_count.lock().unwrap();
        *count += 1;

        Ok(format!("webp:{}", width).into_bytes())
    }
}
