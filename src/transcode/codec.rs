use super::{ImageMeta, VariantCodec, WEBP_QUALITY};
use crate::{Error, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::ImageReader;
use std::io::Cursor;

/// Real codec backed by the `image` crate for decode/resize and libwebp
/// (via the `webp` crate) for lossy encoding at the fixed quality.
pub struct WebpTranscoder;

impl WebpTranscoder {
    pub fn new() -> Self {
        Self
    }

    fn resize_encode_sync(data: &[u8], width: u32) -> Result<Vec<u8>> {
        let img = image::load_from_memory(data)?;
        let (source_width, source_height) = (img.width(), img.height());

        // Fit-inside, never enlarge: the planner already filters widths
        // above the source's, but the resize itself refuses to upscale.
        let target_width = width.min(source_width);
        let target_height = ((source_height as f64) * (target_width as f64)
            / (source_width as f64))
            .round() as u32;

        let resized = if target_width == source_width {
            img
        } else {
            img.resize_exact(target_width, target_height.max(1), FilterType::Lanczos3)
        };

        let rgba = resized.to_rgba8();
        let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode(WEBP_QUALITY);
        Ok(encoded.to_vec())
    }
}

impl Default for WebpTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VariantCodec for WebpTranscoder {
    async fn metadata(&self, data: &[u8]) -> Result<ImageMeta> {
        // Header-only probe; no full decode needed for dimensions.
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(ImageMeta { width, height })
    }

    async fn resize_encode(&self, data: &[u8], width: u32) -> Result<Vec<u8>> {
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || Self::resize_encode_sync(&data, width))
            .await
            .map_err(|e| Error::Invariant(format!("Transcode task join error: {}", e)))?
    }
}
