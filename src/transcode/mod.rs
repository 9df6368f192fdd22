//! Variant planning and image transcoding
//!
//! Decides which breakpoint widths to generate for a source image and
//! produces the resized, WebP-encoded bytes for each of them.

pub mod codec;
pub mod mock;

pub use codec::WebpTranscoder;
pub use mock::MockVariantCodec;

use crate::Result;
use async_trait::async_trait;

/// Fixed ascending breakpoint widths (pixels) at which variants are
/// generated. Not configurable per request.
pub const BREAKPOINT_WIDTHS: [u32; 3] = [400, 800, 1200];

/// Fixed WebP encode quality for every variant.
pub const WEBP_QUALITY: f32 = 82.0;

/// Intrinsic pixel dimensions of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
}

/// The subset of breakpoints to generate for a source `source_width`
/// pixels wide, ascending. Empty when the source is narrower than the
/// smallest breakpoint; never contains a width above the source's.
pub fn plan_widths(source_width: u32) -> Vec<u32> {
    BREAKPOINT_WIDTHS
        .iter()
        .copied()
        .filter(|width| *width <= source_width)
        .collect()
}

#[async_trait]
pub trait VariantCodec: Send + Sync {
    /// Decode enough of `data` to report its intrinsic dimensions.
    async fn metadata(&self, data: &[u8]) -> Result<ImageMeta>;

    /// Resize `data` to `width` (aspect-ratio preserving, never
    /// enlarging) and encode the result as WebP.
    async fn resize_encode(&self, data: &[u8], width: u32) -> Result<Vec<u8>>;
}
