//! Image existence probes.
//!
//! A probe answers one question: does this URL serve a decodable image? The
//! answer is a plain `bool`. Misses (missing file, wrong content, dead origin,
//! timeout) are an expected outcome of speculative discovery, not an error,
//! so nothing here returns `Result` and nothing logs above `trace`.
//!
//! The production implementation is
//! [`HttpOrigin`](crate::origin::HttpOrigin). Tests use an in-memory origin
//! that records every probe.

use async_trait::async_trait;
use std::time::Duration;

/// Trait for image existence probes.
///
/// Implementations must resolve within `timeout` and resolve exactly once.
#[async_trait]
pub trait Prober: Sync {
    /// `true` when `url` serves an image, `false` on any failure or timeout.
    async fn exists(&self, url: &str, timeout: Duration) -> bool;
}

/// Bytes needed to recognize every supported format's signature.
pub const SNIFF_LEN: usize = 32;

/// True when `head` starts with the signature of an image format we can decode.
pub fn sniff_image(head: &[u8]) -> bool {
    matches!(
        image::guess_format(head),
        Ok(image::ImageFormat::Jpeg | image::ImageFormat::Png | image::ImageFormat::WebP)
    )
}
