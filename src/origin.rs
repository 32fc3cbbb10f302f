//! HTTP origin client.
//!
//! The carousel's only server is a passive file host. [`HttpOrigin`] talks to
//! it in two ways:
//!
//! - **Manifest fetches** bypass caches (`Cache-Control: no-cache`) so a freshly
//!   regenerated manifest is picked up on the next load.
//! - **Probes** issue a GET and read just enough of the body to recognize an
//!   image signature. Anything else (connection failure, non-2xx, an HTML error
//!   page served with 200, or no answer before the timeout) is a miss.
//!
//! All paths are resolved against the configured base URL, so a site served
//! from a subdirectory works the same as one served from the host root.

use crate::load::{FetchError, ManifestSource};
use crate::probe::{self, Prober};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum OriginError {
    #[error("invalid base URL {0}: {1}")]
    InvalidBaseUrl(String, String),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP-backed origin serving manifests and images.
pub struct HttpOrigin {
    base: Url,
    client: Client,
}

impl HttpOrigin {
    pub fn new(base_url: &str) -> Result<Self, OriginError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| OriginError::InvalidBaseUrl(base_url.to_string(), e.to_string()))?;
        // Url::join drops the last segment unless the base ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(concat!("album-carousel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for an origin-relative path.
    pub fn resolve(&self, path: &str) -> Option<Url> {
        self.base.join(path.trim_start_matches('/')).ok()
    }

    async fn probe(&self, url: Url) -> Result<bool, reqwest::Error> {
        let mut response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let mut head = Vec::with_capacity(probe::SNIFF_LEN);
        while head.len() < probe::SNIFF_LEN {
            match response.chunk().await? {
                Some(chunk) => head.extend_from_slice(&chunk),
                None => break,
            }
        }
        Ok(probe::sniff_image(&head))
    }
}

#[async_trait]
impl Prober for HttpOrigin {
    async fn exists(&self, path: &str, timeout: Duration) -> bool {
        let Some(url) = self.resolve(path) else {
            trace!(path, "probe skipped: unresolvable path");
            return false;
        };
        let hit = match tokio::time::timeout(timeout, self.probe(url)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                trace!(path, error = %e, "probe failed");
                false
            }
            Err(_) => {
                trace!(path, ?timeout, "probe timed out");
                false
            }
        };
        trace!(path, hit, "probe settled");
        hit
    }
}

#[async_trait]
impl ManifestSource for HttpOrigin {
    async fn fetch_manifest(&self, path: &str) -> Result<String, FetchError> {
        let url = self
            .resolve(path)
            .ok_or_else(|| FetchError::InvalidPath(path.to_string()))?;
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
