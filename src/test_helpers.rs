//! Shared test utilities for the album-carousel test suite.
//!
//! Provides fixture builders for image trees, manifest and catalog lookups,
//! and a recording [`MockOrigin`] that stands in for the HTTP origin.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let images = write_tree(tmp.path(), &["photo1.JPG", "album1/ph1s1.jpg"]);
//! let manifest = scan(&images).unwrap();
//! assert_eq!(find_record(&manifest, 1).images, vec!["images/album1/ph1s1.jpg"]);
//!
//! let origin = MockOrigin::new().with_images(&["images/ph2s1.JPG"]);
//! assert!(origin.probed().is_empty());
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::load::{FetchError, ManifestSource};
use crate::probe::Prober;
use crate::types::{AlbumEntry, AlbumId, AlbumRecord, Catalog, Manifest};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create `<root>/images` holding each relative path as a small file.
pub fn write_tree(root: &Path, files: &[&str]) -> PathBuf {
    let images = root.join("images");
    std::fs::create_dir_all(&images).unwrap();
    for file in files {
        let path = images.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "fake image").unwrap();
    }
    images
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a manifest record by id. Panics if not found.
pub fn find_record(manifest: &Manifest, id: AlbumId) -> &AlbumRecord {
    manifest.albums.get(&id).unwrap_or_else(|| {
        let ids: Vec<&AlbumId> = manifest.albums.keys().collect();
        panic!("album {id} not in manifest. Available: {ids:?}")
    })
}

/// Find a catalog entry by id. Panics if not found.
pub fn find_entry(catalog: &Catalog, id: AlbumId) -> &AlbumEntry {
    catalog.get(id).unwrap_or_else(|| {
        panic!("album {id} not in catalog. Available: {:?}", catalog.ids())
    })
}

/// Sequence numbers parsed from `ph<n>s<k>` basenames, in list order.
pub fn sequence_numbers(paths: &[String]) -> Vec<u32> {
    paths
        .iter()
        .filter_map(|p| {
            let name = p.rsplit('/').next()?;
            match crate::naming::classify_file(name)? {
                crate::naming::FileKind::Photo { sequence, .. } => Some(sequence),
                crate::naming::FileKind::Cover { .. } => None,
            }
        })
        .collect()
}

pub fn entry(id: AlbumId, cover: &str, images: &[&str]) -> AlbumEntry {
    AlbumEntry {
        id,
        title: format!("Album {id}"),
        cover: cover.to_string(),
        images: images.iter().map(|s| s.to_string()).collect(),
    }
}

// =========================================================================
// Mock origin
// =========================================================================

/// In-memory origin: serves manifest bodies by path and answers probes from a
/// set of existing image URLs. Every probe is recorded in order.
#[derive(Default)]
pub struct MockOrigin {
    pub manifests: HashMap<String, Result<String, u16>>,
    pub images: HashSet<String>,
    pub probes: Mutex<Vec<(String, Duration)>>,
    pub fetches: Mutex<Vec<String>>,
}

impl MockOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, path: &str, body: &str) -> Self {
        self.manifests
            .insert(path.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.manifests.insert(path.to_string(), Err(status));
        self
    }

    pub fn with_images(mut self, urls: &[&str]) -> Self {
        self.images.extend(urls.iter().map(|u| u.to_string()));
        self
    }

    /// Probed URLs in issue order.
    pub fn probed(&self) -> Vec<String> {
        self.probes
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn probe_timeouts(&self) -> Vec<Duration> {
        self.probes.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for MockOrigin {
    async fn exists(&self, url: &str, timeout: Duration) -> bool {
        self.probes.lock().unwrap().push((url.to_string(), timeout));
        self.images.contains(url)
    }
}

#[async_trait]
impl ManifestSource for MockOrigin {
    async fn fetch_manifest(&self, path: &str) -> Result<String, FetchError> {
        self.fetches.lock().unwrap().push(path.to_string());
        match self.manifests.get(path) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status(*status)),
            None => Err(FetchError::Status(404)),
        }
    }
}
