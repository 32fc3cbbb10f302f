//! Manifest loading and normalization.
//!
//! The online half of the pipeline. Produces the catalog the carousel renders,
//! and never fails: every problem falls through to the next strategy.
//!
//! ```text
//! images/manifest.json          ─ ok ─▶ normalize ─▶ repair ─▶ catalog
//!   │ missing / bad JSON / no albums
//!   ▼
//! images/manifest.example.json  ─ ok ─▶ normalize ─▶ repair ─▶ catalog
//!   │ missing / bad JSON / no albums
//!   ▼
//! built-in single album         ──────────────────▶ repair ─▶ catalog
//! ```
//!
//! ## Schema
//!
//! Manifests are read leniently. `albums` must be an object; everything else
//! degrades field by field:
//!
//! - `albumOrder` that is not an array is ignored and the numeric keys of
//!   `albums` are used in ascending order instead. Array items may be numbers
//!   or numeric strings; other items are skipped.
//! - An album entry that is not an object is skipped.
//! - A `title` or `cover` that is not a non-empty string counts as absent.
//! - `images` that is not an array becomes empty; non-string items are dropped.
//!
//! Ids and image paths are de-duplicated (first occurrence wins), so every
//! catalog has unique ids and duplicate-free image lists.

use crate::config::{CarouselConfig, LoaderConfig};
use crate::probe::Prober;
use crate::repair::{self, RepairOutcome};
use crate::types::{AlbumEntry, AlbumId, Catalog, ImagePath, default_title, placeholder_cover};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Why a manifest could not be used. Logged, never returned from [`load`].
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("invalid manifest path: {0}")]
    InvalidPath(String),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("manifest has no albums object")]
    MissingAlbums,
    #[error("manifest lists no displayable albums")]
    NoAlbums,
}

/// Where manifest documents come from.
#[async_trait]
pub trait ManifestSource: Sync {
    /// Body of the document at an origin-relative path, bypassing caches.
    async fn fetch_manifest(&self, path: &str) -> Result<String, FetchError>;
}

/// Which strategy produced the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Primary(String),
    Fallback(String),
    /// Neither manifest was usable.
    Builtin,
}

/// A loaded catalog and how it was obtained.
#[derive(Debug)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub source: CatalogSource,
    /// One outcome per album, in catalog order. Empty when repair is disabled.
    pub repairs: Vec<RepairOutcome>,
}

/// Manifest document as read from the wire.
#[derive(Debug, Deserialize)]
pub struct RawManifest {
    #[serde(rename = "albumOrder", default)]
    pub album_order: Option<Value>,
    pub albums: serde_json::Map<String, Value>,
}

/// One album entry as read from the wire. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RawAlbum {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,
}

fn non_empty_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Parse a manifest body. Fails when the JSON is invalid or `albums` is not
/// an object.
pub fn parse_manifest(body: &str) -> Result<RawManifest, FetchError> {
    let value: Value = serde_json::from_str(body)?;
    match value.get("albums") {
        Some(Value::Object(_)) => Ok(serde_json::from_value(value)?),
        _ => Err(FetchError::MissingAlbums),
    }
}

/// Effective display order: `albumOrder` when it is an array, otherwise the
/// numeric keys of `albums` ascending.
pub fn effective_order(raw: &RawManifest) -> Vec<AlbumId> {
    match &raw.album_order {
        Some(Value::Array(items)) => items.iter().filter_map(order_item).collect(),
        _ => {
            let mut ids: Vec<AlbumId> = raw
                .albums
                .keys()
                .filter_map(|k| k.parse::<AlbumId>().ok())
                .filter(|&id| id > 0)
                .collect();
            ids.sort_unstable();
            ids
        }
    }
}

fn order_item(item: &Value) -> Option<AlbumId> {
    let id = match item {
        Value::Number(n) => match n.as_u64() {
            Some(n) => AlbumId::try_from(n).ok(),
            // `1.0` names album "1".
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f > 0.0 && *f <= f64::from(AlbumId::MAX))
                .map(|f| f as AlbumId),
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}

/// Turn a raw manifest into a catalog.
pub fn normalize(raw: &RawManifest) -> Catalog {
    let mut seen = HashSet::new();
    let mut albums = Vec::new();

    for id in effective_order(raw) {
        if !seen.insert(id) {
            debug!(album = id, "duplicate id in albumOrder skipped");
            continue;
        }
        let Some(value) = raw.albums.get(&id.to_string()) else {
            debug!(album = id, "albumOrder id has no entry, skipped");
            continue;
        };
        // The derived visitor would also read a JSON array positionally.
        if !value.is_object() {
            debug!(album = id, "album entry is not an object, skipped");
            continue;
        }
        let Ok(entry) = RawAlbum::deserialize(value) else {
            debug!(album = id, "album entry unreadable, skipped");
            continue;
        };
        albums.push(normalize_entry(id, entry));
    }

    Catalog::new(albums)
}

fn normalize_entry(id: AlbumId, raw: RawAlbum) -> AlbumEntry {
    let mut paths = HashSet::new();
    let images: Vec<ImagePath> = raw
        .images
        .into_iter()
        .filter(|p| paths.insert(p.clone()))
        .collect();
    let cover = raw
        .cover
        .or_else(|| images.first().cloned())
        .unwrap_or_else(|| placeholder_cover(id));

    AlbumEntry {
        id,
        title: raw.title.unwrap_or_else(|| default_title(id)),
        cover,
        images,
    }
}

/// The single album shown when no manifest is usable.
pub fn builtin_catalog() -> Catalog {
    Catalog::new(vec![AlbumEntry {
        id: 1,
        title: default_title(1),
        cover: "images/folder1/photo1.JPG".to_string(),
        images: vec![
            "images/folder1/ph1s1.JPG".to_string(),
            "images/folder1/ph1s2.JPG".to_string(),
        ],
    }])
}

async fn fetch_catalog<S: ManifestSource + ?Sized>(
    source: &S,
    path: &str,
) -> Result<Catalog, FetchError> {
    let body = source.fetch_manifest(path).await?;
    let catalog = normalize(&parse_manifest(&body)?);
    if catalog.is_empty() {
        return Err(FetchError::NoAlbums);
    }
    Ok(catalog)
}

/// Fetch and normalize, falling through primary → fallback → built-in.
pub async fn load_catalog<S: ManifestSource + ?Sized>(
    source: &S,
    config: &LoaderConfig,
) -> (Catalog, CatalogSource) {
    match fetch_catalog(source, &config.manifest).await {
        Ok(catalog) => return (catalog, CatalogSource::Primary(config.manifest.clone())),
        Err(e) => debug!(path = %config.manifest, error = %e, "primary manifest unavailable"),
    }
    match fetch_catalog(source, &config.fallback_manifest).await {
        Ok(catalog) => {
            return (
                catalog,
                CatalogSource::Fallback(config.fallback_manifest.clone()),
            );
        }
        Err(e) => debug!(path = %config.fallback_manifest, error = %e, "fallback manifest unavailable"),
    }
    (builtin_catalog(), CatalogSource::Builtin)
}

/// Load the catalog and, unless disabled, run the repair pass over it.
///
/// Always returns at least one album.
pub async fn load<O: ManifestSource + Prober + ?Sized>(
    origin: &O,
    config: &CarouselConfig,
) -> LoadedCatalog {
    let (mut catalog, source) = load_catalog(origin, &config.loader).await;
    info!(source = ?source, albums = catalog.len(), "catalog loaded");

    let repairs = if config.loader.repair {
        repair::repair_catalog(&mut catalog, origin, config).await
    } else {
        Vec::new()
    };

    LoadedCatalog {
        catalog,
        source,
        repairs,
    }
}
