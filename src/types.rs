//! Shared types used across the builder, loader, and repair stages.
//!
//! Two shapes of the same data live here:
//!
//! - [`Manifest`] is the on-disk document (`images/manifest.json`). Albums are
//!   keyed by their stringified id, and `albumOrder` carries the display order.
//! - [`Catalog`] is the in-memory form the carousel consumes: an ordered list
//!   of [`AlbumEntry`] values obtained by walking `albumOrder`.
//!
//! The builder writes a `Manifest`, the loader turns one into a `Catalog`, and
//! [`Catalog::to_manifest`] goes back the other way so a loaded catalog can be
//! re-serialized without loss.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Album identifier. Always positive; `0` never appears in a valid catalog.
pub type AlbumId = u32;

/// Origin-relative URL using forward slashes and no leading slash,
/// e.g. `images/album1/ph1s1.jpg`. Extension case is preserved verbatim.
pub type ImagePath = String;

/// Title used when a manifest entry carries none.
pub fn default_title(id: AlbumId) -> String {
    format!("Album {id}")
}

/// Conventional cover location for an album that has no observed cover.
pub fn placeholder_cover(id: AlbumId) -> ImagePath {
    format!("images/photo{id}.JPG")
}

/// One album as stored in the manifest. The id lives in the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub title: String,
    pub cover: ImagePath,
    #[serde(default)]
    pub images: Vec<ImagePath>,
}

impl AlbumRecord {
    pub fn new(id: AlbumId) -> Self {
        Self {
            title: default_title(id),
            cover: placeholder_cover(id),
            images: Vec::new(),
        }
    }
}

/// The on-disk manifest document.
///
/// `albums` is a `BTreeMap` keyed by the numeric id so the serialized key order
/// is ascending numeric (`"1", "2", "10"`) rather than lexical. serde_json
/// writes integer map keys as strings, which is what the file format wants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "albumOrder")]
    pub album_order: Vec<AlbumId>,
    pub albums: BTreeMap<AlbumId, AlbumRecord>,
}

/// A structural problem found by [`Manifest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestIssue {
    /// `albumOrder` lists an id with no matching key in `albums`.
    MissingAlbum(AlbumId),
    /// `albumOrder` lists the same id more than once.
    DuplicateOrder(AlbumId),
    /// Album ids must be positive.
    ZeroId,
    EmptyCover(AlbumId),
    DuplicateImage(AlbumId, ImagePath),
}

impl std::fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAlbum(id) => write!(f, "albumOrder lists {id} but albums has no entry"),
            Self::DuplicateOrder(id) => write!(f, "albumOrder lists {id} more than once"),
            Self::ZeroId => write!(f, "album id 0 is not allowed"),
            Self::EmptyCover(id) => write!(f, "album {id} has an empty cover"),
            Self::DuplicateImage(id, path) => {
                write!(f, "album {id} lists image {path} more than once")
            }
        }
    }
}

impl Manifest {
    /// Check the manifest invariants. An empty result means the manifest is valid.
    ///
    /// Keys present in `albums` but absent from `albumOrder` are allowed; they
    /// are simply never displayed.
    pub fn validate(&self) -> Vec<ManifestIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for &id in &self.album_order {
            if !seen.insert(id) {
                issues.push(ManifestIssue::DuplicateOrder(id));
            } else if !self.albums.contains_key(&id) {
                issues.push(ManifestIssue::MissingAlbum(id));
            }
        }

        for (&id, record) in &self.albums {
            if id == 0 {
                issues.push(ManifestIssue::ZeroId);
            }
            if record.cover.is_empty() {
                issues.push(ManifestIssue::EmptyCover(id));
            }
            let mut paths = HashSet::new();
            for path in &record.images {
                if !paths.insert(path.as_str()) {
                    issues.push(ManifestIssue::DuplicateImage(id, path.clone()));
                }
            }
        }

        issues
    }

    /// Serialize as the canonical file body: two-space indent, trailing newline.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// One album in the runtime catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumEntry {
    pub id: AlbumId,
    pub title: String,
    pub cover: ImagePath,
    pub images: Vec<ImagePath>,
}

/// The in-memory, validated catalog in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub albums: Vec<AlbumEntry>,
}

impl Catalog {
    pub fn new(albums: Vec<AlbumEntry>) -> Self {
        Self { albums }
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Album ids in display order.
    pub fn ids(&self) -> Vec<AlbumId> {
        self.albums.iter().map(|a| a.id).collect()
    }

    pub fn get(&self, id: AlbumId) -> Option<&AlbumEntry> {
        self.albums.iter().find(|a| a.id == id)
    }

    /// Re-express the catalog as a manifest. Loading the result yields an
    /// equivalent catalog.
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            album_order: self.ids(),
            albums: self
                .albums
                .iter()
                .map(|a| {
                    (
                        a.id,
                        AlbumRecord {
                            title: a.title.clone(),
                            cover: a.cover.clone(),
                            images: a.images.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}
