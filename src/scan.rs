//! Filesystem scanning and manifest generation.
//!
//! The offline half of the pipeline. Walks an image directory, recognizes
//! album files by name, and writes `manifest.json` next to them so the loader
//! can build its catalog without probing the origin.
//!
//! ## Directory Structure
//!
//! Any nesting is accepted. A typical tree:
//!
//! ```text
//! images/                          # Scan root (paths are emitted as images/...)
//! ├── photo1.JPG                   # Cover for album 1
//! ├── photo2.JPG                   # Cover for album 2
//! ├── album1/
//! │   ├── ph1s1.jpg                # Album 1, photo 1
//! │   └── ph1s2.jpg                # Album 1, photo 2
//! ├── a4/
//! │   └── harbour.png              # Album 4 by directory name
//! └── misc/
//!     └── notes.txt                # Ignored
//! ```
//!
//! ## Classification
//!
//! Each file's basename is tried against the cover and photo patterns (see
//! [`naming`](crate::naming)). Files matching neither are assigned by the
//! nearest ancestor directory named `album<n>`, `album-<n>`, or `a<n>`, as long
//! as they carry an image extension. Everything else is skipped.
//!
//! ## Output
//!
//! Albums 1, 2, and 3 always exist in the result so a fresh checkout still
//! renders a carousel. The manifest is written to a temporary sibling and
//! renamed into place, so readers never observe a truncated file.

use crate::naming::{self, FileKind};
use crate::types::{AlbumId, AlbumRecord, ImagePath, Manifest, placeholder_cover};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Name of the manifest file written inside the scanned directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Ids that always get an entry, observed or not.
const BOOTSTRAP_IDS: [AlbumId; 3] = [1, 2, 3];

/// Result of a full builder run.
#[derive(Debug)]
pub struct BuildOutput {
    pub manifest: Manifest,
    pub path: PathBuf,
}

/// Scan `images_dir` and write `images_dir/manifest.json`.
pub fn build(images_dir: &Path) -> Result<BuildOutput, ScanError> {
    let manifest = scan(images_dir)?;
    let path = write_manifest(&manifest, images_dir)?;
    Ok(BuildOutput { manifest, path })
}

/// Scan `images_dir` into a manifest without touching the disk.
pub fn scan(images_dir: &Path) -> Result<Manifest, ScanError> {
    let prefix = url_prefix(images_dir);
    let mut albums: BTreeMap<AlbumId, AlbumRecord> = BTreeMap::new();

    for rel in collect_files(images_dir)? {
        let Some(name) = rel.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let url = to_url(&prefix, &rel);

        match naming::classify_file(&name) {
            Some(FileKind::Cover { album }) => {
                debug!(album, path = %url, "cover");
                albums
                    .entry(album)
                    .or_insert_with(|| AlbumRecord::new(album))
                    .cover = url;
            }
            Some(FileKind::Photo { album, sequence }) => {
                debug!(album, sequence, path = %url, "photo");
                albums
                    .entry(album)
                    .or_insert_with(|| AlbumRecord::new(album))
                    .images
                    .push(url);
            }
            None => {
                if !naming::has_image_extension(&name) {
                    continue;
                }
                if let Some(album) = album_from_ancestors(&prefix, &rel) {
                    debug!(album, path = %url, "photo by directory");
                    albums
                        .entry(album)
                        .or_insert_with(|| AlbumRecord::new(album))
                        .images
                        .push(url);
                }
            }
        }
    }

    for record in albums.values_mut() {
        record.images.sort_by(|a, b| naming::natural_cmp(a, b));
    }

    let mut album_order: Vec<AlbumId> = albums.keys().copied().collect();

    for id in BOOTSTRAP_IDS {
        if albums.contains_key(&id) {
            continue;
        }
        let mut record = AlbumRecord::new(id);
        record.cover = bootstrap_cover(images_dir, &prefix, id);
        albums.insert(id, record);
        if !album_order.contains(&id) {
            album_order.push(id);
        }
    }

    Ok(Manifest {
        album_order,
        albums,
    })
}

/// Write the manifest as `manifest.json` inside `images_dir`.
///
/// The file is first written to `manifest.json.tmp` and then renamed.
pub fn write_manifest(manifest: &Manifest, images_dir: &Path) -> Result<PathBuf, ScanError> {
    let json = manifest.to_json_pretty()?;
    let path = images_dir.join(MANIFEST_FILENAME);
    let tmp = images_dir.join(format!("{MANIFEST_FILENAME}.tmp"));

    if let Err(e) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    info!(path = %path.display(), albums = manifest.album_order.len(), "wrote manifest");
    Ok(path)
}

/// Every regular file under `root`, relative to it, in sorted order.
fn collect_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    Ok(files)
}

/// First segment of every emitted path: the scanned directory's own name.
fn url_prefix(images_dir: &Path) -> String {
    images_dir
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(images_dir)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "images".to_string())
}

fn to_url(prefix: &str, rel: &Path) -> ImagePath {
    let mut url = prefix.to_string();
    for part in rel.components() {
        url.push('/');
        url.push_str(&part.as_os_str().to_string_lossy());
    }
    url
}

/// Album id from the nearest ancestor directory, walking leaf to root.
fn album_from_ancestors(prefix: &str, rel: &Path) -> Option<AlbumId> {
    let dirs: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    dirs.iter()
        .rev()
        .map(String::as_str)
        .chain(std::iter::once(prefix))
        .find_map(naming::album_dir_id)
}

/// Cover for a bootstrap album: `photo<id>.JPG` or `.jpg` when present on disk.
fn bootstrap_cover(images_dir: &Path, prefix: &str, id: AlbumId) -> ImagePath {
    ["JPG", "jpg"]
        .iter()
        .map(|ext| format!("photo{id}.{ext}"))
        .find(|name| images_dir.join(name).is_file())
        .map(|name| format!("{prefix}/{name}"))
        .unwrap_or_else(|| placeholder_cover(id))
}
