//! Runtime discovery of album photos by probing the origin.
//!
//! When a manifest entry has no photos, discovery rebuilds the list by asking
//! the origin for `ph<id>s<index><ext>` one candidate at a time:
//!
//! ```text
//! index 1: images/ph2s1.JPG ✗  .jpg ✗  .jpeg ✗  .png ✓  → record, next index
//! index 2: images/ph2s2.JPG ✗  .jpg ✗  .jpeg ✗  .png ✗  .webp ✗  → miss 1
//! index 3: ...                                                   → miss 2
//! index 4: ...                                                   → miss 3, stop
//! ```
//!
//! Probes are strictly sequential: the next candidate is requested only after
//! the previous one settled. An album with nothing on the origin therefore
//! costs at most `extensions × miss_threshold` failed requests in narrow mode.
//!
//! ## Modes
//!
//! - **Narrow** (default): the only folder is the one holding the cover.
//! - **Wide**: `images/album<id>`, `images/album-<id>`, `images/a<id>`, then
//!   `images`, each tried with every extension before moving to the next.
//!
//! The first hit for an index binds that index only; the next index starts
//! again from the first folder and the first extension.

use crate::config::{DiscoveryConfig, DiscoveryMode};
use crate::probe::Prober;
use crate::types::{AlbumEntry, AlbumId, ImagePath};
use std::time::Duration;
use tracing::debug;

/// Folder used when a cover path has no directory part.
const ROOT_FOLDER: &str = "images";

/// Directory portion of a cover path: everything before the last `/`.
pub fn cover_folder(cover: &str) -> &str {
    match cover.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir,
        _ => ROOT_FOLDER,
    }
}

/// Folders searched for an album, in priority order.
pub fn candidate_folders(mode: DiscoveryMode, id: AlbumId, cover: &str) -> Vec<String> {
    match mode {
        DiscoveryMode::Narrow => vec![cover_folder(cover).to_string()],
        DiscoveryMode::Wide => vec![
            format!("{ROOT_FOLDER}/album{id}"),
            format!("{ROOT_FOLDER}/album-{id}"),
            format!("{ROOT_FOLDER}/a{id}"),
            ROOT_FOLDER.to_string(),
        ],
    }
}

/// Candidate URL for one sequence index.
pub fn candidate_path(folder: &str, id: AlbumId, index: u32, ext: &str) -> ImagePath {
    format!("{folder}/ph{id}s{index}{ext}")
}

/// Rebuild an album's photo list by probing the origin.
///
/// Returns the hits in discovery order. Stops once `miss_threshold`
/// consecutive indices miss on every candidate, or after `max_index`.
pub async fn discover<P: Prober + ?Sized>(
    entry: &AlbumEntry,
    prober: &P,
    config: &DiscoveryConfig,
    timeout: Duration,
) -> Vec<ImagePath> {
    let folders = candidate_folders(config.mode, entry.id, &entry.cover);
    let miss_threshold = config.effective_miss_threshold();
    let max_index = config.effective_max_index();

    let mut found = Vec::new();
    let mut misses = 0;

    for index in 1..=max_index {
        match probe_index(entry.id, index, &folders, &config.extensions, prober, timeout).await {
            Some(path) => {
                found.push(path);
                misses = 0;
            }
            None => {
                misses += 1;
                if misses >= miss_threshold {
                    debug!(album = entry.id, index, "discovery stopped after consecutive misses");
                    break;
                }
            }
        }
    }

    debug!(album = entry.id, found = found.len(), "discovery finished");
    found
}

/// First candidate for `index` that the origin serves.
async fn probe_index<P: Prober + ?Sized>(
    id: AlbumId,
    index: u32,
    folders: &[String],
    extensions: &[String],
    prober: &P,
    timeout: Duration,
) -> Option<ImagePath> {
    for folder in folders {
        for ext in extensions {
            let path = candidate_path(folder, id, index, ext);
            if prober.exists(&path, timeout).await {
                return Some(path);
            }
        }
    }
    None
}
