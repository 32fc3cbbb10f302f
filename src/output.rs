//! CLI output formatting for every command.
//!
//! # Entity Display Contract
//!
//! Albums follow the same two-level pattern everywhere:
//!
//! 1. **Header line**: positional index + title + photo count
//! 2. **Context lines**: indented `Cover:`, card tier, then the photos
//!
//! # Output Format
//!
//! ## Manifest
//!
//! ```text
//! Generated manifest at images/manifest.json
//! Album IDs: 1, 2, 3
//! ```
//!
//! ## Catalog
//!
//! ```text
//! Source: images/manifest.json
//! 001 Album 1 (2 photos) [complete]
//!     Cover: images/photo1.JPG
//!     Card: center, offset 0
//!     001 images/album1/ph1s1.jpg
//!     002 images/album1/ph1s2.jpg
//! 002 Album 2 (0 photos) [empty]
//!     Cover: images/photo2.JPG
//!     Card: behind, offset 1
//!     No photos found for this album.
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::carousel::{Carousel, NO_PHOTOS_MESSAGE, PanelContent};
use crate::load::{CatalogSource, LoadedCatalog};
use crate::repair::AlbumState;
use crate::scan::BuildOutput;
use crate::types::{AlbumEntry, AlbumId, ImagePath, Manifest, ManifestIssue};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn album_header(index: usize, album: &AlbumEntry) -> String {
    format!(
        "{} {} ({} photos)",
        format_index(index),
        album.title,
        album.images.len()
    )
}

fn state_label(state: AlbumState) -> &'static str {
    match state {
        AlbumState::Declared => "declared",
        AlbumState::Verified => "verified",
        AlbumState::CoverRepaired => "cover repaired",
        AlbumState::DiscoveryRun => "discovery run",
        AlbumState::Complete => "complete",
        AlbumState::Empty => "empty",
    }
}

fn join_ids(ids: &[AlbumId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// manifest
// ============================================================================

pub fn format_build_output(output: &BuildOutput) -> Vec<String> {
    vec![
        format!("Generated manifest at {}", output.path.display()),
        format!("Album IDs: {}", join_ids(&output.manifest.album_order)),
    ]
}

pub fn print_build_output(output: &BuildOutput) {
    for line in format_build_output(output) {
        println!("{}", line);
    }
}

// ============================================================================
// catalog
// ============================================================================

/// Format a loaded catalog the way the carousel presents it.
pub fn format_catalog(loaded: &LoadedCatalog) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(match &loaded.source {
        CatalogSource::Primary(path) => format!("Source: {}", path),
        CatalogSource::Fallback(path) => format!("Source: {} (fallback)", path),
        CatalogSource::Builtin => "Source: built-in album".to_string(),
    });

    let carousel = Carousel::new(loaded.catalog.len());
    for (i, album) in loaded.catalog.albums.iter().enumerate() {
        let mut header = album_header(i + 1, album);
        if let Some(outcome) = loaded.repairs.iter().find(|o| o.id == album.id) {
            header.push_str(&format!(" [{}]", state_label(outcome.state)));
        }
        lines.push(header);

        let ctx = indent(1);
        lines.push(format!("{}Cover: {}", ctx, album.cover));
        if let Some(outcome) = loaded.repairs.iter().find(|o| o.id == album.id)
            && let Some(old) = &outcome.replaced_cover
        {
            lines.push(format!("{}Replaced: {}", ctx, old));
        }
        let placement = carousel.placement(i, false);
        lines.push(format!(
            "{}Card: {}, offset {}",
            ctx,
            placement.tier.class(),
            placement.offset
        ));

        match PanelContent::for_album(album) {
            PanelContent::Photos(photos) => {
                for (n, photo) in photos.iter().enumerate() {
                    lines.push(format!("{}{} {}", ctx, format_index(n + 1), photo.src));
                }
            }
            PanelContent::NoPhotosFound => {
                lines.push(format!("{}{}", ctx, NO_PHOTOS_MESSAGE));
            }
        }
    }
    lines
}

pub fn print_catalog(loaded: &LoadedCatalog) {
    for line in format_catalog(loaded) {
        println!("{}", line);
    }
}

// ============================================================================
// discover
// ============================================================================

pub fn format_discovery(id: AlbumId, images: &[ImagePath]) -> Vec<String> {
    let mut lines = vec![format!("Album {} ({} photos found)", id, images.len())];
    if images.is_empty() {
        lines.push(format!("{}{}", indent(1), NO_PHOTOS_MESSAGE));
    }
    for (i, path) in images.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), path));
    }
    lines
}

pub fn print_discovery(id: AlbumId, images: &[ImagePath]) {
    for line in format_discovery(id, images) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_check(path: &Path, manifest: &Manifest, issues: &[ManifestIssue]) -> Vec<String> {
    let mut lines = vec![format!("Manifest {}", path.display())];
    for (i, id) in manifest.album_order.iter().enumerate() {
        match manifest.albums.get(id) {
            Some(record) => lines.push(format!(
                "{}{} Album {} \"{}\" ({} photos)",
                indent(1),
                format_index(i + 1),
                id,
                record.title,
                record.images.len()
            )),
            None => lines.push(format!("{}{} Album {} (missing)", indent(1), format_index(i + 1), id)),
        }
    }
    let hidden = manifest
        .albums
        .keys()
        .filter(|id| !manifest.album_order.contains(id))
        .count();
    if hidden > 0 {
        lines.push(format!("{}{} albums not in albumOrder", indent(1), hidden));
    }
    if issues.is_empty() {
        lines.push("Manifest is valid".to_string());
    } else {
        lines.push(format!("{} problems", issues.len()));
        for issue in issues {
            lines.push(format!("{}{}", indent(1), issue));
        }
    }
    lines
}

pub fn print_check(path: &Path, manifest: &Manifest, issues: &[ManifestIssue]) {
    for line in format_check(path, manifest, issues) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::RepairOutcome;
    use crate::test_helpers::entry;
    use crate::types::{AlbumRecord, Catalog};
    use std::path::PathBuf;

    fn outcome(id: AlbumId, state: AlbumState, replaced: Option<&str>) -> RepairOutcome {
        RepairOutcome {
            id,
            state,
            history: vec![AlbumState::Declared, state],
            replaced_cover: replaced.map(str::to_string),
            discovered: 0,
        }
    }

    #[test]
    fn build_output_lists_path_and_ids() {
        let mut manifest = Manifest::default();
        manifest.album_order = vec![1, 2, 3];
        let output = BuildOutput {
            manifest,
            path: PathBuf::from("images/manifest.json"),
        };
        assert_eq!(
            format_build_output(&output),
            vec![
                "Generated manifest at images/manifest.json",
                "Album IDs: 1, 2, 3"
            ]
        );
    }

    #[test]
    fn catalog_output_shows_photos_and_empty_indicator() {
        let loaded = LoadedCatalog {
            catalog: Catalog::new(vec![
                entry(1, "images/photo1.JPG", &["images/album1/ph1s1.jpg"]),
                entry(2, "images/photo2.JPG", &[]),
            ]),
            source: CatalogSource::Primary("images/manifest.json".into()),
            repairs: vec![
                outcome(1, AlbumState::Complete, None),
                outcome(2, AlbumState::Empty, None),
            ],
        };

        let lines = format_catalog(&loaded);
        assert_eq!(
            lines,
            vec![
                "Source: images/manifest.json",
                "001 Album 1 (1 photos) [complete]",
                "    Cover: images/photo1.JPG",
                "    Card: center, offset 0",
                "    001 images/album1/ph1s1.jpg",
                "002 Album 2 (0 photos) [empty]",
                "    Cover: images/photo2.JPG",
                "    Card: behind, offset 1",
                "    No photos found for this album.",
            ]
        );
    }

    #[test]
    fn catalog_output_notes_replaced_cover() {
        let loaded = LoadedCatalog {
            catalog: Catalog::new(vec![entry(7, "images/a7/ph7s1.jpg", &["images/a7/ph7s1.jpg"])]),
            source: CatalogSource::Builtin,
            repairs: vec![outcome(7, AlbumState::Complete, Some("images/gone.jpg"))],
        };

        let lines = format_catalog(&loaded);
        assert_eq!(lines[0], "Source: built-in album");
        assert!(lines.contains(&"    Replaced: images/gone.jpg".to_string()));
    }

    #[test]
    fn discovery_output_with_no_hits() {
        assert_eq!(
            format_discovery(2, &[]),
            vec!["Album 2 (0 photos found)", "    No photos found for this album."]
        );
    }

    #[test]
    fn check_output_reports_problems_and_hidden_albums() {
        let mut manifest = Manifest::default();
        manifest.album_order = vec![1, 4];
        manifest.albums.insert(1, AlbumRecord::new(1));
        manifest.albums.insert(9, AlbumRecord::new(9));
        let issues = manifest.validate();

        let lines = format_check(Path::new("images/manifest.json"), &manifest, &issues);
        assert_eq!(lines[1], "    001 Album 1 \"Album 1\" (0 photos)");
        assert_eq!(lines[2], "    002 Album 4 (missing)");
        assert!(lines.contains(&"    1 albums not in albumOrder".to_string()));
        assert!(lines.contains(&"1 problems".to_string()));
    }
}
