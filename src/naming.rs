//! Filename conventions recognized by the manifest builder.
//!
//! Three patterns assign a file to an album:
//!
//! | Pattern | Example | Meaning |
//! |---------|---------|---------|
//! | `photo<d>.<ext>` | `photo2.JPG` | cover for album `d` (a single digit 1-9) |
//! | `ph<n>s<k>.<ext>` | `ph1s12.jpg` | photo `k` of album `n` |
//! | `album<n>`, `album-<n>`, `a<n>` | `images/album-4/` | directory holding album `n` |
//!
//! Pattern letters and extensions match case-insensitively. The emitted path
//! always keeps the original casing since the serving origin may not.
//!
//! ## Ordering
//!
//! [`natural_cmp`] orders paths the way a person would: digit runs compare by
//! value (`ph1s2` before `ph1s10`) and letters compare without regard to case.

use crate::types::AlbumId;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static COVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^photo([1-9])\.(jpe?g|png|webp)$").expect("valid regex"));

static PHOTO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ph(\d+)s(\d+)\.(jpe?g|png|webp)$").expect("valid regex"));

static ALBUM_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:album-?(\d+)|a(\d+))$").expect("valid regex"));

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// How a single basename was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `photo<d>.<ext>`: the album's cover image.
    Cover { album: AlbumId },
    /// `ph<n>s<k>.<ext>`: photo number `sequence` of the album.
    Photo { album: AlbumId, sequence: u32 },
}

/// Classify a basename against the cover and photo patterns.
///
/// Returns `None` when neither pattern matches or when the captured id is
/// zero or does not fit an [`AlbumId`].
pub fn classify_file(name: &str) -> Option<FileKind> {
    if let Some(caps) = COVER_RE.captures(name) {
        let album = positive_id(&caps[1])?;
        return Some(FileKind::Cover { album });
    }
    if let Some(caps) = PHOTO_RE.captures(name) {
        let album = positive_id(&caps[1])?;
        let sequence = caps[2].parse().ok()?;
        return Some(FileKind::Photo { album, sequence });
    }
    None
}

/// Album id carried by a directory name (`album3`, `album-3`, `a3`).
pub fn album_dir_id(name: &str) -> Option<AlbumId> {
    let caps = ALBUM_DIR_RE.captures(name)?;
    let digits = caps.get(1).or_else(|| caps.get(2))?;
    positive_id(digits.as_str())
}

/// True for the extensions the builder treats as images (case-insensitive).
pub fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn positive_id(digits: &str) -> Option<AlbumId> {
    digits.parse::<AlbumId>().ok().filter(|&id| id > 0)
}

/// Numeric-aware, case-insensitive comparison.
///
/// Strings are split into digit and non-digit runs. Digit runs compare by
/// numeric value (leading zeros ignored, then shorter run first); other runs
/// compare case-insensitively. Strings that tie under those rules fall back
/// to a plain byte comparison so the order is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Chunk::Digits(x)), Some(Chunk::Digits(y))) => cmp_digits(x, y),
            (Some(Chunk::Text(x)), Some(Chunk::Text(y))) => cmp_text(x, y),
            (Some(Chunk::Digits(_)), Some(Chunk::Text(_))) => Ordering::Less,
            (Some(Chunk::Text(_)), Some(Chunk::Digits(_))) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

fn cmp_digits(x: &str, y: &str) -> Ordering {
    let xt = x.trim_start_matches('0');
    let yt = y.trim_start_matches('0');
    xt.len()
        .cmp(&yt.len())
        .then_with(|| xt.cmp(yt))
        .then_with(|| x.len().cmp(&y.len()))
}

fn cmp_text(x: &str, y: &str) -> Ordering {
    x.chars()
        .flat_map(char::to_lowercase)
        .cmp(y.chars().flat_map(char::to_lowercase))
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits {
            Chunk::Digits(chunk)
        } else {
            Chunk::Text(chunk)
        })
    }
}
