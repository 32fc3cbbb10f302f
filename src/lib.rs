//! # Album Carousel
//!
//! Album discovery and manifest pipeline for a single-page photo carousel.
//! The page shows one card per album, rotates between them, and expands the
//! centred album into a strip of full-size photos. This crate produces and
//! consumes the album catalog behind that page.
//!
//! # Architecture: Offline Build, Online Load, Probe Repair
//!
//! ```text
//! 1. Build    images/           →  images/manifest.json   (filesystem → manifest)
//! 2. Load     manifest.json     →  Catalog                (HTTP → validated albums)
//! 3. Repair   Catalog + origin  →  Catalog                (probe covers, rebuild empty albums)
//! ```
//!
//! The builder runs wherever the image tree lives and needs no network. The
//! loader and repair pass only need HTTP access to the site, which is a
//! passive file host: nothing on the server knows about albums.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the image tree and writes the manifest |
//! | [`load`] | Stage 2: fetches, validates, and normalizes the manifest |
//! | [`repair`] | Stage 3: cover checks and the per-album state machine |
//! | [`discover`] | Probe-driven reconstruction of an album's photo list |
//! | [`probe`] | The [`Prober`](probe::Prober) trait and image signature sniffing |
//! | [`origin`] | HTTP client implementing manifest fetches and probes |
//! | [`naming`] | Cover, photo, and album-directory filename patterns |
//! | [`types`] | `Manifest`, `Catalog`, and album types shared by every stage |
//! | [`config`] | `carousel.toml` loading, merging, and validation |
//! | [`carousel`] | Card placement, navigation, and expanded-panel model |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Loader Never Fails
//!
//! A broken manifest must not blank the page. Every failure (missing file, bad
//! JSON, no `albums`) falls through to the fallback manifest and then to a
//! built-in album, so the carousel always has at least one card.
//!
//! ## Sequential Probing
//!
//! Discovery asks the origin for one candidate at a time and stops after a few
//! consecutive misses. An album with no photos costs a bounded number of
//! requests, and the connection pool is never flooded by speculative loads.
//!
//! ## Single-Threaded Runtime
//!
//! The binary runs on tokio's current-thread runtime. All suspension points are
//! network requests, and catalog mutation happens between them, so the catalog
//! needs no locking.

pub mod carousel;
pub mod config;
pub mod discover;
pub mod load;
pub mod naming;
pub mod origin;
pub mod output;
pub mod probe;
pub mod repair;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
