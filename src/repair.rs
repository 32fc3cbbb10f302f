//! Post-load repair pass.
//!
//! Each album walks a small state machine once per load:
//!
//! ```text
//! Declared ──cover ok──▶ Verified ──images non-empty──▶ Complete
//!    │                      │
//!    │ cover missing        │ images empty
//!    ▼                      ▼
//! CoverRepaired ────────▶ DiscoveryRun ──hits──▶ Complete
//!                           │
//!                           └─no hits──▶ Empty
//! ```
//!
//! A missing cover is replaced by the album's first photo when that photo is
//! served; otherwise the declared cover stays as the placeholder. Albums are
//! repaired one after another in catalog order, and each album's probes are
//! sequential, so at most one probe is in flight at any time.
//!
//! The outcome is final for the lifetime of the catalog: an album that ends
//! `Empty` is shown with the "no photos found" indicator until the next load.

use crate::config::CarouselConfig;
use crate::discover;
use crate::probe::Prober;
use crate::types::{AlbumEntry, AlbumId, Catalog, ImagePath};
use serde::Serialize;
use tracing::debug;

/// Position of an album in the repair state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlbumState {
    /// Fresh from normalization.
    Declared,
    /// The cover probe succeeded.
    Verified,
    /// The cover probe failed; the first photo was promoted if it loads.
    CoverRepaired,
    /// The album had no photos and discovery ran.
    DiscoveryRun,
    /// Terminal: the album has photos.
    Complete,
    /// Terminal: no photos were found.
    Empty,
}

impl AlbumState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Empty)
    }
}

/// What happened to one album during repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairOutcome {
    pub id: AlbumId,
    /// Final state: `Complete` or `Empty`.
    pub state: AlbumState,
    /// Every state visited, starting with `Declared`.
    pub history: Vec<AlbumState>,
    /// Previous cover when the first photo replaced it.
    pub replaced_cover: Option<ImagePath>,
    /// Photos added by discovery.
    pub discovered: usize,
}

/// Repair every album in place, in catalog order.
pub async fn repair_catalog<P: Prober + ?Sized>(
    catalog: &mut Catalog,
    prober: &P,
    config: &CarouselConfig,
) -> Vec<RepairOutcome> {
    let mut outcomes = Vec::with_capacity(catalog.len());
    for entry in &mut catalog.albums {
        outcomes.push(repair_entry(entry, prober, config).await);
    }
    outcomes
}

/// Check the cover, then fill an empty photo list by discovery.
pub async fn repair_entry<P: Prober + ?Sized>(
    entry: &mut AlbumEntry,
    prober: &P,
    config: &CarouselConfig,
) -> RepairOutcome {
    let foreground = config.probe.foreground_timeout();
    let mut history = vec![AlbumState::Declared];
    let mut replaced_cover = None;

    if prober.exists(&entry.cover, foreground).await {
        history.push(AlbumState::Verified);
    } else {
        if let Some(first) = entry.images.first().cloned()
            && prober.exists(&first, foreground).await
        {
            debug!(album = entry.id, from = %entry.cover, to = %first, "cover replaced by first photo");
            replaced_cover = Some(std::mem::replace(&mut entry.cover, first));
        }
        history.push(AlbumState::CoverRepaired);
    }

    let mut discovered = 0;
    if entry.images.is_empty() {
        history.push(AlbumState::DiscoveryRun);
        let found = discover::discover(
            entry,
            prober,
            &config.discovery,
            config.probe.batch_timeout(),
        )
        .await;
        discovered = found.len();
        entry.images = found;
    }

    let state = if entry.images.is_empty() {
        AlbumState::Empty
    } else {
        AlbumState::Complete
    };
    history.push(state);
    debug!(album = entry.id, ?state, discovered, "album repaired");

    RepairOutcome {
        id: entry.id,
        state,
        history,
        replaced_cover,
        discovered,
    }
}
