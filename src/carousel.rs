//! Presentation model for the album carousel.
//!
//! Everything the page needs to draw the carousel, without a DOM: which card
//! is centred, where every other card sits in 3D space, how input moves the
//! selection, and what the expanded panel shows.
//!
//! Cards are placed by their circular shortest offset from the centred card,
//! so with five albums and the first one centred the last album sits at
//! offset `-1`, immediately to the left.

use crate::types::{AlbumEntry, ImagePath};

const SPACING_X: f64 = 92.0;
const ROTATE_STEP: f64 = -16.0;
const DEPTH_STEP: f64 = 60.0;
const SCALE_STEP: f64 = 0.08;
const MAX_SHRINK: f64 = 0.46;
const STAGGER_MS: u32 = 30;

/// Visual tier of a card relative to the centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTier {
    Center,
    Behind,
    FarBehind,
}

impl CardTier {
    /// CSS class applied to the card.
    pub fn class(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Behind => "behind",
            Self::FarBehind => "far-behind",
        }
    }
}

/// Where one card is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPlacement {
    pub offset: i64,
    pub translate_x: f64,
    pub rotate_y: f64,
    pub translate_z: f64,
    pub scale: f64,
    pub z_index: i64,
    pub tier: CardTier,
    pub transition_delay_ms: u32,
}

impl CardPlacement {
    /// CSS `transform` value for the card.
    pub fn transform(&self) -> String {
        format!(
            "translate(-50%,-50%) translateX({}px) rotateY({}deg) translateZ({}px) scale({})",
            self.translate_x, self.rotate_y, self.translate_z, self.scale
        )
    }
}

/// Keys the carousel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Char(char),
}

/// Content of the expanded panel for one album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelContent {
    Photos(Vec<PanelPhoto>),
    NoPhotosFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelPhoto {
    pub src: ImagePath,
    pub alt: String,
}

pub const NO_PHOTOS_MESSAGE: &str = "No photos found for this album.";

impl PanelContent {
    pub fn for_album(album: &AlbumEntry) -> Self {
        if album.images.is_empty() {
            return Self::NoPhotosFound;
        }
        Self::Photos(
            album
                .images
                .iter()
                .enumerate()
                .map(|(i, src)| PanelPhoto {
                    src: src.clone(),
                    alt: format!("Photo {}", i + 1),
                })
                .collect(),
        )
    }
}

/// Selection and panel state for a carousel of `len` cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    current: usize,
    expanded: bool,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            current: 0,
            expanded: false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.current = (self.current + self.len - 1) % self.len;
        }
    }

    /// A click on the centred card toggles the panel; any other card is selected.
    pub fn click(&mut self, index: usize) {
        if index >= self.len {
            return;
        }
        if index == self.current {
            self.expanded = !self.expanded;
        } else {
            self.current = index;
        }
    }

    /// Keyboard input. While the panel is open only Escape does anything.
    pub fn key(&mut self, key: Key) {
        if self.expanded {
            if key == Key::Escape {
                self.expanded = false;
            }
            return;
        }
        match key {
            Key::ArrowLeft | Key::Char('a') => self.prev(),
            Key::ArrowRight | Key::Char('d') => self.next(),
            _ => {}
        }
    }

    pub fn close(&mut self) {
        self.expanded = false;
    }

    /// Circular shortest offset of card `index` from the centre.
    pub fn offset(&self, index: usize) -> i64 {
        let n = self.len as i64;
        let mut offset = index as i64 - self.current as i64;
        // Mirrors `offset > n / 2` on real numbers for odd and even n.
        if 2 * offset > n {
            offset -= n;
        }
        if 2 * offset < -n {
            offset += n;
        }
        offset
    }

    /// Placement of card `index`. `initial` staggers the entry animation.
    pub fn placement(&self, index: usize, initial: bool) -> CardPlacement {
        let offset = self.offset(index);
        let distance = offset.unsigned_abs();
        let d = distance as f64;
        let o = offset as f64;

        let tier = match distance {
            0 => CardTier::Center,
            1 => CardTier::Behind,
            _ => CardTier::FarBehind,
        };

        // `+ 0.0` turns -0.0 into 0.0 so the centre card renders "0deg".
        CardPlacement {
            offset,
            translate_x: o * SPACING_X,
            rotate_y: o * ROTATE_STEP + 0.0,
            translate_z: -d * DEPTH_STEP + 0.0,
            scale: 1.0 - (d * SCALE_STEP).min(MAX_SHRINK),
            z_index: 1000 - distance as i64,
            tier,
            transition_delay_ms: if initial {
                distance as u32 * STAGGER_MS
            } else {
                0
            },
        }
    }

    /// Placements for every card in order.
    pub fn placements(&self, initial: bool) -> Vec<CardPlacement> {
        (0..self.len).map(|i| self.placement(i, initial)).collect()
    }
}
