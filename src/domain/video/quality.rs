// SPDX-License-Identifier: MPL-2.0
//! Quality levels (renditions) exposed by an adaptive manifest.

use std::fmt;

/// Rendition selector: either a concrete level or adaptive selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityId {
    /// Let the streaming client pick the rendition from measured bandwidth.
    #[default]
    Auto,
    /// A fixed level, by its index in the manifest.
    Level(usize),
}

impl QualityId {
    /// Returns the level index, or `None` for [`QualityId::Auto`].
    #[must_use]
    pub fn level(self) -> Option<usize> {
        match self {
            Self::Auto => None,
            Self::Level(index) => Some(index),
        }
    }

    #[must_use]
    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for QualityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Level(index) => write!(f, "level {index}"),
        }
    }
}

/// One encoded variant of the asset, as parsed from the manifest.
///
/// Immutable for the lifetime of one media source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityLevel {
    /// Index in the manifest; this is what the client's level API takes.
    pub id: usize,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Advertised bandwidth in bits per second.
    pub bitrate_bps: u64,
    /// Display label, e.g. `"720p"`.
    pub label: String,
}

impl QualityLevel {
    #[must_use]
    pub fn new(id: usize, height: u32, bitrate_bps: u64) -> Self {
        Self {
            id,
            height,
            bitrate_bps,
            label: format!("{height}p"),
        }
    }

    #[must_use]
    pub fn quality_id(&self) -> QualityId {
        QualityId::Level(self.id)
    }
}

/// Returns the level with the highest bitrate (ties go to the taller one).
pub fn highest_bitrate(levels: &[QualityLevel]) -> Option<&QualityLevel> {
    levels
        .iter()
        .max_by_key(|level| (level.bitrate_bps, level.height))
}
