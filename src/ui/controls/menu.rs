// SPDX-License-Identifier: MPL-2.0
//! Quality and playback-rate menus.

use crate::domain::video::{PlaybackRate, QualityId, QualityLevel};

/// A popup menu of the control bar. While one is open the controls stay
/// visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Quality,
    Rate,
}

/// Label of the adaptive entry, as an i18n key.
pub const AUTO_QUALITY_LABEL: &str = "video-quality-auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityMenuEntry {
    pub id: QualityId,
    /// `"1080p"` for levels, [`AUTO_QUALITY_LABEL`] for auto.
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateMenuEntry {
    pub rate: PlaybackRate,
    pub label: String,
    pub selected: bool,
}

/// Auto first, then levels from tallest to shortest.
///
/// Levels of equal height are ordered by bitrate, highest first.
#[must_use]
pub fn quality_entries(levels: &[QualityLevel], active: QualityId) -> Vec<QualityMenuEntry> {
    let mut sorted: Vec<&QualityLevel> = levels.iter().collect();
    sorted.sort_by(|a, b| {
        b.height
            .cmp(&a.height)
            .then_with(|| b.bitrate_bps.cmp(&a.bitrate_bps))
    });

    std::iter::once(QualityMenuEntry {
        id: QualityId::Auto,
        label: AUTO_QUALITY_LABEL.to_string(),
        selected: active.is_auto(),
    })
    .chain(sorted.into_iter().map(|level| QualityMenuEntry {
        id: level.quality_id(),
        label: level.label.clone(),
        selected: active == level.quality_id(),
    }))
    .collect()
}

/// Every accepted rate, slowest first.
#[must_use]
pub fn rate_entries(current: PlaybackRate) -> Vec<RateMenuEntry> {
    PlaybackRate::all()
        .map(|rate| RateMenuEntry {
            rate,
            label: rate.label(),
            selected: rate == current,
        })
        .collect()
}
