// SPDX-License-Identifier: MPL-2.0
//! Observable playback state.

use crate::domain::video::{PlaybackRate, QualityId, Volume};

/// What the rest of the player sees of the media element.
///
/// Rebuilt from media element events only; commands never write it
/// directly. `current_time` always stays within `[0, duration]`, so it is
/// zero until the duration is known.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    /// Playhead in seconds.
    pub current_time: f64,
    /// Zero until metadata is loaded.
    pub duration: f64,
    pub volume: Volume,
    pub is_muted: bool,
    pub playback_rate: PlaybackRate,
    /// The user's quality selection.
    pub active_quality_id: QualityId,
    /// The level the stream client currently plays, when known.
    pub playing_level: Option<usize>,
    /// The element is stalled waiting for data.
    pub is_buffering: bool,
    pub has_ended: bool,
}

impl PlaybackSnapshot {
    #[must_use]
    pub fn has_duration(&self) -> bool {
        self.duration > 0.0
    }

    /// Clamps a position into `[0, duration]`.
    #[must_use]
    pub fn clamp_time(&self, secs: f64) -> f64 {
        non_negative(secs).min(self.duration)
    }

    /// Fraction of the video played, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.has_duration() {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Volume as heard, zero when muted.
    #[must_use]
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted {
            0.0
        } else {
            self.volume.value()
        }
    }
}

/// Floors a position at zero; non-finite input maps to zero.
pub(crate) fn non_negative(secs: f64) -> f64 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        0.0
    }
}
