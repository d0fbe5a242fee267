// SPDX-License-Identifier: MPL-2.0
//! Video domain types.

pub mod newtypes;
mod quality;
mod source;

pub use newtypes::{AutoHideDelay, PlaybackRate, SkipStep, Volume, PLAYBACK_RATES};
pub use quality::{highest_bitrate, QualityId, QualityLevel};
pub use source::MediaSource;
