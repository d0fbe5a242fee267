// SPDX-License-Identifier: MPL-2.0
//! Playback state for the lecture player.
//!
//! This module mirrors the media element into an observable
//! [`PlaybackSnapshot`] and turns transport commands into element calls.

mod state;
pub mod sync;
mod time_format;

pub use state::PlaybackSnapshot;
pub use sync::{SyncChange, Synchronizer};
pub use time_format::format_time;
