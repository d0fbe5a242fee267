// SPDX-License-Identifier: MPL-2.0
//! `lecture_player` is an adaptive streaming playback engine for recorded
//! lectures.
//!
//! It drives an adaptive-bitrate client and a media element behind ports,
//! keeps an observable playback snapshot, runs the transport controls
//! (auto-hiding, skip, volume, rate, fullscreen, quality selection) and
//! lets the viewer attach timestamped notes to the video.
//!
//! The entry point is [`player::Player`]. Hosts plug in their own
//! implementations of the traits in [`application::port`]; the `testing`
//! module, enabled by the `testing` feature, ships in-memory ones.

#![doc(html_root_url = "https://docs.rs/lecture_player/0.1.0")]

pub mod annotation;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod player;
pub mod session;
pub mod stream;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod ui;
pub mod video_player;

#[cfg(test)]
mod test_utils;
