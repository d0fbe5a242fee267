// SPDX-License-Identifier: MPL-2.0
//! Domain layer - value objects and business rules.
//!
//! Nothing in here talks to a streaming client, a media element or the
//! network; those live behind the ports in [`crate::application::port`].
//!
//! # Modules
//!
//! - [`timemark`]: Timemark entities, drafts and identifiers
//! - [`video`]: Playback values ([`Volume`](video::Volume),
//!   [`PlaybackRate`](video::PlaybackRate), [`QualityLevel`](video::QualityLevel),
//!   [`MediaSource`](video::MediaSource))

pub mod timemark;
pub mod video;
