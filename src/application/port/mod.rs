// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! These are the seams where the host environment plugs in. The engine
//! only ever sees these traits.
//!
//! # Available Ports
//!
//! - [`stream`]: Adaptive streaming client (manifest, levels, recovery)
//! - [`media`]: Media element (transport commands and native events)
//! - [`fullscreen`]: Fullscreen requests
//! - [`timemark`]: Timemark persistence
//!
//! # Design Notes
//!
//! - Event sources register boxed `FnMut` handlers and return a
//!   [`ListenerId`] so the caller can detach exactly what it attached
//! - Stream and media ports are synchronous; only the timemark backend is
//!   `async`, since it is the only one the engine awaits

pub mod fullscreen;
pub mod media;
pub mod stream;
pub mod timemark;

pub use fullscreen::FullscreenHost;
pub use media::{MediaElement, MediaEvent, MediaEventHandler};
pub use stream::{
    AdaptiveStreamClient, ManifestLevel, StreamClientFactory, StreamErrorData, StreamErrorKind,
    StreamEvent, StreamEventHandler,
};
pub use timemark::TimemarkBackend;

/// Handle for a registered event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);
