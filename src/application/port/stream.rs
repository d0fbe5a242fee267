// SPDX-License-Identifier: MPL-2.0
//! Adaptive streaming client port.
//!
//! This module defines the [`AdaptiveStreamClient`] trait, the minimal
//! capability surface the stream controller needs from a segmented-media
//! engine. Any compliant client (a browser HLS library behind a binding, a
//! native HLS/DASH stack, a test double) can be substituted without touching
//! the synchronizer or the control surface.
//!
//! # Lifecycle
//!
//! 1. The controller obtains a client from a [`StreamClientFactory`]
//! 2. Checks [`is_supported`](AdaptiveStreamClient::is_supported)
//! 3. Registers one listener with [`on`](AdaptiveStreamClient::on)
//! 4. Calls [`load`](AdaptiveStreamClient::load)
//! 5. Eventually [`off`](AdaptiveStreamClient::off) + [`destroy`](AdaptiveStreamClient::destroy)

use super::ListenerId;
use crate::config::StreamConfig;
use crate::domain::video::QualityId;

/// One rendition as the client reports it when the manifest is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestLevel {
    pub height: u32,
    pub bitrate_bps: u64,
}

/// Coarse error category reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    /// Manifest, key or segment fetch failed.
    Network,
    /// Demuxing, buffer append or decode failed.
    Media,
    /// Anything else (mux errors, internal exceptions).
    Other,
}

impl StreamErrorKind {
    /// Categorizes a raw error description when the client gives no type.
    ///
    /// Network failures are checked first since messages such as
    /// "fragLoadError: timeout while decoding" mention both.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("network")
            || msg_lower.contains("timeout")
            || msg_lower.contains("load error")
            || msg_lower.contains("loaderror")
            || msg_lower.contains("http")
            || msg_lower.contains("connection")
        {
            return StreamErrorKind::Network;
        }

        if msg_lower.contains("media")
            || msg_lower.contains("decode")
            || msg_lower.contains("buffer")
            || msg_lower.contains("codec")
            || msg_lower.contains("append")
        {
            return StreamErrorKind::Media;
        }

        StreamErrorKind::Other
    }
}

/// Error payload of [`StreamEvent::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamErrorData {
    pub kind: StreamErrorKind,
    /// `false` when the client already recovers on its own.
    pub fatal: bool,
    pub details: String,
}

impl StreamErrorData {
    pub fn new(kind: StreamErrorKind, fatal: bool, details: impl Into<String>) -> Self {
        Self {
            kind,
            fatal,
            details: details.into(),
        }
    }

    /// Builds error data from a raw message, inferring the kind.
    pub fn from_message(fatal: bool, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            kind: StreamErrorKind::from_message(&details),
            fatal,
            details,
        }
    }
}

/// Events emitted by an adaptive streaming client.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The manifest was parsed; levels are in manifest order.
    ManifestParsed { levels: Vec<ManifestLevel> },
    /// The client started playing a different rendition.
    LevelSwitched { level: usize },
    /// A segment finished loading.
    FragmentLoaded {
        level: usize,
        start_secs: f64,
        duration_secs: f64,
    },
    Error(StreamErrorData),
}

/// Callback registered with [`AdaptiveStreamClient::on`].
pub type StreamEventHandler = Box<dyn FnMut(StreamEvent) + Send>;

/// Port for an adaptive-bitrate streaming engine bound to one media element.
pub trait AdaptiveStreamClient: Send {
    /// Returns false when the environment cannot play the adaptive format at all.
    fn is_supported(&self) -> bool;

    /// Registers an event handler.
    fn on(&mut self, handler: StreamEventHandler) -> ListenerId;

    /// Removes a handler registered with [`on`](Self::on). Unknown ids are ignored.
    fn off(&mut self, id: ListenerId);

    /// Starts loading the manifest at `url`.
    fn load(&mut self, url: &str);

    /// Selects a rendition. Must not seek; applies at the next segment boundary.
    fn set_level(&mut self, level: QualityId);

    /// Restarts segment loading after a fatal network error.
    fn restart_load(&mut self);

    /// Attempts to recover the media pipeline after a fatal media error.
    fn recover_media_error(&mut self);

    /// Aborts in-flight requests and releases the session. Must be idempotent.
    fn destroy(&mut self);
}

/// Creates a fresh client for every media source.
pub trait StreamClientFactory {
    fn create(&self, config: &StreamConfig) -> Box<dyn AdaptiveStreamClient>;
}

impl<F> StreamClientFactory for F
where
    F: Fn(&StreamConfig) -> Box<dyn AdaptiveStreamClient>,
{
    fn create(&self, config: &StreamConfig) -> Box<dyn AdaptiveStreamClient> {
        self(config)
    }
}
