// SPDX-License-Identifier: MPL-2.0
//! Media element port.
//!
//! The media element is the resource that actually renders frames and
//! audio (an HTML video element, a native surface, a test double). The
//! synchronizer issues commands to it and builds its state purely from the
//! events it emits back.

use super::ListenerId;

/// Native events of a media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Playback started (or resumed).
    Play,
    /// Playback paused.
    Pause,
    /// The playhead advanced.
    TimeUpdate { current_time: f64 },
    /// Duration became known.
    LoadedMetadata { duration: f64 },
    VolumeChange { volume: f32, muted: bool },
    RateChange { rate: f64 },
    /// A seek completed at `current_time`.
    Seeked { current_time: f64 },
    /// Playback stalled waiting for data.
    Waiting,
    /// Playback reached the end.
    Ended,
}

/// Callback registered with [`MediaElement::on`].
pub type MediaEventHandler = Box<dyn FnMut(MediaEvent) + Send>;

/// Port for the element the streaming client renders into.
///
/// Commands are fire-and-forget: the element confirms them through events.
pub trait MediaElement: Send {
    fn play(&mut self);

    fn pause(&mut self);

    /// Requests a seek; confirmed by [`MediaEvent::Seeked`].
    fn set_current_time(&mut self, secs: f64);

    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);

    fn set_playback_rate(&mut self, rate: f64);

    fn on(&mut self, handler: MediaEventHandler) -> ListenerId;

    /// Removes a handler registered with [`on`](Self::on). Unknown ids are ignored.
    fn off(&mut self, id: ListenerId);
}
