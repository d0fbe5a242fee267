// SPDX-License-Identifier: MPL-2.0
//! Playback state synchronization.
//!
//! The [`Synchronizer`] keeps [`PlaybackSnapshot`] consistent with the media
//! element. Commands go to the element; the snapshot only changes when the
//! element reports back through an event. Observers subscribe through a
//! `tokio::sync::watch` channel and always see the latest snapshot.
//!
//! # Pending intents
//!
//! The element confirms `play`/`pause`/seek asynchronously. Between the
//! command and its confirmation the synchronizer remembers the intent so
//! that:
//! - repeated `play()` calls issue a single play request
//! - a toggle pressed twice before confirmation returns to the starting
//!   state instead of toggling against stale data
//! - progress reports from before a seek do not move the playhead back
//!
//! Until metadata reports a duration there is no playable range: progress
//! reports are ignored and a seek is held back, then issued clamped to the
//! duration once it is known.

use super::state::{non_negative, PlaybackSnapshot};
use crate::application::port::{ListenerId, MediaElement, MediaEvent};
use crate::domain::video::{PlaybackRate, QualityId, Volume};
use crate::session::SessionSender;
use tokio::sync::watch;

/// What an event changed, for the player to coordinate the other parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncChange {
    None,
    Started,
    Paused,
    Progress,
    /// A seek completed at this position.
    Seeked(f64),
    MetadataLoaded,
    Audio,
    Rate,
    Buffering,
    Ended,
}

pub struct Synchronizer {
    media: Box<dyn MediaElement>,
    listener: Option<ListenerId>,
    tx: watch::Sender<PlaybackSnapshot>,
    pending_play: Option<bool>,
    pending_seek: Option<f64>,
    /// Seek requested before the duration was known.
    deferred_seek: Option<f64>,
}

impl Synchronizer {
    /// Wraps a media element and applies the initial volume to it.
    pub fn new(mut media: Box<dyn MediaElement>, volume: Volume) -> Self {
        media.set_volume(volume.value());
        let (tx, _rx) = watch::channel(PlaybackSnapshot {
            volume,
            ..PlaybackSnapshot::default()
        });
        Self {
            media,
            listener: None,
            tx,
            pending_play: None,
            pending_seek: None,
            deferred_seek: None,
        }
    }

    /// Starts forwarding media events for a session. Replaces any previous
    /// registration.
    pub fn attach(&mut self, sender: SessionSender) {
        self.detach();
        let session = sender.session();
        self.listener = Some(self.media.on(Box::new(move |event| sender.send(event))));
        tracing::debug!(%session, "media events attached");
    }

    /// Stops forwarding media events. Safe to call repeatedly.
    pub fn detach(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.media.off(listener);
            tracing::debug!("media events detached");
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.tx.borrow().clone()
    }

    /// Whether playback is playing or has been asked to.
    #[must_use]
    pub fn is_playing_or_requested(&self) -> bool {
        self.pending_play
            .unwrap_or_else(|| self.tx.borrow().is_playing)
    }

    /// The playhead, or the target of a seek still in flight or deferred.
    #[must_use]
    pub fn position(&self) -> f64 {
        self.pending_seek
            .or(self.deferred_seek)
            .unwrap_or_else(|| self.tx.borrow().current_time)
    }

    #[must_use]
    pub fn is_seeking(&self) -> bool {
        self.pending_seek.is_some() || self.deferred_seek.is_some()
    }

    /// Folds one media element event into the snapshot.
    pub fn handle_media_event(&mut self, event: MediaEvent) -> SyncChange {
        let mut next = self.snapshot();

        let change = match event {
            MediaEvent::Play => {
                if self.pending_play == Some(true) {
                    self.pending_play = None;
                }
                next.is_playing = true;
                next.has_ended = false;
                SyncChange::Started
            }
            MediaEvent::Pause => {
                if self.pending_play == Some(false) {
                    self.pending_play = None;
                }
                next.is_playing = false;
                SyncChange::Paused
            }
            MediaEvent::TimeUpdate { current_time } => {
                if self.pending_seek.is_some() || !next.has_duration() {
                    return SyncChange::None;
                }
                next.current_time = next.clamp_time(current_time);
                next.is_buffering = false;
                SyncChange::Progress
            }
            MediaEvent::LoadedMetadata { duration } => {
                next.duration = if duration.is_finite() {
                    duration.max(0.0)
                } else {
                    0.0
                };
                next.current_time = next.clamp_time(next.current_time);
                SyncChange::MetadataLoaded
            }
            MediaEvent::VolumeChange { volume, muted } => {
                next.volume = Volume::new(volume);
                next.is_muted = muted;
                SyncChange::Audio
            }
            MediaEvent::RateChange { rate } => match PlaybackRate::try_from(rate) {
                Ok(rate) => {
                    next.playback_rate = rate;
                    SyncChange::Rate
                }
                Err(rate) => {
                    tracing::warn!(rate, "media element reported an unsupported rate");
                    return SyncChange::None;
                }
            },
            MediaEvent::Seeked { current_time } => {
                self.pending_seek = None;
                next.current_time = next.clamp_time(current_time);
                SyncChange::Seeked(next.current_time)
            }
            MediaEvent::Waiting => {
                next.is_buffering = true;
                SyncChange::Buffering
            }
            MediaEvent::Ended => {
                self.pending_play = None;
                next.is_playing = false;
                next.has_ended = true;
                next.current_time = next.duration.max(next.current_time);
                SyncChange::Ended
            }
        };

        self.publish(next);
        if change == SyncChange::MetadataLoaded {
            self.apply_deferred_seek();
        }
        change
    }

    /// Requests playback. Returns false if already playing or requested.
    pub fn play(&mut self) -> bool {
        if self.is_playing_or_requested() {
            return false;
        }
        self.pending_play = Some(true);
        self.media.play();
        true
    }

    /// Requests a pause. Returns false if already paused or requested.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing_or_requested() {
            return false;
        }
        self.pending_play = Some(false);
        self.media.pause();
        true
    }

    /// Pauses when playing (or requested), plays otherwise.
    pub fn toggle_play(&mut self) {
        if self.is_playing_or_requested() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Requests a seek to `secs`, clamped into the playable range.
    ///
    /// Returns the clamped target. The snapshot moves once the element
    /// confirms with `Seeked`. Before the duration is known nothing reaches
    /// the element: the target is kept (floored at zero, replacing any
    /// earlier one) and issued when metadata arrives.
    pub fn seek(&mut self, secs: f64) -> f64 {
        if !self.tx.borrow().has_duration() {
            let target = non_negative(secs);
            self.deferred_seek = Some(target);
            tracing::trace!(target, "seek deferred until metadata");
            return target;
        }
        let target = self.tx.borrow().clamp_time(secs);
        self.issue_seek(target)
    }

    fn issue_seek(&mut self, target: f64) -> f64 {
        self.pending_seek = Some(target);
        self.media.set_current_time(target);
        tracing::trace!(target, "seek requested");
        target
    }

    fn apply_deferred_seek(&mut self) {
        let Some(requested) = self.deferred_seek.take() else {
            return;
        };
        if !self.tx.borrow().has_duration() {
            tracing::debug!(requested, "no duration reported, dropping deferred seek");
            return;
        }
        let target = self.tx.borrow().clamp_time(requested);
        tracing::debug!(requested, target, "applying deferred seek");
        self.issue_seek(target);
    }

    pub fn set_volume(&mut self, volume: Volume) {
        self.media.set_volume(volume.value());
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.media.set_muted(muted);
    }

    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.media.set_playback_rate(rate.value());
    }

    /// Records the user's quality selection. Quality never comes from the
    /// media element, so it is written here directly.
    pub fn set_active_quality(&mut self, id: QualityId) {
        self.tx.send_if_modified(|snapshot| {
            let changed = snapshot.active_quality_id != id;
            snapshot.active_quality_id = id;
            changed
        });
    }

    pub fn set_playing_level(&mut self, level: Option<usize>) {
        self.tx.send_if_modified(|snapshot| {
            let changed = snapshot.playing_level != level;
            snapshot.playing_level = level;
            changed
        });
    }

    /// Forgets everything tied to the previous source. Audio settings and
    /// rate live on the element and are kept.
    pub fn reset_for_source(&mut self) {
        self.pending_play = None;
        self.pending_seek = None;
        self.deferred_seek = None;
        let current = self.snapshot();
        self.publish(PlaybackSnapshot {
            volume: current.volume,
            is_muted: current.is_muted,
            playback_rate: current.playback_rate,
            ..PlaybackSnapshot::default()
        });
    }

    fn publish(&self, next: PlaybackSnapshot) {
        self.tx.send_if_modified(|snapshot| {
            if *snapshot == next {
                false
            } else {
                *snapshot = next;
                true
            }
        });
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("attached", &self.listener.is_some())
            .field("pending_play", &self.pending_play)
            .field("pending_seek", &self.pending_seek)
            .field("deferred_seek", &self.deferred_seek)
            .field("snapshot", &*self.tx.borrow())
            .finish()
    }
}
