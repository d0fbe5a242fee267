// SPDX-License-Identifier: MPL-2.0
//! Routing of queued callback messages to the component that owns them.

use super::{Player, PlayerEvent};
use crate::application::port::{MediaEvent, StreamEvent};
use crate::session::{Envelope, PlayerMessage};
use crate::stream::StreamOutcome;
use crate::video_player::SyncChange;

impl Player {
    /// Handles every queued message and returns what the host must react to.
    ///
    /// Never blocks. Messages stamped with a session other than the live
    /// one are dropped.
    pub fn pump(&mut self) -> Vec<PlayerEvent> {
        while let Ok(envelope) = self.rx.try_recv() {
            self.dispatch(envelope);
        }
        std::mem::take(&mut self.outbox)
    }

    /// Waits for the next message, then behaves like [`pump`](Self::pump).
    ///
    /// The returned list may be empty: most messages only change state
    /// the host reads back through [`snapshot`](Self::snapshot).
    pub async fn next_events(&mut self) -> Vec<PlayerEvent> {
        if self.outbox.is_empty() {
            if let Some(envelope) = self.rx.recv().await {
                self.dispatch(envelope);
            }
        }
        self.pump()
    }

    fn dispatch(&mut self, envelope: Envelope) {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(envelope.session) {
            tracing::trace!(session = %envelope.session, ?current, "dropping stale message");
            self.stale_dropped += 1;
            return;
        }

        match envelope.message {
            PlayerMessage::Stream(event) => self.on_stream_event(event),
            PlayerMessage::Media(event) => self.on_media_event(event),
            PlayerMessage::AutoHideElapsed(generation) => {
                self.controls.auto_hide_elapsed(generation);
            }
        }
    }

    fn on_stream_event(&mut self, event: StreamEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.controller.handle_event(event) {
            StreamOutcome::Nothing | StreamOutcome::Resumed => {}
            StreamOutcome::LevelsReady { active } => self.sync.set_active_quality(active),
            StreamOutcome::LevelSwitched(level) => self.sync.set_playing_level(Some(level)),
            StreamOutcome::Fatal(err) => self.fail(err),
        }
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        match self.sync.handle_media_event(event) {
            SyncChange::Started => {
                if let Some(session) = self.session.as_mut() {
                    session.controller.set_media_playing(true);
                }
                self.controls.playback_started();
            }
            SyncChange::Paused | SyncChange::Ended => {
                if let Some(session) = self.session.as_mut() {
                    session.controller.set_media_playing(false);
                }
                self.controls.playback_stopped();
            }
            SyncChange::None
            | SyncChange::MetadataLoaded
            | SyncChange::Progress
            | SyncChange::Seeked(_)
            | SyncChange::Audio
            | SyncChange::Rate
            | SyncChange::Buffering => {}
        }
    }
}
