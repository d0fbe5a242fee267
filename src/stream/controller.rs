// SPDX-License-Identifier: MPL-2.0
//! Stream controller state machine.
//!
//! Owns the adaptive streaming client for one media source:
//! - Idle: Created, nothing loaded
//! - Loading: Manifest requested
//! - Ready: Manifest parsed, quality levels known
//! - Playing / Paused: Mirrors the media element once playback has begun
//! - Retrying: Restarting segment loading after a network error
//! - Recovering: Rebuilding the media pipeline after a media error
//! - Fatal: Unrecoverable error, about to release the session
//! - Destroyed: Session released (terminal)

use super::recovery::{RecoveryAction, RecoveryPolicy};
use crate::application::port::{AdaptiveStreamClient, ListenerId, StreamEvent};
use crate::config::StreamConfig;
use crate::domain::video::{highest_bitrate, QualityId, QualityLevel};
use crate::error::{Error, PlaybackError, Result};
use crate::session::{SessionId, SessionSender};

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Retrying,
    Recovering,
    Fatal,
    Destroyed,
}

impl ControllerState {
    /// Returns true once the session has been released. There is no way back.
    #[must_use]
    pub fn is_destroyed(self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Returns true while an internal recovery is in progress.
    #[must_use]
    pub fn is_recovering(self) -> bool {
        matches!(self, Self::Retrying | Self::Recovering)
    }

    /// Returns true if the session can still take commands.
    #[must_use]
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Idle | Self::Fatal | Self::Destroyed)
    }
}

/// What the player has to propagate after the controller handled an event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// Nothing visible changed.
    Nothing,
    /// Quality levels are known; `active` is the initial selection.
    LevelsReady { active: QualityId },
    /// The client now plays this level.
    LevelSwitched(usize),
    /// Data flows again after a retry or recovery.
    Resumed,
    /// The session is gone. Reported at most once per controller.
    Fatal(PlaybackError),
}

pub struct StreamController {
    session: SessionId,
    client: Option<Box<dyn AdaptiveStreamClient>>,
    listener: Option<ListenerId>,
    state: ControllerState,
    levels: Vec<QualityLevel>,
    selected: Option<QualityId>,
    playing_level: Option<usize>,
    media_playing: bool,
    has_played: bool,
    recovery: RecoveryPolicy,
    fatal_reported: bool,
}

impl StreamController {
    /// Creates an idle controller for one session.
    #[must_use]
    pub fn new(session: SessionId, config: &StreamConfig) -> Self {
        Self {
            session,
            client: None,
            listener: None,
            state: ControllerState::Idle,
            levels: Vec::new(),
            selected: None,
            playing_level: None,
            media_playing: false,
            has_played: false,
            recovery: RecoveryPolicy::new(config.network_retry_limit()),
            fatal_reported: false,
        }
    }

    /// Takes ownership of `client` and starts loading `url`.
    ///
    /// Client events are forwarded through `sender`, stamped with this
    /// controller's session.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::SourceUnsupported`] if the client cannot play the
    ///   format; the client is destroyed and the controller ends `Destroyed`
    /// - A [`PlaybackError::Fatal`] if the controller was already attached
    pub fn attach(
        &mut self,
        mut client: Box<dyn AdaptiveStreamClient>,
        url: &str,
        sender: SessionSender,
    ) -> Result<()> {
        if self.state != ControllerState::Idle {
            client.destroy();
            return Err(Error::Playback(PlaybackError::Fatal(
                "stream controller already attached".into(),
            )));
        }

        if !client.is_supported() {
            tracing::error!(session = %self.session, url, "adaptive streaming not supported");
            client.destroy();
            self.state = ControllerState::Destroyed;
            self.fatal_reported = true;
            return Err(Error::Playback(PlaybackError::SourceUnsupported));
        }

        let listener = client.on(Box::new(move |event| sender.send(event)));
        client.load(url);
        tracing::info!(session = %self.session, url, "manifest load started");

        self.client = Some(client);
        self.listener = Some(listener);
        self.state = ControllerState::Loading;
        Ok(())
    }

    /// Applies one client event.
    pub fn handle_event(&mut self, event: StreamEvent) -> StreamOutcome {
        if self.state.is_destroyed() {
            tracing::trace!(session = %self.session, ?event, "event after destroy ignored");
            return StreamOutcome::Nothing;
        }

        match event {
            StreamEvent::ManifestParsed { levels } => self.on_manifest_parsed(&levels),
            StreamEvent::LevelSwitched { level } => {
                self.playing_level = Some(level);
                tracing::debug!(session = %self.session, level, "level switched");
                StreamOutcome::LevelSwitched(level)
            }
            StreamEvent::FragmentLoaded { .. } => {
                self.recovery.segment_loaded();
                if self.state.is_recovering() {
                    self.state = self.resume_state();
                    tracing::info!(session = %self.session, state = ?self.state, "stream resumed");
                    StreamOutcome::Resumed
                } else {
                    StreamOutcome::Nothing
                }
            }
            StreamEvent::Error(error) => match self.recovery.classify(&error) {
                RecoveryAction::Ignore => {
                    tracing::debug!(session = %self.session, kind = ?error.kind, details = %error.details, "non-fatal stream error");
                    StreamOutcome::Nothing
                }
                RecoveryAction::Retry { attempt } => {
                    tracing::warn!(session = %self.session, attempt, details = %error.details, "network error, restarting load");
                    self.state = ControllerState::Retrying;
                    if let Some(client) = self.client.as_mut() {
                        client.restart_load();
                    }
                    StreamOutcome::Nothing
                }
                RecoveryAction::Recover => {
                    tracing::warn!(session = %self.session, details = %error.details, "media error, attempting recovery");
                    self.state = ControllerState::Recovering;
                    if let Some(client) = self.client.as_mut() {
                        client.recover_media_error();
                    }
                    StreamOutcome::Nothing
                }
                RecoveryAction::Fatal(err) => self.fail(err),
            },
        }
    }

    fn on_manifest_parsed(&mut self, manifest: &[crate::application::port::ManifestLevel]) -> StreamOutcome {
        self.levels = manifest
            .iter()
            .enumerate()
            .map(|(index, level)| QualityLevel::new(index, level.height, level.bitrate_bps))
            .collect();

        // Start at the best rendition rather than letting ABR ramp up.
        let active = highest_bitrate(&self.levels).map_or(QualityId::Auto, QualityLevel::quality_id);
        if let Some(client) = self.client.as_mut() {
            client.set_level(active);
        }
        self.selected = Some(active);
        if matches!(
            self.state,
            ControllerState::Loading | ControllerState::Retrying
        ) {
            self.state = ControllerState::Ready;
        }
        tracing::info!(session = %self.session, levels = self.levels.len(), %active, "manifest parsed");
        StreamOutcome::LevelsReady { active }
    }

    /// Switches rendition without seeking.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveSession`] after destroy
    /// - [`Error::UnknownQualityLevel`] for ids not in the manifest
    pub fn set_quality_level(&mut self, id: QualityId) -> Result<QualityId> {
        let client = match self.client.as_mut() {
            Some(client) if self.state.is_live() => client,
            _ => return Err(Error::NoActiveSession),
        };
        if let QualityId::Level(index) = id {
            if !self.levels.iter().any(|level| level.id == index) {
                return Err(Error::UnknownQualityLevel(id));
            }
        }
        client.set_level(id);
        self.selected = Some(id);
        tracing::debug!(session = %self.session, %id, "quality level requested");
        Ok(id)
    }

    /// Mirrors the media element's play state into the lifecycle.
    pub fn set_media_playing(&mut self, playing: bool) {
        self.media_playing = playing;
        self.has_played |= playing;
        if matches!(
            self.state,
            ControllerState::Ready | ControllerState::Playing | ControllerState::Paused
        ) {
            self.state = if playing {
                ControllerState::Playing
            } else {
                ControllerState::Paused
            };
        }
    }

    fn resume_state(&self) -> ControllerState {
        if self.media_playing {
            ControllerState::Playing
        } else if self.has_played {
            ControllerState::Paused
        } else if self.levels.is_empty() {
            ControllerState::Loading
        } else {
            ControllerState::Ready
        }
    }

    fn fail(&mut self, err: PlaybackError) -> StreamOutcome {
        tracing::error!(session = %self.session, error = %err, "fatal stream error");
        self.state = ControllerState::Fatal;
        self.destroy();
        if self.fatal_reported {
            StreamOutcome::Nothing
        } else {
            self.fatal_reported = true;
            StreamOutcome::Fatal(err)
        }
    }

    /// Detaches the listener and releases the client. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if let Some(mut client) = self.client.take() {
            if let Some(listener) = self.listener.take() {
                client.off(listener);
            }
            client.destroy();
            tracing::info!(session = %self.session, "stream session destroyed");
        }
        self.state = ControllerState::Destroyed;
    }

    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Quality levels in manifest order.
    #[must_use]
    pub fn levels(&self) -> &[QualityLevel] {
        &self.levels
    }

    /// The last accepted selection, once the manifest is parsed.
    #[must_use]
    pub fn selected_quality(&self) -> Option<QualityId> {
        self.selected
    }

    /// The level the client last reported switching to.
    #[must_use]
    pub fn playing_level(&self) -> Option<usize> {
        self.playing_level
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for StreamController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamController")
            .field("session", &self.session)
            .field("state", &self.state)
            .field("levels", &self.levels.len())
            .field("selected", &self.selected)
            .finish()
    }
}
