// SPDX-License-Identifier: MPL-2.0
//! The mount point: one player view and everything it owns.
//!
//! `Player` wires the stream controller, the synchronizer, the control
//! surface, the timemark overlay and the notifications together and owns
//! the session lifecycle. At most one streaming session is live at a time:
//! opening a new source tears the old one down (controller destroyed,
//! listeners detached, countdown cancelled) before anything new is
//! attached, and every callback message carries its session id so late
//! messages from a torn-down session are discarded.
//!
//! The host drives the player from its event loop:
//!
//! ```ignore
//! let mut player = Player::new(config, ports);
//! player.open(MediaSource::new(url).with_title(title))?;
//! loop {
//!     for event in player.next_events().await {
//!         match event {
//!             PlayerEvent::Fatal(err) => show_error(err.i18n_key()),
//!             PlayerEvent::Close => return,
//!         }
//!     }
//!     render(&player.snapshot(), player.controls());
//! }
//! ```

mod dispatch;
mod timemarks;

use crate::annotation::TimemarkOverlay;
use crate::application::port::{FullscreenHost, MediaElement, StreamClientFactory, TimemarkBackend};
use crate::config::Config;
use crate::domain::video::{MediaSource, PlaybackRate, QualityId, QualityLevel, Volume};
use crate::error::{Error, PlaybackError, Result};
use crate::session::{Envelope, SessionId, SessionSender};
use crate::stream::{ControllerState, StreamController};
use crate::ui::controls::{ControlSurface, Menu, QualityMenuEntry, RateMenuEntry};
use crate::ui::notifications::{Manager as Notifications, Notification};
use crate::video_player::{format_time, PlaybackSnapshot, Synchronizer};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Signals for the host view.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The session ended with an unrecoverable error. Reported once.
    Fatal(PlaybackError),
    /// The viewer asked to dismiss the player.
    Close,
}

/// Everything the host environment plugs into a player.
pub struct PlayerPorts {
    pub media: Box<dyn MediaElement>,
    pub stream_clients: Box<dyn StreamClientFactory>,
    pub fullscreen: Box<dyn FullscreenHost>,
    pub timemarks: Arc<dyn TimemarkBackend>,
}

struct ActiveSession {
    id: SessionId,
    source: MediaSource,
    controller: StreamController,
}

pub struct Player {
    config: Config,
    stream_clients: Box<dyn StreamClientFactory>,
    fullscreen: Box<dyn FullscreenHost>,
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
    last_session: SessionId,
    session: Option<ActiveSession>,
    sync: Synchronizer,
    controls: ControlSurface,
    timemarks: TimemarkOverlay,
    notifications: Notifications,
    fatal: Option<PlaybackError>,
    outbox: Vec<PlayerEvent>,
    stale_dropped: usize,
}

impl Player {
    pub fn new(config: Config, ports: PlayerPorts) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let sync = Synchronizer::new(ports.media, config.controls.initial_volume());
        let controls = ControlSurface::new(&config.controls);
        Self {
            config,
            stream_clients: ports.stream_clients,
            fullscreen: ports.fullscreen,
            tx,
            rx,
            last_session: SessionId::new(0),
            session: None,
            sync,
            controls,
            timemarks: TimemarkOverlay::new(ports.timemarks),
            notifications: Notifications::new(),
            fatal: None,
            outbox: Vec::new(),
            stale_dropped: 0,
        }
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Opens a media source, replacing the current one.
    ///
    /// # Errors
    ///
    /// [`Error::Playback`] with [`PlaybackError::SourceUnsupported`] when
    /// the environment cannot play adaptive streams. The player is left
    /// without a session and [`fatal_error`](Self::fatal_error) is set.
    pub fn open(&mut self, source: MediaSource) -> Result<()> {
        self.teardown();
        self.fatal = None;
        self.notifications.clear_playback_errors();

        let id = self.last_session.next();
        self.last_session = id;
        let sender = SessionSender::new(id, self.tx.clone());

        match &source.annotations {
            Some(key) => self.timemarks.open(key.clone()),
            None => self.timemarks.close(),
        }

        self.sync.attach(sender.clone());
        self.controls.attach(sender.clone());

        let client = self.stream_clients.create(&self.config.stream);
        let mut controller = StreamController::new(id, &self.config.stream);
        match controller.attach(client, &source.url, sender) {
            Ok(()) => {
                tracing::info!(session = %id, url = %source.url, title = ?source.title, "source opened");
                if let Some(start) = source.start_at_secs {
                    // Held by the synchronizer until metadata arrives.
                    self.sync.seek(start);
                }
                self.session = Some(ActiveSession {
                    id,
                    source,
                    controller,
                });
                Ok(())
            }
            Err(err) => {
                self.teardown();
                if let Error::Playback(playback) = &err {
                    self.notifications
                        .push(Notification::error(playback.i18n_key()));
                    self.fatal = Some(playback.clone());
                }
                Err(err)
            }
        }
    }

    /// Tears the session down and asks the host to dismiss the player.
    pub fn close(&mut self) {
        self.teardown();
        self.timemarks.close();
        self.outbox.push(PlayerEvent::Close);
    }

    /// Releases the session, every listener and the countdown. Idempotent.
    ///
    /// The element is paused and the snapshot reset, so nothing reads as
    /// playing once the session is gone.
    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            self.sync.pause();
            session.controller.destroy();
            tracing::info!(session = %session.id, "session torn down");
        }
        self.sync.detach();
        self.controls.detach();
        self.sync.reset_for_source();
        // Anything still queued belongs to the old session.
        while let Ok(envelope) = self.rx.try_recv() {
            tracing::trace!(session = %envelope.session, "discarding queued message");
            self.stale_dropped += 1;
        }
    }

    fn fail(&mut self, err: PlaybackError) {
        tracing::error!(error = %err, "playback failed");
        self.teardown();
        self.notifications.push(
            Notification::error(err.i18n_key()).with_arg("details", err.to_string()),
        );
        self.fatal = Some(err.clone());
        self.outbox.push(PlayerEvent::Fatal(err));
    }

    fn require_session(&self) -> Result<()> {
        if self.session.is_some() {
            Ok(())
        } else {
            Err(Error::NoActiveSession)
        }
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Starts playback. Playing twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn play(&mut self) -> Result<()> {
        self.require_session()?;
        self.sync.play();
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn pause(&mut self) -> Result<()> {
        self.require_session()?;
        self.sync.pause();
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn toggle_play(&mut self) -> Result<()> {
        self.require_session()?;
        self.sync.toggle_play();
        Ok(())
    }

    /// Seeks to an absolute position. Returns the clamped target.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn seek(&mut self, secs: f64) -> Result<f64> {
        self.require_session()?;
        Ok(self.sync.seek(secs))
    }

    /// Seeks relative to the playhead. Returns the clamped target.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn skip(&mut self, delta_secs: f64) -> Result<f64> {
        self.require_session()?;
        Ok(self.controls.skip(&mut self.sync, delta_secs))
    }

    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn skip_forward(&mut self) -> Result<f64> {
        self.require_session()?;
        Ok(self.controls.skip_forward(&mut self.sync))
    }

    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn skip_backward(&mut self) -> Result<f64> {
        self.require_session()?;
        Ok(self.controls.skip_backward(&mut self.sync))
    }

    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn set_volume(&mut self, volume: f32) -> Result<Volume> {
        self.require_session()?;
        Ok(self.controls.set_volume(&mut self.sync, volume))
    }

    /// # Errors
    ///
    /// [`Error::NoActiveSession`] if nothing is open.
    pub fn toggle_mute(&mut self) -> Result<()> {
        self.require_session()?;
        self.controls.toggle_mute(&mut self.sync);
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::NoActiveSession`], or [`Error::InvalidPlaybackRate`] for a
    /// rate outside the menu.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<PlaybackRate> {
        self.require_session()?;
        self.controls.set_playback_rate(&mut self.sync, rate)
    }

    /// Selects a rendition (or adaptive selection). Never seeks.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveSession`], or [`Error::UnknownQualityLevel`].
    pub fn set_quality(&mut self, id: QualityId) -> Result<QualityId> {
        let session = self.session.as_mut().ok_or(Error::NoActiveSession)?;
        self.controls
            .select_quality(&mut session.controller, &mut self.sync, id)
    }

    // =========================================================================
    // Controls
    // =========================================================================

    /// # Errors
    ///
    /// [`Error::Fullscreen`] from the host.
    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        self.controls.toggle_fullscreen(self.fullscreen.as_mut())
    }

    /// The host's fullscreen change notification.
    pub fn fullscreen_changed(&mut self, fullscreen: bool) {
        self.controls.fullscreen_changed(fullscreen);
    }

    pub fn pointer_moved(&mut self) {
        self.controls.pointer_moved();
    }

    pub fn pointer_left(&mut self) {
        self.controls.pointer_left();
    }

    pub fn open_menu(&mut self, menu: Menu) {
        self.controls.open_menu(menu);
    }

    pub fn close_menu(&mut self) {
        self.controls.close_menu();
    }

    pub fn toggle_menu(&mut self, menu: Menu) {
        self.controls.toggle_menu(menu);
    }

    #[must_use]
    pub fn quality_menu(&self) -> Vec<QualityMenuEntry> {
        let active = self.sync.snapshot().active_quality_id;
        self.controls.quality_menu(self.quality_levels(), active)
    }

    #[must_use]
    pub fn rate_menu(&self) -> Vec<RateMenuEntry> {
        self.controls.rate_menu(self.sync.snapshot().playback_rate)
    }

    // =========================================================================
    // State
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.sync.snapshot()
    }

    /// Receiver that always holds the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.sync.subscribe()
    }

    /// `(position, duration)` labels for the time display.
    #[must_use]
    pub fn time_labels(&self) -> (String, String) {
        let snapshot = self.sync.snapshot();
        (format_time(snapshot.current_time), format_time(snapshot.duration))
    }

    #[must_use]
    pub fn controls(&self) -> &ControlSurface {
        &self.controls
    }

    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    #[must_use]
    pub fn source(&self) -> Option<&MediaSource> {
        self.session.as_ref().map(|s| &s.source)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    #[must_use]
    pub fn controller_state(&self) -> Option<ControllerState> {
        self.session.as_ref().map(|s| s.controller.state())
    }

    /// Levels of the current manifest, in manifest order.
    #[must_use]
    pub fn quality_levels(&self) -> &[QualityLevel] {
        match &self.session {
            Some(session) => session.controller.levels(),
            None => &[],
        }
    }

    /// The error that ended the last session, until a new source opens.
    #[must_use]
    pub fn fatal_error(&self) -> Option<&PlaybackError> {
        self.fatal.as_ref()
    }

    /// Messages discarded because their session was gone.
    #[must_use]
    pub fn stale_dropped(&self) -> usize {
        self.stale_dropped
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("session", &self.session_id())
            .field("controller", &self.controller_state())
            .field("fatal", &self.fatal)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
