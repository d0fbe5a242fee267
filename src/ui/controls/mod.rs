// SPDX-License-Identifier: MPL-2.0
//! Transport controls.
//!
//! The [`ControlSurface`] holds the state that belongs to the control bar
//! itself (visibility, open menu, fullscreen flag, the volume to restore on
//! unmute) and turns user gestures into commands on the synchronizer and
//! the stream controller. It never writes the playback snapshot.

pub mod menu;
mod timer;
pub mod visibility;

pub use menu::{Menu, QualityMenuEntry, RateMenuEntry};
pub use timer::AutoHideTimer;
pub use visibility::ControlVisibility;

use crate::application::port::FullscreenHost;
use crate::config::ControlsConfig;
use crate::domain::video::{AutoHideDelay, PlaybackRate, QualityId, QualityLevel, SkipStep, Volume};
use crate::error::{Error, Result};
use crate::session::SessionSender;
use crate::stream::StreamController;
use crate::video_player::Synchronizer;
use visibility::{Countdown, Effect, Message};

#[derive(Debug)]
pub struct ControlSurface {
    visibility: visibility::State,
    timer: Option<AutoHideTimer>,
    sender: Option<SessionSender>,
    auto_hide: AutoHideDelay,
    skip_step: SkipStep,
    /// Restored when unmuting from silence.
    last_audible_volume: Volume,
    fullscreen: bool,
    menu: Option<Menu>,
}

impl ControlSurface {
    #[must_use]
    pub fn new(config: &ControlsConfig) -> Self {
        let volume = config.initial_volume();
        Self {
            visibility: visibility::State::default(),
            timer: None,
            sender: None,
            auto_hide: config.auto_hide_delay(),
            skip_step: config.skip_step(),
            last_audible_volume: if volume.is_silent() {
                Volume::default()
            } else {
                volume
            },
            fullscreen: false,
            menu: None,
        }
    }

    /// Binds the auto-hide countdown to a session.
    pub fn attach(&mut self, sender: SessionSender) {
        self.detach();
        self.sender = Some(sender);
    }

    /// Cancels the countdown and closes menus. Visibility resets to shown.
    pub fn detach(&mut self) {
        self.timer = None;
        self.sender = None;
        self.menu = None;
        self.visibility = visibility::State::default();
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    pub fn pointer_moved(&mut self) {
        self.apply(Message::PointerMoved);
    }

    pub fn pointer_left(&mut self) {
        self.apply(Message::PointerLeft);
    }

    pub fn playback_started(&mut self) {
        self.apply(Message::PlaybackStarted);
    }

    pub fn playback_stopped(&mut self) {
        self.apply(Message::PlaybackStopped);
    }

    /// Handles an elapsed countdown. Returns true if the controls were hidden.
    pub fn auto_hide_elapsed(&mut self, generation: u64) -> bool {
        if self.timer.as_ref().is_some_and(|t| t.generation() == generation) {
            self.timer = None;
        }
        self.apply(Message::CountdownElapsed(generation)) == Some(false)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    #[must_use]
    pub fn visibility(&self) -> ControlVisibility {
        self.visibility.snapshot()
    }

    /// Returns true while an auto-hide countdown is running.
    #[must_use]
    pub fn is_countdown_armed(&self) -> bool {
        self.timer.is_some()
    }

    fn apply(&mut self, msg: Message) -> Option<bool> {
        let Effect {
            visibility_changed,
            countdown,
        } = self.visibility.handle(msg);

        match countdown {
            Countdown::Unchanged => {}
            Countdown::Cancel => self.timer = None,
            Countdown::Arm(generation) => {
                // Replacing the guard aborts the previous countdown.
                self.timer = self.sender.clone().map(|sender| {
                    AutoHideTimer::arm(sender, self.auto_hide.as_duration(), generation)
                });
            }
        }

        if let Some(visible) = visibility_changed {
            tracing::trace!(visible, "controls visibility changed");
        }
        visibility_changed
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Seeks relative to the current position (or to a seek still in
    /// flight, so repeated skips accumulate). Returns the clamped target.
    pub fn skip(&mut self, sync: &mut Synchronizer, delta_secs: f64) -> f64 {
        let delta = if delta_secs.is_finite() { delta_secs } else { 0.0 };
        sync.seek(sync.position() + delta)
    }

    pub fn skip_forward(&mut self, sync: &mut Synchronizer) -> f64 {
        self.skip(sync, self.skip_step.value())
    }

    pub fn skip_backward(&mut self, sync: &mut Synchronizer) -> f64 {
        self.skip(sync, -self.skip_step.value())
    }

    #[must_use]
    pub fn skip_step(&self) -> SkipStep {
        self.skip_step
    }

    /// Sets a linear volume. Zero mutes; any other value unmutes and is
    /// remembered for [`toggle_mute`](Self::toggle_mute).
    pub fn set_volume(&mut self, sync: &mut Synchronizer, volume: f32) -> Volume {
        let volume = Volume::new(volume);
        sync.set_volume(volume);
        if volume.is_silent() {
            sync.set_muted(true);
        } else {
            self.last_audible_volume = volume;
            if sync.snapshot().is_muted {
                sync.set_muted(false);
            }
        }
        volume
    }

    /// Mutes, or unmutes at the last non-zero volume.
    pub fn toggle_mute(&mut self, sync: &mut Synchronizer) {
        let snapshot = sync.snapshot();
        if snapshot.is_muted || snapshot.volume.is_silent() {
            if snapshot.volume.is_silent() {
                sync.set_volume(self.last_audible_volume);
            }
            sync.set_muted(false);
        } else {
            sync.set_muted(true);
        }
    }

    #[must_use]
    pub fn last_audible_volume(&self) -> Volume {
        self.last_audible_volume
    }

    /// Changes the rate. Closes the rate menu.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPlaybackRate`] if `rate` is not one of the menu's
    /// values. Nothing is sent to the element in that case.
    pub fn set_playback_rate(&mut self, sync: &mut Synchronizer, rate: f64) -> Result<PlaybackRate> {
        let rate = PlaybackRate::try_from(rate).map_err(Error::InvalidPlaybackRate)?;
        sync.set_playback_rate(rate);
        if self.menu == Some(Menu::Rate) {
            self.close_menu();
        }
        Ok(rate)
    }

    // =========================================================================
    // Fullscreen
    // =========================================================================

    /// Asks the host to enter or leave fullscreen. The flag only changes
    /// through [`fullscreen_changed`](Self::fullscreen_changed).
    ///
    /// # Errors
    ///
    /// [`Error::Fullscreen`] if the host has no fullscreen support, or
    /// whatever the host returns.
    pub fn toggle_fullscreen(&mut self, host: &mut dyn FullscreenHost) -> Result<()> {
        if self.fullscreen {
            host.exit_fullscreen()
        } else if host.is_fullscreen_available() {
            host.request_fullscreen()
        } else {
            Err(Error::Fullscreen("fullscreen is not available".into()))
        }
    }

    /// Applies the host's fullscreen change notification.
    pub fn fullscreen_changed(&mut self, fullscreen: bool) {
        if self.fullscreen != fullscreen {
            self.fullscreen = fullscreen;
            tracing::debug!(fullscreen, "fullscreen changed");
            self.apply(Message::FullscreenChanged);
        }
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    // =========================================================================
    // Menus
    // =========================================================================

    /// Opens a menu, closing the other one. Pins the controls visible.
    pub fn open_menu(&mut self, menu: Menu) {
        self.menu = Some(menu);
        self.apply(Message::MenuOpened);
    }

    pub fn close_menu(&mut self) {
        if self.menu.take().is_some() {
            self.apply(Message::MenuClosed);
        }
    }

    pub fn toggle_menu(&mut self, menu: Menu) {
        if self.menu == Some(menu) {
            self.close_menu();
        } else {
            self.open_menu(menu);
        }
    }

    #[must_use]
    pub fn open_menu_kind(&self) -> Option<Menu> {
        self.menu
    }

    #[must_use]
    pub fn quality_menu(&self, levels: &[QualityLevel], active: QualityId) -> Vec<QualityMenuEntry> {
        menu::quality_entries(levels, active)
    }

    #[must_use]
    pub fn rate_menu(&self, current: PlaybackRate) -> Vec<RateMenuEntry> {
        menu::rate_entries(current)
    }

    /// Switches quality through the stream controller and closes the menu.
    ///
    /// # Errors
    ///
    /// Whatever [`StreamController::set_quality_level`] rejects; the menu
    /// stays open in that case.
    pub fn select_quality(
        &mut self,
        controller: &mut StreamController,
        sync: &mut Synchronizer,
        id: QualityId,
    ) -> Result<QualityId> {
        let id = controller.set_quality_level(id)?;
        sync.set_active_quality(id);
        if self.menu == Some(Menu::Quality) {
            self.close_menu();
        }
        Ok(id)
    }
}
