// SPDX-License-Identifier: MPL-2.0
//! Activity-driven visibility of the control bar.
//!
//! Controls stay visible while paused. While playing they hide once the
//! auto-hide countdown runs out with no pointer activity in between. An
//! open menu pins them visible. Leaving the player hides them at once
//! unless a menu is open.
//!
//! Each armed countdown gets a new generation number. An elapsed
//! notification only hides the controls if it carries the current
//! generation, so a countdown superseded by later activity is a no-op
//! even if its notification was already in flight.

use std::time::Instant;

/// Public view of the visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlVisibility {
    pub visible: bool,
    /// Last pointer movement, playback start or menu interaction.
    pub last_activity_at: Option<Instant>,
}

/// Messages for the visibility state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    PointerMoved,
    PointerLeft,
    PlaybackStarted,
    PlaybackStopped,
    MenuOpened,
    MenuClosed,
    FullscreenChanged,
    /// The countdown with this generation ran out.
    CountdownElapsed(u64),
}

/// What to do with the auto-hide countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Unchanged,
    /// Start a new countdown tagged with this generation.
    Arm(u64),
    Cancel,
}

/// Effects produced by a visibility message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    /// `Some(visible)` when visibility flipped.
    pub visibility_changed: Option<bool>,
    pub countdown: Countdown,
}

impl Effect {
    const NONE: Self = Self {
        visibility_changed: None,
        countdown: Countdown::Unchanged,
    };
}

#[derive(Debug, Clone)]
pub struct State {
    visible: bool,
    last_activity_at: Option<Instant>,
    generation: u64,
    playing: bool,
    /// A menu is open.
    pinned: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            visible: true,
            last_activity_at: None,
            generation: 0,
            playing: false,
            pinned: false,
        }
    }
}

impl State {
    pub fn handle(&mut self, msg: Message) -> Effect {
        let was_visible = self.visible;

        let countdown = match msg {
            Message::PointerMoved | Message::FullscreenChanged => self.activity(),
            Message::PlaybackStarted => {
                self.playing = true;
                self.activity()
            }
            Message::MenuClosed => {
                self.pinned = false;
                self.activity()
            }
            Message::PlaybackStopped => {
                self.playing = false;
                self.visible = true;
                self.cancel_countdown()
            }
            Message::MenuOpened => {
                self.pinned = true;
                self.last_activity_at = Some(Instant::now());
                self.visible = true;
                self.cancel_countdown()
            }
            Message::PointerLeft => {
                if self.pinned {
                    return Effect::NONE;
                }
                self.visible = false;
                self.cancel_countdown()
            }
            Message::CountdownElapsed(generation) => {
                if generation != self.generation || !self.playing || self.pinned {
                    return Effect::NONE;
                }
                self.visible = false;
                Countdown::Unchanged
            }
        };

        Effect {
            visibility_changed: (self.visible != was_visible).then_some(self.visible),
            countdown,
        }
    }

    fn activity(&mut self) -> Countdown {
        self.last_activity_at = Some(Instant::now());
        self.visible = true;
        self.restart_countdown()
    }

    fn restart_countdown(&mut self) -> Countdown {
        if self.playing && !self.pinned {
            self.generation = self.generation.wrapping_add(1);
            Countdown::Arm(self.generation)
        } else {
            self.cancel_countdown()
        }
    }

    fn cancel_countdown(&mut self) -> Countdown {
        // Bumping the generation invalidates any notification in flight.
        self.generation = self.generation.wrapping_add(1);
        Countdown::Cancel
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn snapshot(&self) -> ControlVisibility {
        ControlVisibility {
            visible: self.visible,
            last_activity_at: self.last_activity_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(effect: Effect) -> u64 {
        match effect.countdown {
            Countdown::Arm(generation) => generation,
            other => panic!("expected an armed countdown, got {other:?}"),
        }
    }

    #[test]
    fn starts_visible_without_countdown() {
        let state = State::default();
        assert!(state.is_visible());
        assert!(state.snapshot().last_activity_at.is_none());
    }

    #[test]
    fn playback_start_arms_countdown() {
        let mut state = State::default();
        let generation = armed(state.handle(Message::PlaybackStarted));

        let effect = state.handle(Message::CountdownElapsed(generation));
        assert_eq!(effect.visibility_changed, Some(false));
        assert!(!state.is_visible());
    }

    #[test]
    fn pointer_movement_supersedes_previous_countdown() {
        let mut state = State::default();
        let first = armed(state.handle(Message::PlaybackStarted));
        let second = armed(state.handle(Message::PointerMoved));
        assert_ne!(first, second);

        assert_eq!(state.handle(Message::CountdownElapsed(first)), Effect::NONE);
        assert!(state.is_visible());

        state.handle(Message::CountdownElapsed(second));
        assert!(!state.is_visible());
    }

    #[test]
    fn pointer_movement_reveals_hidden_controls() {
        let mut state = State::default();
        let generation = armed(state.handle(Message::PlaybackStarted));
        state.handle(Message::CountdownElapsed(generation));

        let effect = state.handle(Message::PointerMoved);
        assert_eq!(effect.visibility_changed, Some(true));
        assert!(matches!(effect.countdown, Countdown::Arm(_)));
    }

    #[test]
    fn paused_controls_never_hide_on_timeout() {
        let mut state = State::default();
        let generation = armed(state.handle(Message::PlaybackStarted));
        let effect = state.handle(Message::PlaybackStopped);
        assert_eq!(effect.countdown, Countdown::Cancel);

        state.handle(Message::CountdownElapsed(generation));
        assert!(state.is_visible());
        assert_eq!(state.handle(Message::PointerMoved).countdown, Countdown::Cancel);
    }

    #[test]
    fn open_menu_pins_visibility() {
        let mut state = State::default();
        let generation = armed(state.handle(Message::PlaybackStarted));
        state.handle(Message::MenuOpened);

        assert_eq!(state.handle(Message::PointerLeft), Effect::NONE);
        state.handle(Message::CountdownElapsed(generation));
        assert!(state.is_visible());

        let closed = armed(state.handle(Message::MenuClosed));
        state.handle(Message::CountdownElapsed(closed));
        assert!(!state.is_visible());
    }

    #[test]
    fn pointer_leave_hides_immediately() {
        let mut state = State::default();
        let effect = state.handle(Message::PointerLeft);
        assert_eq!(effect.visibility_changed, Some(false));
        assert_eq!(effect.countdown, Countdown::Cancel);
    }
}
