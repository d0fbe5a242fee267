// SPDX-License-Identifier: MPL-2.0
//! Video playback newtypes.
//!
//! This module provides type-safe wrappers for playback values,
//! ensuring they are always within valid ranges.

use std::time::Duration;

// =============================================================================
// Volume
// =============================================================================

/// Volume bounds (linear 0.0 to 1.0).
pub mod volume_bounds {
    /// Minimum volume level.
    pub const MIN: f32 = 0.0;
    /// Maximum volume level.
    pub const MAX: f32 = 1.0;
    /// Default volume level.
    pub const DEFAULT: f32 = 1.0;
    /// Volume adjustment step per key press (10%, matching the slider step).
    pub const STEP: f32 = 0.1;
}

/// Volume level, guaranteed to be within valid range (0.0–1.0).
///
/// This newtype enforces validity at the type level, making it impossible
/// to create an invalid volume value.
///
/// # Example
///
/// ```
/// use lecture_player::domain::video::Volume;
///
/// let vol = Volume::new(0.5);
/// assert_eq!(vol.value(), 0.5);
///
/// // Values outside range are clamped
/// let too_loud = Volume::new(2.0);
/// assert_eq!(too_loud.value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(f32);

impl Volume {
    /// Creates a new volume level, clamping to valid range.
    ///
    /// `NaN` is treated as silence.
    #[must_use]
    pub fn new(volume: f32) -> Self {
        if volume.is_nan() {
            return Self(volume_bounds::MIN);
        }
        Self(volume.clamp(volume_bounds::MIN, volume_bounds::MAX))
    }

    /// Returns the volume value as f32.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns true if volume is effectively silent (below audible threshold).
    #[must_use]
    pub fn is_silent(self) -> bool {
        self.0 < 0.001
    }

    /// Increases volume by one step, clamping to maximum.
    #[must_use]
    pub fn increase(self) -> Self {
        Self::new(self.0 + volume_bounds::STEP)
    }

    /// Decreases volume by one step, clamping to minimum.
    #[must_use]
    pub fn decrease(self) -> Self {
        Self::new(self.0 - volume_bounds::STEP)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(volume_bounds::DEFAULT)
    }
}

// =============================================================================
// Playback Rate
// =============================================================================

/// The only playback rates the transport controls offer.
pub const PLAYBACK_RATES: [f64; 5] = [0.5, 1.0, 1.25, 1.5, 2.0];

/// Playback rate restricted to the discrete set in [`PLAYBACK_RATES`].
///
/// Unlike [`Volume`], out-of-set values are rejected rather than clamped:
/// a rate of `1.1` is not "close enough" to anything the menu shows.
///
/// # Example
///
/// ```
/// use lecture_player::domain::video::PlaybackRate;
///
/// assert_eq!(PlaybackRate::try_from(1.5).unwrap().value(), 1.5);
/// assert!(PlaybackRate::try_from(3.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Normal speed.
    pub const NORMAL: Self = Self(1.0);

    /// Returns the rate as f64.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Iterates over every accepted rate in ascending order.
    pub fn all() -> impl Iterator<Item = PlaybackRate> {
        PLAYBACK_RATES.iter().map(|&rate| PlaybackRate(rate))
    }

    /// Returns the menu label, e.g. `"1.25x"`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{}x", self.0)
    }

    /// Returns the next faster rate, or self at the top of the set.
    #[must_use]
    pub fn faster(self) -> Self {
        PLAYBACK_RATES
            .iter()
            .find(|&&r| r > self.0 + 0.001)
            .map_or(self, |&r| Self(r))
    }

    /// Returns the next slower rate, or self at the bottom of the set.
    #[must_use]
    pub fn slower(self) -> Self {
        PLAYBACK_RATES
            .iter()
            .rev()
            .find(|&&r| r < self.0 - 0.001)
            .map_or(self, |&r| Self(r))
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = f64;

    /// Accepts a value only if it matches one of [`PLAYBACK_RATES`];
    /// returns the rejected value otherwise.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        PLAYBACK_RATES
            .iter()
            .find(|&&r| (r - value).abs() < 1e-6)
            .map(|&r| Self(r))
            .ok_or(value)
    }
}

// =============================================================================
// Skip Step
// =============================================================================

/// Skip step bounds in seconds.
pub mod skip_step_bounds {
    /// Minimum skip step.
    pub const MIN: f64 = 1.0;
    /// Maximum skip step.
    pub const MAX: f64 = 60.0;
    /// Default skip step, as bound to the rewind/forward buttons.
    pub const DEFAULT: f64 = 10.0;
}

/// Distance jumped by the skip-back/skip-forward buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipStep(f64);

impl SkipStep {
    /// Creates a new skip step, clamping to valid range.
    #[must_use]
    pub fn new(secs: f64) -> Self {
        if secs.is_nan() {
            return Self::default();
        }
        Self(secs.clamp(skip_step_bounds::MIN, skip_step_bounds::MAX))
    }

    /// Returns the step in seconds.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SkipStep {
    fn default() -> Self {
        Self(skip_step_bounds::DEFAULT)
    }
}

// =============================================================================
// Auto-hide Delay
// =============================================================================

/// Auto-hide delay bounds in milliseconds.
pub mod auto_hide_bounds {
    /// Minimum delay.
    pub const MIN_MS: u64 = 500;
    /// Maximum delay.
    pub const MAX_MS: u64 = 30_000;
    /// Default delay.
    pub const DEFAULT_MS: u64 = 3_000;
}

/// Inactivity delay before the transport controls hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoHideDelay(u64);

impl AutoHideDelay {
    /// Creates a new delay, clamping to valid range.
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self(ms.clamp(auto_hide_bounds::MIN_MS, auto_hide_bounds::MAX_MS))
    }

    /// Returns the value in milliseconds.
    #[must_use]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns the delay as a Duration.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for AutoHideDelay {
    fn default() -> Self {
        Self(auto_hide_bounds::DEFAULT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_abs_diff_eq, F32_EPSILON};

    #[test]
    fn volume_clamps_to_valid_range() {
        assert_abs_diff_eq!(Volume::new(-0.5).value(), 0.0);
        assert_abs_diff_eq!(Volume::new(1.5).value(), 1.0);
        assert_abs_diff_eq!(Volume::new(0.3).value(), 0.3, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(Volume::new(f32::NAN).value(), 0.0);
    }

    #[test]
    fn volume_steps_stay_in_range() {
        assert_abs_diff_eq!(Volume::new(1.0).increase().value(), 1.0);
        assert_abs_diff_eq!(Volume::new(0.0).decrease().value(), 0.0);
        assert_abs_diff_eq!(Volume::new(0.5).increase().value(), 0.6, epsilon = 0.001);
    }

    #[test]
    fn volume_silence_threshold() {
        assert!(Volume::new(0.0).is_silent());
        assert!(!Volume::new(0.01).is_silent());
    }

    #[test]
    fn playback_rate_accepts_only_menu_values() {
        for rate in PLAYBACK_RATES {
            assert_abs_diff_eq!(PlaybackRate::try_from(rate).unwrap().value(), rate);
        }
        assert_eq!(PlaybackRate::try_from(0.75), Err(0.75));
        assert_eq!(PlaybackRate::try_from(3.0), Err(3.0));
        assert!(PlaybackRate::try_from(f64::NAN).is_err());
    }

    #[test]
    fn playback_rate_steps_through_set() {
        assert_abs_diff_eq!(PlaybackRate::NORMAL.faster().value(), 1.25);
        assert_abs_diff_eq!(PlaybackRate::NORMAL.slower().value(), 0.5);
        let max = PlaybackRate::try_from(2.0).unwrap();
        assert_eq!(max.faster(), max);
    }

    #[test]
    fn playback_rate_label() {
        assert_eq!(PlaybackRate::try_from(1.25).unwrap().label(), "1.25x");
        assert_eq!(PlaybackRate::NORMAL.label(), "1x");
    }

    #[test]
    fn skip_step_clamps() {
        assert_abs_diff_eq!(SkipStep::new(0.0).value(), skip_step_bounds::MIN);
        assert_abs_diff_eq!(SkipStep::new(600.0).value(), skip_step_bounds::MAX);
        assert_abs_diff_eq!(SkipStep::default().value(), 10.0);
    }

    #[test]
    fn auto_hide_delay_clamps_and_converts() {
        assert_eq!(AutoHideDelay::default().as_millis(), 3_000);
        assert_eq!(AutoHideDelay::from_millis(1).as_millis(), auto_hide_bounds::MIN_MS);
        assert_eq!(
            AutoHideDelay::from_millis(3_000).as_duration(),
            Duration::from_secs(3)
        );
    }
}
