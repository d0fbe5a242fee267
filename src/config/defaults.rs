// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Stream**: Adaptive client setup and retry limits
//! - **Controls**: Auto-hide countdown, skip step, volume
//! - **Timemarks**: Backend endpoint and timeouts

use crate::domain::video::newtypes::{auto_hide_bounds, skip_step_bounds, volume_bounds};

// ==========================================================================
// Stream Defaults
// ==========================================================================

/// Seconds of already-played media the client keeps buffered behind the playhead.
pub const DEFAULT_BACK_BUFFER_LENGTH_SECS: u32 = 90;

/// Fatal network errors retried before the session is given up.
pub const DEFAULT_MAX_NETWORK_RETRIES: u32 = 3;

/// Upper bound accepted from the config file.
pub const MAX_NETWORK_RETRIES: u32 = 10;

// ==========================================================================
// Controls Defaults
// ==========================================================================

/// Inactivity before the transport controls hide.
pub const DEFAULT_AUTO_HIDE_MS: u64 = auto_hide_bounds::DEFAULT_MS;

/// Skip-back/skip-forward distance.
pub const DEFAULT_SKIP_STEP_SECS: f64 = skip_step_bounds::DEFAULT;

/// Initial playback volume (0.0 to 1.0).
pub const DEFAULT_VOLUME: f32 = volume_bounds::DEFAULT;

// ==========================================================================
// Timemark Defaults
// ==========================================================================

/// Request timeout for timemark backend calls.
pub const DEFAULT_TIMEMARK_TIMEOUT_SECS: u64 = 10;
