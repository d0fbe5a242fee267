// SPDX-License-Identifier: MPL-2.0
//! Error recovery policy.
//!
//! Decides what the stream controller does with each error the client
//! reports:
//!
//! | Error                         | Action                               |
//! |-------------------------------|--------------------------------------|
//! | non-fatal (any kind)          | ignore, the client handles it        |
//! | fatal network, under limit    | restart loading                      |
//! | fatal network, limit reached  | fatal                                |
//! | fatal media, first            | recover the media pipeline           |
//! | fatal media, during recovery  | fatal                                |
//! | anything else                 | fatal                                |
//!
//! Both counters reset once a segment loads again.

use crate::application::port::{StreamErrorData, StreamErrorKind};
use crate::error::PlaybackError;

/// What the controller should do about an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Handled inside the client; log only.
    Ignore,
    /// Restart segment loading. `attempt` starts at 1.
    Retry { attempt: u32 },
    /// Ask the client to rebuild its media pipeline.
    Recover,
    /// Give up on the session.
    Fatal(PlaybackError),
}

#[derive(Debug, Clone)]
pub struct RecoveryPolicy {
    max_network_retries: u32,
    network_attempts: u32,
    media_recovery_pending: bool,
}

impl RecoveryPolicy {
    #[must_use]
    pub fn new(max_network_retries: u32) -> Self {
        Self {
            max_network_retries,
            network_attempts: 0,
            media_recovery_pending: false,
        }
    }

    /// Classifies an error and advances the policy's counters.
    pub fn classify(&mut self, error: &StreamErrorData) -> RecoveryAction {
        if !error.fatal {
            return RecoveryAction::Ignore;
        }

        match error.kind {
            StreamErrorKind::Network => {
                if self.network_attempts < self.max_network_retries {
                    self.network_attempts += 1;
                    RecoveryAction::Retry {
                        attempt: self.network_attempts,
                    }
                } else {
                    RecoveryAction::Fatal(PlaybackError::Network(error.details.clone()))
                }
            }
            StreamErrorKind::Media => {
                if self.media_recovery_pending {
                    RecoveryAction::Fatal(PlaybackError::Media(error.details.clone()))
                } else {
                    self.media_recovery_pending = true;
                    RecoveryAction::Recover
                }
            }
            StreamErrorKind::Other => {
                RecoveryAction::Fatal(PlaybackError::Fatal(error.details.clone()))
            }
        }
    }

    /// Records that data is flowing again.
    pub fn segment_loaded(&mut self) {
        self.network_attempts = 0;
        self.media_recovery_pending = false;
    }

    #[must_use]
    pub fn network_attempts(&self) -> u32 {
        self.network_attempts
    }

    #[must_use]
    pub fn is_recovering_media(&self) -> bool {
        self.media_recovery_pending
    }
}
