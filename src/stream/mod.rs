// SPDX-License-Identifier: MPL-2.0
//! Adaptive stream control.
//!
//! [`StreamController`] owns the streaming client for one media source and
//! runs every client error through the [`RecoveryPolicy`]. Only fatal
//! errors leave this module.

mod controller;
pub mod recovery;

pub use controller::{ControllerState, StreamController, StreamOutcome};
pub use recovery::{RecoveryAction, RecoveryPolicy};
