// SPDX-License-Identifier: MPL-2.0
//! Fullscreen host port.
//!
//! The host can only be *asked* to change fullscreen; the user may also
//! leave fullscreen through a system gesture. The actual state therefore
//! reaches the player only through the host's change notification
//! (`Player::fullscreen_changed`).

use crate::error::Result;

pub trait FullscreenHost: Send {
    /// Returns false when the container cannot go fullscreen at all.
    fn is_fullscreen_available(&self) -> bool {
        true
    }

    /// Requests native fullscreen on the player's container.
    fn request_fullscreen(&mut self) -> Result<()>;

    /// Requests leaving fullscreen.
    fn exit_fullscreen(&mut self) -> Result<()>;
}
