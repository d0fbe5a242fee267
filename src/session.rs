// SPDX-License-Identifier: MPL-2.0
//! Session tagging for asynchronous events.
//!
//! Every media source opened on a player gets a fresh [`SessionId`]. All
//! callbacks registered for that source (stream client, media element,
//! auto-hide countdown) post [`Envelope`]s stamped with it through a
//! [`SessionSender`]. The player drops envelopes whose session is no longer
//! current, so a late event from a torn-down session can never touch the
//! state of the next one.

use crate::application::port::{MediaEvent, StreamEvent};
use std::fmt;
use tokio::sync::mpsc;

/// Identifier of one attach/destroy cycle on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Messages delivered to the player's event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerMessage {
    Stream(StreamEvent),
    Media(MediaEvent),
    /// The auto-hide countdown armed with this generation ran out.
    AutoHideElapsed(u64),
}

impl From<StreamEvent> for PlayerMessage {
    fn from(event: StreamEvent) -> Self {
        PlayerMessage::Stream(event)
    }
}

impl From<MediaEvent> for PlayerMessage {
    fn from(event: MediaEvent) -> Self {
        PlayerMessage::Media(event)
    }
}

/// A message stamped with the session it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub session: SessionId,
    pub message: PlayerMessage,
}

/// Cloneable, `Send` handle that posts messages for one session.
#[derive(Clone)]
pub struct SessionSender {
    session: SessionId,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl SessionSender {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { session, tx }
    }

    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Posts a message. Silently dropped once the player is gone.
    pub fn send(&self, message: impl Into<PlayerMessage>) {
        let _ = self.tx.send(Envelope {
            session: self.session,
            message: message.into(),
        });
    }
}

impl fmt::Debug for SessionSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSender")
            .field("session", &self.session)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
