// SPDX-License-Identifier: MPL-2.0
//! Transient user-facing notifications.
//!
//! Playback and timemark failures surface here as short, keyed messages the
//! host renders however it likes (toast, banner, status line). The engine
//! only manages their lifecycle.
//!
//! # Components
//!
//! - [`Notification`] - A keyed message with a severity level
//! - [`Manager`] - Queuing, auto-dismiss and manual dismissal
//!
//! # Design Considerations
//!
//! - Duration: 3s for success/info, 5s for warnings, manual dismiss for errors
//! - Max visible notifications: 3 (others are queued)
//! - Message keys are i18n keys; the host resolves them

mod manager;
mod notification;

pub use manager::{Manager, Message as NotificationMessage};
pub use notification::{Notification, NotificationId, Severity};
