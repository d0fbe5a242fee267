// SPDX-License-Identifier: MPL-2.0
//! Auto-hide countdown.

use crate::session::{PlayerMessage, SessionSender};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A running auto-hide countdown.
///
/// When the delay elapses, posts [`PlayerMessage::AutoHideElapsed`] with
/// the countdown's generation. Dropping the guard aborts the countdown, so
/// whoever owns it (the control surface) cannot leak a pending timer.
#[derive(Debug)]
pub struct AutoHideTimer {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl AutoHideTimer {
    /// Starts a countdown on the ambient tokio runtime.
    ///
    /// Without a runtime the guard is inert: controls simply stay visible.
    pub fn arm(sender: SessionSender, delay: Duration, generation: u64) -> Self {
        let task = match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(async move {
                tokio::time::sleep(delay).await;
                sender.send(PlayerMessage::AutoHideElapsed(generation));
            })),
            Err(_) => {
                tracing::debug!("no tokio runtime, auto-hide disabled");
                None
            }
        };
        Self { generation, task }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true while the countdown has not fired.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for AutoHideTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
