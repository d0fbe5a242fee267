// SPDX-License-Identifier: MPL-2.0
//! Timemark commands exposed on the player.
//!
//! These wrap [`TimemarkOverlay`](crate::annotation::TimemarkOverlay) and
//! turn backend failures into notifications, so a failing timemark call
//! never disturbs playback.

use super::Player;
use crate::annotation::DeleteConfirmation;
use crate::domain::timemark::{Timemark, TimemarkDraft, TimemarkId};
use crate::error::{AnnotationError, Error, Result};
use crate::ui::notifications::Notification;

impl Player {
    /// Fetches the timemarks of the current video.
    ///
    /// # Errors
    ///
    /// The backend's error; the previous list is kept.
    pub async fn load_timemarks(&mut self) -> Result<&[Timemark]> {
        if let Err(err) = self.timemarks.load().await.map(|_| ()) {
            return Err(self.report_annotation(err));
        }
        Ok(self.timemarks.timemarks())
    }

    /// Opens a draft at the current playhead.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::Disabled`] if the source has no annotation key.
    pub fn create_timemark_draft(&mut self) -> Result<&TimemarkDraft> {
        let snapshot = self.sync.snapshot();
        Ok(self.timemarks.create_draft(&snapshot)?)
    }

    /// Opens an existing timemark for editing.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::NotFound`].
    pub fn edit_timemark(&mut self, id: &TimemarkId) -> Result<&TimemarkDraft> {
        Ok(self.timemarks.edit(id)?)
    }

    /// # Errors
    ///
    /// [`AnnotationError::NoDraft`].
    pub fn set_timemark_content(&mut self, content: impl Into<String>) -> Result<()> {
        Ok(self.timemarks.set_draft_content(content)?)
    }

    pub fn discard_timemark_draft(&mut self) {
        self.timemarks.discard_draft();
    }

    /// Saves the open draft. The draft stays open if the backend fails.
    ///
    /// # Errors
    ///
    /// The overlay's or backend's error, also pushed as a notification.
    pub async fn save_timemark(&mut self) -> Result<Timemark> {
        match self.timemarks.save().await {
            Ok(saved) => {
                self.notifications
                    .push(Notification::success("notification-timemark-saved"));
                Ok(saved)
            }
            Err(err) => Err(self.report_annotation(err)),
        }
    }

    /// First step of a delete; see [`confirm_timemark_delete`](Self::confirm_timemark_delete).
    ///
    /// # Errors
    ///
    /// [`AnnotationError::NotFound`].
    pub fn request_timemark_delete(&mut self, id: &TimemarkId) -> Result<DeleteConfirmation> {
        Ok(self.timemarks.request_delete(id)?)
    }

    pub fn cancel_timemark_delete(&mut self) {
        self.timemarks.cancel_delete();
    }

    /// Deletes a timemark the user confirmed.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::Unconfirmed`] or the backend's error.
    pub async fn confirm_timemark_delete(&mut self, token: DeleteConfirmation) -> Result<()> {
        match self.timemarks.confirm_delete(token).await {
            Ok(()) => {
                self.notifications
                    .push(Notification::success("notification-timemark-deleted"));
                Ok(())
            }
            Err(err) => Err(self.report_annotation(err)),
        }
    }

    /// Jumps to a timemark. Play/pause state is left alone.
    ///
    /// # Errors
    ///
    /// [`Error::NoActiveSession`] or [`AnnotationError::NotFound`].
    pub fn select_timemark(&mut self, id: &TimemarkId) -> Result<f64> {
        self.require_session()?;
        let timestamp = self.timemarks.select_for_playback(id)?;
        Ok(self.sync.seek(timestamp))
    }

    #[must_use]
    pub fn timemarks(&self) -> &[Timemark] {
        self.timemarks.timemarks()
    }

    #[must_use]
    pub fn timemark_draft(&self) -> Option<&TimemarkDraft> {
        self.timemarks.draft()
    }

    #[must_use]
    pub fn selected_timemark(&self) -> Option<&Timemark> {
        self.timemarks.selected()
    }

    #[must_use]
    pub fn pending_timemark_delete(&self) -> Option<&TimemarkId> {
        self.timemarks.pending_delete()
    }

    #[must_use]
    pub fn search_timemarks(&self, term: &str) -> Vec<&Timemark> {
        self.timemarks.search(term)
    }

    #[must_use]
    pub fn annotations_enabled(&self) -> bool {
        self.timemarks.is_enabled()
    }

    fn report_annotation(&mut self, err: AnnotationError) -> Error {
        tracing::warn!(error = %err, "timemark operation failed");
        self.notifications
            .push(Notification::error(err.i18n_key()).with_arg("details", err.to_string()));
        Error::Annotation(err)
    }
}
