// SPDX-License-Identifier: MPL-2.0
//! Timemark annotation overlay.
//!
//! Keeps the in-memory list of the viewer's timemarks for the current
//! video and the single open draft. The backend is the source of truth:
//! the list only changes after a backend call succeeds, and saved drafts
//! are replaced by the entity the backend returns.
//!
//! Deleting is a two-step operation. [`TimemarkOverlay::request_delete`]
//! hands out a [`DeleteConfirmation`] that must come back through
//! [`TimemarkOverlay::confirm_delete`] before anything is sent.

use crate::application::port::TimemarkBackend;
use crate::domain::timemark::{
    AnnotationKey, DraftId, NewTimemark, Timemark, TimemarkDraft, TimemarkId, TimemarkUpdate,
};
use crate::error::AnnotationError;
use crate::video_player::PlaybackSnapshot;
use std::sync::Arc;

/// Proof that the user confirmed a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: TimemarkId,
    nonce: u64,
}

impl DeleteConfirmation {
    #[must_use]
    pub fn timemark_id(&self) -> &TimemarkId {
        &self.id
    }
}

pub struct TimemarkOverlay {
    backend: Arc<dyn TimemarkBackend>,
    key: Option<AnnotationKey>,
    timemarks: Vec<Timemark>,
    draft: Option<TimemarkDraft>,
    selected: Option<TimemarkId>,
    pending_delete: Option<DeleteConfirmation>,
    next_draft: u64,
    next_nonce: u64,
}

impl TimemarkOverlay {
    pub fn new(backend: Arc<dyn TimemarkBackend>) -> Self {
        Self {
            backend,
            key: None,
            timemarks: Vec::new(),
            draft: None,
            selected: None,
            pending_delete: None,
            next_draft: 0,
            next_nonce: 0,
        }
    }

    /// Binds the overlay to a video. Forgets the previous video's state.
    pub fn open(&mut self, key: AnnotationKey) {
        self.close();
        tracing::debug!(course = %key.course_id, video = %key.video_id, "timemarks opened");
        self.key = Some(key);
    }

    /// Unbinds the overlay. Unsaved drafts are dropped.
    pub fn close(&mut self) {
        self.key = None;
        self.timemarks.clear();
        self.draft = None;
        self.selected = None;
        self.pending_delete = None;
    }

    #[must_use]
    pub fn key(&self) -> Option<&AnnotationKey> {
        self.key.as_ref()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    fn require_key(&self) -> Result<AnnotationKey, AnnotationError> {
        self.key.clone().ok_or(AnnotationError::Disabled)
    }

    /// Fetches the list for the current video, replacing the local one.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::Disabled`] without a key, or the backend's error.
    /// The previous list is kept on failure.
    pub async fn load(&mut self) -> Result<&[Timemark], AnnotationError> {
        let key = self.require_key()?;
        let mut timemarks = self.backend.list(&key).await?;
        timemarks.retain(|t| t.key() == key);
        timemarks.sort_by(Timemark::listing_order);
        tracing::debug!(video = %key.video_id, count = timemarks.len(), "timemarks loaded");
        self.timemarks = timemarks;
        Ok(&self.timemarks)
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    /// Opens a new draft at the current playhead. Replaces any open draft.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::Disabled`] if no video is bound.
    pub fn create_draft(&mut self, snapshot: &PlaybackSnapshot) -> Result<&TimemarkDraft, AnnotationError> {
        self.require_key()?;
        let draft = TimemarkDraft {
            draft_id: self.next_draft_id(),
            persisted_id: None,
            timestamp: snapshot.clamp_time(snapshot.current_time),
            content: String::new(),
        };
        Ok(self.draft.insert(draft))
    }

    /// Opens an existing timemark for editing.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::NotFound`] if the id is not in the list.
    pub fn edit(&mut self, id: &TimemarkId) -> Result<&TimemarkDraft, AnnotationError> {
        let (timestamp, content) = {
            let timemark = self.find(id)?;
            (timemark.timestamp, timemark.content.clone())
        };
        let draft = TimemarkDraft {
            draft_id: self.next_draft_id(),
            persisted_id: Some(id.clone()),
            timestamp,
            content,
        };
        Ok(self.draft.insert(draft))
    }

    /// Replaces the open draft's text.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::NoDraft`] if nothing is open.
    pub fn set_draft_content(&mut self, content: impl Into<String>) -> Result<(), AnnotationError> {
        let draft = self.draft.as_mut().ok_or(AnnotationError::NoDraft)?;
        draft.content = content.into();
        Ok(())
    }

    pub fn discard_draft(&mut self) {
        self.draft = None;
    }

    #[must_use]
    pub fn draft(&self) -> Option<&TimemarkDraft> {
        self.draft.as_ref()
    }

    /// Persists the open draft.
    ///
    /// New drafts are created, drafts of existing timemarks are updated
    /// (last write wins). On success the draft closes and the returned
    /// entity takes its place in the list. On failure the draft stays open
    /// so nothing the user typed is lost.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::NoDraft`], [`AnnotationError::Disabled`], or the
    /// backend's error.
    pub async fn save(&mut self) -> Result<Timemark, AnnotationError> {
        let key = self.require_key()?;
        let draft = self.draft.clone().ok_or(AnnotationError::NoDraft)?;

        let saved = match &draft.persisted_id {
            None => {
                let request = NewTimemark {
                    course_id: key.course_id.clone(),
                    video_id: key.video_id.clone(),
                    timestamp: draft.timestamp,
                    content: draft.content.clone(),
                };
                self.backend.create(&request).await?
            }
            Some(id) => {
                let update = TimemarkUpdate {
                    timestamp: draft.timestamp,
                    content: draft.content.clone(),
                };
                self.backend.update(&key, id, &update).await?
            }
        };
        tracing::info!(id = %saved.id, timestamp = saved.timestamp, "timemark saved");

        self.draft = None;
        self.upsert(saved.clone());
        Ok(saved)
    }

    fn upsert(&mut self, timemark: Timemark) {
        match self.timemarks.iter_mut().find(|t| t.id == timemark.id) {
            Some(existing) => *existing = timemark,
            None => self.timemarks.push(timemark),
        }
        self.timemarks.sort_by(Timemark::listing_order);
    }

    fn next_draft_id(&mut self) -> DraftId {
        self.next_draft += 1;
        DraftId::new(self.next_draft)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Starts a delete. Nothing is sent until the token is confirmed.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::NotFound`] if the id is not in the list.
    pub fn request_delete(&mut self, id: &TimemarkId) -> Result<DeleteConfirmation, AnnotationError> {
        self.find(id)?;
        self.next_nonce += 1;
        let token = DeleteConfirmation {
            id: id.clone(),
            nonce: self.next_nonce,
        };
        self.pending_delete = Some(token.clone());
        Ok(token)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&TimemarkId> {
        self.pending_delete.as_ref().map(|token| &token.id)
    }

    /// Deletes on the backend, then locally.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::Unconfirmed`] if `token` is not the pending
    /// request, or the backend's error (the entry stays listed).
    pub async fn confirm_delete(&mut self, token: DeleteConfirmation) -> Result<(), AnnotationError> {
        if self.pending_delete.as_ref() != Some(&token) {
            return Err(AnnotationError::Unconfirmed(token.id));
        }
        let key = self.require_key()?;
        self.pending_delete = None;

        self.backend.delete(&key, &token.id).await?;
        tracing::info!(id = %token.id, "timemark deleted");

        self.timemarks.retain(|t| t.id != token.id);
        if self.selected.as_ref() == Some(&token.id) {
            self.selected = None;
        }
        if self
            .draft
            .as_ref()
            .is_some_and(|d| d.persisted_id.as_ref() == Some(&token.id))
        {
            self.draft = None;
        }
        Ok(())
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Marks a timemark as the one being viewed and returns where to seek.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::NotFound`] if the id is not in the list.
    pub fn select_for_playback(&mut self, id: &TimemarkId) -> Result<f64, AnnotationError> {
        let timestamp = self.find(id)?.timestamp;
        self.selected = Some(id.clone());
        Ok(timestamp)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Timemark> {
        let id = self.selected.as_ref()?;
        self.timemarks.iter().find(|t| &t.id == id)
    }

    /// Timemarks of the current video, by timestamp.
    #[must_use]
    pub fn timemarks(&self) -> &[Timemark] {
        &self.timemarks
    }

    /// Case-insensitive content filter, in listing order.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Timemark> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.timemarks.iter().collect();
        }
        self.timemarks
            .iter()
            .filter(|t| t.content.to_lowercase().contains(&needle))
            .collect()
    }

    fn find(&self, id: &TimemarkId) -> Result<&Timemark, AnnotationError> {
        self.timemarks
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| AnnotationError::NotFound(id.clone()))
    }
}

impl std::fmt::Debug for TimemarkOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimemarkOverlay")
            .field("key", &self.key)
            .field("timemarks", &self.timemarks.len())
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnotationOperation;
    use crate::testing::InMemoryTimemarkBackend;

    fn key() -> AnnotationKey {
        AnnotationKey::new("course-1", "lecture-03")
    }

    fn at(secs: f64) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_time: secs,
            duration: 600.0,
            ..PlaybackSnapshot::default()
        }
    }

    fn overlay() -> (TimemarkOverlay, Arc<InMemoryTimemarkBackend>) {
        let backend = Arc::new(InMemoryTimemarkBackend::new());
        let mut overlay = TimemarkOverlay::new(backend.clone());
        overlay.open(key());
        (overlay, backend)
    }

    async fn saved(overlay: &mut TimemarkOverlay, secs: f64, content: &str) -> Timemark {
        overlay.create_draft(&at(secs)).unwrap();
        overlay.set_draft_content(content).unwrap();
        overlay.save().await.unwrap()
    }

    #[test]
    fn draft_requires_open_video() {
        let backend = Arc::new(InMemoryTimemarkBackend::new());
        let mut overlay = TimemarkOverlay::new(backend);
        assert_eq!(
            overlay.create_draft(&at(1.0)).unwrap_err(),
            AnnotationError::Disabled
        );
    }

    #[test]
    fn draft_captures_current_time() {
        let (mut overlay, _backend) = overlay();
        let draft = overlay.create_draft(&at(95.4)).unwrap();
        assert!(draft.is_new());
        assert_eq!(draft.timestamp, 95.4);
    }

    #[tokio::test]
    async fn save_creates_and_replaces_draft() {
        let (mut overlay, backend) = overlay();
        let timemark = saved(&mut overlay, 95.4, "Key formula").await;

        assert!(overlay.draft().is_none());
        assert_eq!(overlay.timemarks(), &[timemark.clone()]);
        assert_eq!(backend.create_calls(), 1);
        assert_eq!(timemark.content, "Key formula");
    }

    #[tokio::test]
    async fn save_existing_updates() {
        let (mut overlay, backend) = overlay();
        let timemark = saved(&mut overlay, 10.0, "first").await;

        overlay.edit(&timemark.id).unwrap();
        overlay.set_draft_content("second").unwrap();
        let updated = overlay.save().await.unwrap();

        assert_eq!(updated.id, timemark.id);
        assert_eq!(backend.update_calls(), 1);
        assert_eq!(overlay.timemarks().len(), 1);
        assert_eq!(overlay.timemarks()[0].content, "second");
    }

    #[tokio::test]
    async fn failed_save_keeps_draft() {
        let (mut overlay, backend) = overlay();
        backend.fail_next(AnnotationOperation::Create);

        overlay.create_draft(&at(3.0)).unwrap();
        overlay.set_draft_content("keep me").unwrap();
        let err = overlay.save().await.unwrap_err();

        assert!(matches!(
            err,
            AnnotationError::Backend {
                operation: AnnotationOperation::Create,
                ..
            }
        ));
        assert_eq!(overlay.draft().unwrap().content, "keep me");
        assert!(overlay.timemarks().is_empty());
    }

    #[tokio::test]
    async fn list_is_ordered_by_timestamp() {
        let (mut overlay, _backend) = overlay();
        saved(&mut overlay, 300.0, "c").await;
        saved(&mut overlay, 5.0, "a").await;
        saved(&mut overlay, 120.0, "b").await;

        let contents: Vec<&str> = overlay.timemarks().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);

        overlay.load().await.unwrap();
        let reloaded: Vec<f64> = overlay.timemarks().iter().map(|t| t.timestamp).collect();
        assert_eq!(reloaded, vec![5.0, 120.0, 300.0]);
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let (mut overlay, backend) = overlay();
        let timemark = saved(&mut overlay, 42.0, "gone").await;

        let token = overlay.request_delete(&timemark.id).unwrap();
        assert_eq!(backend.delete_calls(), 0);
        assert_eq!(overlay.pending_delete(), Some(&timemark.id));

        overlay.confirm_delete(token).await.unwrap();
        assert_eq!(backend.delete_calls(), 1);
        assert!(overlay.timemarks().is_empty());
    }

    #[tokio::test]
    async fn cancelled_or_stale_token_is_rejected() {
        let (mut overlay, backend) = overlay();
        let timemark = saved(&mut overlay, 42.0, "stay").await;

        let stale = overlay.request_delete(&timemark.id).unwrap();
        overlay.cancel_delete();
        assert_eq!(
            overlay.confirm_delete(stale.clone()).await.unwrap_err(),
            AnnotationError::Unconfirmed(timemark.id.clone())
        );

        overlay.request_delete(&timemark.id).unwrap();
        assert!(overlay.confirm_delete(stale).await.is_err());
        assert_eq!(backend.delete_calls(), 0);
        assert_eq!(overlay.timemarks().len(), 1);
    }

    #[tokio::test]
    async fn failed_delete_keeps_entry() {
        let (mut overlay, backend) = overlay();
        let timemark = saved(&mut overlay, 42.0, "stay").await;
        backend.fail_next(AnnotationOperation::Delete);

        let token = overlay.request_delete(&timemark.id).unwrap();
        assert!(overlay.confirm_delete(token).await.is_err());
        assert_eq!(overlay.timemarks().len(), 1);
    }

    #[tokio::test]
    async fn select_returns_timestamp() {
        let (mut overlay, _backend) = overlay();
        let timemark = saved(&mut overlay, 61.5, "chapter 2").await;

        assert_eq!(overlay.select_for_playback(&timemark.id).unwrap(), 61.5);
        assert_eq!(overlay.selected().map(|t| &t.id), Some(&timemark.id));
        assert!(matches!(
            overlay.select_for_playback(&TimemarkId::new("nope")),
            Err(AnnotationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let (mut overlay, _backend) = overlay();
        saved(&mut overlay, 1.0, "Key Formula").await;
        saved(&mut overlay, 2.0, "proof sketch").await;

        let hits: Vec<&str> = overlay
            .search("formula")
            .into_iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(hits, vec!["Key Formula"]);
        assert_eq!(overlay.search("  ").len(), 2);
    }

    #[tokio::test]
    async fn open_other_video_resets_state() {
        let (mut overlay, _backend) = overlay();
        saved(&mut overlay, 1.0, "x").await;
        overlay.create_draft(&at(2.0)).unwrap();

        overlay.open(AnnotationKey::new("course-1", "lecture-04"));
        assert!(overlay.timemarks().is_empty());
        assert!(overlay.draft().is_none());

        overlay.load().await.unwrap();
        assert!(overlay.timemarks().is_empty());
    }
}
