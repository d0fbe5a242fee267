// SPDX-License-Identifier: MPL-2.0
//! Timemark backend port.
//!
//! The backend is the source of truth for persisted timemarks. All calls
//! are keyed by `(course, video)` and return server-assigned ids and
//! timestamps.

use crate::domain::timemark::{AnnotationKey, NewTimemark, Timemark, TimemarkId, TimemarkUpdate};
use crate::error::AnnotationError;
use async_trait::async_trait;

#[async_trait]
pub trait TimemarkBackend: Send + Sync {
    /// Lists the caller's timemarks for one video, in any order.
    async fn list(&self, key: &AnnotationKey) -> Result<Vec<Timemark>, AnnotationError>;

    /// Persists a new timemark.
    async fn create(&self, timemark: &NewTimemark) -> Result<Timemark, AnnotationError>;

    /// Overwrites an existing timemark (last write wins).
    async fn update(
        &self,
        key: &AnnotationKey,
        id: &TimemarkId,
        update: &TimemarkUpdate,
    ) -> Result<Timemark, AnnotationError>;

    async fn delete(&self, key: &AnnotationKey, id: &TimemarkId) -> Result<(), AnnotationError>;
}
