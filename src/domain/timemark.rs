// SPDX-License-Identifier: MPL-2.0
//! Timemark domain types.
//!
//! A timemark is a user-authored note bound to a playback timestamp of one
//! video. Persisted timemarks come from the backend; drafts exist only in
//! the annotation overlay until they are saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Course identifier assigned by the course catalog.
    CourseId
);
string_id!(
    /// Video identifier within a course (the manifest file name in practice).
    VideoId
);
string_id!(
    /// Server-assigned timemark identifier.
    TimemarkId
);
string_id!(
    /// Author of a timemark.
    UserId
);

/// The `(course, video)` pair timemarks are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationKey {
    pub course_id: CourseId,
    pub video_id: VideoId,
}

impl AnnotationKey {
    pub fn new(course_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            course_id: CourseId::new(course_id),
            video_id: VideoId::new(video_id),
        }
    }
}

/// A persisted timemark, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timemark {
    pub id: TimemarkId,
    pub course_id: CourseId,
    pub video_id: VideoId,
    pub user_id: UserId,
    /// Position in seconds.
    pub timestamp: f64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_saved: bool,
    #[serde(default)]
    pub is_edited: bool,
}

fn default_true() -> bool {
    true
}

impl Timemark {
    /// Ordering used for every listing: timestamp ascending, then creation time.
    pub fn listing_order(a: &Timemark, b: &Timemark) -> Ordering {
        a.timestamp
            .total_cmp(&b.timestamp)
            .then_with(|| a.created_at.cmp(&b.created_at))
    }

    #[must_use]
    pub fn key(&self) -> AnnotationKey {
        AnnotationKey {
            course_id: self.course_id.clone(),
            video_id: self.video_id.clone(),
        }
    }
}

/// Create request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimemark {
    pub course_id: CourseId,
    pub video_id: VideoId,
    pub timestamp: f64,
    pub content: String,
}

/// Update request body. Last write wins; there is no version field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimemarkUpdate {
    pub timestamp: f64,
    pub content: String,
}

/// Local placeholder id for a draft that has not been saved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(u64);

impl DraftId {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// An editable timemark: either brand new or an open persisted one.
#[derive(Debug, Clone, PartialEq)]
pub struct TimemarkDraft {
    pub draft_id: DraftId,
    /// `Some` when the draft edits an existing timemark.
    pub persisted_id: Option<TimemarkId>,
    pub timestamp: f64,
    pub content: String,
}

impl TimemarkDraft {
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.persisted_id.is_none()
    }
}
