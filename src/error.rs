// SPDX-License-Identifier: MPL-2.0
use crate::domain::timemark::TimemarkId;
use crate::domain::video::QualityId;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Playback Error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Annotation Error: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("Unknown quality level: {0}")]
    UnknownQualityLevel(QualityId),

    #[error("Invalid playback rate: {0}")]
    InvalidPlaybackRate(f64),

    #[error("Fullscreen Error: {0}")]
    Fullscreen(String),

    #[error("HTTP Error: {0}")]
    Http(String),

    /// A command arrived while no streaming session is live.
    #[error("No active playback session")]
    NoActiveSession,
}

/// Errors that end a playback session.
///
/// Only these cross from the stream controller into the UI layer; transient
/// network and media faults are retried internally and merely logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The environment cannot play the adaptive format at all.
    #[error("Adaptive streaming is not supported in this environment")]
    SourceUnsupported,

    /// Network retries were exhausted.
    #[error("Network error: {0}")]
    Network(String),

    /// Decoding failed again after a recovery attempt.
    #[error("Media error: {0}")]
    Media(String),

    /// Anything unclassified.
    #[error("Fatal playback error: {0}")]
    Fatal(String),
}

impl PlaybackError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            PlaybackError::SourceUnsupported => "error-playback-unsupported",
            PlaybackError::Network(_) => "error-playback-network",
            PlaybackError::Media(_) => "error-playback-media",
            PlaybackError::Fatal(_) => "error-playback-general",
        }
    }
}

/// Which backend call an [`AnnotationError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationOperation {
    List,
    Create,
    Update,
    Delete,
}

impl fmt::Display for AnnotationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Timemark failures. Never affects playback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// The backend call failed (transport error or non-success status).
    #[error("timemark {operation} failed: {message}")]
    Backend {
        operation: AnnotationOperation,
        message: String,
    },

    #[error("timemark {0} not found")]
    NotFound(TimemarkId),

    #[error("no timemark draft is open")]
    NoDraft,

    /// The current source was opened without an annotation key.
    #[error("annotations are not enabled for this video")]
    Disabled,

    /// The confirmation token does not match the pending delete request.
    #[error("delete of timemark {0} was not confirmed")]
    Unconfirmed(TimemarkId),
}

impl AnnotationError {
    pub fn backend(operation: AnnotationOperation, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    /// Returns the i18n message key used for the toast notification.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            AnnotationError::Backend {
                operation: AnnotationOperation::List,
                ..
            } => "notification-timemark-load-error",
            AnnotationError::Backend {
                operation: AnnotationOperation::Delete,
                ..
            } => "notification-timemark-delete-error",
            AnnotationError::Backend { .. } => "notification-timemark-save-error",
            AnnotationError::NotFound(_) => "notification-timemark-not-found",
            AnnotationError::NoDraft
            | AnnotationError::Disabled
            | AnnotationError::Unconfirmed(_) => "notification-timemark-invalid",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
