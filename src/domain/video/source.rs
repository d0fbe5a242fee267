// SPDX-License-Identifier: MPL-2.0
//! The media source a player session is opened for.

use crate::domain::timemark::AnnotationKey;

/// Identifies the manifest to load, plus what the host knows about it.
///
/// # Example
///
/// ```
/// use lecture_player::domain::timemark::AnnotationKey;
/// use lecture_player::domain::video::MediaSource;
///
/// let source = MediaSource::new("https://cdn.example.com/c1/3/intro.m3u8")
///     .with_title("Week 3: Introduction")
///     .with_annotations(AnnotationKey::new("c1", "intro.m3u8"))
///     .starting_at(95.4);
/// assert_eq!(source.title.as_deref(), Some("Week 3: Introduction"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    /// Adaptive manifest URL.
    pub url: String,
    /// Optional display title.
    pub title: Option<String>,
    /// Position to resume at once metadata is known (e.g. opened from a timemark).
    pub start_at_secs: Option<f64>,
    /// Key under which timemarks for this video are stored, if annotations are enabled.
    pub annotations: Option<AnnotationKey>,
}

impl MediaSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            start_at_secs: None,
            annotations: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn starting_at(mut self, secs: f64) -> Self {
        self.start_at_secs = (secs.is_finite() && secs > 0.0).then_some(secs);
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, key: AnnotationKey) -> Self {
        self.annotations = Some(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_at_ignores_non_positive_offsets() {
        assert_eq!(MediaSource::new("a").starting_at(0.0).start_at_secs, None);
        assert_eq!(MediaSource::new("a").starting_at(-3.0).start_at_secs, None);
        assert_eq!(
            MediaSource::new("a").starting_at(f64::NAN).start_at_secs,
            None
        );
        assert_eq!(
            MediaSource::new("a").starting_at(12.0).start_at_secs,
            Some(12.0)
        );
    }
}
