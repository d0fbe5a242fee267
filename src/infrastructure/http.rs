// SPDX-License-Identifier: MPL-2.0
//! HTTP timemark backend.
//!
//! Routes, relative to the configured base URL:
//!
//! | Operation | Request                                                    |
//! |-----------|------------------------------------------------------------|
//! | list      | `GET    courses/{course}/videos/{video}/timemarks`         |
//! | create    | `POST   courses/{course}/videos/{video}/timemarks`         |
//! | update    | `PUT    courses/{course}/videos/{video}/timemarks/{id}`    |
//! | delete    | `DELETE courses/{course}/videos/{video}/timemarks/{id}`    |
//!
//! Bodies are camelCase JSON. Any non-success status is an
//! [`AnnotationError::Backend`], except 404 on update/delete which maps to
//! [`AnnotationError::NotFound`].

use crate::application::port::TimemarkBackend;
use crate::config::TimemarksConfig;
use crate::domain::timemark::{AnnotationKey, NewTimemark, Timemark, TimemarkId, TimemarkUpdate};
use crate::error::{AnnotationError, AnnotationOperation, Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTimemarkBackend {
    client: Client,
    base_url: Url,
}

impl HttpTimemarkBackend {
    /// Creates a backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an unusable URL, [`Error::Http`] if the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid timemark API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "timemark API URL cannot be a base: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("LecturePlayer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Builds the backend from config. `Ok(None)` when no URL is set.
    ///
    /// # Errors
    ///
    /// See [`HttpTimemarkBackend::new`].
    pub fn from_config(config: &TimemarksConfig) -> Result<Option<Self>> {
        config
            .api_base_url
            .as_deref()
            .map(|url| Self::new(url, config.request_timeout()))
            .transpose()
    }

    fn collection_url(&self, key: &AnnotationKey) -> Url {
        self.url_for(key, None)
    }

    fn url_for(&self, key: &AnnotationKey, id: Option<&TimemarkId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "courses",
                key.course_id.as_str(),
                "videos",
                key.video_id.as_str(),
                "timemarks",
            ]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }
}

fn transport_error(operation: AnnotationOperation, err: &reqwest::Error) -> AnnotationError {
    AnnotationError::backend(operation, err.to_string())
}

async fn check_status(
    operation: AnnotationOperation,
    id: Option<&TimemarkId>,
    response: Response,
) -> std::result::Result<Response, AnnotationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(AnnotationError::NotFound(id.clone()));
        }
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%operation, status = status.as_u16(), "timemark request rejected");
    Err(AnnotationError::backend(
        operation,
        format!("HTTP {}: {}", status.as_u16(), body.trim()),
    ))
}

#[async_trait]
impl TimemarkBackend for HttpTimemarkBackend {
    async fn list(&self, key: &AnnotationKey) -> std::result::Result<Vec<Timemark>, AnnotationError> {
        const OP: AnnotationOperation = AnnotationOperation::List;
        let url = self.collection_url(key);
        tracing::debug!(%url, "listing timemarks");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(OP, &e))?;
        check_status(OP, None, response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error(OP, &e))
    }

    async fn create(&self, timemark: &NewTimemark) -> std::result::Result<Timemark, AnnotationError> {
        const OP: AnnotationOperation = AnnotationOperation::Create;
        let key = AnnotationKey {
            course_id: timemark.course_id.clone(),
            video_id: timemark.video_id.clone(),
        };
        let url = self.collection_url(&key);
        tracing::debug!(%url, timestamp = timemark.timestamp, "creating timemark");

        let response = self
            .client
            .post(url)
            .json(timemark)
            .send()
            .await
            .map_err(|e| transport_error(OP, &e))?;
        check_status(OP, None, response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error(OP, &e))
    }

    async fn update(
        &self,
        key: &AnnotationKey,
        id: &TimemarkId,
        update: &TimemarkUpdate,
    ) -> std::result::Result<Timemark, AnnotationError> {
        const OP: AnnotationOperation = AnnotationOperation::Update;
        let url = self.url_for(key, Some(id));
        tracing::debug!(%url, "updating timemark");

        let response = self
            .client
            .put(url)
            .json(update)
            .send()
            .await
            .map_err(|e| transport_error(OP, &e))?;
        check_status(OP, Some(id), response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error(OP, &e))
    }

    async fn delete(&self, key: &AnnotationKey, id: &TimemarkId) -> std::result::Result<(), AnnotationError> {
        const OP: AnnotationOperation = AnnotationOperation::Delete;
        let url = self.url_for(key, Some(id));
        tracing::debug!(%url, "deleting timemark");

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| transport_error(OP, &e))?;
        check_status(OP, Some(id), response).await?;
        Ok(())
    }
}
