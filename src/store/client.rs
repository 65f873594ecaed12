//! Annotation store client
//!
//! The store is a remote HTTP service owning comment persistence. This
//! client is a thin, typed wrapper: every operation crosses the network,
//! every operation can fail, and nothing here orders operations on
//! different comments.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{Comment, CommentId, CommentUpdate, NewComment};
use crate::config::StoreConfig;

/// Errors from the annotation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never completed (connection refused, timeout, bad
    /// response body).
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The store does not know the comment.
    #[error("comment {0} does not exist in the store")]
    NotFound(CommentId),
}

/// Asynchronous comment persistence.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a new comment; the store assigns its id and timestamp.
    async fn create(&self, comment: &NewComment) -> Result<Comment, StoreError>;

    /// Replace a comment's text, returning the updated comment.
    async fn update(&self, id: CommentId, comment_text: &str) -> Result<Comment, StoreError>;

    /// Delete a comment. Deleting an id the store does not know reports
    /// [`StoreError::NotFound`] rather than silently succeeding.
    async fn delete(&self, id: CommentId) -> Result<(), StoreError>;

    /// All comments for one file of one project.
    async fn list(
        &self,
        project_directory: &str,
        file_path: &str,
    ) -> Result<Vec<Comment>, StoreError>;
}

/// [`CommentStore`] backed by the review server's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCommentStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCommentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Build a client from configuration, honoring the request timeout.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(config.base_url.clone()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Read the error body off a failed response.
async fn error_body(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    StoreError::Status { status, message }
}

#[async_trait]
impl CommentStore for HttpCommentStore {
    async fn create(&self, comment: &NewComment) -> Result<Comment, StoreError> {
        let response = self
            .client
            .post(self.url("/api/comments"))
            .json(comment)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_body(response).await);
        }
        Ok(response.json().await?)
    }

    async fn update(&self, id: CommentId, comment_text: &str) -> Result<Comment, StoreError> {
        let payload = CommentUpdate {
            comment_text: comment_text.to_string(),
        };
        let response = self
            .client
            .patch(self.url(&format!("/api/comments/{}", id)))
            .json(&payload)
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Err(StoreError::NotFound(id));
        }
        if !response.status().is_success() {
            return Err(error_body(response).await);
        }
        Ok(response.json().await?)
    }

    async fn delete(&self, id: CommentId) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/comments/{}", id)))
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Err(StoreError::NotFound(id));
        }
        if !response.status().is_success() {
            return Err(error_body(response).await);
        }
        Ok(())
    }

    async fn list(
        &self,
        project_directory: &str,
        file_path: &str,
    ) -> Result<Vec<Comment>, StoreError> {
        let response = self
            .client
            .get(self.url("/api/comments"))
            .query(&[
                ("project_directory", project_directory),
                ("file_path", file_path),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_body(response).await);
        }
        Ok(response.json().await?)
    }
}
