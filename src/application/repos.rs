//! Repository traits describing content-store adapters.
//!
//! Every method maps to one fixed, parameterized read query. Adapters neither
//! retry nor cache; callers decide how a failure degrades.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::entities::{AboutRecord, GeneralPost, LearningPost};
use crate::domain::travels::TripRecord;

/// Related posts shown under a general post.
pub const RELATED_POSTS_LIMIT: usize = 6;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("content store request failed: {0}")]
    Transport(String),
    #[error("content store responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode content: {0}")]
    Decode(String),
    #[error("content source unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait GeneralPostsRepo: Send + Sync {
    /// All general posts, newest first.
    async fn list_general_posts(&self) -> Result<Vec<GeneralPost>, RepoError>;

    async fn find_general_post(&self, slug: &str) -> Result<Option<GeneralPost>, RepoError>;

    /// Up to [`RELATED_POSTS_LIMIT`] posts sharing `category`, excluding `exclude_slug`.
    async fn list_related_posts(
        &self,
        category: &str,
        exclude_slug: &str,
    ) -> Result<Vec<GeneralPost>, RepoError>;
}

#[async_trait]
pub trait LearningPostsRepo: Send + Sync {
    /// All learning posts, newest first, without their content bodies.
    async fn list_learning_posts(&self) -> Result<Vec<LearningPost>, RepoError>;

    async fn find_learning_post(&self, slug: &str) -> Result<Option<LearningPost>, RepoError>;
}

#[async_trait]
pub trait AboutRepo: Send + Sync {
    async fn list_about(&self) -> Result<Vec<AboutRecord>, RepoError>;
}

#[async_trait]
pub trait TripsRepo: Send + Sync {
    async fn list_trips(&self) -> Result<Vec<TripRecord>, RepoError>;
}

#[async_trait]
pub trait DatasetExportRepo: Send + Sync {
    /// Raw documents of every kind the site reads, suitable for a local dataset file.
    async fn export_documents(&self) -> Result<Vec<Value>, RepoError>;
}
