use std::{cmp::Ordering, path::Path, sync::Arc};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use super::decode_documents;
use crate::application::repos::{
    AboutRepo, DatasetExportRepo, GeneralPostsRepo, LearningPostsRepo, RELATED_POSTS_LIMIT,
    RepoError,
};
use crate::domain::entities::{AboutRecord, GeneralPost, LearningPost};
use crate::infra::error::InfraError;

const SOURCE: &str = "infra::content::dataset";

const GENERAL_TYPE: &str = "general";
const LEARNING_TYPE: &str = "learning";
const ABOUT_TYPE: &str = "about";

/// Content documents served from a local JSON array, loaded once at startup.
///
/// Answers the same reads as the hosted query API with in-memory filters,
/// so a dataset written by `vgwritings export` renders the same site offline.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    documents: Arc<Vec<Value>>,
}

impl DatasetStore {
    pub async fn load(path: &Path) -> Result<Self, InfraError> {
        let bytes = tokio::fs::read(path).await?;
        let documents: Vec<Value> = serde_json::from_slice(&bytes).map_err(|err| {
            InfraError::configuration(format!(
                "dataset `{}` is not a JSON array of documents: {err}",
                path.display()
            ))
        })?;

        info!(
            target = SOURCE,
            path = %path.display(),
            documents = documents.len(),
            "Loaded local content dataset"
        );
        Ok(Self::from_documents(documents))
    }

    pub fn from_documents(documents: Vec<Value>) -> Self {
        Self {
            documents: Arc::new(documents),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn of_type(&self, kind: &str) -> impl Iterator<Item = &Value> {
        self.documents
            .iter()
            .filter(move |document| document.get("_type").and_then(Value::as_str) == Some(kind))
    }

    fn decode_type<T: DeserializeOwned>(&self, kind: &'static str) -> Vec<T> {
        decode_documents(self.of_type(kind).cloned().collect(), kind)
    }

    fn newest_first<T: DeserializeOwned>(&self, kind: &'static str) -> Vec<T> {
        let mut documents: Vec<Value> = self.of_type(kind).cloned().collect();
        documents.sort_by(|a, b| newest_first(document_date(a), document_date(b)));
        decode_documents(documents, kind)
    }

    fn find_by_slug<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        slug: &str,
    ) -> Result<Option<T>, RepoError> {
        self.of_type(kind)
            .find(|document| document_slug(document) == Some(slug))
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(RepoError::decode)
    }
}

fn document_date(document: &Value) -> Option<&str> {
    document.get("date").and_then(Value::as_str)
}

fn document_slug(document: &Value) -> Option<&str> {
    document
        .get("slug")
        .and_then(|slug| slug.get("current"))
        .and_then(Value::as_str)
}

/// Descending by date string; undated documents sort last.
fn newest_first(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl GeneralPostsRepo for DatasetStore {
    async fn list_general_posts(&self) -> Result<Vec<GeneralPost>, RepoError> {
        Ok(self.newest_first(GENERAL_TYPE))
    }

    async fn find_general_post(&self, slug: &str) -> Result<Option<GeneralPost>, RepoError> {
        self.find_by_slug(GENERAL_TYPE, slug)
    }

    async fn list_related_posts(
        &self,
        category: &str,
        exclude_slug: &str,
    ) -> Result<Vec<GeneralPost>, RepoError> {
        let posts: Vec<GeneralPost> = self.newest_first(GENERAL_TYPE);
        Ok(posts
            .into_iter()
            .filter(|post| post.category.as_deref() == Some(category))
            .filter(|post| post.slug() != exclude_slug)
            .map(|post| GeneralPost {
                content: Vec::new(),
                ..post
            })
            .take(RELATED_POSTS_LIMIT)
            .collect())
    }
}

#[async_trait]
impl LearningPostsRepo for DatasetStore {
    async fn list_learning_posts(&self) -> Result<Vec<LearningPost>, RepoError> {
        let posts: Vec<LearningPost> = self.newest_first(LEARNING_TYPE);
        Ok(posts
            .into_iter()
            .map(|post| LearningPost {
                content: Vec::new(),
                key_moments_data: Vec::new(),
                ..post
            })
            .collect())
    }

    async fn find_learning_post(&self, slug: &str) -> Result<Option<LearningPost>, RepoError> {
        self.find_by_slug(LEARNING_TYPE, slug)
    }
}

#[async_trait]
impl AboutRepo for DatasetStore {
    async fn list_about(&self) -> Result<Vec<AboutRecord>, RepoError> {
        Ok(self.decode_type(ABOUT_TYPE))
    }
}

#[async_trait]
impl DatasetExportRepo for DatasetStore {
    async fn export_documents(&self) -> Result<Vec<Value>, RepoError> {
        Ok(self.documents.as_ref().clone())
    }
}
