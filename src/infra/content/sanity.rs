use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{decode_document, decode_documents, queries};
use crate::application::repos::{
    AboutRepo, DatasetExportRepo, GeneralPostsRepo, LearningPostsRepo, RepoError,
};
use crate::config::ContentSettings;
use crate::domain::entities::{AboutRecord, GeneralPost, LearningPost};
use crate::infra::error::InfraError;
use crate::infra::telemetry::{
    METRIC_CONTENT_QUERY_FAILURE_TOTAL, METRIC_CONTENT_QUERY_MS, METRIC_CONTENT_QUERY_TOTAL,
};

const SOURCE: &str = "infra::content::sanity";
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Read-only client for the hosted content store query API.
#[derive(Clone)]
pub struct SanityClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl SanityClient {
    pub fn new(settings: &ContentSettings) -> Result<Self, InfraError> {
        let endpoint = query_endpoint(settings)?;
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("vgwritings/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| InfraError::configuration(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            endpoint,
            token: settings.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn query<T: DeserializeOwned>(
        &self,
        name: &'static str,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RepoError> {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (param, value) in params {
                let encoded = Value::String((*value).to_string()).to_string();
                pairs.append_pair(&format!("${param}"), &encoded);
            }
        }

        counter!(METRIC_CONTENT_QUERY_TOTAL, "query" => name).increment(1);
        let started = Instant::now();
        let outcome = self.execute(url).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!(METRIC_CONTENT_QUERY_MS, "query" => name).record(elapsed_ms);

        match &outcome {
            Ok(_) => debug!(target = SOURCE, query = name, elapsed_ms, "content query finished"),
            Err(err) => {
                counter!(METRIC_CONTENT_QUERY_FAILURE_TOTAL, "query" => name).increment(1);
                warn!(
                    target = SOURCE,
                    query = name,
                    elapsed_ms,
                    error = %err,
                    "content query failed"
                );
            }
        }
        outcome
    }

    async fn execute<T: DeserializeOwned>(&self, url: Url) -> Result<T, RepoError> {
        let mut request = self.http.get(url);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RepoError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepoError::Status {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope: QueryResponse<T> = response.json().await.map_err(RepoError::decode)?;
        Ok(envelope.result)
    }

    async fn query_list<T: DeserializeOwned>(
        &self,
        name: &'static str,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, RepoError> {
        let documents: Option<Vec<Value>> = self.query(name, query, params).await?;
        Ok(decode_documents(documents.unwrap_or_default(), name))
    }

    async fn query_one<T: DeserializeOwned>(
        &self,
        name: &'static str,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, RepoError> {
        let document: Option<Value> = self.query(name, query, params).await?;
        decode_document(document)
    }
}

/// `https://<project>.api[cdn].sanity.io/v<version>/data/query/<dataset>`
fn query_endpoint(settings: &ContentSettings) -> Result<Url, InfraError> {
    let base = match settings.api_host.as_ref() {
        Some(host) => host.clone(),
        None => {
            let project = settings.project_id.as_deref().ok_or_else(|| {
                InfraError::configuration("content.project_id is required for the sanity backend")
            })?;
            let subdomain = if settings.use_cdn { "apicdn" } else { "api" };
            Url::parse(&format!("https://{project}.{subdomain}.sanity.io/")).map_err(|err| {
                InfraError::configuration(format!("invalid content store host: {err}"))
            })?
        }
    };

    let mut endpoint = base;
    endpoint
        .path_segments_mut()
        .map_err(|_| InfraError::configuration("content store host cannot be a base url"))?
        .pop_if_empty()
        .extend([
            format!("v{}", settings.api_version).as_str(),
            "data",
            "query",
            settings.dataset.as_str(),
        ]);
    Ok(endpoint)
}

#[async_trait]
impl GeneralPostsRepo for SanityClient {
    async fn list_general_posts(&self) -> Result<Vec<GeneralPost>, RepoError> {
        self.query_list("general_posts", queries::GENERAL_POSTS, &[])
            .await
    }

    async fn find_general_post(&self, slug: &str) -> Result<Option<GeneralPost>, RepoError> {
        self.query_one(
            "general_post_by_slug",
            queries::GENERAL_POST_BY_SLUG,
            &[("slug", slug)],
        )
        .await
    }

    async fn list_related_posts(
        &self,
        category: &str,
        exclude_slug: &str,
    ) -> Result<Vec<GeneralPost>, RepoError> {
        self.query_list(
            "related_general_posts",
            queries::RELATED_GENERAL_POSTS,
            &[("category", category), ("slug", exclude_slug)],
        )
        .await
    }
}

#[async_trait]
impl LearningPostsRepo for SanityClient {
    async fn list_learning_posts(&self) -> Result<Vec<LearningPost>, RepoError> {
        self.query_list("learning_posts", queries::LEARNING_POSTS, &[])
            .await
    }

    async fn find_learning_post(&self, slug: &str) -> Result<Option<LearningPost>, RepoError> {
        self.query_one(
            "learning_post_by_slug",
            queries::LEARNING_POST_BY_SLUG,
            &[("slug", slug)],
        )
        .await
    }
}

#[async_trait]
impl AboutRepo for SanityClient {
    async fn list_about(&self) -> Result<Vec<AboutRecord>, RepoError> {
        self.query_list("about", queries::ABOUT, &[]).await
    }
}

#[async_trait]
impl DatasetExportRepo for SanityClient {
    async fn export_documents(&self) -> Result<Vec<Value>, RepoError> {
        let documents: Option<Vec<Value>> = self
            .query("export_documents", queries::EXPORT_DOCUMENTS, &[])
            .await?;
        Ok(documents.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentBackend;
    use std::{path::PathBuf, time::Duration};

    fn settings(use_cdn: bool, api_host: Option<&str>) -> ContentSettings {
        ContentSettings {
            backend: ContentBackend::Sanity,
            project_id: Some("abc123".into()),
            dataset: "production".into(),
            api_version: "2024-01-01".into(),
            use_cdn,
            token: None,
            api_host: api_host.map(|host| Url::parse(host).expect("url")),
            dataset_path: PathBuf::from("unused.json"),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn endpoint_follows_cdn_choice() {
        assert_eq!(
            query_endpoint(&settings(true, None)).expect("endpoint").as_str(),
            "https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production"
        );
        assert_eq!(
            query_endpoint(&settings(false, None)).expect("endpoint").as_str(),
            "https://abc123.api.sanity.io/v2024-01-01/data/query/production"
        );
    }

    #[test]
    fn endpoint_honours_host_override() {
        assert_eq!(
            query_endpoint(&settings(true, Some("http://127.0.0.1:9999")))
                .expect("endpoint")
                .as_str(),
            "http://127.0.0.1:9999/v2024-01-01/data/query/production"
        );
    }
}
