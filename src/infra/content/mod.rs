//! Content store adapters.
//!
//! [`SanityClient`] talks to the hosted query API; [`DatasetStore`] serves the
//! same documents from a local JSON file. Both implement every content
//! repository trait so the application layer cannot tell them apart.

mod dataset;
pub mod queries;
mod sanity;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

pub use dataset::DatasetStore;
pub use sanity::SanityClient;

use crate::application::repos::RepoError;

const SOURCE: &str = "infra::content";

/// Decode a list of raw documents, skipping any that do not match `T`.
pub(crate) fn decode_documents<T: DeserializeOwned>(documents: Vec<Value>, kind: &str) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match serde_json::from_value(document) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!(
                        target = SOURCE,
                        kind,
                        id = %id,
                        error = %err,
                        "skipping malformed document"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Decode a single optional document; a malformed one is an error.
pub(crate) fn decode_document<T: DeserializeOwned>(
    document: Option<Value>,
) -> Result<Option<T>, RepoError> {
    document
        .filter(|value| !value.is_null())
        .map(serde_json::from_value)
        .transpose()
        .map_err(RepoError::decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GeneralPost;
    use serde_json::json;

    #[test]
    fn malformed_documents_are_skipped() {
        let posts: Vec<GeneralPost> = decode_documents(
            vec![
                json!({"_id": "a", "title": "Kept"}),
                json!({"_id": "b", "title": 7}),
            ],
            "general",
        );
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Kept");
    }

    #[test]
    fn null_detail_is_absent() {
        let post: Option<GeneralPost> = decode_document(Some(Value::Null)).expect("decode");
        assert!(post.is_none());
    }
}
