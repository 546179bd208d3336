//! Transient, non-blocking notifications shown to the reader.

use std::time::Duration;

use uuid::Uuid;

const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    pub ttl: Duration,
}

impl Toast {
    fn build(kind: ToastKind, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            description: None,
            ttl: DEFAULT_TOAST_TTL,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::build(ToastKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::build(ToastKind::Error, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::build(ToastKind::Info, title)
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    /// Notice for a list that could not be loaded.
    pub fn fetch_failed(what: &str) -> Self {
        Self::error(format!("Failed to fetch {what}")).with_description(format!(
            "There was an error fetching {what}. Please try again later."
        ))
    }

    /// Notice for a search that matched nothing.
    pub fn no_search_results(query: &str) -> Self {
        Self::info(format!("No blogs found matching \"{}\"", query.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failure_toast_wording() {
        let toast = Toast::fetch_failed("learning posts");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Failed to fetch learning posts");
        assert_eq!(
            toast.description.as_deref(),
            Some("There was an error fetching learning posts. Please try again later.")
        );
    }

    #[test]
    fn search_toast_quotes_query() {
        let toast = Toast::no_search_results(" zebra ");
        assert_eq!(toast.title, "No blogs found matching \"zebra\"");
    }
}
