use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{blog::ContentError, repos::RepoError},
    infra::error::InfraError,
};

/// Diagnostic detail attached to error responses and logged by the response middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Status for a content load that did not produce a page.
pub fn content_error_status(error: &ContentError) -> StatusCode {
    match error {
        ContentError::InvalidSlug(_) => StatusCode::NOT_FOUND,
        ContentError::Repo(RepoError::Decode(_)) => StatusCode::BAD_GATEWAY,
        ContentError::Repo(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::slug::validate_route_slug;

    #[test]
    fn content_errors_map_to_statuses() {
        let invalid = validate_route_slug("../etc").expect_err("invalid slug");
        assert_eq!(
            content_error_status(&ContentError::InvalidSlug(invalid)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            content_error_status(&ContentError::Repo(RepoError::decode("bad json"))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            content_error_status(&ContentError::Repo(RepoError::Transport("refused".into()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn report_collects_error_chain() {
        let err = ContentError::Repo(RepoError::unavailable("offline"));
        let report = ErrorReport::from_error("test", StatusCode::SERVICE_UNAVAILABLE, &err);
        assert_eq!(report.messages[0], "content source unavailable: offline");
    }
}
