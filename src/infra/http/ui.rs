//! Fragment endpoints driven by datastar.
//!
//! Every handler answers a datastar request with an SSE stream that swaps the
//! affected fragment and the toast stack. Plain requests get the fragment HTML
//! followed by the toast stack so the forms still work without scripts.

use axum::{
    Form, Router,
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    application::{
        blog::reactions_view,
        error::HttpError,
        interactions::{self, ClipboardError, ClipboardWriter},
        stream::StreamBuilder,
        toast::Toast,
    },
    domain::reactions::ReactionState,
    presentation::views::{
        ContactTemplate, ContactView, GeneralResultsPartial, NewsletterTemplate, NewsletterView,
        ReactionsTemplate, ToastStackTemplate, ToastView, TripsPartial, render_fragment,
    },
};

use super::{
    HttpState, is_datastar,
    public::{SearchQuery, TripsQuery},
    selectors::{CONTACT, GENERAL_RESULTS, NEWSLETTER, REACTIONS, TOAST_STACK, TRIPS},
};

const SOURCE: &str = "infra::http::ui";

pub(super) fn routes() -> Router<HttpState> {
    Router::new()
        .route("/ui/general/search", get(search_general))
        .route("/ui/reactions/like", post(toggle_like))
        .route("/ui/reactions/bookmark", post(toggle_bookmark))
        .route("/ui/share", post(share))
        .route("/ui/newsletter", post(newsletter))
        .route("/ui/contact", post(contact))
        .route("/ui/travels", get(more_trips))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReactionForm {
    slug: String,
    liked: bool,
    likes: u64,
    bookmarked: bool,
}

impl ReactionForm {
    fn state(&self) -> ReactionState {
        ReactionState {
            liked: self.liked,
            likes: self.likes,
            bookmarked: self.bookmarked,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ShareForm {
    url: String,
    /// Set by the page when the browser refused the clipboard write.
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewsletterForm {
    email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContactForm {
    name: String,
    email: String,
    message: String,
}

/// Clipboard outcome reported back by the browser.
struct ReportedClipboard {
    error: Option<String>,
}

impl ClipboardWriter for ReportedClipboard {
    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        match self.error.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => Err(ClipboardError(message.to_string())),
            _ => Ok(()),
        }
    }
}

async fn search_general(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Response, HttpError> {
    let results = state
        .blog
        .general_results(query.q.as_deref().unwrap_or_default())
        .await;
    let html = render_fragment(
        GeneralResultsPartial {
            results: results.value,
        },
        SOURCE,
    )?;
    fragment_response(&headers, Some((GENERAL_RESULTS, html)), &results.toasts)
}

async fn toggle_like(
    headers: HeaderMap,
    Form(form): Form<ReactionForm>,
) -> Result<Response, HttpError> {
    let (next, toast) = interactions::toggle_like(form.state());
    reactions_response(&headers, &form.slug, next, toast)
}

async fn toggle_bookmark(
    headers: HeaderMap,
    Form(form): Form<ReactionForm>,
) -> Result<Response, HttpError> {
    let (next, toast) = interactions::toggle_bookmark(form.state());
    reactions_response(&headers, &form.slug, next, toast)
}

fn reactions_response(
    headers: &HeaderMap,
    slug: &str,
    next: ReactionState,
    toast: Toast,
) -> Result<Response, HttpError> {
    let html = render_fragment(
        ReactionsTemplate {
            view: reactions_view(slug, next),
        },
        SOURCE,
    )?;
    fragment_response(headers, Some((REACTIONS, html)), &[toast])
}

async fn share(headers: HeaderMap, Form(form): Form<ShareForm>) -> Result<Response, HttpError> {
    let clipboard = ReportedClipboard { error: form.error };
    let toast = interactions::share_link(&clipboard, &form.url);
    fragment_response(&headers, None, &[toast])
}

async fn newsletter(
    headers: HeaderMap,
    Form(form): Form<NewsletterForm>,
) -> Result<Response, HttpError> {
    let (view, toasts) = match interactions::subscribe(&form.email) {
        Ok((_, toast)) => (
            NewsletterView {
                subscribed: true,
                ..NewsletterView::default()
            },
            vec![toast],
        ),
        Err(err) => (
            NewsletterView {
                email: form.email,
                error: Some(err.to_string()),
                subscribed: false,
            },
            Vec::new(),
        ),
    };
    let html = render_fragment(NewsletterTemplate { view }, SOURCE)?;
    fragment_response(&headers, Some((NEWSLETTER, html)), &toasts)
}

async fn contact(headers: HeaderMap, Form(form): Form<ContactForm>) -> Result<Response, HttpError> {
    let (view, toasts) = match interactions::send_contact(&form.name, &form.email, &form.message)
    {
        Ok(toast) => (
            ContactView {
                sent: true,
                ..ContactView::default()
            },
            vec![toast],
        ),
        Err(err) => (
            ContactView {
                error_field: err.field(),
                error: Some(err.to_string()),
                name: form.name,
                email: form.email,
                message: form.message,
                sent: false,
            },
            Vec::new(),
        ),
    };
    let html = render_fragment(ContactTemplate { view }, SOURCE)?;
    fragment_response(&headers, Some((CONTACT, html)), &toasts)
}

async fn more_trips(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<TripsQuery>,
) -> Result<Response, HttpError> {
    let listing = state.travels.listing(query.shown).await;
    let html = render_fragment(
        TripsPartial {
            listing: listing.value,
        },
        SOURCE,
    )?;
    fragment_response(&headers, Some((TRIPS, html)), &listing.toasts)
}

fn fragment_response(
    headers: &HeaderMap,
    fragment: Option<(&'static str, String)>,
    toasts: &[Toast],
) -> Result<Response, HttpError> {
    let stack = render_fragment(
        ToastStackTemplate {
            toasts: toasts.iter().map(ToastView::from).collect(),
        },
        SOURCE,
    )?;

    if is_datastar(headers) {
        let mut stream = StreamBuilder::new();
        if let Some((selector, html)) = fragment {
            stream.replace(selector, html);
        }
        if !toasts.is_empty() {
            stream.replace(TOAST_STACK, stack);
        }
        return Ok(stream.into_response());
    }

    let body = match fragment {
        Some((_, html)) => format!("{html}{stack}"),
        None => stack,
    };
    Ok(Html(body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_clipboard_fails_only_with_a_message() {
        let ok = ReportedClipboard { error: None };
        assert!(ok.write_text("https://example.com").is_ok());

        let blank = ReportedClipboard {
            error: Some("  ".to_string()),
        };
        assert!(blank.write_text("https://example.com").is_ok());

        let denied = ReportedClipboard {
            error: Some("NotAllowedError".to_string()),
        };
        assert_eq!(
            denied.write_text("https://example.com"),
            Err(ClipboardError("NotAllowedError".to_string()))
        );
    }
}
