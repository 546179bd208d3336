use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::warn;

use crate::{
    application::{
        blog::{BlogService, ContentError},
        chrome::ChromeService,
        error::{ErrorReport, content_error_status},
        toast::Toast,
        travels::TravelService,
    },
    domain::theme::THEME_COOKIE,
    infra::assets::serve_static,
    presentation::views::{
        ContactView, ErrorPageView, ErrorTemplate, GeneralIndexContext, GeneralTemplate,
        HomeContext, IndexTemplate, LayoutChrome, LayoutContext, LearningIndexContext,
        LearningTemplate, NewsletterView, PostDetailContext, PostTemplate, TravelsContext,
        TravelsTemplate, render_not_found_response, render_template_response,
    },
};

use super::{
    middleware::{log_responses, set_request_context},
    ui, visitor_theme,
};

#[derive(Clone)]
pub struct HttpState {
    pub blog: Arc<BlogService>,
    pub travels: Arc<TravelService>,
    pub chrome: ChromeService,
}

impl HttpState {
    pub fn new(blog: BlogService, travels: TravelService, chrome: ChromeService) -> Self {
        Self {
            blog: Arc::new(blog),
            travels: Arc::new(travels),
            chrome,
        }
    }

    fn chrome_for(&self, jar: &CookieJar, path: &str) -> LayoutChrome {
        let theme = visitor_theme(jar, self.chrome.site().default_theme);
        self.chrome.load(path, theme)
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/general", get(general_index))
        .route("/general/{slug}", get(general_detail))
        .route("/learning", get(learning_index))
        .route("/learning/{slug}", get(learning_detail))
        .route("/travels", get(travels))
        .route("/theme/toggle", get(toggle_theme))
        .route("/_health", get(health))
        .route("/static/{*path}", get(serve_static))
        .merge(ui::routes())
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SearchQuery {
    pub(super) q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TripsQuery {
    pub(super) shown: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeToggleQuery {
    return_to: Option<String>,
}

async fn index(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let (learning, about, trips) = tokio::join!(
        state.blog.learning_cards(),
        state.blog.about_sections(),
        state.travels.listing(None),
    );

    let learning_failed = !learning.toasts.is_empty();
    let toasts: Vec<Toast> = learning
        .toasts
        .into_iter()
        .chain(about.toasts)
        .chain(trips.toasts)
        .collect();

    let content = HomeContext {
        learning: learning.value,
        learning_failed,
        has_more_trips: trips.value.next_shown.is_some(),
        trips: trips.value.trips,
        about: about.value,
        career: state.chrome.career(),
        newsletter: NewsletterView::default(),
        contact: ContactView::default(),
    };
    let chrome = state.chrome_for(&jar, "/").with_toasts(toasts);
    let view = LayoutContext::new(chrome, content);
    render_template_response(IndexTemplate { view }, StatusCode::OK)
}

async fn general_index(
    State(state): State<HttpState>,
    jar: CookieJar,
    Query(query): Query<SearchQuery>,
) -> Response {
    let results = state
        .blog
        .general_results(query.q.as_deref().unwrap_or_default())
        .await;
    let chrome = state
        .chrome_for(&jar, "/general")
        .with_title("General")
        .with_toasts(results.toasts);
    let content = GeneralIndexContext {
        results: results.value,
    };
    let view = LayoutContext::new(chrome, content);
    render_template_response(GeneralTemplate { view }, StatusCode::OK)
}

async fn general_detail(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Response {
    let chrome = state.chrome_for(&jar, &format!("/general/{slug}"));
    detail_response(chrome, state.blog.general_detail(&slug).await)
}

async fn learning_index(State(state): State<HttpState>, jar: CookieJar) -> Response {
    let cards = state.blog.learning_cards().await;
    let chrome = state
        .chrome_for(&jar, "/learning")
        .with_title("Learning")
        .with_toasts(cards.toasts);
    let content = LearningIndexContext { posts: cards.value };
    let view = LayoutContext::new(chrome, content);
    render_template_response(LearningTemplate { view }, StatusCode::OK)
}

async fn learning_detail(
    State(state): State<HttpState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Response {
    let chrome = state.chrome_for(&jar, &format!("/learning/{slug}"));
    detail_response(chrome, state.blog.learning_detail(&slug).await)
}

fn detail_response(
    chrome: LayoutChrome,
    outcome: Result<Option<PostDetailContext>, ContentError>,
) -> Response {
    const SOURCE: &str = "infra::http::public::detail_response";

    match outcome {
        Ok(Some(content)) => {
            let chrome = chrome.with_title(&content.title);
            let view = LayoutContext::new(chrome, content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err @ ContentError::InvalidSlug(_)) => {
            let mut response = render_not_found_response(chrome);
            ErrorReport::from_error(SOURCE, StatusCode::NOT_FOUND, &err).attach(&mut response);
            response
        }
        Err(err) => {
            warn!(target = SOURCE, error = %err, "failed to load post");
            let status = content_error_status(&err);
            let chrome = chrome.with_toasts(vec![Toast::fetch_failed("the post")]);
            let view = LayoutContext::new(chrome, ErrorPageView::not_found());
            let mut response = render_template_response(ErrorTemplate { view }, status);
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            response
        }
    }
}

async fn travels(
    State(state): State<HttpState>,
    jar: CookieJar,
    Query(query): Query<TripsQuery>,
) -> Response {
    let listing = state.travels.listing(query.shown).await;
    let chrome = state
        .chrome_for(&jar, "/travels")
        .with_title("Travels")
        .with_toasts(listing.toasts);
    let content = TravelsContext {
        listing: listing.value,
    };
    let view = LayoutContext::new(chrome, content);
    render_template_response(TravelsTemplate { view }, StatusCode::OK)
}

async fn toggle_theme(
    State(state): State<HttpState>,
    jar: CookieJar,
    Query(query): Query<ThemeToggleQuery>,
) -> (CookieJar, Redirect) {
    let next = visitor_theme(&jar, state.chrome.site().default_theme).toggled();
    let cookie = Cookie::build((THEME_COOKIE, next.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .permanent();
    let target = safe_return_path(query.return_to.as_deref());
    (jar.add(cookie), Redirect::to(target))
}

/// Only same-site absolute paths are followed; anything else goes home.
fn safe_return_path(candidate: Option<&str>) -> &str {
    match candidate {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(State(state): State<HttpState>, jar: CookieJar) -> Response {
    render_not_found_response(state.chrome_for(&jar, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_path_stays_on_site() {
        assert_eq!(safe_return_path(Some("/general?q=rust")), "/general?q=rust");
        assert_eq!(safe_return_path(Some("//evil.example")), "/");
        assert_eq!(safe_return_path(Some("https://evil.example")), "/");
        assert_eq!(safe_return_path(Some("/\\evil.example")), "/");
        assert_eq!(safe_return_path(None), "/");
    }
}
