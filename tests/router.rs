use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use vgwritings::application::blog::BlogService;
use vgwritings::application::chrome::ChromeService;
use vgwritings::application::render::ContentRenderer;
use vgwritings::application::repos::{
    AboutRepo, GeneralPostsRepo, LearningPostsRepo, RepoError,
};
use vgwritings::application::site;
use vgwritings::application::travels::TravelService;
use vgwritings::domain::assets::AssetResolver;
use vgwritings::domain::entities::{AboutRecord, GeneralPost, LearningPost};
use vgwritings::infra::content::DatasetStore;
use vgwritings::infra::http::{HttpState, build_router};
use vgwritings::infra::trips::TripsFileRepo;

fn documents() -> Vec<Value> {
    vec![
        json!({
            "_id": "g1",
            "_type": "general",
            "title": "Slow Mornings in Porto",
            "slug": {"current": "slow-mornings-in-porto"},
            "date": "2024-05-12",
            "desc": "Coffee and tiles.",
            "tags": ["travel"],
            "category": "travel",
            "likes": 18,
            "content": [
                {"_type": "block", "_key": "h", "style": "h2",
                 "children": [{"_type": "span", "text": "Where to start"}]}
            ]
        }),
        json!({
            "_id": "g2",
            "_type": "general",
            "title": "Packing Light",
            "slug": {"current": "packing-light"},
            "date": "2024-03-02",
            "category": "travel"
        }),
        json!({
            "_id": "l1",
            "_type": "learning",
            "title": "Cancellable Timers",
            "slug": {"current": "async-rust-timers"},
            "date": "2024-06-01",
            "stats": {"likes": 57},
            "content": [
                {"_type": "code", "_key": "c", "language": "rust", "code": "fn main() {}"},
                {"_type": "video", "_key": "v",
                 "file": {"asset": {"url": "https://cdn.example.com/v.mp4"}}}
            ]
        }),
        json!({"_id": "a1", "_type": "about", "title": "About VG"}),
    ]
}

struct FailingContent;

#[async_trait]
impl GeneralPostsRepo for FailingContent {
    async fn list_general_posts(&self) -> Result<Vec<GeneralPost>, RepoError> {
        Err(RepoError::Transport("connection refused".into()))
    }

    async fn find_general_post(&self, _slug: &str) -> Result<Option<GeneralPost>, RepoError> {
        Err(RepoError::Transport("connection refused".into()))
    }

    async fn list_related_posts(
        &self,
        _category: &str,
        _exclude_slug: &str,
    ) -> Result<Vec<GeneralPost>, RepoError> {
        Err(RepoError::Transport("connection refused".into()))
    }
}

#[async_trait]
impl LearningPostsRepo for FailingContent {
    async fn list_learning_posts(&self) -> Result<Vec<LearningPost>, RepoError> {
        Err(RepoError::Transport("connection refused".into()))
    }

    async fn find_learning_post(&self, _slug: &str) -> Result<Option<LearningPost>, RepoError> {
        Err(RepoError::Transport("connection refused".into()))
    }
}

#[async_trait]
impl AboutRepo for FailingContent {
    async fn list_about(&self) -> Result<Vec<AboutRecord>, RepoError> {
        Err(RepoError::Status {
            status: 500,
            message: "boom".into(),
        })
    }
}

fn write_trips(dir: &Path, count: u32) -> std::path::PathBuf {
    let trips: serde_json::Map<String, Value> = (1..=count)
        .map(|id| {
            (
                format!("trip-{id}"),
                json!({"id": id, "title": format!("Trip {id}"), "readTime": "4 days"}),
            )
        })
        .collect();
    let path = dir.join("blog-data.json");
    std::fs::write(&path, serde_json::to_vec(&Value::Object(trips)).expect("encode"))
        .expect("write trips");
    path
}

fn router_with<C>(content: Arc<C>, trips_path: &Path) -> Router
where
    C: GeneralPostsRepo + LearningPostsRepo + AboutRepo + 'static,
{
    let blog = BlogService::new(
        content.clone(),
        content.clone(),
        content,
        ContentRenderer::new(AssetResolver::new(None, "production")),
        "https://vgwritings.example/",
    );
    let travels = TravelService::new(Arc::new(TripsFileRepo::new(trips_path)));
    build_router(HttpState::new(
        blog,
        travels,
        ChromeService::new(site::current()),
    ))
}

fn router(trips_path: &Path) -> Router {
    router_with(Arc::new(DatasetStore::from_documents(documents())), trips_path)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    (
        status,
        headers,
        String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

fn datastar_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("datastar-request", "true")
        .body(Body::empty())
        .expect("request should build")
}

fn post_form(uri: &str, body: &str, datastar: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if datastar {
        builder = builder.header("datastar-request", "true");
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

#[tokio::test]
async fn home_page_renders_learning_and_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 5));

    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cancellable Timers"));
    assert!(body.contains("About VG"));
    assert!(body.contains("Trip 3"));
    assert!(!body.contains("Trip 4"));
    assert!(body.contains("id=\"toast-stack\""));
}

#[tokio::test]
async fn home_page_shows_career_timeline_and_profile_links() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("id=\"career\""));
    assert!(body.contains("Career Journey"));
    assert!(body.contains("Alphabet Inc."));
    assert!(body.contains("Improved page load speed by 30%"));
    assert!(body.contains("career__entry career__entry--end"));
    assert!(body.contains("href=\"https://github.com/TheVinayakGore\""));
    assert!(body.contains("rel=\"noopener noreferrer\""));

    let (_, _, body) = send(&app, get("/general")).await;
    assert!(body.contains("class=\"social-links\""));
    assert!(!body.contains("id=\"career\""));
}

#[tokio::test]
async fn unknown_slug_renders_not_found_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    for uri in ["/general/missing", "/learning/missing", "/general/bad%20slug", "/nowhere"] {
        let (status, _, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.contains("Post not found"), "{uri}");
    }
}

#[tokio::test]
async fn general_detail_renders_toc_related_and_reactions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, _, body) = send(&app, get("/general/slow-mornings-in-porto")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("href=\"#h\""));
    assert!(body.contains("Packing Light"));
    assert!(body.contains("id=\"reactions\""));
    assert!(body.contains("https://vgwritings.example/general/slow-mornings-in-porto"));
}

#[tokio::test]
async fn learning_detail_renders_player_and_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, _, body) = send(&app, get("/learning/async-rust-timers")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-video-player"));
    assert!(body.contains("syntax-highlight"));
    assert!(body.contains("57 likes"));
}

#[tokio::test]
async fn search_without_matches_shows_notice() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, _, body) = send(&app, get("/general?q=zebra")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No blogs found matching"));

    let (_, _, body) = send(&app, get("/general?q=porto")).await;
    assert!(body.contains("Slow Mornings in Porto"));
    assert!(!body.contains("Packing Light"));
    assert!(!body.contains("No blogs found matching"));
}

#[tokio::test]
async fn datastar_search_streams_patches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, headers, body) = send(&app, datastar_get("/ui/general/search?q=packing")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .expect("content type")
            .starts_with("text/event-stream")
    );
    assert!(body.contains("#general-results"));
    assert!(body.contains("Packing Light"));
}

#[tokio::test]
async fn content_failures_degrade_to_toasts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router_with(Arc::new(FailingContent), &write_trips(dir.path(), 2));

    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Failed to fetch learning posts"));
    assert!(body.contains("Failed to fetch about content"));
    assert!(body.contains("Trip 1"));

    let (status, _, body) = send(&app, get("/general")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Failed to fetch blogs"));

    let (status, _, body) = send(&app, get("/general/slow-mornings-in-porto")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Failed to fetch the post"));
}

#[tokio::test]
async fn travels_page_loads_more() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 7));

    let (status, _, body) = send(&app, get("/travels")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/travels?shown=6"));

    let (_, _, body) = send(&app, get("/ui/travels?shown=6")).await;
    assert!(body.contains("Trip 6"));
    assert!(body.contains("/travels?shown=7"));

    let (_, _, body) = send(&app, get("/travels?shown=7")).await;
    assert!(body.contains("Trip 7"));
    assert!(!body.contains("Load more"));
}

#[tokio::test]
async fn theme_toggle_sets_cookie_and_redirects() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, headers, _) = send(&app, get("/theme/toggle?return_to=/general")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/general");
    let cookie = headers[header::SET_COOKIE].to_str().expect("cookie");
    assert!(cookie.starts_with("vg_theme=dark"));

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "vg_theme=dark")
        .body(Body::empty())
        .expect("request should build");
    let (_, _, body) = send(&app, request).await;
    assert!(body.contains("data-theme=\"dark\""));
}

#[tokio::test]
async fn like_toggle_patches_reactions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, _, body) = send(
        &app,
        post_form(
            "/ui/reactions/like",
            "slug=porto&liked=false&likes=3&bookmarked=false",
            true,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("#reactions"));
    assert!(body.contains("name=\"likes\" value=\"4\""));
    assert!(body.contains("Liked post"));
}

#[tokio::test]
async fn forms_validate_and_acknowledge() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, _, body) = send(&app, post_form("/ui/newsletter", "email=nope", false)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("aria-invalid=\"true\""));

    let (_, _, body) = send(
        &app,
        post_form("/ui/newsletter", "email=reader%40example.com", false),
    )
    .await;
    assert!(body.contains("Thank you for subscribing!"));

    let (_, _, body) = send(
        &app,
        post_form(
            "/ui/contact",
            "name=Ana&email=ana%40example.com&message=",
            false,
        ),
    )
    .await;
    assert!(body.contains("id=\"contact-message\""));
    assert!(body.contains("form-error"));

    let (_, _, body) = send(
        &app,
        post_form(
            "/ui/contact",
            "name=Ana&email=ana%40example.com&message=Hello",
            true,
        ),
    )
    .await;
    assert!(body.contains("Message sent."));
}

#[tokio::test]
async fn share_reports_clipboard_outcome() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (_, _, body) = send(
        &app,
        post_form("/ui/share", "url=https%3A%2F%2Fvgwritings.example%2Fgeneral%2Fa", true),
    )
    .await;
    assert!(body.contains("Link copied!"));

    let (_, _, body) = send(
        &app,
        post_form(
            "/ui/share",
            "url=https%3A%2F%2Fvgwritings.example%2Fgeneral%2Fa&error=NotAllowedError",
            true,
        ),
    )
    .await;
    assert!(body.contains("Failed to copy the link."));
    assert!(body.contains("NotAllowedError"));
}

#[tokio::test]
async fn health_and_static_assets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, headers, _) = send(&app, get("/_health")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(headers.contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/_health")
        .header("x-request-id", "edge-42")
        .body(Body::empty())
        .expect("request should build");
    let (_, headers, _) = send(&app, request).await;
    assert_eq!(headers["x-request-id"], "edge-42");

    let (status, headers, _) = send(&app, get("/static/site.css")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/css");

    let (status, _, _) = send(&app, get("/static/missing.js")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn script_function<'a>(script: &'a str, name: &str) -> &'a str {
    let start = script
        .find(&format!("function {name}("))
        .unwrap_or_else(|| panic!("{name} should be defined"));
    let rest = &script[start..];
    let end = rest.find("\n    }\n").expect("function should close");
    &rest[..end]
}

#[tokio::test]
async fn player_script_follows_widget_rules() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = router(&write_trips(dir.path(), 0));

    let (status, _, script) = send(&app, get("/static/site.js")).await;
    assert_eq!(status, StatusCode::OK);

    assert!(script.contains("window.addEventListener(\"keydown\", onKeydown)"));
    assert!(script.contains("window.removeEventListener(\"keydown\", onKeydown)"));
    assert!(!script.contains("root.addEventListener(\"keydown\""));

    let show_controls = script_function(&script, "showControls");
    assert!(show_controls.contains("CONTROLS_HIDE_DELAY_MS"));
    assert!(!show_controls.contains("paused"));

    let toggle_mute = script_function(&script, "toggleMute");
    assert!(toggle_mute.contains("if (level === 0) level = UNMUTE_FALLBACK_VOLUME;"));
    assert!(!toggle_mute.contains("volume.value"));
    assert!(script_function(&script, "setVolume").contains("muted = level === 0;"));
}
